//! Lending engine facade: the five account operations over an injected store.
//!
//! Reads never take an account lock and work on a snapshot of the stored
//! set. `execute` performs its read-modify-write under the per-account lock
//! so concurrent writers on one account never lose an update.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::{DemoPositionConfig, EngineConfig};
use crate::errors::EngineError;
use crate::types::{
    AccountKey, Market, PortfolioSummary, Position, Receipt, TransactionPreview, TransactionType,
};

use super::account_locks::AccountLocks;
use super::executor;
use super::gas::{GasOracle, StaticGasOracle};
use super::market_registry::MarketRegistry;
use super::portfolio::summarize;
use super::position_store::{
    load_or_materialize, materialize_positions, InMemoryPositionStore, PositionStore,
};
use super::simulator::{self, TransactionEffect};
use super::validation::{
    check_amount_usd, check_asset, check_balance, check_network, parse_amount_lenient,
    parse_amount_strict, ValidationMode,
};

// ---------------------------------------------------------------------------
// Settings and requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub validation_mode: ValidationMode,
    /// Finite health factor reported in previews for debt-free accounts.
    pub no_debt_health_factor: Decimal,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::Lenient,
            no_debt_health_factor: crate::constants::DEFAULT_NO_DEBT_HEALTH_FACTOR,
        }
    }
}

/// Hypothetical transaction to preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub tx_type: TransactionType,
    pub asset: String,
    /// Raw amount as entered. Parsed according to the validation mode.
    pub amount: String,
    pub network_id: u64,
    pub address: String,
}

/// Transaction to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub tx_type: TransactionType,
    pub asset: String,
    pub amount: String,
    pub network_id: u64,
    pub address: String,
    /// Prefer a signed permit over an approve transaction when the asset
    /// supports it.
    pub use_permit: bool,
}

// ---------------------------------------------------------------------------
// LendingEngine
// ---------------------------------------------------------------------------

pub struct LendingEngine {
    registry: MarketRegistry,
    store: Arc<dyn PositionStore>,
    gas: Arc<dyn GasOracle>,
    settings: EngineSettings,
    locks: AccountLocks,
}

impl LendingEngine {
    pub fn new(
        registry: MarketRegistry,
        store: Arc<dyn PositionStore>,
        gas: Arc<dyn GasOracle>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            registry,
            store,
            gas,
            settings,
            locks: AccountLocks::new(),
        }
    }

    /// Build an engine over an in-memory store and seed the demo account on
    /// every configured network when enabled.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let engine = Self::new(
            MarketRegistry::from_config(&config.markets),
            Arc::new(InMemoryPositionStore::new()),
            Arc::new(StaticGasOracle::from_config(&config.engine.gas)),
            EngineSettings {
                validation_mode: config.engine.validation_mode,
                no_debt_health_factor: config.engine.no_debt_health_factor,
            },
        );

        if let Some(demo) = config.engine.demo_account.as_ref().filter(|d| d.enabled) {
            let network_ids: Vec<u64> = engine.registry.networks().iter().map(|n| n.id).collect();
            for network_id in network_ids {
                engine.seed_account(network_id, &demo.address, &demo.positions)?;
            }
            info!(
                address = %demo.address,
                networks = engine.registry.networks().len(),
                "demo account seeded"
            );
        }

        Ok(engine)
    }

    pub fn registry(&self) -> &MarketRegistry {
        &self.registry
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Overwrite an account with the given balances, marked at registry prices.
    ///
    /// Symbols without a market are skipped.
    pub fn seed_account(
        &self,
        network_id: u64,
        address: &str,
        balances: &[DemoPositionConfig],
    ) -> Result<(), EngineError> {
        let key = AccountKey::new(network_id, address);
        let mut positions = materialize_positions(&self.registry);

        for balance in balances {
            let Some(pos) = positions.iter_mut().find(|p| p.symbol == balance.symbol) else {
                debug!(symbol = %balance.symbol, "seed balance for unlisted market skipped");
                continue;
            };
            let price = self.registry.price(&balance.symbol);
            pos.supplied_amount = balance.supplied_amount;
            pos.supplied_value_usd = balance.supplied_amount.saturating_mul(price);
            pos.borrowed_amount = balance.borrowed_amount;
            pos.borrowed_value_usd = balance.borrowed_amount.saturating_mul(price);
            pos.is_collateral = balance.is_collateral && !balance.supplied_amount.is_zero();
        }

        self.locks
            .with_lock(&key, || self.store.set(&key, positions))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Every listed market with the network's APY adjustment applied.
    pub fn markets(&self, network_id: u64) -> Result<Vec<Market>, EngineError> {
        if self.settings.validation_mode == ValidationMode::Strict {
            self.reject_unsupported_network(network_id)?;
        }
        Ok(self.registry.markets(network_id))
    }

    /// Stored positions, or a zero set for an account never written.
    pub fn positions(&self, network_id: u64, address: &str) -> Result<Vec<Position>, EngineError> {
        if self.settings.validation_mode == ValidationMode::Strict {
            self.reject_unsupported_network(network_id)?;
        }
        let key = AccountKey::new(network_id, address);
        load_or_materialize(self.store.as_ref(), &self.registry, &key)
    }

    pub fn summary(&self, network_id: u64, address: &str) -> Result<PortfolioSummary, EngineError> {
        let positions = self.positions(network_id, address)?;
        Ok(summarize(&positions, &self.registry))
    }

    // -----------------------------------------------------------------------
    // Preview
    // -----------------------------------------------------------------------

    pub fn preview(&self, request: &PreviewRequest) -> Result<TransactionPreview, EngineError> {
        self.preview_with_mode(request, self.settings.validation_mode)
    }

    /// Preview under an explicit validation mode. Never writes.
    pub fn preview_with_mode(
        &self,
        request: &PreviewRequest,
        mode: ValidationMode,
    ) -> Result<TransactionPreview, EngineError> {
        if mode == ValidationMode::Strict {
            self.reject_unsupported_network(request.network_id)?;
        }
        let key = AccountKey::new(request.network_id, &request.address);
        let positions = load_or_materialize(self.store.as_ref(), &self.registry, &key)?;
        let effect = self.effect(
            mode,
            request.tx_type,
            &request.asset,
            &request.amount,
            &positions,
        )?;

        Ok(simulator::preview(
            &self.registry,
            &positions,
            &request.asset,
            &effect,
            self.gas.quote(request.network_id, request.tx_type),
            self.settings.no_debt_health_factor,
        ))
    }

    // -----------------------------------------------------------------------
    // Execute
    // -----------------------------------------------------------------------

    pub fn execute(&self, request: &TransactionRequest) -> Result<Receipt, EngineError> {
        self.execute_with_mode(request, self.settings.validation_mode)
    }

    /// Commit a transaction under an explicit validation mode.
    pub fn execute_with_mode(
        &self,
        request: &TransactionRequest,
        mode: ValidationMode,
    ) -> Result<Receipt, EngineError> {
        if mode == ValidationMode::Strict {
            self.reject_unsupported_network(request.network_id)?;
        }
        let key = AccountKey::new(request.network_id, &request.address);

        let updated = self.locks.with_lock(&key, || {
            let mut positions = load_or_materialize(self.store.as_ref(), &self.registry, &key)?;
            let effect = self.effect(
                mode,
                request.tx_type,
                &request.asset,
                &request.amount,
                &positions,
            )?;
            let updated = simulator::apply_to_account(&mut positions, &request.asset, &effect);
            self.store.set(&key, positions)?;
            Ok(updated)
        })?;

        let approval = executor::approval_mode(
            request.tx_type,
            self.registry.supports_permit(&request.asset),
            request.use_permit,
        );
        let receipt = executor::build_receipt(
            request.tx_type,
            &request.asset,
            &request.amount,
            approval,
        );

        match &updated {
            Some(pos) => info!(
                account = %key,
                tx_hash = %receipt.hash,
                tx_type = %request.tx_type,
                asset = %request.asset,
                amount = %request.amount,
                supplied = %pos.supplied_amount,
                borrowed = %pos.borrowed_amount,
                collateral = pos.is_collateral,
                approval = ?approval,
                "transaction executed"
            ),
            None => info!(
                account = %key,
                tx_hash = %receipt.hash,
                tx_type = %request.tx_type,
                asset = %request.asset,
                "transaction executed with no matching position"
            ),
        }

        Ok(receipt)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Parse and mark a request amount, enforcing the strict checks when asked.
    fn effect(
        &self,
        mode: ValidationMode,
        tx_type: TransactionType,
        asset: &str,
        raw_amount: &str,
        positions: &[Position],
    ) -> Result<TransactionEffect, EngineError> {
        match mode {
            ValidationMode::Lenient => {
                let amount = parse_amount_lenient(raw_amount);
                if amount.is_zero() && !raw_amount.trim().is_empty() {
                    debug!(raw = raw_amount, "amount normalized to zero");
                }
                Ok(TransactionEffect::new(
                    tx_type,
                    amount,
                    self.registry.price(asset),
                ))
            }
            ValidationMode::Strict => self
                .strict_effect(tx_type, asset, raw_amount, positions)
                .inspect_err(|e| {
                    warn!(code = e.code(), error = %e, %tx_type, asset, "request rejected");
                }),
        }
    }

    fn strict_effect(
        &self,
        tx_type: TransactionType,
        asset: &str,
        raw_amount: &str,
        positions: &[Position],
    ) -> Result<TransactionEffect, EngineError> {
        let market = check_asset(&self.registry, asset)?;
        let amount = parse_amount_strict(raw_amount)?;
        let amount_usd = check_amount_usd(raw_amount, amount, market.price_usd)?;
        check_balance(positions, tx_type, asset, amount)?;
        Ok(TransactionEffect {
            tx_type,
            amount,
            amount_usd,
        })
    }

    fn reject_unsupported_network(&self, network_id: u64) -> Result<(), EngineError> {
        check_network(&self.registry, network_id).inspect_err(|e| {
            warn!(code = e.code(), network_id, "request rejected");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::constants::DEMO_ACCOUNT_ADDRESS;
    use crate::types::{ApprovalMode, HealthFactor, TxStatus};

    fn engine() -> LendingEngine {
        LendingEngine::from_config(&EngineConfig::default()).unwrap()
    }

    fn strict_engine() -> LendingEngine {
        let mut config = EngineConfig::default();
        config.engine.validation_mode = ValidationMode::Strict;
        LendingEngine::from_config(&config).unwrap()
    }

    fn tx(tx_type: TransactionType, asset: &str, amount: &str, address: &str) -> TransactionRequest {
        TransactionRequest {
            tx_type,
            asset: asset.into(),
            amount: amount.into(),
            network_id: 1,
            address: address.into(),
            use_permit: true,
        }
    }

    fn preview_req(tx_type: TransactionType, asset: &str, amount: &str, address: &str) -> PreviewRequest {
        PreviewRequest {
            tx_type,
            asset: asset.into(),
            amount: amount.into(),
            network_id: 1,
            address: address.into(),
        }
    }

    fn supplied(engine: &LendingEngine, address: &str, symbol: &str) -> Position {
        engine
            .positions(1, address)
            .unwrap()
            .into_iter()
            .find(|p| p.symbol == symbol)
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // reads
    // -----------------------------------------------------------------------

    #[test]
    fn test_demo_account_seeded_on_every_network() {
        let engine = engine();
        for network in engine.registry().networks() {
            let summary = engine.summary(network.id, DEMO_ACCOUNT_ADDRESS).unwrap();
            assert_eq!(summary.total_supplied_usd, dec!(10530.75));
            assert_eq!(summary.total_borrowed_usd, dec!(1500));
            assert_eq!(summary.health_factor, HealthFactor::Ratio(dec!(5.71)));
            assert_eq!(summary.borrowing_power, dec!(82.49));
            // (31512.0875 - 8505) / 10530.75 at base APYs
            assert_eq!(summary.net_apy, dec!(2.18), "network {}", network.id);
        }
    }

    #[test]
    fn test_positions_keep_base_apys_while_markets_adjust() {
        let engine = engine();
        let positions = engine.positions(8453, DEMO_ACCOUNT_ADDRESS).unwrap();
        assert_eq!(positions[0].symbol, "ETH");
        assert_eq!(positions[0].supply_apy, dec!(2.45));
        assert!(!positions[2].is_collateral);

        let fresh = engine.positions(1, "0xnobody").unwrap();
        assert_eq!(fresh[0].supply_apy, dec!(2.45));

        let markets = engine.markets(8453).unwrap();
        assert_eq!(markets[0].supply_apy, dec!(2.60));
    }

    #[test]
    fn test_unknown_account_reads_as_zero_without_writing() {
        let store = Arc::new(InMemoryPositionStore::new());
        let engine = LendingEngine::new(
            MarketRegistry::reference(),
            store.clone(),
            Arc::new(StaticGasOracle::from_config(&Default::default())),
            EngineSettings::default(),
        );

        let positions = engine.positions(10, "0xNEW").unwrap();
        assert_eq!(positions.len(), 4);
        assert!(positions.iter().all(Position::is_empty));
        let summary = engine.summary(10, "0xnew").unwrap();
        assert!(summary.health_factor.is_no_debt());
        assert!(store.is_empty());
    }

    #[test]
    fn test_address_is_case_insensitive() {
        let engine = engine();
        let upper = DEMO_ACCOUNT_ADDRESS.to_uppercase().replace("0X", "0x");
        let summary = engine.summary(1, &upper).unwrap();
        assert_eq!(summary.total_supplied_usd, dec!(10530.75));
    }

    // -----------------------------------------------------------------------
    // execute
    // -----------------------------------------------------------------------

    #[test]
    fn test_execute_updates_only_target_account() {
        let engine = engine();
        let receipt = engine
            .execute(&tx(TransactionType::Supply, "ETH", "1.5", "0xAlice"))
            .unwrap();
        assert_eq!(receipt.status, TxStatus::Success);
        assert_eq!(receipt.amount, "1.5");
        // ETH has no permit support.
        assert_eq!(receipt.approval, ApprovalMode::Approve);

        let eth = supplied(&engine, "0xalice", "ETH");
        assert_eq!(eth.supplied_amount, dec!(1.5));
        assert_eq!(eth.supplied_value_usd, dec!(3368.25));
        assert!(eth.is_collateral);

        assert!(supplied(&engine, "0xbob", "ETH").is_empty());
        let other_network = engine.positions(10, "0xalice").unwrap();
        assert!(other_network.iter().all(Position::is_empty));
    }

    #[test]
    fn test_preview_matches_execute() {
        let engine = engine();
        let address = "0xcarol";
        engine
            .execute(&tx(TransactionType::Supply, "WBTC", "0.3", address))
            .unwrap();

        let preview = engine
            .preview(&preview_req(TransactionType::Withdraw, "WBTC", "0.125", address))
            .unwrap();
        engine
            .execute(&tx(TransactionType::Withdraw, "WBTC", "0.125", address))
            .unwrap();

        assert_eq!(preview.projected_position.unwrap(), supplied(&engine, address, "WBTC"));
    }

    #[test]
    fn test_lenient_over_withdraw_clamps() {
        let engine = engine();
        let address = "0xdave";
        engine.execute(&tx(TransactionType::Supply, "ETH", "1.0", address)).unwrap();
        engine.execute(&tx(TransactionType::Withdraw, "ETH", "5.0", address)).unwrap();

        let eth = supplied(&engine, address, "ETH");
        assert_eq!(eth.supplied_amount, Decimal::ZERO);
        assert!(!eth.is_collateral);
    }

    #[test]
    fn test_lenient_garbage_amount_is_noop() {
        let engine = engine();
        let receipt = engine
            .execute(&tx(TransactionType::Supply, "DAI", "abc", "0xerin"))
            .unwrap();
        assert_eq!(receipt.amount, "abc");
        let dai = supplied(&engine, "0xerin", "DAI");
        assert!(dai.is_empty());
        assert!(!dai.is_collateral);
    }

    #[test]
    fn test_borrow_receipt_has_no_approval() {
        let engine = engine();
        let receipt = engine
            .execute(&tx(TransactionType::Borrow, "USDC", "10", DEMO_ACCOUNT_ADDRESS))
            .unwrap();
        assert_eq!(receipt.approval, ApprovalMode::None);
        assert_eq!(supplied(&engine, DEMO_ACCOUNT_ADDRESS, "USDC").borrowed_amount, dec!(1510));
    }

    #[test]
    fn test_concurrent_executes_lose_no_updates() {
        let engine = engine();
        let address = "0xconcurrent";

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..25 {
                        engine
                            .execute(&tx(TransactionType::Supply, "USDC", "1", address))
                            .unwrap();
                    }
                });
            }
        });

        let usdc = supplied(&engine, address, "USDC");
        assert_eq!(usdc.supplied_amount, dec!(200));
        assert_eq!(usdc.supplied_value_usd, dec!(200));
    }

    // -----------------------------------------------------------------------
    // preview
    // -----------------------------------------------------------------------

    #[test]
    fn test_preview_unknown_asset_lenient() {
        let engine = engine();
        let preview = engine
            .preview(&preview_req(TransactionType::Supply, "ZZZ", "10", DEMO_ACCOUNT_ADDRESS))
            .unwrap();
        assert!(preview.projected_position.is_none());
        assert_eq!(preview.new_health_factor, dec!(5.71));
        assert_eq!(preview.gas.gas_usd, dec!(5.61));
    }

    #[test]
    fn test_preview_never_writes() {
        let engine = engine();
        engine
            .preview(&preview_req(TransactionType::Supply, "ETH", "3", "0xfrank"))
            .unwrap();
        assert!(supplied(&engine, "0xfrank", "ETH").is_empty());
    }

    // -----------------------------------------------------------------------
    // strict mode
    // -----------------------------------------------------------------------

    #[test]
    fn test_strict_rejects_what_lenient_clamps() {
        let engine = strict_engine();
        let address = "0xgrace";
        engine.execute(&tx(TransactionType::Supply, "ETH", "1.0", address)).unwrap();

        let err = engine
            .execute(&tx(TransactionType::Withdraw, "ETH", "5.0", address))
            .unwrap_err();
        assert_eq!(err.code(), "insufficient_balance");
        assert_eq!(supplied(&engine, address, "ETH").supplied_amount, dec!(1.0));

        let err = engine
            .execute(&tx(TransactionType::Repay, "DAI", "1", address))
            .unwrap_err();
        assert_eq!(err.code(), "insufficient_balance");
    }

    #[test]
    fn test_strict_rejections() {
        let engine = strict_engine();
        let address = "0xheidi";

        let err = engine.execute(&tx(TransactionType::Supply, "ZZZ", "1", address)).unwrap_err();
        assert_eq!(err.code(), "unknown_asset");

        for amount in ["", "abc", "-1", "0"] {
            let err = engine
                .execute(&tx(TransactionType::Supply, "ETH", amount, address))
                .unwrap_err();
            assert_eq!(err.code(), "invalid_amount", "amount {amount:?}");
        }

        let mut request = tx(TransactionType::Supply, "ETH", "1", address);
        request.network_id = 56;
        assert_eq!(engine.execute(&request).unwrap_err().code(), "unsupported_network");
        assert_eq!(engine.markets(56).unwrap_err().code(), "unsupported_network");

        let err = engine
            .preview(&preview_req(TransactionType::Supply, "ZZZ", "1", address))
            .unwrap_err();
        assert_eq!(err.code(), "unknown_asset");
    }

    #[test]
    fn test_rejected_executes_leave_no_lock_entries() {
        let engine = strict_engine();
        for i in 0..50 {
            let address = format!("0xstranger{i}");
            let err = engine
                .execute(&tx(TransactionType::Withdraw, "ETH", "1", &address))
                .unwrap_err();
            assert_eq!(err.code(), "insufficient_balance");
            let err = engine
                .execute(&tx(TransactionType::Supply, "ZZZ", "1", &address))
                .unwrap_err();
            assert_eq!(err.code(), "unknown_asset");
        }
        engine.execute(&tx(TransactionType::Supply, "ETH", "1", "0xjudy")).unwrap();
        assert!(engine.locks.is_empty());
    }

    #[test]
    fn test_explicit_mode_overrides_setting() {
        let engine = engine();
        let request = tx(TransactionType::Withdraw, "ETH", "5", "0xivan");
        let err = engine
            .execute_with_mode(&request, ValidationMode::Strict)
            .unwrap_err();
        assert_eq!(err.code(), "insufficient_balance");
        assert!(engine.execute_with_mode(&request, ValidationMode::Lenient).is_ok());
    }

    #[test]
    fn test_lenient_serves_unlisted_network() {
        let engine = engine();
        let markets = engine.markets(56).unwrap();
        // 2.45 * (1 + 6 * 0.02)
        assert_eq!(markets[0].supply_apy, dec!(2.74));
    }
}
