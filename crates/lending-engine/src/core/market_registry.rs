//! Static per-asset reference data.
//!
//! Price and collateral factor lookups never fail: an unlisted symbol falls
//! back to [`DEFAULT_PRICE_USD`] and [`DEFAULT_COLLATERAL_FACTOR`] so the rest
//! of the engine stays total. Only the APYs vary by network.

use rust_decimal::Decimal;

use crate::config::MarketsConfig;
use crate::constants::{
    DEFAULT_COLLATERAL_FACTOR, DEFAULT_PRICE_USD, NETWORK_APY_MODULUS, NETWORK_APY_STEP,
};
use crate::types::{Asset, Market, Network};

use super::risk::round_display;

/// Immutable market reference data, shared read-only by every component.
#[derive(Debug, Clone)]
pub struct MarketRegistry {
    networks: Vec<Network>,
    assets: Vec<Asset>,
    /// Network-neutral markets in listing order.
    markets: Vec<Market>,
}

impl MarketRegistry {
    /// Build from validated config.
    pub fn from_config(config: &MarketsConfig) -> Self {
        let networks = config
            .networks
            .iter()
            .map(|n| Network {
                id: n.id,
                name: n.name.clone(),
                symbol: n.symbol.clone(),
            })
            .collect();

        let assets: Vec<Asset> = config
            .assets
            .iter()
            .map(|a| Asset {
                symbol: a.symbol.clone(),
                name: a.name.clone(),
                decimals: a.decimals,
                supports_permit: a.supports_permit,
            })
            .collect();

        let markets = config
            .markets
            .iter()
            .map(|m| Market {
                symbol: m.symbol.clone(),
                name: assets
                    .iter()
                    .find(|a| a.symbol == m.symbol)
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| m.symbol.clone()),
                supply_apy: m.supply_apy,
                borrow_apy: m.borrow_apy,
                total_supply: m.total_supply,
                total_borrow: m.total_borrow,
                available_liquidity: m.available_liquidity,
                utilization_rate: m.utilization_rate,
                collateral_factor: m.collateral_factor,
                liquidation_threshold: m.liquidation_threshold,
                price_usd: m.price_usd,
            })
            .collect();

        Self {
            networks,
            assets,
            markets,
        }
    }

    /// Registry over the reference deployment data.
    pub fn reference() -> Self {
        Self::from_config(&MarketsConfig::default())
    }

    // -----------------------------------------------------------------------
    // Networks and assets
    // -----------------------------------------------------------------------

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn network(&self, network_id: u64) -> Option<&Network> {
        self.networks.iter().find(|n| n.id == network_id)
    }

    pub fn is_supported_network(&self, network_id: u64) -> bool {
        self.network(network_id).is_some()
    }

    pub fn asset(&self, symbol: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }

    /// Whether `symbol` accepts a permit signature. Unknown symbols do not.
    pub fn supports_permit(&self, symbol: &str) -> bool {
        self.asset(symbol).is_some_and(|a| a.supports_permit)
    }

    // -----------------------------------------------------------------------
    // Markets
    // -----------------------------------------------------------------------

    /// Network-neutral market data for `symbol`.
    pub fn market(&self, symbol: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.symbol == symbol)
    }

    /// USD price of `symbol`, or [`DEFAULT_PRICE_USD`] when unlisted.
    pub fn price(&self, symbol: &str) -> Decimal {
        self.market(symbol)
            .map(|m| m.price_usd)
            .unwrap_or(DEFAULT_PRICE_USD)
    }

    /// Collateral factor of `symbol`, or [`DEFAULT_COLLATERAL_FACTOR`] when unlisted.
    pub fn collateral_factor(&self, symbol: &str) -> Decimal {
        self.market(symbol)
            .map(|m| m.collateral_factor)
            .unwrap_or(DEFAULT_COLLATERAL_FACTOR)
    }

    /// `1 + (network_id mod 10) * 0.02`.
    pub fn apy_multiplier(network_id: u64) -> Decimal {
        Decimal::ONE + Decimal::from(network_id % NETWORK_APY_MODULUS) * NETWORK_APY_STEP
    }

    /// Every market as seen on `network_id`: APYs scaled by the network
    /// multiplier and rounded to two decimals.
    pub fn markets(&self, network_id: u64) -> Vec<Market> {
        let multiplier = Self::apy_multiplier(network_id);
        self.markets
            .iter()
            .map(|m| Market {
                supply_apy: round_display(m.supply_apy * multiplier),
                borrow_apy: round_display(m.borrow_apy * multiplier),
                ..m.clone()
            })
            .collect()
    }

    /// Base markets in listing order, without network adjustment.
    pub fn base_markets(&self) -> &[Market] {
        &self.markets
    }
}
