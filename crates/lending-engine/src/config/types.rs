use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ESTIMATED_GAS, DEFAULT_GAS_USD, DEFAULT_NO_DEBT_HEALTH_FACTOR, DEMO_ACCOUNT_ADDRESS,
};
use crate::core::validation::ValidationMode;

// ---------------------------------------------------------------------------
// Top-level aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    pub app: AppConfig,
    pub engine: EngineSection,
    pub markets: MarketsConfig,
}

// ---------------------------------------------------------------------------
// app.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".into(),
            file_name: "engine.log".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// engine.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    pub validation_mode: ValidationMode,
    /// Finite stand-in for the no-debt health factor in previews.
    #[serde(with = "rust_decimal::serde::str")]
    pub no_debt_health_factor: Decimal,
    pub gas: GasConfig,
    pub demo_account: Option<DemoAccountConfig>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::Lenient,
            no_debt_health_factor: DEFAULT_NO_DEBT_HEALTH_FACTOR,
            gas: GasConfig::default(),
            demo_account: Some(DemoAccountConfig::default()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GasConfig {
    pub estimated_gas: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub gas_usd: Decimal,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            estimated_gas: DEFAULT_ESTIMATED_GAS.into(),
            gas_usd: DEFAULT_GAS_USD,
        }
    }
}

/// Account seeded with the same balances on every configured network.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoAccountConfig {
    pub enabled: bool,
    pub address: String,
    pub positions: Vec<DemoPositionConfig>,
}

impl Default for DemoAccountConfig {
    fn default() -> Self {
        let pos = |symbol: &str, supplied: Decimal, borrowed: Decimal, is_collateral: bool| {
            DemoPositionConfig {
                symbol: symbol.into(),
                supplied_amount: supplied,
                borrowed_amount: borrowed,
                is_collateral,
            }
        };
        Self {
            enabled: true,
            address: DEMO_ACCOUNT_ADDRESS.into(),
            positions: vec![
                pos("ETH", dec!(1.5), dec!(0), true),
                pos("USDC", dec!(5000), dec!(1500), true),
                pos("DAI", dec!(0), dec!(0), false),
                pos("WBTC", dec!(0.05), dec!(0), true),
            ],
        }
    }
}

/// Seeded balances; USD values are marked at the registry price on seeding.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoPositionConfig {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub supplied_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub borrowed_amount: Decimal,
    pub is_collateral: bool,
}

// ---------------------------------------------------------------------------
// markets.json (optional; reference deployment data otherwise)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MarketsConfig {
    pub networks: Vec<NetworkConfig>,
    pub assets: Vec<AssetConfig>,
    pub markets: Vec<MarketConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub id: u64,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub supports_permit: bool,
}

/// Base (network-neutral) market data. The display name comes from the
/// matching asset entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub supply_apy: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub borrow_apy: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_supply: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_borrow: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub available_liquidity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub utilization_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub collateral_factor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub liquidation_threshold: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_usd: Decimal,
}

impl Default for MarketsConfig {
    fn default() -> Self {
        let network = |id: u64, name: &str, symbol: &str| NetworkConfig {
            id,
            name: name.into(),
            symbol: symbol.into(),
        };
        let asset = |symbol: &str, name: &str, decimals: u8, supports_permit: bool| AssetConfig {
            symbol: symbol.into(),
            name: name.into(),
            decimals,
            supports_permit,
        };
        Self {
            networks: vec![
                network(1, "Ethereum", "ETH"),
                network(42161, "Arbitrum", "ARB"),
                network(10, "Optimism", "OP"),
                network(8453, "Base", "BASE"),
            ],
            assets: vec![
                asset("ETH", "Ethereum", 18, false),
                asset("USDC", "USD Coin", 6, true),
                asset("DAI", "Dai Stablecoin", 18, true),
                asset("WBTC", "Wrapped Bitcoin", 8, false),
            ],
            markets: vec![
                MarketConfig {
                    symbol: "ETH".into(),
                    supply_apy: dec!(2.45),
                    borrow_apy: dec!(3.82),
                    total_supply: dec!(125000),
                    total_borrow: dec!(45000),
                    available_liquidity: dec!(80000),
                    utilization_rate: dec!(36),
                    collateral_factor: dec!(0.8),
                    liquidation_threshold: dec!(0.85),
                    price_usd: dec!(2245.50),
                },
                MarketConfig {
                    symbol: "USDC".into(),
                    supply_apy: dec!(4.12),
                    borrow_apy: dec!(5.67),
                    total_supply: dec!(8500000),
                    total_borrow: dec!(3200000),
                    available_liquidity: dec!(5300000),
                    utilization_rate: dec!(37.6),
                    collateral_factor: dec!(0.85),
                    liquidation_threshold: dec!(0.9),
                    price_usd: dec!(1.0),
                },
                MarketConfig {
                    symbol: "DAI".into(),
                    supply_apy: dec!(3.89),
                    borrow_apy: dec!(5.23),
                    total_supply: dec!(4200000),
                    total_borrow: dec!(1800000),
                    available_liquidity: dec!(2400000),
                    utilization_rate: dec!(42.8),
                    collateral_factor: dec!(0.82),
                    liquidation_threshold: dec!(0.87),
                    price_usd: dec!(1.0),
                },
                MarketConfig {
                    symbol: "WBTC".into(),
                    supply_apy: dec!(1.23),
                    borrow_apy: dec!(2.45),
                    total_supply: dec!(850),
                    total_borrow: dec!(220),
                    available_liquidity: dec!(630),
                    utilization_rate: dec!(25.9),
                    collateral_factor: dec!(0.75),
                    liquidation_threshold: dec!(0.8),
                    price_usd: dec!(43250.00),
                },
            ],
        }
    }
}
