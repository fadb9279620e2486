use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Registry fallbacks
// ---------------------------------------------------------------------------

/// Price used for a symbol the registry does not list.
pub const DEFAULT_PRICE_USD: Decimal = dec!(1);

/// Collateral factor used for a symbol the registry does not list.
pub const DEFAULT_COLLATERAL_FACTOR: Decimal = dec!(0.75);

// ---------------------------------------------------------------------------
// Network APY adjustment
// ---------------------------------------------------------------------------

/// APY multiplier step per unit of `network_id mod 10`.
pub const NETWORK_APY_STEP: Decimal = dec!(0.02);

/// Modulus applied to the network id before scaling.
pub const NETWORK_APY_MODULUS: u64 = 10;

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Decimal places of every rounded output figure.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Finite health factor reported in previews when an account carries no debt.
pub const DEFAULT_NO_DEBT_HEALTH_FACTOR: Decimal = dec!(99);

// ---------------------------------------------------------------------------
// Health tier boundaries
// ---------------------------------------------------------------------------

/// Below this the account can be liquidated.
pub const HF_LIQUIDATION: Decimal = dec!(1.0);

/// `[1.0, 1.2)`: danger.
pub const HF_DANGER: Decimal = dec!(1.2);

/// `[1.2, 1.5)`: at risk.
pub const HF_AT_RISK: Decimal = dec!(1.5);

/// `[1.5, 2.0)`: stable. Anything at or above is safe.
pub const HF_SAFE: Decimal = dec!(2.0);

// ---------------------------------------------------------------------------
// External quotes
// ---------------------------------------------------------------------------

/// Gas quote passed through when no estimator is configured.
pub const DEFAULT_ESTIMATED_GAS: &str = "0.0025 ETH";
pub const DEFAULT_GAS_USD: Decimal = dec!(5.61);

/// Length in bytes of the pseudo transaction hash.
pub const TX_HASH_BYTES: usize = 32;

// ---------------------------------------------------------------------------
// Demo account
// ---------------------------------------------------------------------------

/// Account pre-seeded on every configured network when demo seeding is on.
pub const DEMO_ACCOUNT_ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f8c2B1";
