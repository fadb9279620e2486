pub mod health;
pub mod market;
pub mod portfolio;
pub mod position;
pub mod transaction;

pub use health::{BorrowingPower, HealthFactor, HealthTier};
pub use market::{Asset, Market, Network};
pub use portfolio::PortfolioSummary;
pub use position::{AccountKey, Position};
pub use transaction::{
    ApprovalMode, GasQuote, Receipt, TransactionPreview, TransactionType, TxStatus,
};
