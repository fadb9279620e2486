pub mod account_locks;
pub mod engine;
pub mod executor;
pub mod gas;
pub mod market_registry;
pub mod portfolio;
pub mod position_store;
pub mod risk;
pub mod simulator;
pub mod validation;

pub use engine::{EngineSettings, LendingEngine, PreviewRequest, TransactionRequest};
pub use gas::{GasOracle, StaticGasOracle};
pub use market_registry::MarketRegistry;
pub use position_store::{InMemoryPositionStore, PositionStore};
pub use validation::ValidationMode;
