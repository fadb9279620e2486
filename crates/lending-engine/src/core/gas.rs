//! Gas quotes are an opaque external input passed through to previews.

use crate::config::GasConfig;
use crate::types::{GasQuote, TransactionType};

/// Source of gas estimates for previews.
pub trait GasOracle: Send + Sync {
    fn quote(&self, network_id: u64, tx_type: TransactionType) -> GasQuote;
}

/// Returns the same configured quote for every request.
#[derive(Debug, Clone)]
pub struct StaticGasOracle {
    quote: GasQuote,
}

impl StaticGasOracle {
    pub fn new(quote: GasQuote) -> Self {
        Self { quote }
    }

    pub fn from_config(config: &GasConfig) -> Self {
        Self::new(GasQuote {
            estimated_gas: config.estimated_gas.clone(),
            gas_usd: config.gas_usd,
        })
    }
}

impl GasOracle for StaticGasOracle {
    fn quote(&self, _network_id: u64, _tx_type: TransactionType) -> GasQuote {
        self.quote.clone()
    }
}
