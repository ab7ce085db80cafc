pub mod pool_risk;
pub mod risk_config;

pub use pool_risk::*;
pub use risk_config::*;
