pub mod registry;
pub mod traits;

// Chain adapter implementations
pub mod bitcoin;
pub mod evm;

// Market data provider implementations
pub mod coincap;
