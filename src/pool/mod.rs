//! The stateful engine: registries, oracle, settlement and the pool
//! operations built on top of them.

pub mod liquidity;
pub mod oracle;
pub mod position;
pub mod protocol;
pub mod settlement;
pub mod swap;
pub mod tick;
pub mod v3_pool;

pub use oracle::Observation;
pub use position::{PositionInfo, PositionKey};
pub use settlement::{Clock, InMemoryLedger, ManualClock, SystemClock, TokenLedger};
pub use swap::{SwapParams, SwapResult};
pub use tick::TickInfo;
pub use v3_pool::{ProtocolFees, Slot0, V3Pool, sort_tokens};
