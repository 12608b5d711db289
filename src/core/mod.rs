pub mod formatter;
pub mod normalizer;
pub mod orchestrator;
pub mod resolver;
pub mod table;

pub use crate::domain::model::{DateKey, Normalized, OutboundMessage, Outcome, ResolvedMessage};
pub use crate::domain::ports::{DeliveryChannel, RowSource};
pub use crate::utils::error::Result;
