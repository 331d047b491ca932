mod channel;
mod message;
mod pair;
mod stats;

pub use channel::{ChannelInfo, ChannelOutcome};
pub use message::ArchivedMessage;
pub use pair::{Pair, TrainingRecord};
pub use stats::{ChannelStats, Stats};
