//! Device state machine

pub mod events;
pub mod machine;

pub use events::{Event, TriggerSource};
pub use machine::Mode;
