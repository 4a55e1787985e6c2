//! Tempo lógico do núcleo

pub mod clock;
pub mod jiffies;

pub use clock::{Clock, Jiffies, ManualClock};
