mod engine;
mod mode;

pub use engine::{format_countdown, TimerMachine, TimerStatus, DEFAULT_AUTO_RESET_DELAY};
pub use mode::Mode;
