//! Solaris viewer: window, event loop and simulation clock.

pub mod clock;
pub mod platform;
pub mod window;

pub use clock::{FIXED_DT, MAX_FRAME_TIME, SimulationClock};
pub use platform::{PlatformDirs, PlatformError};
pub use window::{AppError, AppState, KeyAction, run_with_config};
