//! Cross-cutting building blocks shared by every layer

pub mod clock;
pub mod response;
pub mod shutdown;

pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use response::{ApiResponse, Notice, NoticeCode};
pub use shutdown::{listen_for_shutdown_signals, ShutdownCoordinator, ShutdownSignal};
