pub mod api;
pub mod assignment;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod logging;
pub mod notification;
pub mod output;
pub mod overview;
pub mod prompt;
pub mod session;

pub use error::{ConsoleError, FailureKind};
pub use notification::{Notification, Severity};
pub use session::ResultsSession;
