//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod group_key;
pub mod key_action;
pub mod log_line;

// Re-export for convenience
pub use error::{AppError, InputError};
pub use group_key::GroupKey;
pub use key_action::KeyAction;
pub use log_line::{LogLine, Record, Tag};
