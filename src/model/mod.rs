//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod notification;
pub mod target;

// Re-export for convenience
pub use error::AppError;
pub use identifiers::{ContentId, GroupName, InstanceId, InvalidContentId, InvalidGroupName};
pub use notification::{Notification, NotificationKind};
pub use target::Target;
