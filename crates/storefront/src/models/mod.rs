//! Request-scoped models that are not backend rows.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
