//! Route handlers

pub mod classes;
pub mod health;
pub mod index;
pub mod predict;
pub mod stats;

/// Current time as an RFC 3339 string
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
