//! Command handlers - the application's write operations.

pub mod subscriber;
pub mod verification;
