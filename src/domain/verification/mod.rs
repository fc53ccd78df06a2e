//! Verification tokens - short-lived, single-use email proofs.

mod errors;
mod events;
mod token;

pub use errors::VerificationError;
pub use events::{VerificationConfirmed, VerificationIssued};
pub use token::VerificationToken;
