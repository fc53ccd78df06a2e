//! Verification command handlers.

mod confirm_code;
mod issue_code;

pub use confirm_code::{
    ConfirmVerificationCommand, ConfirmVerificationHandler, ConfirmVerificationResult,
};
pub use issue_code::{
    IssueSettings, IssueVerificationCommand, IssueVerificationHandler, IssueVerificationResult,
};
