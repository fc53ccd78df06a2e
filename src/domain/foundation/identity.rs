//! Identity - the subject a trust token is bound to.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{EmailAddress, MemberId};

/// The identity claim behind a trust check.
///
/// A plain subscriber is identified by email alone; a member is identified
/// by member id plus the email associated with it, so a leaked member id is
/// useless without the matching address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    Subscriber { email: EmailAddress },
    Member { member_id: MemberId, email: EmailAddress },
}

impl Identity {
    /// Identity of a plain subscriber.
    pub fn subscriber(email: EmailAddress) -> Self {
        Identity::Subscriber { email }
    }

    /// Identity of a member with an associated email.
    pub fn member(member_id: MemberId, email: EmailAddress) -> Self {
        Identity::Member { member_id, email }
    }

    /// The email address behind this identity.
    pub fn email(&self) -> &EmailAddress {
        match self {
            Identity::Subscriber { email } => email,
            Identity::Member { email, .. } => email,
        }
    }

    /// The subject key fed to the trust-token signer.
    ///
    /// Subscribers: the bare normalized email. Members:
    /// `"{member_id}:{email}"`. `:` cannot occur inside a `MemberId`, so
    /// the two identity kinds can never produce colliding keys.
    pub fn subject_key(&self) -> String {
        match self {
            Identity::Subscriber { email } => email.as_str().to_string(),
            Identity::Member { member_id, email } => {
                format!("{}:{}", member_id.as_str(), email.as_str())
            }
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subject_key())
    }
}
