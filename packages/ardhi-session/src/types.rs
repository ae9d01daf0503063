//! Directory types returned by the users API
//!
//! These mirror the backend's `/api/users` payload.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::routes::Destination;

/// How long a directory snapshot may be used after capture (1/24 of a day).
pub const DIRECTORY_TTL_SECS: i64 = 60 * 60;

pub fn directory_ttl() -> Duration {
    Duration::seconds(DIRECTORY_TTL_SECS)
}

// ============================================================================
// Users
// ============================================================================

/// Participant role as reported by the backend.
///
/// Unrecognized values are kept verbatim in `Other` so a directory with an
/// unexpected role still parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Buyer,
    Seller,
    Lawyer,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Lawyer => "lawyer",
            Role::Other(role) => role,
        }
    }

    /// Where a verified user with this role lands. `None` for roles outside
    /// the recognized set.
    pub fn destination(&self) -> Option<Destination> {
        match self {
            Role::Lawyer => Some(Destination::ContractDrafting),
            Role::Buyer => Some(Destination::LandListing),
            Role::Seller => Some(Destination::SellerHome),
            Role::Other(_) => None,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "buyer" => Role::Buyer,
            "seller" => Role::Seller,
            "lawyer" => Role::Lawyer,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    /// As stored by the backend; may carry spaces, dashes or a leading `+`.
    pub phone_number: String,
    pub role: Role,
}

// ============================================================================
// Directory snapshot
// ============================================================================

/// Immutable copy of the full user directory plus its capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    users: Vec<User>,
    captured_at: DateTime<Utc>,
}

impl DirectorySnapshot {
    /// Snapshot captured now.
    pub fn new(users: Vec<User>) -> Self {
        Self::captured_at(users, Utc::now())
    }

    pub fn captured_at(users: Vec<User>, captured_at: DateTime<Utc>) -> Self {
        Self { users, captured_at }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn capture_time(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.captured_at + directory_ttl()
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }
}
