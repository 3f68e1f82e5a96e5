use serde::{Deserialize, Serialize};
use std::fmt;

const KEY_PREFIX: &str = "cart_";
const ANONYMOUS: &str = "anonymous";

/// The authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Storage key separating one owner's cart from another's.
///
/// `cart_<user id>` for an authenticated user, `cart_anonymous` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn anonymous() -> Self {
        Self(format!("{}{}", KEY_PREFIX, ANONYMOUS))
    }

    pub fn user(user_id: &str) -> Self {
        Self(format!("{}{}", KEY_PREFIX, user_id))
    }

    pub fn for_identity(identity: Option<&Identity>) -> Self {
        match identity {
            Some(identity) => Self::user(&identity.id),
            None => Self::anonymous(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        *self == Self::anonymous()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PartitionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
