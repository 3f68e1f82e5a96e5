use crate::domain::identity::Identity;
use crate::domain::ports::IdentityProvider;
use std::sync::{Arc, RwLock};

/// Identity provider backed by a switchable slot.
///
/// The login flow calls [`SessionIdentity::sign_in`] / [`SessionIdentity::sign_out`];
/// the cart engine only ever reads it through [`IdentityProvider`].
#[derive(Debug, Default, Clone)]
pub struct SessionIdentity {
    current: Arc<RwLock<Option<Identity>>>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let session = Self::new();
        session.sign_in(Identity::new(user_id));
        session
    }

    pub fn sign_in(&self, identity: Identity) {
        // A poisoned lock still holds a valid Option; keep going with it.
        let mut slot = self.current.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(identity);
    }

    pub fn sign_out(&self) {
        let mut slot = self.current.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

impl IdentityProvider for SessionIdentity {
    fn current(&self) -> Option<Identity> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
