use alloy_primitives::Address;

use crate::ports::auth::Authorizer;

/// Grants administrative capability to a single campaign owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerAuthorizer {
    owner: Address,
}

impl OwnerAuthorizer {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }
}

impl Authorizer for OwnerAuthorizer {
    fn is_authorized(&self, caller: Address) -> bool {
        caller == self.owner
    }
}
