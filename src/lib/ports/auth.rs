use alloy_primitives::Address;

/// Capability check guarding administrative actions (root publication).
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, caller: Address) -> bool;
}
