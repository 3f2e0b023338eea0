//! # Permission Sets
//!
//! The one allow-list shape used everywhere: the ledger's hook list and both
//! lists of the account access controller are a [`PermissionSet`]. The set
//! itself performs no authorization; whoever embeds it decides who may
//! toggle membership.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::Address;

/// An ordered set of permitted addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    members: BTreeSet<Address>,
}

impl PermissionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants or revokes membership. Returns `true` if membership changed.
    ///
    /// Setting a value the account already has is allowed and simply
    /// reports no change.
    pub fn set(&mut self, account: Address, allowed: bool) -> bool {
        if allowed {
            self.members.insert(account)
        } else {
            self.members.remove(&account)
        }
    }

    /// Returns `true` if `account` is a member.
    pub fn contains(&self, account: &Address) -> bool {
        self.members.contains(account)
    }

    /// Revokes every membership.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if nobody is a member.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }
}
