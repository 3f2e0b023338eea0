//! Single-owner authority embedded in every component.

use serde::{Deserialize, Serialize};

use crate::error::{ContractError, Role};
use crate::events::Event;
use crate::types::{Address, CallContext};

/// Holds the one identity allowed to reconfigure a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Creates an authority owned by `owner`.
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// Current owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Fails with [`ContractError::Unauthorized`] unless the caller is the owner.
    pub fn only_owner(&self, ctx: &CallContext) -> Result<(), ContractError> {
        if ctx.caller != self.owner {
            return Err(ContractError::unauthorized(ctx.caller, Role::Owner));
        }
        Ok(())
    }

    /// Hands ownership to `new_owner`. Owner-only.
    pub fn transfer_ownership(
        &mut self,
        ctx: &CallContext,
        new_owner: Address,
    ) -> Result<Event, ContractError> {
        self.only_owner(ctx)?;
        let previous_owner = self.owner;
        self.owner = new_owner;
        Ok(Event::OwnershipTransferred {
            previous_owner,
            new_owner,
        })
    }
}
