//! # Hook Configuration
//!
//! What the deposit and withdraw hooks have in common: an owner, a single
//! vault allowed to call them, and a reference to the ledger they write to.
//! Both references can be swapped by the owner at any time, including to
//! `None`, and setting the current value again is a successful no-op that
//! still emits its notification.
//!
//! A hook stores the ledger's *address*, not the ledger. The live contract is
//! looked up through a [`ContractRegistry`] on every call, so several hooks
//! can point at one ledger and a reference can dangle without anything
//! panicking.

use serde::{Deserialize, Serialize};

use crate::access_controller::AccountAccessController;
use crate::deposit_record::DepositRecord;
use crate::error::{ContractError, Role, Setting};
use crate::events::Event;
use crate::ownable::Ownable;
use crate::types::{Address, CallContext};

/// Resolves stored contract addresses to live contracts.
pub trait ContractRegistry {
    /// The ledger deployed at `address`, if there is one.
    fn deposit_record_mut(&mut self, address: &Address) -> Option<&mut DepositRecord>;

    /// The access controller deployed at `address`, if there is one.
    fn access_controller(&self, address: &Address) -> Option<&AccountAccessController>;
}

/// Owner, vault, and ledger reference of a hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    address: Address,
    ownable: Ownable,
    vault: Option<Address>,
    deposit_record: Option<Address>,
}

impl HookConfig {
    /// Creates a configuration with no vault.
    pub fn new(address: Address, owner: Address, deposit_record: Option<Address>) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            vault: None,
            deposit_record,
        }
    }

    /// Sets the only caller allowed to invoke the hook. Owner-only.
    /// `None` disables the hook for everyone.
    pub fn set_vault(
        &mut self,
        ctx: &CallContext,
        vault: Option<Address>,
    ) -> Result<Event, ContractError> {
        self.ownable.only_owner(ctx)?;
        self.vault = vault;
        Ok(Event::VaultChanged { vault })
    }

    /// Points the hook at a ledger. Owner-only.
    pub fn set_deposit_record(
        &mut self,
        ctx: &CallContext,
        deposit_record: Option<Address>,
    ) -> Result<Event, ContractError> {
        self.ownable.only_owner(ctx)?;
        self.deposit_record = deposit_record;
        Ok(Event::DepositRecordChanged { deposit_record })
    }

    /// Checks that the hook is fully configured and that the caller is the
    /// vault. Returns the ledger address to write to.
    pub(crate) fn authorize(&self, ctx: &CallContext) -> Result<Address, ContractError> {
        let vault = self
            .vault
            .ok_or(ContractError::PreconditionUnset(Setting::Vault))?;
        if ctx.caller != vault {
            return Err(ContractError::unauthorized(ctx.caller, Role::Vault));
        }
        self.deposit_record
            .ok_or(ContractError::PreconditionUnset(Setting::DepositRecord))
    }

    /// The context the hook presents to the ledger: itself as caller.
    pub(crate) fn as_caller(&self) -> CallContext {
        CallContext::new(self.address)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub(crate) fn ownable(&self) -> &Ownable {
        &self.ownable
    }

    pub(crate) fn ownable_mut(&mut self) -> &mut Ownable {
        &mut self.ownable
    }

    /// The configured vault, if any.
    pub fn vault(&self) -> Option<Address> {
        self.vault
    }

    /// The configured ledger reference, if any.
    pub fn deposit_record(&self) -> Option<Address> {
        self.deposit_record
    }
}
