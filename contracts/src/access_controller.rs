//! # Account Access Controller
//!
//! An owner-managed pair of lists deciding which end-user accounts may use
//! a gated entry point. An account is *permitted* when it is on the allowed
//! list and not on the blocked list; blocking wins so that an operator can
//! shut an account out without first finding every place it was allowed.
//!
//! The deposit hook consults a controller when one is configured (see
//! [`DepositHook::set_account_access_controller`](crate::deposit_hook::DepositHook::set_account_access_controller)).

use serde::{Deserialize, Serialize};

use crate::error::ContractError;
use crate::events::Event;
use crate::ownable::Ownable;
use crate::permission::PermissionSet;
use crate::types::{Address, CallContext};

/// Allowed/blocked account lists with an owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountAccessController {
    address: Address,
    ownable: Ownable,
    allowed_accounts: PermissionSet,
    blocked_accounts: PermissionSet,
}

impl AccountAccessController {
    /// Creates an empty controller at `address` owned by `owner`.
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            allowed_accounts: PermissionSet::new(),
            blocked_accounts: PermissionSet::new(),
        }
    }

    /// Address this controller is deployed at.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current owner.
    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub(crate) fn ownable_mut(&mut self) -> &mut Ownable {
        &mut self.ownable
    }

    /// Adds `account` to, or removes it from, the allowed list. Owner-only.
    pub fn set(
        &mut self,
        ctx: &CallContext,
        account: Address,
        allowed: bool,
    ) -> Result<Event, ContractError> {
        self.ownable.only_owner(ctx)?;
        self.allowed_accounts.set(account, allowed);
        Ok(Event::AccountAllowedChanged { account, allowed })
    }

    /// Allows every account in `accounts`. Owner-only; one event per account.
    pub fn allow_accounts(
        &mut self,
        ctx: &CallContext,
        accounts: &[Address],
    ) -> Result<Vec<Event>, ContractError> {
        self.ownable.only_owner(ctx)?;
        Ok(accounts
            .iter()
            .map(|&account| {
                self.allowed_accounts.set(account, true);
                Event::AccountAllowedChanged {
                    account,
                    allowed: true,
                }
            })
            .collect())
    }

    /// Blocks every account in `accounts`. Owner-only; one event per account.
    pub fn block_accounts(
        &mut self,
        ctx: &CallContext,
        accounts: &[Address],
    ) -> Result<Vec<Event>, ContractError> {
        self.update_blocked(ctx, accounts, true)
    }

    /// Unblocks every account in `accounts`. Owner-only; one event per account.
    pub fn unblock_accounts(
        &mut self,
        ctx: &CallContext,
        accounts: &[Address],
    ) -> Result<Vec<Event>, ContractError> {
        self.update_blocked(ctx, accounts, false)
    }

    fn update_blocked(
        &mut self,
        ctx: &CallContext,
        accounts: &[Address],
        blocked: bool,
    ) -> Result<Vec<Event>, ContractError> {
        self.ownable.only_owner(ctx)?;
        Ok(accounts
            .iter()
            .map(|&account| {
                self.blocked_accounts.set(account, blocked);
                Event::AccountBlockedChanged { account, blocked }
            })
            .collect())
    }

    /// Empties the allowed list. Owner-only.
    pub fn clear_allowed_accounts(&mut self, ctx: &CallContext) -> Result<Event, ContractError> {
        self.ownable.only_owner(ctx)?;
        self.allowed_accounts.clear();
        Ok(Event::AllowedAccountsCleared)
    }

    /// Empties the blocked list. Owner-only.
    pub fn clear_blocked_accounts(&mut self, ctx: &CallContext) -> Result<Event, ContractError> {
        self.ownable.only_owner(ctx)?;
        self.blocked_accounts.clear();
        Ok(Event::BlockedAccountsCleared)
    }

    /// Returns `true` if `account` is on the allowed list.
    pub fn is_allowed(&self, account: &Address) -> bool {
        self.allowed_accounts.contains(account)
    }

    /// Returns `true` if `account` is on the blocked list.
    pub fn is_blocked(&self, account: &Address) -> bool {
        self.blocked_accounts.contains(account)
    }

    /// Returns `true` if `account` is allowed and not blocked.
    pub fn permits(&self, account: &Address) -> bool {
        self.is_allowed(account) && !self.is_blocked(account)
    }
}
