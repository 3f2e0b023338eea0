//! # Deposit Record
//!
//! The ledger: how much has been deposited, net of withdrawals, by each
//! account and by everyone together, plus the caps those totals must stay
//! under.
//!
//! ## Access
//!
//! - `record_deposit` / `record_withdrawal` are open only to members of the
//!   ledger's own hook allow-list (typically the deposit and withdraw hooks,
//!   sometimes the vault itself). Who owns the ledger is irrelevant here.
//! - Caps and allow-list membership are owner-only.
//! - Reads are unrestricted.
//!
//! ## Caps
//!
//! Caps are checked only when a deposit is recorded, against the total the
//! deposit would produce. Lowering a cap below the current totals is
//! allowed and leaves existing balances untouched; it only stops further
//! deposits until withdrawals bring the totals back under.
//!
//! Every operation validates first and writes last, so a rejected call
//! leaves the ledger exactly as it found it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ContractError, Role, Scope};
use crate::events::Event;
use crate::ownable::Ownable;
use crate::permission::PermissionSet;
use crate::types::{Address, Amount, CallContext};

/// Global and per-account net deposits with their caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRecord {
    /// Address this ledger is deployed at.
    address: Address,
    ownable: Ownable,
    /// Sum of every account's net deposit.
    global_net_deposit: Amount,
    /// Per-account net deposit. Entries debited to zero are kept.
    account_net_deposits: BTreeMap<Address, Amount>,
    global_deposit_cap: Amount,
    account_deposit_cap: Amount,
    /// Callers allowed to record deposits and withdrawals.
    allowed_hooks: PermissionSet,
}

impl DepositRecord {
    /// Creates an empty ledger with the given caps.
    pub fn new(
        address: Address,
        owner: Address,
        global_deposit_cap: Amount,
        account_deposit_cap: Amount,
    ) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            global_net_deposit: 0,
            account_net_deposits: BTreeMap::new(),
            global_deposit_cap,
            account_deposit_cap,
            allowed_hooks: PermissionSet::new(),
        }
    }

    // -- Ledger writes ------------------------------------------------------

    /// Adds `amount` to the global total and to `account`'s total.
    ///
    /// # Errors
    ///
    /// - [`ContractError::Unauthorized`] if the caller is not an allowed hook.
    /// - [`ContractError::CapExceeded`] if either resulting total would be
    ///   above its cap. The global cap is checked first.
    pub fn record_deposit(
        &mut self,
        ctx: &CallContext,
        account: Address,
        amount: Amount,
    ) -> Result<(), ContractError> {
        self.only_allowed_hook(ctx)?;

        let global_total = Self::capped_total(
            self.global_net_deposit,
            amount,
            self.global_deposit_cap,
            Scope::Global,
        )?;
        let account_total = Self::capped_total(
            self.get_net_deposit(&account),
            amount,
            self.account_deposit_cap,
            Scope::Account,
        )?;

        self.global_net_deposit = global_total;
        self.store_account_total(account, account_total);

        tracing::debug!(
            record = %self.address,
            %account,
            amount,
            global_total,
            account_total,
            "deposit recorded"
        );
        Ok(())
    }

    /// Subtracts `amount` from the global total and from `account`'s total.
    ///
    /// # Errors
    ///
    /// - [`ContractError::Unauthorized`] if the caller is not an allowed hook.
    /// - [`ContractError::InsufficientBalance`] if `amount` is larger than
    ///   the account's total or the global total.
    pub fn record_withdrawal(
        &mut self,
        ctx: &CallContext,
        account: Address,
        amount: Amount,
    ) -> Result<(), ContractError> {
        self.only_allowed_hook(ctx)?;

        let account_available = self.get_net_deposit(&account);
        let account_total = account_available.checked_sub(amount).ok_or(
            ContractError::InsufficientBalance {
                scope: Scope::Account,
                available: account_available,
                requested: amount,
            },
        )?;
        let global_total = self.global_net_deposit.checked_sub(amount).ok_or(
            ContractError::InsufficientBalance {
                scope: Scope::Global,
                available: self.global_net_deposit,
                requested: amount,
            },
        )?;

        self.global_net_deposit = global_total;
        self.store_account_total(account, account_total);

        tracing::debug!(
            record = %self.address,
            %account,
            amount,
            global_total,
            account_total,
            "withdrawal recorded"
        );
        Ok(())
    }

    // Accounts the ledger has never credited get no entry for a zero
    // total; known accounts keep theirs even when debited to zero.
    fn store_account_total(&mut self, account: Address, total: Amount) {
        if total > 0 || self.account_net_deposits.contains_key(&account) {
            self.account_net_deposits.insert(account, total);
        }
    }

    fn capped_total(
        current: Amount,
        amount: Amount,
        cap: Amount,
        scope: Scope,
    ) -> Result<Amount, ContractError> {
        match current.checked_add(amount) {
            Some(total) if total <= cap => Ok(total),
            total => Err(ContractError::CapExceeded {
                scope,
                cap,
                attempted: total.unwrap_or(Amount::MAX),
            }),
        }
    }

    fn only_allowed_hook(&self, ctx: &CallContext) -> Result<(), ContractError> {
        if !self.allowed_hooks.contains(&ctx.caller) {
            return Err(ContractError::unauthorized(ctx.caller, Role::AllowedHook));
        }
        Ok(())
    }

    // -- Owner configuration ------------------------------------------------

    /// Sets the global cap. Owner-only. Existing totals are not re-checked.
    pub fn set_global_deposit_cap(
        &mut self,
        ctx: &CallContext,
        cap: Amount,
    ) -> Result<Event, ContractError> {
        self.ownable.only_owner(ctx)?;
        self.global_deposit_cap = cap;
        Ok(Event::GlobalDepositCapChanged { cap })
    }

    /// Sets the per-account cap. Owner-only. Existing totals are not re-checked.
    pub fn set_account_deposit_cap(
        &mut self,
        ctx: &CallContext,
        cap: Amount,
    ) -> Result<Event, ContractError> {
        self.ownable.only_owner(ctx)?;
        self.account_deposit_cap = cap;
        Ok(Event::AccountDepositCapChanged { cap })
    }

    /// Adds `hook` to, or removes it from, the allow-list. Owner-only.
    pub fn set_allowed_hook(
        &mut self,
        ctx: &CallContext,
        hook: Address,
        allowed: bool,
    ) -> Result<Event, ContractError> {
        self.ownable.only_owner(ctx)?;
        self.allowed_hooks.set(hook, allowed);
        Ok(Event::AllowedHooksChanged { hook, allowed })
    }

    pub(crate) fn ownable_mut(&mut self) -> &mut Ownable {
        &mut self.ownable
    }

    // -- Reads --------------------------------------------------------------

    /// Address this ledger is deployed at.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current owner.
    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    /// Sum of every account's net deposit.
    pub fn get_global_deposit_amount(&self) -> Amount {
        self.global_net_deposit
    }

    /// Net deposit of `account`; zero for accounts never seen.
    pub fn get_net_deposit(&self, account: &Address) -> Amount {
        self.account_net_deposits.get(account).copied().unwrap_or(0)
    }

    pub fn get_global_deposit_cap(&self) -> Amount {
        self.global_deposit_cap
    }

    pub fn get_account_deposit_cap(&self) -> Amount {
        self.account_deposit_cap
    }

    /// Returns `true` if `hook` may record deposits and withdrawals.
    pub fn is_hook_allowed(&self, hook: &Address) -> bool {
        self.allowed_hooks.contains(hook)
    }

    /// Every account with a ledger entry and its net deposit, in address order.
    pub fn net_deposits(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.account_net_deposits.iter()
    }
}
