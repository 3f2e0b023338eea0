//! # Withdraw Hook
//!
//! Called by the vault before it pays out a withdrawal. Same configuration
//! and gating as the deposit hook; the ledger write is a withdrawal.
//!
//! ## Debit amount
//!
//! The ledger is debited by `amount_after` in full, not by
//! `amount_after - amount_before`. Vaults built against this hook pass the
//! withdrawn amount as `amount_after`, and totals are expected to drop by
//! exactly that much. `amount_before` is accepted for signature parity with
//! the deposit hook and is otherwise unused.

use serde::{Deserialize, Serialize};

use crate::error::ContractError;
use crate::events::Event;
use crate::hook::{ContractRegistry, HookConfig};
use crate::types::{Address, Amount, CallContext};

/// Vault-gated entry point that records withdrawals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WithdrawHook {
    config: HookConfig,
}

impl WithdrawHook {
    /// Creates a hook writing to `deposit_record`, with no vault.
    pub fn new(address: Address, owner: Address, deposit_record: Option<Address>) -> Self {
        Self {
            config: HookConfig::new(address, owner, deposit_record),
        }
    }

    /// Removes `amount_after` from `account`'s and the global net deposit.
    ///
    /// # Errors
    ///
    /// - [`ContractError::PreconditionUnset`] if the vault or ledger is unset.
    /// - [`ContractError::Unauthorized`] if the caller is not the vault.
    /// - [`ContractError::UnknownContract`] if the ledger reference points
    ///   nowhere.
    /// - Anything [`DepositRecord::record_withdrawal`](crate::deposit_record::DepositRecord::record_withdrawal)
    ///   returns, unchanged.
    pub fn hook<R: ContractRegistry>(
        &self,
        ctx: &CallContext,
        registry: &mut R,
        account: Address,
        _amount_before: Amount,
        amount_after: Amount,
    ) -> Result<(), ContractError> {
        let record_address = self.config.authorize(ctx)?;
        let record = registry
            .deposit_record_mut(&record_address)
            .ok_or(ContractError::UnknownContract(record_address))?;
        record.record_withdrawal(&self.config.as_caller(), account, amount_after)
    }

    /// Sets the vault. Owner-only.
    pub fn set_vault(
        &mut self,
        ctx: &CallContext,
        vault: Option<Address>,
    ) -> Result<Event, ContractError> {
        self.config.set_vault(ctx, vault)
    }

    /// Sets the ledger reference. Owner-only.
    pub fn set_deposit_record(
        &mut self,
        ctx: &CallContext,
        deposit_record: Option<Address>,
    ) -> Result<Event, ContractError> {
        self.config.set_deposit_record(ctx, deposit_record)
    }

    pub fn get_vault(&self) -> Option<Address> {
        self.config.vault()
    }

    pub fn get_deposit_record(&self) -> Option<Address> {
        self.config.deposit_record()
    }

    pub fn address(&self) -> Address {
        self.config.address()
    }

    pub fn owner(&self) -> Address {
        self.config.owner()
    }

    pub(crate) fn config_mut(&mut self) -> &mut HookConfig {
        &mut self.config
    }
}
