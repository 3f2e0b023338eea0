//! # Deposit Hook
//!
//! Called by the vault before it credits a deposit. The vault reports an
//! account's balance before and after the deposit; the hook records the
//! increase in the ledger, which enforces the caps. Decreases are not this
//! hook's business and are ignored.
//!
//! Optionally the hook also requires the depositing account to be permitted
//! by an [`AccountAccessController`](crate::access_controller::AccountAccessController).

use serde::{Deserialize, Serialize};

use crate::error::{ContractError, Role};
use crate::events::Event;
use crate::hook::{ContractRegistry, HookConfig};
use crate::types::{Address, Amount, CallContext};

/// Vault-gated entry point that records deposits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositHook {
    #[serde(flatten)]
    config: HookConfig,
    account_access_controller: Option<Address>,
}

impl DepositHook {
    /// Creates a hook writing to `deposit_record`, with no vault and no
    /// access controller.
    pub fn new(address: Address, owner: Address, deposit_record: Option<Address>) -> Self {
        Self {
            config: HookConfig::new(address, owner, deposit_record),
            account_access_controller: None,
        }
    }

    /// Records `amount_after - amount_before` as a deposit by `account`.
    ///
    /// Does nothing to the ledger when `amount_after <= amount_before`.
    ///
    /// # Errors
    ///
    /// - [`ContractError::PreconditionUnset`] if the vault or ledger is unset.
    /// - [`ContractError::Unauthorized`] if the caller is not the vault, or
    ///   the access controller does not permit `account`.
    /// - [`ContractError::UnknownContract`] if a reference points nowhere.
    /// - Anything [`DepositRecord::record_deposit`](crate::deposit_record::DepositRecord::record_deposit)
    ///   returns, unchanged.
    pub fn hook<R: ContractRegistry>(
        &self,
        ctx: &CallContext,
        registry: &mut R,
        account: Address,
        amount_before: Amount,
        amount_after: Amount,
    ) -> Result<(), ContractError> {
        let record_address = self.config.authorize(ctx)?;

        let delta = match amount_after.checked_sub(amount_before) {
            Some(delta) if delta > 0 => delta,
            _ => {
                tracing::debug!(
                    hook = %self.address(),
                    %account,
                    "no increase, nothing recorded"
                );
                return Ok(());
            }
        };

        if let Some(controller_address) = self.account_access_controller {
            let controller = registry
                .access_controller(&controller_address)
                .ok_or(ContractError::UnknownContract(controller_address))?;
            if !controller.permits(&account) {
                return Err(ContractError::unauthorized(account, Role::AllowedAccount));
            }
        }

        let record = registry
            .deposit_record_mut(&record_address)
            .ok_or(ContractError::UnknownContract(record_address))?;
        record.record_deposit(&self.config.as_caller(), account, delta)
    }

    /// Sets the vault. Owner-only. See [`HookConfig::set_vault`].
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

    /// Sets (or removes) the access controller consulted for depositors.
    /// Owner-only.
    pub fn set_account_access_controller(
        &mut self,
        ctx: &CallContext,
        controller: Option<Address>,
    ) -> Result<Event, ContractError> {
        self.config.ownable().only_owner(ctx)?;
        self.account_access_controller = controller;
        Ok(Event::AccountAccessControllerChanged { controller })
    }

    /// The configured access controller, if any.
    pub fn get_account_access_controller(&self) -> Option<Address> {
        self.account_access_controller
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Contracts;
    use crate::error::{Scope, Setting};

    struct Fixture {
        contracts: Contracts,
        hook: DepositHook,
        owner: CallContext,
        vault: CallContext,
        record: Address,
        user: Address,
    }

    fn fixture() -> Fixture {
        let owner = Address::from_label("owner");
        let mut contracts = Contracts::default();
        let record = contracts.insert_deposit_record(Address::from_label("record"), owner, 100, 10);
        let mut hook = DepositHook::new(Address::from_label("deposit-hook"), owner, Some(record));
        let vault = Address::from_label("vault");
        let owner_ctx = CallContext::new(owner);
        hook.set_vault(&owner_ctx, Some(vault)).unwrap();
        contracts
            .deposit_record_mut(&record)
            .unwrap()
            .set_allowed_hook(&owner_ctx, hook.address(), true)
            .unwrap();
        Fixture {
            contracts,
            hook,
            owner: owner_ctx,
            vault: CallContext::new(vault),
            record,
            user: Address::from_label("user"),
        }
    }

    fn net_deposit(f: &Fixture) -> Amount {
        f.contracts.deposit_record(&f.record).unwrap().get_net_deposit(&f.user)
    }

    #[test]
    fn records_the_increase() {
        let mut f = fixture();
        f.hook.hook(&f.vault, &mut f.contracts, f.user, 3, 8).unwrap();
        assert_eq!(net_deposit(&f), 5);
    }

    #[test]
    fn decrease_or_equal_is_noop() {
        let mut f = fixture();
        f.hook.hook(&f.vault, &mut f.contracts, f.user, 8, 3).unwrap();
        f.hook.hook(&f.vault, &mut f.contracts, f.user, 4, 4).unwrap();
        assert_eq!(net_deposit(&f), 0);
    }

    #[test]
    fn only_vault_may_call() {
        let mut f = fixture();
        let user = CallContext::new(f.user);
        let err = f.hook.hook(&user, &mut f.contracts, f.user, 1, 2).unwrap_err();
        assert!(matches!(
            err,
            ContractError::Unauthorized {
                required: Role::Vault,
                ..
            }
        ));
        assert_eq!(net_deposit(&f), 0);
    }

    #[test]
    fn cap_error_propagates_unchanged() {
        let mut f = fixture();
        let err = f
            .hook
            .hook(&f.vault, &mut f.contracts, f.user, 0, 11)
            .unwrap_err();
        assert_eq!(
            err,
            ContractError::CapExceeded {
                scope: Scope::Account,
                cap: 10,
                attempted: 11
            }
        );
    }

    #[test]
    fn hook_not_on_ledger_allow_list_is_rejected() {
        let mut f = fixture();
        let hook_address = f.hook.address();
        f.contracts
            .deposit_record_mut(&f.record)
            .unwrap()
            .set_allowed_hook(&f.owner, hook_address, false)
            .unwrap();
        let err = f.hook.hook(&f.vault, &mut f.contracts, f.user, 0, 1).unwrap_err();
        assert_eq!(
            err,
            ContractError::Unauthorized {
                caller: hook_address,
                required: Role::AllowedHook
            }
        );
    }

    #[test]
    fn unset_record_is_a_precondition_failure() {
        let mut f = fixture();
        f.hook.set_deposit_record(&f.owner, None).unwrap();
        assert_eq!(
            f.hook.hook(&f.vault, &mut f.contracts, f.user, 0, 1),
            Err(ContractError::PreconditionUnset(Setting::DepositRecord))
        );
    }

    #[test]
    fn dangling_record_reference() {
        let mut f = fixture();
        let nowhere = Address::from_label("nowhere");
        f.hook.set_deposit_record(&f.owner, Some(nowhere)).unwrap();
        assert_eq!(
            f.hook.hook(&f.vault, &mut f.contracts, f.user, 0, 1),
            Err(ContractError::UnknownContract(nowhere))
        );
    }

    #[test]
    fn access_controller_gates_depositors() {
        let mut f = fixture();
        let aac = f
            .contracts
            .insert_access_controller(Address::from_label("aac"), f.owner.caller);
        f.hook
            .set_account_access_controller(&f.owner, Some(aac))
            .unwrap();

        let err = f.hook.hook(&f.vault, &mut f.contracts, f.user, 0, 1).unwrap_err();
        assert!(matches!(
            err,
            ContractError::Unauthorized {
                required: Role::AllowedAccount,
                ..
            }
        ));

        f.contracts
            .access_controller_mut(&aac)
            .unwrap()
            .set(&f.owner, f.user, true)
            .unwrap();
        f.hook.hook(&f.vault, &mut f.contracts, f.user, 0, 1).unwrap();
        assert_eq!(net_deposit(&f), 1);
    }

    #[test]
    fn set_account_access_controller_is_owner_only() {
        let mut f = fixture();
        let vault = f.vault;
        assert!(f
            .hook
            .set_account_access_controller(&vault, Some(Address::from_label("aac")))
            .is_err());
        assert_eq!(f.hook.get_account_access_controller(), None);
    }
}
