//! # Execution Environment
//!
//! An in-process stand-in for the chain the components would normally live
//! on. It assigns addresses at deployment, routes each [`Call`] to its
//! target with an authenticated caller, and appends the resulting
//! notifications to the [`EventLog`].
//!
//! ## Execution model
//!
//! Calls run one at a time through `&mut self`, so there is never more than
//! one operation in flight. Each component validates before it writes, and
//! events are appended only after the whole call has succeeded: a rejected
//! call leaves both state and log untouched.
//!
//! ## Durable state
//!
//! Everything except the event log serializes to JSON. A saved environment
//! restores to an identical one, down to every total, cap, allow-list entry,
//! owner, vault, and reference.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access_controller::AccountAccessController;
use crate::config::STATE_FORMAT_VERSION;
use crate::deposit_hook::DepositHook;
use crate::deposit_record::DepositRecord;
use crate::error::ContractError;
use crate::events::{EmittedEvent, Event, EventLog};
use crate::hook::{ContractRegistry, HookConfig};
use crate::ownable::Ownable;
use crate::types::{Address, Amount, CallContext};
use crate::withdraw_hook::WithdrawHook;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from saving or loading an environment.
#[derive(Debug, Error)]
pub enum StateError {
    /// Reading or writing the state file failed.
    #[error("state i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The state could not be encoded or decoded.
    #[error("state encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The state was written by an incompatible version.
    #[error("unsupported state format version {found} (expected {expected})")]
    Version {
        /// Version found in the file.
        found: u32,
        /// Version this build reads and writes.
        expected: u32,
    },
}

/// The part of a state file read before anything else.
#[derive(Deserialize)]
struct StateHeader {
    version: u32,
}

// ---------------------------------------------------------------------------
// Call
// ---------------------------------------------------------------------------

/// Every mutating operation the environment can route.
///
/// Each variant names its target contract explicitly; the caller is supplied
/// separately to [`Environment::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    RecordDeposit {
        deposit_record: Address,
        account: Address,
        amount: Amount,
    },
    RecordWithdrawal {
        deposit_record: Address,
        account: Address,
        amount: Amount,
    },
    SetGlobalDepositCap {
        deposit_record: Address,
        cap: Amount,
    },
    SetAccountDepositCap {
        deposit_record: Address,
        cap: Amount,
    },
    SetAllowedHook {
        deposit_record: Address,
        hook: Address,
        allowed: bool,
    },
    SetAccountAllowed {
        controller: Address,
        account: Address,
        allowed: bool,
    },
    AllowAccounts {
        controller: Address,
        accounts: Vec<Address>,
    },
    BlockAccounts {
        controller: Address,
        accounts: Vec<Address>,
    },
    UnblockAccounts {
        controller: Address,
        accounts: Vec<Address>,
    },
    ClearAllowedAccounts {
        controller: Address,
    },
    ClearBlockedAccounts {
        controller: Address,
    },
    InvokeDepositHook {
        hook: Address,
        account: Address,
        amount_before: Amount,
        amount_after: Amount,
    },
    InvokeWithdrawHook {
        hook: Address,
        account: Address,
        amount_before: Amount,
        amount_after: Amount,
    },
    /// Works on either kind of hook.
    SetVault {
        hook: Address,
        vault: Option<Address>,
    },
    /// Works on either kind of hook.
    SetDepositRecord {
        hook: Address,
        deposit_record: Option<Address>,
    },
    SetAccountAccessController {
        hook: Address,
        controller: Option<Address>,
    },
    /// Works on any deployed component.
    TransferOwnership {
        contract: Address,
        new_owner: Address,
    },
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// The contracts hooks write to or consult: ledgers and access controllers.
///
/// Kept apart from the hooks themselves so a hook can be borrowed while the
/// ledger it points at is borrowed mutably.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contracts {
    deposit_records: BTreeMap<Address, DepositRecord>,
    access_controllers: BTreeMap<Address, AccountAccessController>,
}

impl Contracts {
    /// Places a new ledger at `address` and returns the address.
    pub fn insert_deposit_record(
        &mut self,
        address: Address,
        owner: Address,
        global_deposit_cap: Amount,
        account_deposit_cap: Amount,
    ) -> Address {
        self.deposit_records.insert(
            address,
            DepositRecord::new(address, owner, global_deposit_cap, account_deposit_cap),
        );
        address
    }

    /// Places a new access controller at `address` and returns the address.
    pub fn insert_access_controller(&mut self, address: Address, owner: Address) -> Address {
        self.access_controllers
            .insert(address, AccountAccessController::new(address, owner));
        address
    }

    pub fn deposit_record(&self, address: &Address) -> Option<&DepositRecord> {
        self.deposit_records.get(address)
    }

    pub fn access_controller_mut(
        &mut self,
        address: &Address,
    ) -> Option<&mut AccountAccessController> {
        self.access_controllers.get_mut(address)
    }

    fn record_or_err(&mut self, address: Address) -> Result<&mut DepositRecord, ContractError> {
        self.deposit_records
            .get_mut(&address)
            .ok_or(ContractError::UnknownContract(address))
    }

    fn controller_or_err(
        &mut self,
        address: Address,
    ) -> Result<&mut AccountAccessController, ContractError> {
        self.access_controllers
            .get_mut(&address)
            .ok_or(ContractError::UnknownContract(address))
    }
}

impl ContractRegistry for Contracts {
    fn deposit_record_mut(&mut self, address: &Address) -> Option<&mut DepositRecord> {
        self.deposit_records.get_mut(address)
    }

    fn access_controller(&self, address: &Address) -> Option<&AccountAccessController> {
        self.access_controllers.get(address)
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Deployed components plus the machinery to call them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    version: u32,
    /// Deployment counter feeding address derivation.
    nonce: u64,
    contracts: Contracts,
    deposit_hooks: BTreeMap<Address, DepositHook>,
    withdraw_hooks: BTreeMap<Address, WithdrawHook>,
    #[serde(skip)]
    events: EventLog,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Creates an environment with nothing deployed.
    pub fn new() -> Self {
        Self {
            version: STATE_FORMAT_VERSION,
            nonce: 0,
            contracts: Contracts::default(),
            deposit_hooks: BTreeMap::new(),
            withdraw_hooks: BTreeMap::new(),
            events: EventLog::new(),
        }
    }

    fn next_address(&mut self, deployer: &Address) -> Address {
        let address = Address::derive(deployer, self.nonce);
        self.nonce += 1;
        address
    }

    // -- Deployment ---------------------------------------------------------

    /// Deploys a ledger owned by `deployer`.
    pub fn deploy_deposit_record(
        &mut self,
        deployer: Address,
        global_deposit_cap: Amount,
        account_deposit_cap: Amount,
    ) -> Address {
        let address = self.next_address(&deployer);
        self.contracts.insert_deposit_record(
            address,
            deployer,
            global_deposit_cap,
            account_deposit_cap,
        );
        tracing::info!(
            %address,
            owner = %deployer,
            global_deposit_cap,
            account_deposit_cap,
            "deposit record deployed"
        );
        address
    }

    /// Deploys a deposit hook owned by `deployer`, pointed at
    /// `deposit_record`, with no vault.
    pub fn deploy_deposit_hook(
        &mut self,
        deployer: Address,
        deposit_record: Option<Address>,
    ) -> Address {
        let address = self.next_address(&deployer);
        self.deposit_hooks
            .insert(address, DepositHook::new(address, deployer, deposit_record));
        tracing::info!(%address, owner = %deployer, ?deposit_record, "deposit hook deployed");
        address
    }

    /// Deploys a withdraw hook owned by `deployer`, pointed at
    /// `deposit_record`, with no vault.
    pub fn deploy_withdraw_hook(
        &mut self,
        deployer: Address,
        deposit_record: Option<Address>,
    ) -> Address {
        let address = self.next_address(&deployer);
        self.withdraw_hooks
            .insert(address, WithdrawHook::new(address, deployer, deposit_record));
        tracing::info!(%address, owner = %deployer, ?deposit_record, "withdraw hook deployed");
        address
    }

    /// Deploys an empty access controller owned by `deployer`.
    pub fn deploy_access_controller(&mut self, deployer: Address) -> Address {
        let address = self.next_address(&deployer);
        self.contracts.insert_access_controller(address, deployer);
        tracing::info!(%address, owner = %deployer, "access controller deployed");
        address
    }

    // -- Execution ----------------------------------------------------------

    /// Runs `call` on behalf of `caller`.
    ///
    /// Returns the events the call emitted, already appended to the log.
    /// On error nothing was changed and nothing was logged.
    pub fn execute(
        &mut self,
        caller: Address,
        call: Call,
    ) -> Result<Vec<EmittedEvent>, ContractError> {
        let span = tracing::info_span!("execute", %caller, call = ?call);
        let _guard = span.enter();

        let ctx = CallContext::new(caller);
        match self.dispatch(&ctx, call) {
            Ok((emitter, events)) => Ok(events
                .into_iter()
                .map(|event| self.events.emit(emitter, event))
                .collect()),
            Err(err) => {
                tracing::warn!(%err, "call rejected");
                Err(err)
            }
        }
    }

    fn dispatch(
        &mut self,
        ctx: &CallContext,
        call: Call,
    ) -> Result<(Address, Vec<Event>), ContractError> {
        match call {
            Call::RecordDeposit {
                deposit_record,
                account,
                amount,
            } => {
                self.contracts
                    .record_or_err(deposit_record)?
                    .record_deposit(ctx, account, amount)?;
                Ok((deposit_record, Vec::new()))
            }
            Call::RecordWithdrawal {
                deposit_record,
                account,
                amount,
            } => {
                self.contracts
                    .record_or_err(deposit_record)?
                    .record_withdrawal(ctx, account, amount)?;
                Ok((deposit_record, Vec::new()))
            }
            Call::SetGlobalDepositCap {
                deposit_record,
                cap,
            } => {
                let event = self
                    .contracts
                    .record_or_err(deposit_record)?
                    .set_global_deposit_cap(ctx, cap)?;
                Ok((deposit_record, vec![event]))
            }
            Call::SetAccountDepositCap {
                deposit_record,
                cap,
            } => {
                let event = self
                    .contracts
                    .record_or_err(deposit_record)?
                    .set_account_deposit_cap(ctx, cap)?;
                Ok((deposit_record, vec![event]))
            }
            Call::SetAllowedHook {
                deposit_record,
                hook,
                allowed,
            } => {
                let event = self
                    .contracts
                    .record_or_err(deposit_record)?
                    .set_allowed_hook(ctx, hook, allowed)?;
                Ok((deposit_record, vec![event]))
            }
            Call::SetAccountAllowed {
                controller,
                account,
                allowed,
            } => {
                let event = self
                    .contracts
                    .controller_or_err(controller)?
                    .set(ctx, account, allowed)?;
                Ok((controller, vec![event]))
            }
            Call::AllowAccounts {
                controller,
                accounts,
            } => {
                let events = self
                    .contracts
                    .controller_or_err(controller)?
                    .allow_accounts(ctx, &accounts)?;
                Ok((controller, events))
            }
            Call::BlockAccounts {
                controller,
                accounts,
            } => {
                let events = self
                    .contracts
                    .controller_or_err(controller)?
                    .block_accounts(ctx, &accounts)?;
                Ok((controller, events))
            }
            Call::UnblockAccounts {
                controller,
                accounts,
            } => {
                let events = self
                    .contracts
                    .controller_or_err(controller)?
                    .unblock_accounts(ctx, &accounts)?;
                Ok((controller, events))
            }
            Call::ClearAllowedAccounts { controller } => {
                let event = self
                    .contracts
                    .controller_or_err(controller)?
                    .clear_allowed_accounts(ctx)?;
                Ok((controller, vec![event]))
            }
            Call::ClearBlockedAccounts { controller } => {
                let event = self
                    .contracts
                    .controller_or_err(controller)?
                    .clear_blocked_accounts(ctx)?;
                Ok((controller, vec![event]))
            }
            Call::InvokeDepositHook {
                hook,
                account,
                amount_before,
                amount_after,
            } => {
                let target = self
                    .deposit_hooks
                    .get(&hook)
                    .ok_or(ContractError::UnknownContract(hook))?;
                target.hook(ctx, &mut self.contracts, account, amount_before, amount_after)?;
                Ok((hook, Vec::new()))
            }
            Call::InvokeWithdrawHook {
                hook,
                account,
                amount_before,
                amount_after,
            } => {
                let target = self
                    .withdraw_hooks
                    .get(&hook)
                    .ok_or(ContractError::UnknownContract(hook))?;
                target.hook(ctx, &mut self.contracts, account, amount_before, amount_after)?;
                Ok((hook, Vec::new()))
            }
            Call::SetVault { hook, vault } => {
                let event = self
                    .hook_config_mut(&hook)
                    .ok_or(ContractError::UnknownContract(hook))?
                    .set_vault(ctx, vault)?;
                Ok((hook, vec![event]))
            }
            Call::SetDepositRecord {
                hook,
                deposit_record,
            } => {
                let event = self
                    .hook_config_mut(&hook)
                    .ok_or(ContractError::UnknownContract(hook))?
                    .set_deposit_record(ctx, deposit_record)?;
                Ok((hook, vec![event]))
            }
            Call::SetAccountAccessController { hook, controller } => {
                let event = self
                    .deposit_hooks
                    .get_mut(&hook)
                    .ok_or(ContractError::UnknownContract(hook))?
                    .set_account_access_controller(ctx, controller)?;
                Ok((hook, vec![event]))
            }
            Call::TransferOwnership {
                contract,
                new_owner,
            } => {
                let event = self
                    .ownable_mut(&contract)
                    .ok_or(ContractError::UnknownContract(contract))?
                    .transfer_ownership(ctx, new_owner)?;
                Ok((contract, vec![event]))
            }
        }
    }

    fn hook_config_mut(&mut self, address: &Address) -> Option<&mut HookConfig> {
        if let Some(hook) = self.deposit_hooks.get_mut(address) {
            return Some(hook.config_mut());
        }
        self.withdraw_hooks
            .get_mut(address)
            .map(WithdrawHook::config_mut)
    }

    fn ownable_mut(&mut self, address: &Address) -> Option<&mut Ownable> {
        if let Some(record) = self.contracts.deposit_records.get_mut(address) {
            return Some(record.ownable_mut());
        }
        if let Some(controller) = self.contracts.access_controllers.get_mut(address) {
            return Some(controller.ownable_mut());
        }
        if let Some(hook) = self.deposit_hooks.get_mut(address) {
            return Some(hook.config_mut().ownable_mut());
        }
        self.withdraw_hooks
            .get_mut(address)
            .map(|hook| hook.config_mut().ownable_mut())
    }

    // -- Reads --------------------------------------------------------------

    pub fn deposit_record(&self, address: &Address) -> Option<&DepositRecord> {
        self.contracts.deposit_records.get(address)
    }

    pub fn deposit_hook(&self, address: &Address) -> Option<&DepositHook> {
        self.deposit_hooks.get(address)
    }

    pub fn withdraw_hook(&self, address: &Address) -> Option<&WithdrawHook> {
        self.withdraw_hooks.get(address)
    }

    pub fn access_controller(&self, address: &Address) -> Option<&AccountAccessController> {
        self.contracts.access_controllers.get(address)
    }

    /// Owner of whatever component lives at `address`.
    pub fn owner_of(&self, address: &Address) -> Option<Address> {
        self.deposit_record(address)
            .map(DepositRecord::owner)
            .or_else(|| self.access_controller(address).map(|c| c.owner()))
            .or_else(|| self.deposit_hook(address).map(DepositHook::owner))
            .or_else(|| self.withdraw_hook(address).map(WithdrawHook::owner))
    }

    /// Events emitted since creation (or the last [`drain_events`](Self::drain_events)).
    ///
    /// The log is unbounded: every event is held until drained. Long-lived
    /// callers should drain it periodically.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Takes every logged event out of the log and hands them to the caller.
    /// Indices of later events keep counting up.
    pub fn drain_events(&mut self) -> Vec<EmittedEvent> {
        self.events.drain()
    }

    // -- Persistence --------------------------------------------------------

    /// Encodes the durable state as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes state written by [`to_json`](Self::to_json). The event log
    /// starts empty.
    ///
    /// The version is read on its own first, so a file from another format
    /// version fails with [`StateError::Version`] even if the rest of its
    /// layout no longer decodes.
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        let header: StateHeader = serde_json::from_str(json)?;
        if header.version != STATE_FORMAT_VERSION {
            return Err(StateError::Version {
                found: header.version,
                expected: STATE_FORMAT_VERSION,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the state to `path`, replacing it atomically. The data goes to
    /// `<path>.tmp` first and is renamed over `path`.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let tmp = temp_path(path);
        fs::write(&tmp, self.to_json()?)?;
        fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), "state saved");
        Ok(())
    }

    /// Reads state previously written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let json = fs::read_to_string(path)?;
        let env = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "state loaded");
        Ok(env)
    }
}

/// `<path>.tmp`, never equal to `path` itself.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
