//! # Errors
//!
//! A single error type for every component. Hooks forward ledger failures
//! without rewrapping them, so the caller of a hook sees exactly what the
//! ledger reported. Every variant is raised before any state is written.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Address, Amount};

/// The identity check a caller failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// The component's owner.
    Owner,
    /// The vault configured on a hook.
    Vault,
    /// A member of the ledger's hook allow-list.
    AllowedHook,
    /// An account permitted by the configured access controller.
    AllowedAccount,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "the owner"),
            Role::Vault => write!(f, "the vault"),
            Role::AllowedHook => write!(f, "an allowed hook"),
            Role::AllowedAccount => write!(f, "an allowed account"),
        }
    }
}

/// Which ledger total a cap or balance check applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// The system-wide net deposit.
    Global,
    /// A single account's net deposit.
    Account,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Account => write!(f, "account"),
        }
    }
}

/// A hook setting that must be present before the hook can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Setting {
    /// The single caller allowed to invoke the hook.
    Vault,
    /// The ledger the hook writes to.
    DepositRecord,
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Vault => write!(f, "vault"),
            Setting::DepositRecord => write!(f, "deposit record"),
        }
    }
}

/// Errors returned by ledger, hook, and access-control operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContractError {
    /// The caller failed an identity check.
    #[error("unauthorized: caller {caller} is not {required}")]
    Unauthorized {
        /// Who attempted the call.
        caller: Address,
        /// The identity the operation demands.
        required: Role,
    },

    /// A deposit would push a total above its cap.
    #[error("{scope} deposit cap exceeded: total would be {attempted}, cap is {cap}")]
    CapExceeded {
        /// Which total overflowed its cap.
        scope: Scope,
        /// The configured cap.
        cap: Amount,
        /// The post-deposit total that was rejected. Saturates at
        /// `Amount::MAX` when the addition itself overflowed.
        attempted: Amount,
    },

    /// A withdrawal would drive a total below zero.
    #[error("insufficient {scope} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Which total would have gone negative.
        scope: Scope,
        /// The current total.
        available: Amount,
        /// The amount the caller tried to remove.
        requested: Amount,
    },

    /// A hook was invoked before one of its references was configured.
    #[error("{0} is not set")]
    PreconditionUnset(Setting),

    /// No contract of the expected kind lives at this address.
    #[error("no such contract: {0}")]
    UnknownContract(Address),
}

impl ContractError {
    pub(crate) fn unauthorized(caller: Address, required: Role) -> Self {
        ContractError::Unauthorized { caller, required }
    }
}
