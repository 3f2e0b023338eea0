//! # CLI Interface
//!
//! Argument structure for `deposit-gate`, using `clap` derive. Four
//! subcommands: `init`, `exec`, `show`, and `address`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use deposit_gate_contracts::config::{
    DEFAULT_ACCOUNT_DEPOSIT_CAP_UNITS, DEFAULT_GLOBAL_DEPOSIT_CAP_UNITS,
};
use deposit_gate_contracts::types::Address;

use crate::logging::LogFormat;

/// Operator tool for a deposit gate: a capped deposit ledger, the hooks a
/// vault calls into, and an account access controller.
///
/// State lives in a single JSON file. Every command loads it, and `init` and
/// successful `exec` calls write it back.
#[derive(Parser, Debug)]
#[command(name = "deposit-gate", version, propagate_version = true)]
pub struct DepositGateCli {
    /// Path to the state file.
    #[arg(
        long,
        short = 's',
        global = true,
        env = "DEPOSIT_GATE_STATE",
        default_value = "deposit-gate.json"
    )]
    pub state: PathBuf,

    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "DEPOSIT_GATE_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy and wire a fresh gate, and write it to the state file.
    Init(InitArgs),
    /// Execute one call against the stored state.
    Exec(ExecArgs),
    /// Print the stored state, or one deployed contract.
    Show(ShowArgs),
    /// Print the address derived from a label.
    Address(AddressArgs),
}

/// Arguments for `init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Owner of every deployed contract.
    #[arg(long)]
    pub owner: Address,

    /// Global deposit cap, in whole tokens.
    #[arg(long, default_value_t = DEFAULT_GLOBAL_DEPOSIT_CAP_UNITS)]
    pub global_cap: u64,

    /// Per-account deposit cap, in whole tokens.
    #[arg(long, default_value_t = DEFAULT_ACCOUNT_DEPOSIT_CAP_UNITS)]
    pub account_cap: u64,

    /// Replace an existing state file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `exec`.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Address the call is made from.
    #[arg(long, env = "DEPOSIT_GATE_CALLER")]
    pub caller: Address,

    /// The call as JSON, e.g. `{"set_vault":{"hook":"0x..","vault":null}}`.
    #[arg(long)]
    pub call: String,
}

/// Arguments for `show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Only print the contract deployed at this address.
    #[arg(long)]
    pub contract: Option<Address>,
}

/// Arguments for `address`.
#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Any string; the same label always yields the same address.
    pub label: String,
}
