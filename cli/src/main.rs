// Copyright (c) 2026 Deposit Gate Contributors. MIT License.

//! # Deposit Gate Operator
//!
//! Entry point for the `deposit-gate` binary. Parses CLI arguments,
//! initializes logging, and runs one command against the state file.
//!
//! - `init`: deploy and wire a ledger, both hooks, and an access controller
//! - `exec`: run one call as a given caller and persist the result
//! - `show`: dump the state, or a single contract
//! - `address`: derive an address from a label
//!
//! Results go to stdout as JSON; logs go to stderr.

mod cli;
mod logging;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use deposit_gate_contracts::config::units;
use deposit_gate_contracts::environment::{Call, Environment};
use deposit_gate_contracts::types::Address;

use cli::{Commands, DepositGateCli};

/// Addresses printed by `init`.
#[derive(Debug, Serialize)]
struct Deployment {
    owner: Address,
    deposit_record: Address,
    deposit_hook: Address,
    withdraw_hook: Address,
    account_access_controller: Address,
}

fn main() -> Result<()> {
    let cli = DepositGateCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);

    match cli.command {
        Commands::Init(args) => init_gate(&cli.state, args),
        Commands::Exec(args) => exec_call(&cli.state, args),
        Commands::Show(args) => show_state(&cli.state, args),
        Commands::Address(args) => {
            println!("{}", Address::from_label(&args.label));
            Ok(())
        }
    }
}

/// Deploys a fresh gate and writes it to `state`.
///
/// Both hooks are put on the ledger's allow-list. Vaults are left unset;
/// hooks stay disabled until the owner runs `set_vault`.
fn init_gate(state: &Path, args: cli::InitArgs) -> Result<()> {
    if state.exists() && !args.force {
        bail!(
            "state file {} already exists (pass --force to replace it)",
            state.display()
        );
    }

    let owner = args.owner;
    let mut env = Environment::new();
    let deposit_record =
        env.deploy_deposit_record(owner, units(args.global_cap), units(args.account_cap));
    let deposit_hook = env.deploy_deposit_hook(owner, Some(deposit_record));
    let withdraw_hook = env.deploy_withdraw_hook(owner, Some(deposit_record));
    let account_access_controller = env.deploy_access_controller(owner);

    for hook in [deposit_hook, withdraw_hook] {
        env.execute(
            owner,
            Call::SetAllowedHook {
                deposit_record,
                hook,
                allowed: true,
            },
        )
        .context("failed to allow-list hook on the deposit record")?;
    }

    env.save(state)
        .with_context(|| format!("failed to write state to {}", state.display()))?;
    tracing::info!(path = %state.display(), "gate initialized");

    let deployment = Deployment {
        owner,
        deposit_record,
        deposit_hook,
        withdraw_hook,
        account_access_controller,
    };
    println!("{}", serde_json::to_string_pretty(&deployment)?);
    Ok(())
}

/// Runs one call. State is written back only if the call succeeds.
fn exec_call(state: &Path, args: cli::ExecArgs) -> Result<()> {
    let mut env = load(state)?;
    let call: Call = serde_json::from_str(&args.call).context("invalid call JSON")?;

    let emitted = env
        .execute(args.caller, call)
        .with_context(|| format!("call from {} rejected", args.caller))?;

    env.save(state)
        .with_context(|| format!("failed to write state to {}", state.display()))?;

    for entry in &emitted {
        println!("{}", serde_json::to_string(entry)?);
    }
    Ok(())
}

/// Prints the whole state, or the contract at `--contract`.
fn show_state(state: &Path, args: cli::ShowArgs) -> Result<()> {
    let env = load(state)?;
    let json = match args.contract {
        None => env.to_json()?,
        Some(address) => contract_json(&env, &address)?,
    };
    println!("{json}");
    Ok(())
}

fn contract_json(env: &Environment, address: &Address) -> Result<String> {
    let json = if let Some(record) = env.deposit_record(address) {
        serde_json::to_string_pretty(record)
    } else if let Some(hook) = env.deposit_hook(address) {
        serde_json::to_string_pretty(hook)
    } else if let Some(hook) = env.withdraw_hook(address) {
        serde_json::to_string_pretty(hook)
    } else if let Some(controller) = env.access_controller(address) {
        serde_json::to_string_pretty(controller)
    } else {
        bail!("no contract deployed at {address}");
    };
    Ok(json?)
}

fn load(state: &Path) -> Result<Environment> {
    Environment::load(state).with_context(|| {
        format!(
            "failed to load state from {} (run `deposit-gate init` first)",
            state.display()
        )
    })
}
