//! # Deposit Gate Contracts
//!
//! Record-keeping and gating for a permissioned collateral vault. The vault
//! itself (token custody, settlement) lives elsewhere; this crate decides
//! whether a deposit or withdrawal may be booked and keeps the books:
//!
//! - **Deposit Record**: the ledger. Global and per-account net deposits,
//!   their caps, and the allow-list of callers that may write to it.
//! - **Deposit Hook**: invoked by the vault before a deposit is credited;
//!   books the increase, which the ledger checks against its caps.
//! - **Withdraw Hook**: invoked by the vault before a withdrawal is paid
//!   out; books the decrease.
//! - **Account Access Controller**: owner-managed allowed/blocked account
//!   lists the deposit hook can consult.
//! - **Environment**: deploys the above, routes calls with an explicit
//!   caller, collects change notifications, and persists state.
//!
//! ## Design Principles
//!
//! 1. The caller is always explicit. Every mutating operation takes a
//!    [`CallContext`]; nothing reads an ambient sender.
//! 2. All-or-nothing. Operations validate before they write, so an error
//!    means no state changed.
//! 3. Checked arithmetic on every total. Overflow is an error, never a wrap.
//! 4. One owner per component, one vault per hook, one allow-list type for
//!    every allow-list.

pub mod access_controller;
pub mod config;
pub mod deposit_hook;
pub mod deposit_record;
pub mod environment;
pub mod error;
pub mod events;
pub mod hook;
pub mod ownable;
pub mod permission;
pub mod types;
pub mod withdraw_hook;

pub use access_controller::AccountAccessController;
pub use deposit_hook::DepositHook;
pub use deposit_record::DepositRecord;
pub use environment::{Call, Environment, StateError};
pub use error::{ContractError, Role, Scope, Setting};
pub use events::{EmittedEvent, Event, EventLog};
pub use types::{Address, Amount, CallContext};
pub use withdraw_hook::WithdrawHook;
