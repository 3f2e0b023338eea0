//! # Change Notifications
//!
//! Every successful configuration change produces exactly one [`Event`]
//! carrying the new value, including setters that leave the value as it
//! was. Owner-gated setters return their event instead of pushing it
//! somewhere themselves: the [`Environment`](crate::environment::Environment)
//! appends it to the [`EventLog`] only once the whole call has succeeded.
//!
//! The log is for observers (indexers, UIs, the CLI). Nothing in the ledger
//! reads it back, and it is not part of the persisted state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount};

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// A component changed hands.
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    /// The ledger's global cap was set.
    GlobalDepositCapChanged { cap: Amount },
    /// The ledger's per-account cap was set.
    AccountDepositCapChanged { cap: Amount },
    /// A caller was added to or removed from the ledger's hook allow-list.
    AllowedHooksChanged { hook: Address, allowed: bool },
    /// An account was added to or removed from an access controller's
    /// allowed list.
    AccountAllowedChanged { account: Address, allowed: bool },
    /// An account was added to or removed from an access controller's
    /// blocked list.
    AccountBlockedChanged { account: Address, blocked: bool },
    /// An access controller's allowed list was emptied.
    AllowedAccountsCleared,
    /// An access controller's blocked list was emptied.
    BlockedAccountsCleared,
    /// A hook's vault was set. `None` disables the hook.
    VaultChanged { vault: Option<Address> },
    /// A hook's ledger reference was set.
    DepositRecordChanged { deposit_record: Option<Address> },
    /// A deposit hook's access controller reference was set.
    AccountAccessControllerChanged { controller: Option<Address> },
}

/// An [`Event`] as recorded in the log, with its origin and position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedEvent {
    /// Position in the log. Strictly increasing, never reused.
    pub index: u64,
    /// Address of the component that emitted the event.
    pub emitter: Address,
    /// The notification itself.
    pub event: Event,
    /// Wall-clock time the event was appended.
    pub emitted_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Append-only record of emitted events.
///
/// Unbounded: entries stay until [`drain`](Self::drain) takes them.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<EmittedEvent>,
    next_index: u64,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and returns the recorded entry.
    pub fn emit(&mut self, emitter: Address, event: Event) -> EmittedEvent {
        let entry = EmittedEvent {
            index: self.next_index,
            emitter,
            event,
            emitted_at: Utc::now(),
        };
        self.next_index += 1;
        tracing::info!(
            index = entry.index,
            emitter = %entry.emitter,
            event = ?entry.event,
            "event emitted"
        );
        self.entries.push(entry.clone());
        entry
    }

    /// All events still held by the log, oldest first.
    pub fn events(&self) -> &[EmittedEvent] {
        &self.entries
    }

    /// The most recent event emitted by `emitter`, if any.
    pub fn last_for(&self, emitter: &Address) -> Option<&EmittedEvent> {
        self.entries.iter().rev().find(|e| &e.emitter == emitter)
    }

    /// Removes and returns every held event. Indices keep counting from
    /// where they left off.
    pub fn drain(&mut self) -> Vec<EmittedEvent> {
        std::mem::take(&mut self.entries)
    }

    /// Number of events currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the log holds no events.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
