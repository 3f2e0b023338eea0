//! Integration tests for the account access controller, routed through an
//! [`Environment`] so batch calls and their notifications are checked
//! end to end.

use deposit_gate_contracts::environment::{Call, Environment};
use deposit_gate_contracts::error::{ContractError, Role};
use deposit_gate_contracts::events::Event;
use deposit_gate_contracts::types::Address;

fn setup() -> (Environment, Address, Address) {
    let owner = Address::from_label("owner");
    let mut env = Environment::new();
    let controller = env.deploy_access_controller(owner);
    (env, owner, controller)
}

fn accounts(labels: &[&str]) -> Vec<Address> {
    labels.iter().map(|l| Address::from_label(l)).collect()
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[test]
fn allow_accounts_emits_one_event_per_account() {
    let (mut env, owner, controller) = setup();
    let batch = accounts(&["a", "b", "c"]);

    let emitted = env
        .execute(
            owner,
            Call::AllowAccounts {
                controller,
                accounts: batch.clone(),
            },
        )
        .unwrap();

    assert_eq!(emitted.len(), 3);
    for (entry, account) in emitted.iter().zip(&batch) {
        assert_eq!(entry.emitter, controller);
        assert_eq!(
            entry.event,
            Event::AccountAllowedChanged {
                account: *account,
                allowed: true
            }
        );
    }
    let aac = env.access_controller(&controller).unwrap();
    assert!(batch.iter().all(|a| aac.is_allowed(a)));
}

#[test]
fn empty_batch_succeeds_silently() {
    let (mut env, owner, controller) = setup();
    let emitted = env
        .execute(
            owner,
            Call::BlockAccounts {
                controller,
                accounts: Vec::new(),
            },
        )
        .unwrap();
    assert!(emitted.is_empty());
}

#[test]
fn batch_from_non_owner_changes_nothing() {
    let (mut env, _, controller) = setup();
    let stranger = Address::from_label("stranger");
    let err = env
        .execute(
            stranger,
            Call::AllowAccounts {
                controller,
                accounts: accounts(&["a", "b"]),
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        ContractError::Unauthorized {
            caller: stranger,
            required: Role::Owner
        }
    );
    assert!(!env
        .access_controller(&controller)
        .unwrap()
        .is_allowed(&Address::from_label("a")));
    assert!(env.events().is_empty());
}

#[test]
fn duplicate_accounts_in_a_batch_are_harmless() {
    let (mut env, owner, controller) = setup();
    let a = Address::from_label("a");
    let emitted = env
        .execute(
            owner,
            Call::BlockAccounts {
                controller,
                accounts: vec![a, a],
            },
        )
        .unwrap();
    assert_eq!(emitted.len(), 2);
    assert!(env.access_controller(&controller).unwrap().is_blocked(&a));
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[test]
fn allowed_and_blocked_lists_are_independent() {
    let (mut env, owner, controller) = setup();
    let a = Address::from_label("a");

    env.execute(
        owner,
        Call::BlockAccounts {
            controller,
            accounts: vec![a],
        },
    )
    .unwrap();
    env.execute(
        owner,
        Call::SetAccountAllowed {
            controller,
            account: a,
            allowed: true,
        },
    )
    .unwrap();

    let aac = env.access_controller(&controller).unwrap();
    assert!(aac.is_allowed(&a));
    assert!(aac.is_blocked(&a));
    assert!(!aac.permits(&a));
}

#[test]
fn clearing_lists() {
    let (mut env, owner, controller) = setup();
    let batch = accounts(&["a", "b"]);
    for call in [
        Call::AllowAccounts {
            controller,
            accounts: batch.clone(),
        },
        Call::BlockAccounts {
            controller,
            accounts: batch.clone(),
        },
    ] {
        env.execute(owner, call).unwrap();
    }
    env.drain_events();

    let emitted = env
        .execute(owner, Call::ClearAllowedAccounts { controller })
        .unwrap();
    assert_eq!(emitted[0].event, Event::AllowedAccountsCleared);
    let emitted = env
        .execute(owner, Call::ClearBlockedAccounts { controller })
        .unwrap();
    assert_eq!(emitted[0].event, Event::BlockedAccountsCleared);

    let aac = env.access_controller(&controller).unwrap();
    assert!(batch.iter().all(|a| !aac.is_allowed(a) && !aac.is_blocked(a)));
}

#[test]
fn clearing_an_empty_list_still_notifies() {
    let (mut env, owner, controller) = setup();
    let emitted = env
        .execute(owner, Call::ClearBlockedAccounts { controller })
        .unwrap();
    assert_eq!(emitted.len(), 1);
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

#[test]
fn new_owner_takes_over_list_management() {
    let (mut env, owner, controller) = setup();
    let successor = Address::from_label("successor");
    let a = Address::from_label("a");

    let emitted = env
        .execute(
            owner,
            Call::TransferOwnership {
                contract: controller,
                new_owner: successor,
            },
        )
        .unwrap();
    assert_eq!(
        emitted[0].event,
        Event::OwnershipTransferred {
            previous_owner: owner,
            new_owner: successor
        }
    );

    let set = |allowed| Call::SetAccountAllowed {
        controller,
        account: a,
        allowed,
    };
    assert!(env.execute(owner, set(true)).is_err());
    env.execute(successor, set(true)).unwrap();
    assert!(env.access_controller(&controller).unwrap().is_allowed(&a));
}
