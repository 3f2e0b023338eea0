// Deposit gate benchmarks.
//
// Covers raw ledger writes, the full hook path through the environment
// (vault check, access controller lookup, cap checks), and state encoding
// as the number of tracked accounts grows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use deposit_gate_contracts::deposit_record::DepositRecord;
use deposit_gate_contracts::environment::{Call, Environment};
use deposit_gate_contracts::types::{Address, CallContext};

/// Sets up an environment with a wired deposit hook and `accounts`
/// allow-listed depositors. Returns the environment, the vault, the hook,
/// and the depositors.
fn setup_gate(accounts: usize) -> (Environment, Address, Address, Vec<Address>) {
    let owner = Address::from_label("owner");
    let vault = Address::from_label("vault");
    let mut env = Environment::new();

    let record = env.deploy_deposit_record(owner, u128::MAX, u128::MAX);
    let hook = env.deploy_deposit_hook(owner, Some(record));
    let controller = env.deploy_access_controller(owner);
    let depositors: Vec<Address> = (0..accounts)
        .map(|i| Address::from_label(&format!("depositor-{i}")))
        .collect();

    let calls = vec![
        Call::SetAllowedHook {
            deposit_record: record,
            hook,
            allowed: true,
        },
        Call::SetVault {
            hook,
            vault: Some(vault),
        },
        Call::SetAccountAccessController {
            hook,
            controller: Some(controller),
        },
        Call::AllowAccounts {
            controller,
            accounts: depositors.clone(),
        },
    ];
    for call in calls {
        env.execute(owner, call).expect("wiring call");
    }
    env.drain_events();

    (env, vault, hook, depositors)
}

fn bench_record_deposit(c: &mut Criterion) {
    let owner = CallContext::new(Address::from_label("owner"));
    let account = Address::from_label("account");
    let mut record = DepositRecord::new(
        Address::from_label("record"),
        owner.caller,
        u128::MAX,
        u128::MAX,
    );
    record
        .set_allowed_hook(&owner, owner.caller, true)
        .expect("allow owner");

    c.bench_function("ledger/record_deposit", |b| {
        b.iter(|| record.record_deposit(&owner, black_box(account), black_box(1)));
    });
}

fn bench_hook_deposit(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/hook_deposit");

    for accounts in [1usize, 100, 10_000] {
        let (mut env, vault, hook, depositors) = setup_gate(accounts);
        let mut next = 0usize;

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(accounts), &accounts, |b, _| {
            b.iter(|| {
                let account = depositors[next % depositors.len()];
                next += 1;
                env.execute(
                    vault,
                    Call::InvokeDepositHook {
                        hook,
                        account,
                        amount_before: 0,
                        amount_after: 1,
                    },
                )
            });
            env.drain_events();
        });
    }

    group.finish();
}

fn bench_state_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/state_to_json");

    for accounts in [10usize, 1_000] {
        let (env, ..) = setup_gate(accounts);

        group.throughput(Throughput::Elements(accounts as u64));
        group.bench_with_input(BenchmarkId::from_parameter(accounts), &env, |b, env| {
            b.iter(|| env.to_json());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_record_deposit,
    bench_hook_deposit,
    bench_state_encoding,
);
criterion_main!(benches);
