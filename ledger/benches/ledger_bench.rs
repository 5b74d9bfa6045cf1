use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use lattice_blocks::{Block, StateBlock};
use lattice_ledger::{genesis_key, Ledger, LedgerConfig, LedgerConstants, SignatureVerification};
use lattice_nullables::{NullClock, NullStore};
use lattice_store::{ReadTxn, Store};
use lattice_types::{Account, Amount, Link, NetworkId};

fn fresh_ledger() -> (NullStore, Ledger) {
    let store = NullStore::new();
    let genesis = genesis_key(NetworkId::Dev);
    let ledger = Ledger::with_clock(
        &store,
        LedgerConstants::dev(&genesis),
        &LedgerConfig::default(),
        Arc::new(NullClock::new(0)),
    )
    .expect("ledger");
    (store, ledger)
}

/// A chain of `count` state sends from genesis.
fn send_chain(count: usize) -> Vec<Block> {
    let genesis = genesis_key(NetworkId::Dev);
    let account = genesis.account();
    let mut previous = LedgerConstants::dev(&genesis).genesis_hash();
    let mut balance = Amount::MAX;
    (0..count)
        .map(|i| {
            balance = balance - Amount::raw(1);
            let block: Block = StateBlock::new(
                account,
                previous,
                account,
                balance,
                Link::from(Account::new([(i % 251) as u8 + 1; 32])),
                &genesis.private,
                0,
            )
            .into();
            previous = block.hash();
            block
        })
        .collect()
}

fn process_state_sends_bench(c: &mut Criterion) {
    let blocks = send_chain(100);
    c.bench_function("process_100_state_sends", |b| {
        b.iter_batched(
            fresh_ledger,
            |(store, ledger)| {
                let mut txn = store.begin_write().expect("write");
                for block in &blocks {
                    black_box(
                        ledger
                            .process(&mut txn, block, SignatureVerification::Unknown)
                            .expect("process"),
                    );
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn account_receivable_bench(c: &mut Criterion) {
    let (store, ledger) = fresh_ledger();
    let blocks = send_chain(500);
    let mut txn = store.begin_write().expect("write");
    for block in &blocks {
        ledger
            .process(&mut txn, block, SignatureVerification::Valid)
            .expect("process");
    }
    let target = Account::new([1; 32]);
    c.bench_function("account_receivable_500_sends", |b| {
        b.iter(|| {
            ledger
                .account_receivable(&txn, black_box(&target))
                .expect("receivable")
        })
    });
    assert!(txn.block_count().expect("count") > 1);
}

criterion_group!(benches, process_state_sends_bench, account_receivable_bench);
criterion_main!(benches);
