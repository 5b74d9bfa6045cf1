//! Block admission scenarios against the in-memory store.

mod common;

use common::*;
use lattice_crypto::encode_account;
use lattice_ledger::{
    Ledger, LedgerConfig, LedgerConstants, LedgerStat, ProcessResult, SignatureVerification,
};
use lattice_store::{PendingInfo, PendingKey, ReadTxn, Store};
use lattice_types::{Account, Amount, BlockHash, Epoch, Link, QualifiedRoot, Root};

// ---------------------------------------------------------------------------
// Genesis
// ---------------------------------------------------------------------------

#[test]
fn genesis_is_inserted_into_empty_store() {
    let t = TestLedger::new();
    let txn = t.read();
    let genesis = t.genesis_account();

    assert_eq!(t.ledger.block_count(), 1);
    assert_eq!(t.ledger.account_count(), 1);
    assert_eq!(t.ledger.cemented_count(), 1);
    assert_eq!(t.ledger.weight(&genesis), Amount::MAX);
    assert_eq!(t.ledger.account_balance(&txn, &genesis).unwrap(), Amount::MAX);
    assert_eq!(t.ledger.confirmed_height(&txn, &genesis).unwrap(), 1);
    assert!(t.ledger.block_confirmed(&txn, &t.genesis_hash()).unwrap());
    assert_eq!(txn.frontier_get(&t.genesis_hash()).unwrap(), Some(genesis));
    assert_eq!(txn.representation_get(&genesis).unwrap(), Amount::MAX);

    let block = t.ledger.get_block(&txn, &t.genesis_hash()).unwrap().unwrap();
    assert_eq!(block.height(), 1);
    assert_eq!(block.balance(), Amount::MAX);
    assert_eq!(block.timestamp().as_secs(), START_TIME);
}

#[test]
fn reopening_a_populated_store_keeps_existing_state() {
    let t = TestLedger::new();
    let (key, _) = t.open_account(1, 500);

    let reopened = Ledger::new(
        &t.store,
        LedgerConstants::dev(&t.genesis),
        &LedgerConfig::default(),
    )
    .unwrap();
    assert_eq!(reopened.block_count(), 3);
    assert_eq!(reopened.account_count(), 2);
    assert_eq!(reopened.weight(&key.account()), Amount::raw(500));
    assert_eq!(
        reopened.weight(&t.genesis_account()),
        Amount::MAX - Amount::raw(500)
    );
}

// ---------------------------------------------------------------------------
// Legacy blocks
// ---------------------------------------------------------------------------

#[test]
fn legacy_send_then_open() {
    let t = TestLedger::new();
    let key = key(1);
    let send = t.genesis_send(key.account(), 100);

    let result = t.admit(&send);
    assert_eq!(result.account, t.genesis_account());
    assert_eq!(result.amount, Amount::raw(100));
    assert_eq!(result.pending_account, key.account());
    assert_eq!(result.previous_balance, Amount::MAX);
    assert_eq!(result.verified, SignatureVerification::Valid);
    assert_eq!(result.state_is_send, None);

    {
        let txn = t.read();
        assert_eq!(
            txn.pending_get(&PendingKey::new(key.account(), send.hash()))
                .unwrap(),
            Some(PendingInfo::new(
                t.genesis_account(),
                Amount::raw(100),
                Epoch::Epoch0
            ))
        );
        assert_eq!(
            t.ledger.account_receivable(&txn, &key.account()).unwrap(),
            Amount::raw(100)
        );
        assert!(t.ledger.receivable_any(&txn, &key.account()).unwrap());
        assert_eq!(txn.frontier_get(&t.genesis_hash()).unwrap(), None);
        assert_eq!(
            txn.frontier_get(&send.hash()).unwrap(),
            Some(t.genesis_account())
        );
        assert_eq!(
            txn.block_successor(&t.genesis_hash()).unwrap(),
            Some(send.hash())
        );
    }
    assert_eq!(
        t.ledger.weight(&t.genesis_account()),
        Amount::MAX - Amount::raw(100)
    );

    let rep = Account::new([9; 32]);
    let open = open(&key, send.hash(), rep);
    let result = t.admit(&open);
    assert_eq!(result.amount, Amount::raw(100));
    assert_eq!(result.pending_account, t.genesis_account());

    let txn = t.read();
    let info = t.ledger.account_info(&txn, &key.account()).unwrap().unwrap();
    assert_eq!(info.head, open.hash());
    assert_eq!(info.open_block, open.hash());
    assert_eq!(info.representative, rep);
    assert_eq!(info.balance, Amount::raw(100));
    assert_eq!(info.block_count, 1);
    assert!(!t.ledger.receivable_any(&txn, &key.account()).unwrap());
    assert_eq!(t.ledger.weight(&rep), Amount::raw(100));
    assert_eq!(t.ledger.height(&txn, &send.hash()).unwrap(), Some(2));
    assert_eq!(t.ledger.height(&txn, &open.hash()).unwrap(), Some(1));
    assert_eq!(t.ledger.block_count(), 3);
    assert_eq!(t.ledger.account_count(), 2);
    assert_eq!(t.ledger.stats().get(LedgerStat::Send), 1);
    assert_eq!(t.ledger.stats().get(LedgerStat::Open), 1);
}

#[test]
fn reprocessing_is_old_and_changes_nothing() {
    let t = TestLedger::new();
    let send = t.genesis_send(key(1).account(), 100);
    t.admit(&send);
    let before = t.ledger.rep_weights().snapshot();

    assert_eq!(t.process(&send).code, ProcessResult::Old);
    assert_eq!(t.ledger.block_count(), 2);
    assert_eq!(t.ledger.rep_weights().snapshot(), before);
}

#[test]
fn second_block_on_same_previous_is_fork() {
    let t = TestLedger::new();
    let first = t.genesis_send(key(1).account(), 100);
    let second = t.genesis_send(key(2).account(), 100);
    t.admit(&first);

    assert_eq!(t.process(&second).code, ProcessResult::Fork);
    let txn = t.read();
    let forked = t.ledger.forked_block(&txn, &second).unwrap().unwrap();
    assert_eq!(forked.hash(), first.hash());
    assert!(t.ledger.forked_block(&txn, &first).unwrap().is_none());
}

#[test]
fn wrong_signer_is_bad_signature() {
    let t = TestLedger::new();
    let block = send(
        &key(7),
        t.genesis_hash(),
        key(1).account(),
        Amount::MAX - Amount::raw(1),
    );
    let result = t.process(&block);
    assert_eq!(result.code, ProcessResult::BadSignature);
    assert_eq!(result.verified, SignatureVerification::Invalid);
    assert_eq!(t.ledger.block_count(), 1);
}

#[test]
fn send_increasing_balance_is_negative_spend() {
    let t = TestLedger::new();
    let first = t.genesis_send(key(1).account(), 100);
    t.admit(&first);
    let overspend = send(
        &t.genesis,
        first.hash(),
        key(1).account(),
        Amount::MAX - Amount::raw(50),
    );
    assert_eq!(t.process(&overspend).code, ProcessResult::NegativeSpend);
}

#[test]
fn unknown_previous_is_gap_previous() {
    let t = TestLedger::new();
    let block = send(
        &t.genesis,
        BlockHash::new([0xab; 32]),
        key(1).account(),
        Amount::raw(1),
    );
    assert_eq!(t.process(&block).code, ProcessResult::GapPrevious);
}

#[test]
fn unknown_source_is_gap_source() {
    let t = TestLedger::new();
    let key = key(1);
    let block = open(&key, BlockHash::new([0xcd; 32]), key.account());
    assert_eq!(t.process(&block).code, ProcessResult::GapSource);
}

#[test]
fn receiving_someone_elses_send_is_unreceivable() {
    let t = TestLedger::new();
    let send = t.genesis_send(key(1).account(), 100);
    t.admit(&send);
    let thief = key(2);
    let block = open(&thief, send.hash(), thief.account());
    assert_eq!(t.process(&block).code, ProcessResult::Unreceivable);
}

#[test]
fn receiving_twice_is_unreceivable() {
    let t = TestLedger::new();
    let key = key(1);
    let send = t.genesis_send(key.account(), 100);
    t.admit(&send);
    let open = open(&key, send.hash(), key.account());
    t.admit(&open);
    let again = receive(&key, open.hash(), send.hash());
    assert_eq!(t.process(&again).code, ProcessResult::Unreceivable);
}

#[test]
fn legacy_receive_credits_the_account() {
    let t = TestLedger::new();
    let (key, open_hash) = t.open_account(1, 100);
    let send = t.genesis_send(key.account(), 40);
    t.admit(&send);
    let receive = receive(&key, open_hash, send.hash());

    let result = t.admit(&receive);
    assert_eq!(result.amount, Amount::raw(40));
    assert_eq!(result.previous_balance, Amount::raw(100));
    assert_eq!(t.balance_of(&key.account()), Amount::raw(140));
    assert_eq!(t.ledger.weight(&key.account()), Amount::raw(140));
    assert_eq!(t.ledger.stats().get(LedgerStat::Receive), 1);
}

#[test]
fn opening_the_burn_account_is_rejected() {
    let t = TestLedger::new();
    let send = t.genesis_send(Account::BURN, 100);
    t.admit(&send);
    let burner = key(3);
    let block: lattice_blocks::Block = lattice_blocks::OpenBlock::new(
        send.hash(),
        burner.account(),
        Account::BURN,
        &burner.private,
        0,
    )
    .into();
    let result = t.process_with(&block, SignatureVerification::Valid);
    assert_eq!(result.code, ProcessResult::OpenedBurnAccount);
}

#[test]
fn legacy_change_moves_weight() {
    let t = TestLedger::new();
    let (key, open_hash) = t.open_account(1, 100);
    let rep = Account::new([5; 32]);
    t.admit(&change(&key, open_hash, rep));

    assert_eq!(t.ledger.weight(&key.account()), Amount::ZERO);
    assert_eq!(t.ledger.weight(&rep), Amount::raw(100));
    let txn = t.read();
    assert_eq!(
        t.ledger.representative(&txn, &t.head(&key.account())).unwrap(),
        Some(rep)
    );
}

#[test]
fn legacy_block_after_state_block_is_block_position() {
    let t = TestLedger::new();
    let genesis = t.genesis_account();
    let upgrade = state(
        &t.genesis,
        t.genesis_hash(),
        genesis,
        Amount::MAX,
        Link::ZERO,
    );
    t.admit(&upgrade);
    let legacy = change(&t.genesis, upgrade.hash(), genesis);
    assert_eq!(t.process(&legacy).code, ProcessResult::BlockPosition);
}

// ---------------------------------------------------------------------------
// State blocks
// ---------------------------------------------------------------------------

#[test]
fn state_send_then_state_open() {
    let t = TestLedger::new();
    let key = key(1);
    let send = t.genesis_state_send(key.account(), 250);

    let result = t.admit(&send);
    assert_eq!(result.state_is_send, Some(true));
    assert_eq!(result.amount, Amount::raw(250));
    assert_eq!(result.pending_account, key.account());
    {
        let txn = t.read();
        assert_eq!(txn.frontier_get(&t.genesis_hash()).unwrap(), None);
        assert_eq!(txn.frontier_get(&send.hash()).unwrap(), None);
        let saved = txn.block_get(&send.hash()).unwrap().unwrap();
        assert!(saved.is_send());
        assert!(!saved.is_receive());
        assert_eq!(saved.height(), 2);
    }

    let open = state(
        &key,
        BlockHash::ZERO,
        key.account(),
        Amount::raw(250),
        Link::from(send.hash()),
    );
    let result = t.admit(&open);
    assert_eq!(result.state_is_send, Some(false));
    assert_eq!(result.pending_account, t.genesis_account());

    let txn = t.read();
    let info = t.ledger.account_info(&txn, &key.account()).unwrap().unwrap();
    assert_eq!(info.open_block, open.hash());
    assert_eq!(info.balance, Amount::raw(250));
    assert_eq!(info.epoch, Epoch::Epoch0);
    assert!(txn.block_get(&open.hash()).unwrap().unwrap().is_receive());
    assert_eq!(t.ledger.weight(&key.account()), Amount::raw(250));
    assert_eq!(t.ledger.stats().get(LedgerStat::StateBlock), 2);
    assert_eq!(t.ledger.account_count(), 2);
}

#[test]
fn state_receive_with_wrong_amount_is_balance_mismatch() {
    let t = TestLedger::new();
    let key = key(1);
    let send = t.genesis_state_send(key.account(), 250);
    t.admit(&send);
    let open = state(
        &key,
        BlockHash::ZERO,
        key.account(),
        Amount::raw(251),
        Link::from(send.hash()),
    );
    assert_eq!(t.process(&open).code, ProcessResult::BalanceMismatch);
}

#[test]
fn state_balance_change_without_link_is_balance_mismatch() {
    let t = TestLedger::new();
    let block = state(
        &t.genesis,
        t.genesis_hash(),
        t.genesis_account(),
        Amount::MAX - Amount::raw(1),
        Link::ZERO,
    );
    assert_eq!(t.process(&block).code, ProcessResult::BalanceMismatch);
}

#[test]
fn state_open_without_link_is_gap_source() {
    let t = TestLedger::new();
    let key = key(1);
    let block = state(&key, BlockHash::ZERO, key.account(), Amount::ZERO, Link::ZERO);
    assert_eq!(t.process(&block).code, ProcessResult::GapSource);
}

#[test]
fn state_open_of_existing_account_is_fork() {
    let t = TestLedger::new();
    let (key, _) = t.open_account(1, 100);
    let send = t.genesis_state_send(key.account(), 10);
    t.admit(&send);
    let second_open = state(
        &key,
        BlockHash::ZERO,
        key.account(),
        Amount::raw(10),
        Link::from(send.hash()),
    );
    assert_eq!(t.process(&second_open).code, ProcessResult::Fork);
}

#[test]
fn state_change_moves_whole_balance() {
    let t = TestLedger::new();
    let (key, open_hash) = t.open_account(1, 100);
    let rep = Account::new([8; 32]);
    let block = state(&key, open_hash, rep, Amount::raw(100), Link::ZERO);
    let result = t.admit(&block);
    assert_eq!(result.amount, Amount::ZERO);
    assert_eq!(t.ledger.weight(&rep), Amount::raw(100));
    assert_eq!(t.ledger.weight(&key.account()), Amount::ZERO);
    assert_eq!(t.read().frontier_get(&open_hash).unwrap(), None);
}

// ---------------------------------------------------------------------------
// Epochs
// ---------------------------------------------------------------------------

#[test]
fn epoch_upgrades_are_sequential() {
    let t = TestLedger::new();
    let (key, open_hash) = t.open_account(1, 100);
    let account = key.account();
    let epoch1 = t.epoch_link(Epoch::Epoch1);

    let upgrade = epoch_block(&t.genesis, account, open_hash, account, Amount::raw(100), epoch1);
    let result = t.admit(&upgrade);
    assert_eq!(result.verified, SignatureVerification::ValidEpoch);
    assert_eq!(
        t.ledger.account_info(&t.read(), &account).unwrap().unwrap().epoch,
        Epoch::Epoch1
    );
    assert_eq!(t.read().frontier_get(&open_hash).unwrap(), None);

    let legacy = change(&key, upgrade.hash(), account);
    assert_eq!(t.process(&legacy).code, ProcessResult::BlockPosition);

    let repeat = epoch_block(&t.genesis, account, upgrade.hash(), account, Amount::raw(100), epoch1);
    assert_eq!(t.process(&repeat).code, ProcessResult::BlockPosition);

    let epoch2 = epoch_block(
        &t.genesis,
        account,
        upgrade.hash(),
        account,
        Amount::raw(100),
        t.epoch_link(Epoch::Epoch2),
    );
    t.admit(&epoch2);
    let txn = t.read();
    let info = t.ledger.account_info(&txn, &account).unwrap().unwrap();
    assert_eq!(info.epoch, Epoch::Epoch2);
    assert!(txn.block_get(&epoch2.hash()).unwrap().unwrap().is_epoch());
    assert_eq!(t.ledger.weight(&account), Amount::raw(100));
    assert_eq!(t.ledger.stats().get(LedgerStat::EpochBlock), 2);
}

#[test]
fn skipping_an_epoch_is_block_position() {
    let t = TestLedger::new();
    let (key, open_hash) = t.open_account(1, 100);
    let account = key.account();
    let block = epoch_block(
        &t.genesis,
        account,
        open_hash,
        account,
        Amount::raw(100),
        t.epoch_link(Epoch::Epoch2),
    );
    assert_eq!(t.process(&block).code, ProcessResult::BlockPosition);
}

#[test]
fn epoch_changing_representative_is_rejected() {
    let t = TestLedger::new();
    let (key, open_hash) = t.open_account(1, 100);
    let block = epoch_block(
        &t.genesis,
        key.account(),
        open_hash,
        Account::new([4; 32]),
        Amount::raw(100),
        t.epoch_link(Epoch::Epoch1),
    );
    assert_eq!(t.process(&block).code, ProcessResult::RepresentativeMismatch);
}

#[test]
fn epoch_link_signed_by_account_is_a_regular_state_block() {
    let t = TestLedger::new();
    let (key, open_hash) = t.open_account(1, 100);
    let block = state(
        &key,
        open_hash,
        key.account(),
        Amount::raw(100),
        t.epoch_link(Epoch::Epoch1),
    );
    let result = t.process(&block);
    assert_eq!(result.verified, SignatureVerification::Valid);
    // Treated as a receive of a non-existent source.
    assert_eq!(result.code, ProcessResult::GapSource);
}

#[test]
fn epoch_open_requires_pending() {
    let t = TestLedger::new();
    let key = key(1);
    let link = t.epoch_link(Epoch::Epoch1);
    let epoch_open = epoch_block(
        &t.genesis,
        key.account(),
        BlockHash::ZERO,
        Account::ZERO,
        Amount::ZERO,
        link,
    );
    assert_eq!(t.process(&epoch_open).code, ProcessResult::GapEpochOpenPending);

    t.admit(&t.genesis_send(key.account(), 100));
    let with_rep = epoch_block(
        &t.genesis,
        key.account(),
        BlockHash::ZERO,
        key.account(),
        Amount::ZERO,
        link,
    );
    assert_eq!(t.process(&with_rep).code, ProcessResult::RepresentativeMismatch);

    t.admit(&epoch_open);
    let txn = t.read();
    let info = t.ledger.account_info(&txn, &key.account()).unwrap().unwrap();
    assert_eq!(info.epoch, Epoch::Epoch1);
    assert_eq!(info.balance, Amount::ZERO);
    assert_eq!(info.block_count, 1);
    assert_eq!(t.ledger.account_count(), 2);
}

#[test]
fn epoch_open_with_balance_is_balance_mismatch() {
    let t = TestLedger::new();
    let key = key(1);
    t.admit(&t.genesis_send(key.account(), 100));
    let epoch_open = epoch_block(
        &t.genesis,
        key.account(),
        BlockHash::ZERO,
        Account::ZERO,
        Amount::raw(5),
        t.epoch_link(Epoch::Epoch1),
    );
    let result = t.process(&epoch_open);
    assert_eq!(result.code, ProcessResult::BalanceMismatch);
    assert_eq!(result.verified, SignatureVerification::ValidEpoch);
    assert!(t.ledger.account_info(&t.read(), &key.account()).unwrap().is_none());
}

#[test]
fn epoch_upgrade_changing_balance_is_balance_mismatch() {
    let t = TestLedger::new();
    let (key, open_hash) = t.open_account(1, 100);
    let block_count = t.ledger.block_count();
    let upgrade = epoch_block(
        &t.genesis,
        key.account(),
        open_hash,
        key.account(),
        Amount::raw(90),
        t.epoch_link(Epoch::Epoch1),
    );
    assert_eq!(t.process(&upgrade).code, ProcessResult::BalanceMismatch);
    assert_eq!(t.ledger.block_count(), block_count);
    assert_eq!(t.balance_of(&key.account()), Amount::raw(100));
}

#[test]
fn epoch_open_must_be_the_first_epoch() {
    let t = TestLedger::new();
    let key = key(1);
    t.admit(&t.genesis_send(key.account(), 100));
    let skip = epoch_block(
        &t.genesis,
        key.account(),
        BlockHash::ZERO,
        Account::ZERO,
        Amount::ZERO,
        t.epoch_link(Epoch::Epoch2),
    );
    assert_eq!(t.process(&skip).code, ProcessResult::BlockPosition);
    assert!(t.ledger.account_info(&t.read(), &key.account()).unwrap().is_none());
}

#[test]
fn receiving_from_upgraded_sender_raises_epoch() {
    let t = TestLedger::new();
    let genesis = t.genesis_account();
    let upgrade = epoch_block(
        &t.genesis,
        genesis,
        t.genesis_hash(),
        genesis,
        Amount::MAX,
        t.epoch_link(Epoch::Epoch1),
    );
    t.admit(&upgrade);

    let key = key(1);
    let send = t.genesis_state_send(key.account(), 100);
    t.admit(&send);
    assert_eq!(
        t.read()
            .pending_get(&PendingKey::new(key.account(), send.hash()))
            .unwrap()
            .unwrap()
            .epoch,
        Epoch::Epoch1
    );

    let legacy_open = open(&key, send.hash(), key.account());
    assert_eq!(t.process(&legacy_open).code, ProcessResult::Unreceivable);

    let state_open = state(
        &key,
        BlockHash::ZERO,
        key.account(),
        Amount::raw(100),
        Link::from(send.hash()),
    );
    t.admit(&state_open);
    let txn = t.read();
    assert_eq!(
        t.ledger.account_info(&txn, &key.account()).unwrap().unwrap().epoch,
        Epoch::Epoch1
    );
    let saved = txn.block_get(&state_open.hash()).unwrap().unwrap();
    assert_eq!(saved.sideband.source_epoch, Epoch::Epoch1);
    assert_eq!(saved.epoch(), Epoch::Epoch1);
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[test]
fn block_queries() {
    let t = TestLedger::new();
    let key = key(1);
    let send = t.genesis_send(key.account(), 100);
    t.admit(&send);
    let open = open(&key, send.hash(), Account::new([6; 32]));
    let txn = t.read();

    assert_eq!(t.ledger.amount(&txn, &send.hash()).unwrap(), Some(Amount::raw(100)));
    assert_eq!(t.ledger.amount(&txn, &t.genesis_hash()).unwrap(), Some(Amount::MAX));
    assert_eq!(
        t.ledger.balance(&txn, &send.hash()).unwrap(),
        Some(Amount::MAX - Amount::raw(100))
    );
    assert_eq!(t.ledger.account(&txn, &send.hash()).unwrap(), Some(t.genesis_account()));
    // A send names no representative: walk back to the genesis open.
    assert_eq!(
        t.ledger.representative_block(&txn, &send.hash()).unwrap(),
        Some(t.genesis_hash())
    );
    assert_eq!(
        t.ledger.representative(&txn, &send.hash()).unwrap(),
        Some(t.genesis_account())
    );
    assert_eq!(t.ledger.balance(&txn, &open.hash()).unwrap(), None);
    assert!(t.ledger.block_exists(&txn, &send.hash()).unwrap());
    assert!(!t.ledger.block_exists(&txn, &open.hash()).unwrap());

    assert_eq!(
        t.ledger.latest(&txn, &t.genesis_account()).unwrap(),
        Some(send.hash())
    );
    assert_eq!(t.ledger.latest(&txn, &key.account()).unwrap(), None);
    assert_eq!(
        t.ledger.latest_root(&txn, &key.account()).unwrap(),
        Root::from(key.account())
    );
    assert_eq!(
        t.ledger.latest_root(&txn, &t.genesis_account()).unwrap(),
        Root::from(send.hash())
    );

    let slot = QualifiedRoot::new(Root::from(t.genesis_hash()), t.genesis_hash());
    assert_eq!(
        t.ledger.successor(&txn, &slot).unwrap().map(|b| b.hash()),
        Some(send.hash())
    );
    let genesis_slot = QualifiedRoot::new(Root::from(t.genesis_account()), BlockHash::ZERO);
    assert_eq!(
        t.ledger.successor(&txn, &genesis_slot).unwrap().map(|b| b.hash()),
        Some(t.genesis_hash())
    );
}

#[test]
fn dependencies_and_could_fit() {
    let t = TestLedger::new();
    let key = key(1);
    let send = t.genesis_state_send(key.account(), 100);
    let open = state(
        &key,
        BlockHash::ZERO,
        key.account(),
        Amount::raw(100),
        Link::from(send.hash()),
    );

    {
        let txn = t.read();
        assert_eq!(
            t.ledger
                .dependent_blocks(&txn, &t.ledger.constants().genesis)
                .unwrap(),
            [BlockHash::ZERO, BlockHash::ZERO]
        );
        assert_eq!(
            t.ledger.dependent_blocks(&txn, &send).unwrap(),
            [t.genesis_hash(), BlockHash::ZERO]
        );
        assert_eq!(
            t.ledger.dependent_blocks(&txn, &open).unwrap(),
            [BlockHash::ZERO, send.hash()]
        );
        assert!(t.ledger.could_fit(&txn, &send).unwrap());
        assert!(!t.ledger.could_fit(&txn, &open).unwrap());
    }

    t.admit(&send);
    assert!(t.ledger.could_fit(&t.read(), &open).unwrap());

    let epoch_link = t.epoch_link(Epoch::Epoch1);
    let upgrade = epoch_block(
        &t.genesis,
        key.account(),
        BlockHash::ZERO,
        Account::ZERO,
        Amount::ZERO,
        epoch_link,
    );
    assert_eq!(
        t.ledger.dependent_blocks(&t.read(), &upgrade).unwrap(),
        [BlockHash::ZERO, BlockHash::ZERO]
    );
}

#[test]
fn epoch_table_queries() {
    let t = TestLedger::new();
    let link = t.epoch_link(Epoch::Epoch1);
    assert!(t.ledger.is_epoch_link(&link));
    assert!(!t.ledger.is_epoch_link(&Link::new([1; 32])));
    assert_eq!(t.ledger.epoch_signer(&link), Some(t.genesis_account()));
    assert_eq!(t.ledger.epoch_signer(&Link::ZERO), None);
    assert_eq!(t.ledger.epoch_link(Epoch::Epoch0), None);
}

#[test]
fn confirm_raises_confirmation_height() {
    let t = TestLedger::new();
    let first = t.genesis_send(key(1).account(), 1);
    t.admit(&first);
    let second = t.genesis_send(key(1).account(), 1);
    t.admit(&second);

    assert_eq!(t.confirm(&second.hash()), 2);
    assert_eq!(t.confirm(&first.hash()), 0);
    assert_eq!(t.ledger.cemented_count(), 3);
    let txn = t.read();
    assert!(t.ledger.block_confirmed(&txn, &first.hash()).unwrap());
    assert_eq!(
        t.ledger.confirmed_height(&txn, &t.genesis_account()).unwrap(),
        3
    );
}

#[test]
fn bootstrap_weights_apply_below_threshold() {
    let rep = Account::new([3; 32]);
    let mut config = LedgerConfig::default();
    config.bootstrap_weight_max_blocks = 3;
    config
        .bootstrap_weights
        .insert(encode_account(&rep), "777".into());
    let t = TestLedger::with_config(&config);

    assert_eq!(t.ledger.weight(&rep), Amount::raw(777));
    // Reps without a configured entry fall back to live weight.
    assert_eq!(t.ledger.weight(&t.genesis_account()), Amount::MAX);

    t.admit(&t.genesis_send(key(1).account(), 1));
    t.admit(&t.genesis_send(key(1).account(), 1));
    assert_eq!(t.ledger.block_count(), 3);
    assert_eq!(t.ledger.weight(&rep), Amount::ZERO);
}

#[test]
fn aborted_transaction_is_recovered_by_reload() {
    let t = TestLedger::new();
    let send = t.genesis_send(key(1).account(), 100);
    {
        let mut txn = t.store.begin_write().unwrap();
        let result = t
            .ledger
            .process(&mut txn, &send, SignatureVerification::Unknown)
            .unwrap();
        assert_eq!(result.code, ProcessResult::Progress);
        // Dropped without commit.
    }
    t.ledger.reload(&t.read()).unwrap();

    assert_eq!(t.ledger.block_count(), 1);
    assert_eq!(t.ledger.weight(&t.genesis_account()), Amount::MAX);
    assert!(!t.ledger.block_exists(&t.read(), &send.hash()).unwrap());
    t.admit(&send);
}
