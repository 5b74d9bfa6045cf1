//! Network constants: the genesis block and the epoch upgrade table.
//!
//! The genesis block is a legacy open block whose source field holds the
//! genesis account itself (there is no send to receive from). The genesis
//! account starts with the whole supply and also signs epoch upgrades.

use std::collections::BTreeMap;

use lattice_blocks::{Block, OpenBlock};
use lattice_crypto::{blake2b_256, keypair_from_seed};
use lattice_types::{Account, Amount, BlockHash, Epoch, KeyPair, Link, NetworkId};

/// Published seed of the development network's genesis key.
pub const DEV_GENESIS_SEED: [u8; 32] = [
    0x34, 0xf0, 0xa3, 0x7a, 0xad, 0x20, 0xf4, 0xa2, 0x60, 0xf0, 0xa5, 0xb3, 0xcb, 0x3d, 0x7f,
    0xb5, 0x06, 0x73, 0x21, 0x22, 0x63, 0xe5, 0x8a, 0x38, 0x0b, 0xc1, 0x0e, 0x0f, 0x0f, 0x3f,
    0xa2, 0x17,
];

/// Link value marking an epoch upgrade: the label, zero-padded to 32 bytes.
pub fn epoch_link_from_label(label: &str) -> Link {
    let mut bytes = [0u8; 32];
    let len = label.len().min(32);
    bytes[..len].copy_from_slice(&label.as_bytes()[..len]);
    Link::new(bytes)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochInfo {
    pub link: Link,
    pub signer: Account,
}

/// Epoch upgrade table: which link marks each epoch and who may sign it.
#[derive(Clone, Debug, Default)]
pub struct Epochs {
    entries: BTreeMap<Epoch, EpochInfo>,
}

impl Epochs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, epoch: Epoch, signer: Account, link: Link) {
        self.entries.insert(epoch, EpochInfo { link, signer });
    }

    pub fn is_epoch_link(&self, link: &Link) -> bool {
        self.entries.values().any(|e| e.link == *link)
    }

    /// The epoch a link upgrades to, if it is an epoch link.
    pub fn epoch(&self, link: &Link) -> Option<Epoch> {
        self.entries
            .iter()
            .find(|(_, e)| e.link == *link)
            .map(|(epoch, _)| *epoch)
    }

    pub fn link(&self, epoch: Epoch) -> Option<Link> {
        self.entries.get(&epoch).map(|e| e.link)
    }

    pub fn signer(&self, epoch: Epoch) -> Option<Account> {
        self.entries.get(&epoch).map(|e| e.signer)
    }
}

/// Everything about a network the ledger needs at construction time.
#[derive(Clone, Debug)]
pub struct LedgerConstants {
    pub genesis: Block,
    pub genesis_account: Account,
    pub genesis_amount: Amount,
    pub burn_account: Account,
    pub epochs: Epochs,
}

impl LedgerConstants {
    /// Constants for a network whose genesis (and epoch) key is `genesis_key`.
    pub fn dev(genesis_key: &KeyPair) -> Self {
        let genesis_account = genesis_key.account();
        let genesis = OpenBlock::new(
            BlockHash::new(*genesis_account.as_bytes()),
            genesis_account,
            genesis_account,
            &genesis_key.private,
            0,
        );

        let mut epochs = Epochs::new();
        epochs.add(
            Epoch::Epoch1,
            genesis_account,
            epoch_link_from_label("epoch v1 block"),
        );
        epochs.add(
            Epoch::Epoch2,
            genesis_account,
            epoch_link_from_label("epoch v2 block"),
        );

        Self {
            genesis: genesis.into(),
            genesis_account,
            genesis_amount: Amount::MAX,
            burn_account: Account::BURN,
            epochs,
        }
    }

    pub fn for_network(network: NetworkId) -> Self {
        Self::dev(&genesis_key(network))
    }

    pub fn genesis_hash(&self) -> BlockHash {
        self.genesis.hash()
    }
}

/// Genesis key per network. Dev uses the published seed; live and test
/// derive theirs from the network name so each network has a distinct,
/// deterministic genesis hash.
pub fn genesis_key(network: NetworkId) -> KeyPair {
    match network {
        NetworkId::Dev => keypair_from_seed(&DEV_GENESIS_SEED),
        other => {
            let label = format!("lattice genesis {}", other.as_str());
            keypair_from_seed(&blake2b_256(label.as_bytes()))
        }
    }
}
