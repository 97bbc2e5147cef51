//! In-memory chain and indexer doubles sharing one ledger.
//!
//! The mock chain interprets submitted transactions the way the on-chain
//! programs would at the protocol level: it verifies signatures, checks
//! proof roots and path lengths against the tree it tracks, applies the
//! leaf state machine, and commits a transaction's instructions
//! atomically. The mock indexer serves asset records and deterministic
//! proofs from the same ledger, so client flows can be exercised
//! end to end without a validator.

use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use borsh::{BorshDeserialize, BorshSerialize};
use bubblegum_client::{
    constants::{bubblegum, compression, token_metadata},
    indexer::{
        Asset, AssetCompression, AssetContent, AssetCreator, AssetGrouping, AssetOwnership,
        AssetPage, AssetProof, AssetRoyalty, AssetSupply, AssetUses, ContentMetadata,
        GetAssetsByOwnerOptions, Indexer, IndexerError,
    },
    pda,
    rpc::{ChainClient, RpcError},
    state::{TreeConfig, TreeSpec},
    types::{hash_creators, hash_metadata, MetadataArgs, UseMethod},
};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::{hashv, Hash, Hasher},
    instruction::CompiledInstruction,
    pubkey::Pubkey,
    rent::Rent,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};

fn sighash(name: &str) -> [u8; 8] {
    let mut hasher = Hasher::default();
    hasher.hash(format!("global:{name}").as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hasher.result().as_ref()[..8]);
    discriminator
}

#[derive(Debug, Clone)]
struct TreeEntry {
    spec: TreeSpec,
    seq: u64,
}

#[derive(Debug, Clone)]
struct AssetEntry {
    tree: Pubkey,
    leaf_id: u64,
    owner: Pubkey,
    delegate: Option<Pubkey>,
    metadata: MetadataArgs,
    compressed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    accounts: HashMap<Pubkey, Account>,
    assets: HashMap<Pubkey, AssetEntry>,
    trees: HashMap<Pubkey, TreeEntry>,
    pub last_transfer_proof_len: Option<usize>,
}

fn root_for(tree: &Pubkey, seq: u64) -> [u8; 32] {
    hashv(&[b"root", tree.as_ref(), &seq.to_le_bytes()]).to_bytes()
}

fn proof_node(tree: &Pubkey, seq: u64, level: u32) -> [u8; 32] {
    hashv(&[b"node", tree.as_ref(), &seq.to_le_bytes(), &level.to_le_bytes()]).to_bytes()
}

fn b58(bytes: [u8; 32]) -> String {
    Pubkey::new_from_array(bytes).to_string()
}

fn reject(logs: &[&str]) -> RpcError {
    RpcError::SubmissionError {
        message: "transaction simulation failed".to_string(),
        logs: logs.iter().map(|line| line.to_string()).collect(),
    }
}

impl Ledger {
    pub fn accounts_contains(&self, address: &Pubkey) -> bool {
        self.accounts.contains_key(address)
    }

    fn tree_config(&self, tree: &Pubkey) -> Option<TreeConfig> {
        let account = self.accounts.get(&pda::tree_authority(tree))?;
        TreeConfig::deserialize(&mut &account.data[8..]).ok()
    }

    fn write_tree_config(&mut self, tree: &Pubkey, config: &TreeConfig) {
        let mut data = vec![0u8; 8];
        config.serialize(&mut data).expect("serialize tree config");
        self.accounts.insert(
            pda::tree_authority(tree),
            Account {
                lamports: 1_000_000,
                data,
                owner: bubblegum::id(),
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    fn asset_by_leaf(&mut self, tree: &Pubkey, nonce: u64) -> Option<&mut AssetEntry> {
        self.assets
            .values_mut()
            .find(|asset| asset.tree == *tree && asset.leaf_id == nonce)
    }
}

/// Chain double. Applies each transaction atomically against a scratch
/// copy of the ledger, mirroring all-or-nothing submission semantics.
pub struct MockChain {
    ledger: Arc<Mutex<Ledger>>,
    payer: Keypair,
}

impl Debug for MockChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockChain {{ payer: {} }}", self.payer.pubkey())
    }
}

impl MockChain {
    pub fn new(ledger: Arc<Mutex<Ledger>>, payer: Keypair) -> Self {
        Self { ledger, payer }
    }

    fn apply_instruction(
        ledger: &mut Ledger,
        keys: &[Pubkey],
        instruction: &CompiledInstruction,
    ) -> Result<(), RpcError> {
        let program_id = keys[instruction.program_id_index as usize];
        let account = |position: usize| keys[instruction.accounts[position] as usize];

        if program_id == solana_sdk::system_program::id() {
            let tag = u32::from_le_bytes(instruction.data[..4].try_into().unwrap());
            if tag == 0 {
                let lamports = u64::from_le_bytes(instruction.data[4..12].try_into().unwrap());
                let space = u64::from_le_bytes(instruction.data[12..20].try_into().unwrap());
                let owner = Pubkey::try_from(&instruction.data[20..52]).unwrap();
                let address = account(1);
                if ledger.accounts.contains_key(&address) {
                    return Err(reject(&["Allocate: account already in use"]));
                }
                ledger.accounts.insert(
                    address,
                    Account {
                        lamports,
                        data: vec![0u8; space as usize],
                        owner,
                        executable: false,
                        rent_epoch: 0,
                    },
                );
            }
            return Ok(());
        }

        if program_id == bubblegum::id() {
            return Self::apply_bubblegum(ledger, keys, instruction);
        }

        if program_id == spl_token::id() {
            // Mint setup instructions only need the mint account to exist.
            return Ok(());
        }

        if program_id == spl_associated_token_account::id() {
            let ata = account(1);
            ledger.accounts.entry(ata).or_insert_with(|| Account {
                lamports: 2_039_280,
                data: vec![0u8; 165],
                owner: spl_token::id(),
                executable: false,
                rent_epoch: 0,
            });
            return Ok(());
        }

        if program_id == token_metadata::id() {
            match instruction.data[0] {
                // CreateMetadataAccountV3: persist the payload for later
                // inspection.
                33 => {
                    let metadata_account = account(0);
                    ledger.accounts.insert(
                        metadata_account,
                        Account {
                            lamports: 1_000_000,
                            data: instruction.data[1..].to_vec(),
                            owner: token_metadata::id(),
                            executable: false,
                            rent_epoch: 0,
                        },
                    );
                }
                // CreateMasterEditionV3
                17 => {
                    let edition_account = account(0);
                    ledger.accounts.insert(
                        edition_account,
                        Account {
                            lamports: 1_000_000,
                            data: vec![0u8; 1],
                            owner: token_metadata::id(),
                            executable: false,
                            rent_epoch: 0,
                        },
                    );
                }
                _ => {}
            }
            return Ok(());
        }

        Err(reject(&["unknown program invoked"]))
    }

    fn apply_bubblegum(
        ledger: &mut Ledger,
        keys: &[Pubkey],
        instruction: &CompiledInstruction,
    ) -> Result<(), RpcError> {
        let account = |position: usize| keys[instruction.accounts[position] as usize];
        let discriminator: [u8; 8] = instruction.data[..8].try_into().unwrap();
        let args = &instruction.data[8..];

        if discriminator == sighash("create_tree") {
            let max_depth = u32::from_le_bytes(args[..4].try_into().unwrap());
            let max_buffer_size = u32::from_le_bytes(args[4..8].try_into().unwrap());
            let is_public = args.get(8..10) == Some(&[1u8, 1][..]);
            let tree = account(1);

            let tree_account = ledger
                .accounts
                .get_mut(&tree)
                .ok_or_else(|| reject(&["tree account was not allocated"]))?;
            if tree_account.owner != compression::id() {
                return Err(reject(&["tree account has the wrong owner"]));
            }
            tree_account.data[0] = 1;
            tree_account.data[1] = 1;
            tree_account.data[2..6].copy_from_slice(&max_buffer_size.to_le_bytes());
            tree_account.data[6..10].copy_from_slice(&max_depth.to_le_bytes());
            let spec = TreeSpec::from_account_data(&tree_account.data)
                .map_err(|_| reject(&["tree account size does not match the requested shape"]))?;

            let payer = account(2);
            ledger.write_tree_config(
                &tree,
                &TreeConfig {
                    tree_creator: payer,
                    tree_delegate: payer,
                    total_mint_capacity: 1u64 << max_depth.min(62),
                    num_minted: 0,
                    is_public,
                },
            );
            ledger.trees.insert(tree, TreeEntry { spec, seq: 0 });
            return Ok(());
        }

        if discriminator == sighash("mint_v1") || discriminator == sighash("mint_to_collection_v1")
        {
            let metadata = MetadataArgs::try_from_slice(args)
                .map_err(|_| reject(&["invalid metadata payload"]))?;
            let tree = account(3);
            let leaf_owner = account(1);
            let leaf_delegate = account(2);
            let tree_delegate = account(5);

            let mut config = ledger
                .tree_config(&tree)
                .ok_or_else(|| reject(&["tree config does not exist"]))?;
            if !config.is_public && tree_delegate != config.tree_delegate {
                return Err(reject(&["signer is not the tree delegate"]));
            }
            let nonce = config.num_minted;
            config.num_minted += 1;
            ledger.write_tree_config(&tree, &config);

            let asset_id = pda::asset_id(&tree, nonce);
            ledger.assets.insert(
                asset_id,
                AssetEntry {
                    tree,
                    leaf_id: nonce,
                    owner: leaf_owner,
                    delegate: (leaf_delegate != leaf_owner).then_some(leaf_delegate),
                    metadata,
                    compressed: true,
                },
            );
            if let Some(entry) = ledger.trees.get_mut(&tree) {
                entry.seq += 1;
            }
            return Ok(());
        }

        if discriminator == sighash("transfer") {
            let leaf = LeafPayload::parse(args)?;
            let tree = account(4);
            let new_owner = account(3);
            let proof_len = instruction.accounts.len() - 8;
            Self::check_leaf(ledger, &tree, &leaf, proof_len)?;
            ledger.last_transfer_proof_len = Some(proof_len);

            let asset = ledger
                .asset_by_leaf(&tree, leaf.nonce)
                .ok_or_else(|| reject(&["leaf not found"]))?;
            asset.owner = new_owner;
            asset.delegate = None;
            ledger.trees.get_mut(&tree).expect("tree exists").seq += 1;
            return Ok(());
        }

        if discriminator == sighash("redeem") {
            let leaf = LeafPayload::parse(args)?;
            let tree = account(3);
            let voucher = account(4);
            let proof_len = instruction.accounts.len() - 8;
            Self::check_leaf(ledger, &tree, &leaf, proof_len)?;

            if voucher != pda::voucher(&tree, leaf.nonce) {
                return Err(reject(&["voucher address constraint violated"]));
            }
            if ledger.accounts.contains_key(&voucher) {
                return Err(reject(&["voucher account already exists"]));
            }
            ledger.accounts.insert(
                voucher,
                Account {
                    lamports: 1_000_000,
                    data: vec![1u8],
                    owner: bubblegum::id(),
                    executable: false,
                    rent_epoch: 0,
                },
            );
            ledger.trees.get_mut(&tree).expect("tree exists").seq += 1;
            return Ok(());
        }

        if discriminator == sighash("decompress_v1") {
            let voucher = account(0);
            let mint = account(3);
            if ledger.accounts.remove(&voucher).is_none() {
                return Err(reject(&["voucher does not exist"]));
            }
            let metadata_account = account(5);
            let asset = ledger
                .assets
                .get_mut(&mint)
                .ok_or_else(|| reject(&["no asset for mint"]))?;
            asset.compressed = false;
            let metadata = asset.metadata.clone();
            ledger.accounts.insert(
                mint,
                Account {
                    lamports: 1_461_600,
                    data: vec![0u8; 82],
                    owner: spl_token::id(),
                    executable: false,
                    rent_epoch: 0,
                },
            );
            let mut data = Vec::new();
            metadata.serialize(&mut data).expect("serialize metadata");
            ledger.accounts.insert(
                metadata_account,
                Account {
                    lamports: 1_000_000,
                    data,
                    owner: token_metadata::id(),
                    executable: false,
                    rent_epoch: 0,
                },
            );
            return Ok(());
        }

        Err(reject(&["unknown instruction discriminator"]))
    }

    fn check_leaf(
        ledger: &Ledger,
        tree: &Pubkey,
        leaf: &LeafPayload,
        proof_len: usize,
    ) -> Result<(), RpcError> {
        let entry = ledger
            .trees
            .get(tree)
            .ok_or_else(|| reject(&["unknown tree"]))?;
        if leaf.root != root_for(tree, entry.seq) {
            return Err(reject(&[
                "Program log: Invalid root recomputed from proof, stale root",
            ]));
        }
        let expected = (entry.spec.max_depth - entry.spec.canopy_depth) as usize;
        if proof_len != expected {
            return Err(reject(&["Program log: proof path length mismatch"]));
        }
        let asset = ledger
            .assets
            .values()
            .find(|asset| asset.tree == *tree && asset.leaf_id == leaf.nonce)
            .ok_or_else(|| reject(&["leaf not found"]))?;
        if leaf.data_hash != hash_metadata(&asset.metadata).expect("hash metadata")
            || leaf.creator_hash != hash_creators(&asset.metadata.creators)
        {
            return Err(reject(&["Program log: leaf hash mismatch"]));
        }
        Ok(())
    }
}

struct LeafPayload {
    root: [u8; 32],
    data_hash: [u8; 32],
    creator_hash: [u8; 32],
    nonce: u64,
}

impl LeafPayload {
    fn parse(args: &[u8]) -> Result<Self, RpcError> {
        if args.len() < 108 {
            return Err(reject(&["leaf payload too short"]));
        }
        Ok(Self {
            root: args[..32].try_into().unwrap(),
            data_hash: args[32..64].try_into().unwrap(),
            creator_hash: args[64..96].try_into().unwrap(),
            nonce: u64::from_le_bytes(args[96..104].try_into().unwrap()),
        })
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn payer(&self) -> &Keypair {
        &self.payer
    }

    fn commitment(&self) -> CommitmentConfig {
        CommitmentConfig::confirmed()
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, RpcError> {
        Ok(self.ledger.lock().unwrap().accounts.get(address).cloned())
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        Ok(Rent::default().minimum_balance(data_len))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Signature, RpcError> {
        transaction
            .verify()
            .map_err(|err| RpcError::from(Box::new(err)))?;

        let mut ledger = self.ledger.lock().unwrap();
        let mut scratch = ledger.clone();
        let keys = &transaction.message.account_keys;
        for instruction in &transaction.message.instructions {
            Self::apply_instruction(&mut scratch, keys, instruction)?;
        }
        *ledger = scratch;
        Ok(transaction.signatures[0])
    }
}

/// Indexer double serving records and deterministic proofs from the
/// shared ledger.
pub struct MockIndexer {
    ledger: Arc<Mutex<Ledger>>,
    empty_proofs: AtomicBool,
}

impl Debug for MockIndexer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockIndexer")
    }
}

impl MockIndexer {
    pub fn new(ledger: Arc<Mutex<Ledger>>) -> Self {
        Self {
            ledger,
            empty_proofs: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent proof request behave as if the indexer has
    /// not caught up.
    pub fn set_empty_proofs(&self, empty: bool) {
        self.empty_proofs.store(empty, Ordering::SeqCst);
    }

    fn record_for(entry: &AssetEntry, asset_id: &Pubkey, seq: u64) -> Asset {
        let metadata = &entry.metadata;
        Asset {
            id: asset_id.to_string(),
            content: AssetContent {
                json_uri: metadata.uri.clone(),
                metadata: ContentMetadata {
                    name: metadata.name.clone(),
                    symbol: metadata.symbol.clone(),
                },
            },
            compression: AssetCompression {
                eligible: false,
                compressed: entry.compressed,
                data_hash: b58(hash_metadata(metadata).expect("hash metadata")),
                creator_hash: b58(hash_creators(&metadata.creators)),
                asset_hash: String::new(),
                tree: entry.tree.to_string(),
                seq,
                leaf_id: entry.leaf_id,
            },
            ownership: AssetOwnership {
                owner: entry.owner.to_string(),
                delegate: entry.delegate.map(|delegate| delegate.to_string()),
                delegated: entry.delegate.is_some(),
                frozen: false,
            },
            royalty: AssetRoyalty {
                basis_points: metadata.seller_fee_basis_points,
                primary_sale_happened: metadata.primary_sale_happened,
            },
            supply: AssetSupply {
                edition_nonce: metadata.edition_nonce,
            },
            grouping: metadata
                .collection
                .iter()
                .map(|collection| AssetGrouping {
                    group_key: "collection".to_string(),
                    group_value: collection.key.to_string(),
                    verified: Some(collection.verified),
                })
                .collect(),
            creators: metadata
                .creators
                .iter()
                .map(|creator| AssetCreator {
                    address: creator.address.to_string(),
                    verified: creator.verified,
                    share: creator.share,
                })
                .collect(),
            uses: metadata.uses.map(|uses| AssetUses {
                use_method: match uses.use_method {
                    UseMethod::Burn => "Burn".to_string(),
                    UseMethod::Multiple => "Multiple".to_string(),
                    UseMethod::Single => "Single".to_string(),
                },
                remaining: uses.remaining,
                total: uses.total,
            }),
            mutable: metadata.is_mutable,
        }
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    async fn get_asset(&self, asset_id: &Pubkey) -> Result<Option<Asset>, IndexerError> {
        let ledger = self.ledger.lock().unwrap();
        Ok(ledger.assets.get(asset_id).map(|entry| {
            let seq = ledger.trees.get(&entry.tree).map(|tree| tree.seq).unwrap_or(0);
            Self::record_for(entry, asset_id, seq)
        }))
    }

    async fn get_asset_proof(&self, asset_id: &Pubkey) -> Result<AssetProof, IndexerError> {
        if self.empty_proofs.load(Ordering::SeqCst) {
            return Err(IndexerError::EmptyProof {
                asset_id: *asset_id,
            });
        }
        let ledger = self.ledger.lock().unwrap();
        let entry = ledger
            .assets
            .get(asset_id)
            .ok_or(IndexerError::MissingResult {
                context: "getAssetProof",
            })?;
        let tree = ledger
            .trees
            .get(&entry.tree)
            .ok_or(IndexerError::MissingResult {
                context: "getAssetProof",
            })?;
        let depth = tree.spec.max_depth;
        Ok(AssetProof {
            root: b58(root_for(&entry.tree, tree.seq)),
            proof: (0..depth)
                .map(|level| b58(proof_node(&entry.tree, tree.seq, level)))
                .collect(),
            node_index: (1u64 << depth) + entry.leaf_id,
            leaf: b58(hash_metadata(&entry.metadata).expect("hash metadata")),
            tree_id: entry.tree.to_string(),
        })
    }

    async fn get_assets_by_owner(
        &self,
        owner: &Pubkey,
        _options: GetAssetsByOwnerOptions,
    ) -> Result<AssetPage, IndexerError> {
        let ledger = self.ledger.lock().unwrap();
        let items: Vec<Asset> = ledger
            .assets
            .iter()
            .filter(|(_, entry)| entry.owner == *owner)
            .map(|(asset_id, entry)| {
                let seq = ledger.trees.get(&entry.tree).map(|tree| tree.seq).unwrap_or(0);
                Self::record_for(entry, asset_id, seq)
            })
            .collect();
        Ok(AssetPage {
            total: items.len() as u32,
            limit: items.len() as u32,
            page: Some(1),
            items,
        })
    }
}

/// A ledger wired to a fresh chain/indexer pair around one payer.
pub fn test_stack() -> (Arc<Mutex<Ledger>>, MockChain, MockIndexer) {
    let ledger = Arc::new(Mutex::new(Ledger::default()));
    let chain = MockChain::new(ledger.clone(), Keypair::new());
    let indexer = MockIndexer::new(ledger.clone());
    (ledger, chain, indexer)
}
