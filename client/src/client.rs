//! Lifecycle orchestration: locate → fetch fresh state → build → submit →
//! confirm, one sequential chain per operation.
//!
//! Every mutating operation re-fetches the asset and its proof from the
//! indexer immediately before building the instruction. The tree is a
//! shared external resource with no client-side lock; a root that went
//! stale between fetch and submission is rejected on-chain and surfaces
//! through the submission logs. Callers decide whether to re-fetch and
//! rebuild; nothing is resubmitted automatically.

use solana_program::program_pack::Pack;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
};
use tracing::{debug, info};

use crate::{
    config::ClientConfig,
    error::{ClientError, Result},
    indexer::{Asset, AssetProof, DasIndexer, Indexer},
    instructions::{
        self, CreateMasterEditionParams, CreateMetadataAccountParams, CreateTreeParams,
        DecompressParams, LeafArgs, MintParams, MintToCollectionParams, RedeemParams,
        SetCollectionSizeParams, TransferParams,
    },
    pda,
    rpc::{ChainClient, SolanaRpcConnection},
    state::{tree_account_size, LeafState, TreeConfig, TreeSpec},
    types::{DataV2, MetadataArgs},
};

/// Shape of a tree to create. The canopy depth is fixed at creation and
/// can never change; it determines how many proof nodes every later
/// transfer or redeem may omit.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: u32,
    pub max_buffer_size: u32,
    pub canopy_depth: u32,
    pub public: bool,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 14,
            max_buffer_size: 64,
            canopy_depth: 0,
            public: false,
        }
    }
}

/// Compressed-NFT lifecycle client over an injected chain/indexer pair.
pub struct BubblegumClient<R, I> {
    rpc: R,
    indexer: I,
}

impl BubblegumClient<SolanaRpcConnection, DasIndexer> {
    pub fn from_config(config: &ClientConfig, payer: Keypair) -> Self {
        let rpc = SolanaRpcConnection::new(&config.rpc_url, Some(config.commitment), payer)
            .with_confirm_timeout(config.confirm_timeout);
        let indexer = DasIndexer::new(config.indexer_url.clone(), config.indexer_api_key.clone())
            .with_retry_config(config.indexer_retry);
        Self::new(rpc, indexer)
    }
}

impl<R: ChainClient, I: Indexer> BubblegumClient<R, I> {
    pub fn new(rpc: R, indexer: I) -> Self {
        Self { rpc, indexer }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn indexer(&self) -> &I {
        &self.indexer
    }

    /// Allocates and initializes a new tree. The tree keypair co-signs
    /// the allocation; the payer becomes tree creator and delegate.
    pub async fn create_tree(&self, tree: &Keypair, params: TreeParams) -> Result<Signature> {
        let payer = self.rpc.payer().pubkey();
        let space = tree_account_size(params.max_depth, params.max_buffer_size, params.canopy_depth);
        let lamports = self
            .rpc
            .get_minimum_balance_for_rent_exemption(space)
            .await?;

        let allocate = instructions::allocate_tree_account(
            &tree.pubkey(),
            &payer,
            lamports,
            params.max_depth,
            params.max_buffer_size,
            params.canopy_depth,
        );
        let create = instructions::create_tree(CreateTreeParams {
            tree: tree.pubkey(),
            payer,
            tree_creator: payer,
            max_depth: params.max_depth,
            max_buffer_size: params.max_buffer_size,
            public: Some(params.public),
        })?;

        let signature = self
            .rpc
            .create_and_send_transaction(&[allocate, create], &payer, &[self.rpc.payer(), tree])
            .await?;
        info!("created tree {} ({signature})", tree.pubkey());
        Ok(signature)
    }

    /// Number of leaves ever minted into the tree, read from the
    /// tree-config account on chain rather than the indexer so it cannot
    /// lag behind a just-confirmed mint.
    pub async fn nonce_count(&self, tree: &Pubkey) -> Result<u64> {
        let authority = pda::tree_authority(tree);
        let config: TreeConfig = self
            .rpc
            .get_anchor_account(&authority)
            .await?
            .ok_or(ClientError::TreeNotFound { tree: *tree })?;
        Ok(config.num_minted)
    }

    /// Tree shape read from the tree account itself; the canopy depth
    /// recovered here drives proof truncation.
    pub async fn tree_spec(&self, tree: &Pubkey) -> Result<TreeSpec> {
        let account = self
            .rpc
            .get_account(tree)
            .await?
            .ok_or(ClientError::TreeNotFound { tree: *tree })?;
        Ok(TreeSpec::from_account_data(&account.data)?)
    }

    /// Mints `metadata` as a new leaf, owned by `leaf_owner` (the payer
    /// when `None`). Returns the asset id derived from the mint counter
    /// read just before submission; under concurrent minting into the
    /// same tree the indexer-reported leaf id is the authority.
    pub async fn mint(
        &self,
        tree: &Pubkey,
        metadata: MetadataArgs,
        leaf_owner: Option<Pubkey>,
    ) -> Result<(Pubkey, Signature)> {
        let payer = self.rpc.payer().pubkey();
        let owner = leaf_owner.unwrap_or(payer);
        let nonce = self.nonce_count(tree).await?;

        let ix = instructions::mint_v1(MintParams {
            tree: *tree,
            payer,
            tree_delegate: payer,
            leaf_owner: owner,
            leaf_delegate: owner,
            metadata,
        })?;
        let signature = self
            .rpc
            .create_and_send_transaction(&[ix], &payer, &[self.rpc.payer()])
            .await?;

        let asset_id = pda::asset_id(tree, nonce);
        info!("minted leaf {nonce} of tree {tree} as asset {asset_id} ({signature})");
        Ok((asset_id, signature))
    }

    /// Mints a new leaf that references `collection_mint`; the collection
    /// authority co-signs so the program can verify membership in the
    /// same instruction.
    pub async fn mint_to_collection(
        &self,
        tree: &Pubkey,
        metadata: MetadataArgs,
        leaf_owner: Option<Pubkey>,
        collection_mint: &Pubkey,
        collection_authority: &Keypair,
    ) -> Result<(Pubkey, Signature)> {
        let payer = self.rpc.payer().pubkey();
        let owner = leaf_owner.unwrap_or(payer);
        let nonce = self.nonce_count(tree).await?;

        let ix = instructions::mint_to_collection_v1(MintToCollectionParams {
            tree: *tree,
            payer,
            tree_delegate: payer,
            leaf_owner: owner,
            leaf_delegate: owner,
            collection_authority: collection_authority.pubkey(),
            collection_authority_record: None,
            collection_mint: *collection_mint,
            metadata,
        })?;
        let signers = self.signers_with(collection_authority);
        let signature = self
            .rpc
            .create_and_send_transaction(&[ix], &payer, &signers)
            .await?;

        let asset_id = pda::asset_id(tree, nonce);
        info!("minted leaf {nonce} of tree {tree} into collection {collection_mint} ({signature})");
        Ok((asset_id, signature))
    }

    /// Creates a collection NFT (mint, holder account, metadata, master
    /// edition, zero size) in one atomic transaction. The payer is mint,
    /// update and collection authority.
    pub async fn create_collection(
        &self,
        collection_mint: &Keypair,
        data: DataV2,
    ) -> Result<Signature> {
        let payer = self.rpc.payer().pubkey();
        let mint = collection_mint.pubkey();
        let mint_rent = self
            .rpc
            .get_minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)
            .await?;
        let holder =
            spl_associated_token_account::get_associated_token_address(&payer, &mint);

        let instructions_vec = vec![
            system_instruction::create_account(
                &payer,
                &mint,
                mint_rent,
                spl_token::state::Mint::LEN as u64,
                &spl_token::id(),
            ),
            spl_token::instruction::initialize_mint(
                &spl_token::id(),
                &mint,
                &payer,
                Some(&payer),
                0,
            )?,
            spl_associated_token_account::instruction::create_associated_token_account(
                &payer,
                &payer,
                &mint,
                &spl_token::id(),
            ),
            spl_token::instruction::mint_to(&spl_token::id(), &mint, &holder, &payer, &[], 1)?,
            instructions::create_metadata_account_v3(CreateMetadataAccountParams {
                mint,
                mint_authority: payer,
                payer,
                update_authority: payer,
                data,
                is_mutable: false,
                collection_details: None,
            })?,
            instructions::create_master_edition_v3(CreateMasterEditionParams {
                mint,
                update_authority: payer,
                mint_authority: payer,
                payer,
                max_supply: Some(0),
            })?,
            instructions::set_collection_size(SetCollectionSizeParams {
                collection_mint: mint,
                collection_authority: payer,
                size: 0,
            })?,
        ];

        let signature = self
            .rpc
            .create_and_send_transaction(&instructions_vec, &payer, &[self.rpc.payer(), collection_mint])
            .await?;
        info!("created collection {mint} ({signature})");
        Ok(signature)
    }

    /// Transfers the leaf to `new_leaf_owner`. `authority` must be the
    /// current owner or the current delegate.
    pub async fn transfer(
        &self,
        asset_id: &Pubkey,
        new_leaf_owner: &Pubkey,
        authority: &Keypair,
    ) -> Result<Signature> {
        let (asset, proof) = self.fetch_fresh(asset_id).await?;
        let state = self.leaf_state(&asset).await?;
        require_state(asset_id, LeafState::Active, state)?;

        let tree = asset.tree()?;
        let spec = self.tree_spec(&tree).await?;
        let owner = asset.owner()?;
        let delegate = asset.delegate_or_owner()?;
        let delegate_signs = if authority.pubkey() == owner {
            false
        } else if authority.pubkey() == delegate {
            true
        } else {
            return Err(ClientError::NotLeafAuthority {
                asset_id: *asset_id,
                authority: authority.pubkey(),
            });
        };

        let ix = instructions::transfer(TransferParams {
            tree,
            leaf_owner: owner,
            leaf_delegate: delegate,
            new_leaf_owner: *new_leaf_owner,
            delegate_signs,
            args: leaf_args(&asset, &proof)?,
            proof_path: proof.proof_path(spec.canopy_depth)?,
        })?;
        debug!(
            "transferring asset {asset_id} with {} proof nodes (canopy {})",
            spec.max_depth.saturating_sub(spec.canopy_depth),
            spec.canopy_depth
        );

        let payer = self.rpc.payer().pubkey();
        let signers = self.signers_with(authority);
        let signature = self
            .rpc
            .create_and_send_transaction(&[ix], &payer, &signers)
            .await?;
        info!("transferred asset {asset_id} to {new_leaf_owner} ({signature})");
        Ok(signature)
    }

    /// Removes the leaf from the tree into a voucher. Fails with
    /// [`ClientError::InvalidLeafState`] if the leaf is not active, which
    /// covers a second redeem of the same leaf.
    pub async fn redeem(&self, asset_id: &Pubkey, owner: &Keypair) -> Result<Signature> {
        let (asset, proof) = self.fetch_fresh(asset_id).await?;
        let state = self.leaf_state(&asset).await?;
        require_state(asset_id, LeafState::Active, state)?;
        self.require_owner(asset_id, &asset, owner)?;

        let tree = asset.tree()?;
        let spec = self.tree_spec(&tree).await?;
        let ix = instructions::redeem(RedeemParams {
            tree,
            leaf_owner: owner.pubkey(),
            leaf_delegate: asset.delegate_or_owner()?,
            args: leaf_args(&asset, &proof)?,
            proof_path: proof.proof_path(spec.canopy_depth)?,
        })?;

        let payer = self.rpc.payer().pubkey();
        let signers = self.signers_with(owner);
        let signature = self
            .rpc
            .create_and_send_transaction(&[ix], &payer, &signers)
            .await?;
        info!("redeemed asset {asset_id} into voucher ({signature})");
        Ok(signature)
    }

    /// Consumes the voucher created by a prior confirmed redeem and mints
    /// the asset as a standard token. Needs no proof: it operates on the
    /// voucher, not the tree.
    pub async fn decompress(&self, asset_id: &Pubkey, owner: &Keypair) -> Result<Signature> {
        let asset = self
            .indexer
            .get_asset(asset_id)
            .await?
            .ok_or(ClientError::AssetNotFound {
                asset_id: *asset_id,
            })?;
        let state = self.leaf_state(&asset).await?;
        require_state(asset_id, LeafState::Redeemed, state)?;
        self.require_owner(asset_id, &asset, owner)?;

        let ix = instructions::decompress_v1(DecompressParams {
            tree: asset.tree()?,
            nonce: asset.nonce(),
            leaf_owner: owner.pubkey(),
            mint: *asset_id,
            metadata: asset.metadata_args()?,
        })?;

        let payer = self.rpc.payer().pubkey();
        let signers = self.signers_with(owner);
        let signature = self
            .rpc
            .create_and_send_transaction(&[ix], &payer, &signers)
            .await?;
        info!("decompressed asset {asset_id} ({signature})");
        Ok(signature)
    }

    /// Redeem and decompress in one atomic transaction, for callers that
    /// never want the leaf parked in the voucher state.
    pub async fn redeem_and_decompress(
        &self,
        asset_id: &Pubkey,
        owner: &Keypair,
    ) -> Result<Signature> {
        let (asset, proof) = self.fetch_fresh(asset_id).await?;
        let state = self.leaf_state(&asset).await?;
        require_state(asset_id, LeafState::Active, state)?;
        self.require_owner(asset_id, &asset, owner)?;

        let tree = asset.tree()?;
        let spec = self.tree_spec(&tree).await?;
        let redeem_ix = instructions::redeem(RedeemParams {
            tree,
            leaf_owner: owner.pubkey(),
            leaf_delegate: asset.delegate_or_owner()?,
            args: leaf_args(&asset, &proof)?,
            proof_path: proof.proof_path(spec.canopy_depth)?,
        })?;
        let decompress_ix = instructions::decompress_v1(DecompressParams {
            tree,
            nonce: asset.nonce(),
            leaf_owner: owner.pubkey(),
            mint: *asset_id,
            metadata: asset.metadata_args()?,
        })?;

        let payer = self.rpc.payer().pubkey();
        let signers = self.signers_with(owner);
        let signature = self
            .rpc
            .create_and_send_transaction(&[redeem_ix, decompress_ix], &payer, &signers)
            .await?;
        info!("redeemed and decompressed asset {asset_id} ({signature})");
        Ok(signature)
    }

    /// Lifecycle state of the leaf behind `asset`: decompressed when the
    /// indexer no longer reports it compressed, redeemed while its
    /// voucher account exists, active otherwise.
    pub async fn leaf_state(&self, asset: &Asset) -> Result<LeafState> {
        if !asset.compression.compressed {
            return Ok(LeafState::Decompressed);
        }
        let voucher = pda::voucher(&asset.tree()?, asset.nonce());
        match self.rpc.get_account(&voucher).await? {
            Some(_) => Ok(LeafState::Redeemed),
            None => Ok(LeafState::Active),
        }
    }

    /// Fetches the asset record and a fresh proof, which any intervening
    /// tree mutation invalidates. Never cached across operations.
    async fn fetch_fresh(&self, asset_id: &Pubkey) -> Result<(Asset, AssetProof)> {
        let asset = self
            .indexer
            .get_asset(asset_id)
            .await?
            .ok_or(ClientError::AssetNotFound {
                asset_id: *asset_id,
            })?;
        let proof = self.indexer.get_asset_proof(asset_id).await?;
        if proof.tree()? != asset.tree()? {
            return Err(ClientError::Indexer(
                crate::indexer::IndexerError::Malformed(format!(
                    "proof tree {} does not match asset tree {}",
                    proof.tree_id, asset.compression.tree
                )),
            ));
        }
        Ok((asset, proof))
    }

    fn require_owner(&self, asset_id: &Pubkey, asset: &Asset, owner: &Keypair) -> Result<()> {
        if asset.owner()? != owner.pubkey() {
            return Err(ClientError::NotLeafAuthority {
                asset_id: *asset_id,
                authority: owner.pubkey(),
            });
        }
        Ok(())
    }

    fn signers_with<'a>(&'a self, extra: &'a Keypair) -> Vec<&'a Keypair> {
        let payer = self.rpc.payer();
        if payer.pubkey() == extra.pubkey() {
            vec![payer]
        } else {
            vec![payer, extra]
        }
    }
}

fn require_state(asset_id: &Pubkey, expected: LeafState, actual: LeafState) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ClientError::InvalidLeafState {
            asset_id: *asset_id,
            expected,
            actual,
        })
    }
}

fn leaf_args(asset: &Asset, proof: &AssetProof) -> Result<LeafArgs> {
    let nonce = asset.nonce();
    let index = u32::try_from(nonce).map_err(|_| {
        ClientError::Indexer(crate::indexer::IndexerError::Malformed(format!(
            "leaf id {nonce} exceeds the index range"
        )))
    })?;
    Ok(LeafArgs {
        root: proof.root_bytes()?,
        data_hash: asset.data_hash()?,
        creator_hash: asset.creator_hash()?,
        nonce,
        index,
    })
}
