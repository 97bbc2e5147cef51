//! Wire types for the indexer's asset API.
//!
//! Hashes and keys travel as base58 strings; typed accessors decode them
//! once at the boundary so the rest of the client works with `Pubkey` and
//! fixed-size arrays.

use serde::{Deserialize, Serialize};
use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey};

use super::IndexerError;
use crate::types::{Collection, Creator, MetadataArgs, TokenProgramVersion, TokenStandard, UseMethod, Uses};

fn decode_pubkey(field: &'static str, value: &str) -> Result<Pubkey, IndexerError> {
    value.parse().map_err(|_| IndexerError::Base58 {
        field,
        value: value.to_string(),
    })
}

fn decode_hash(field: &'static str, value: &str) -> Result<[u8; 32], IndexerError> {
    let mut buffer = [0u8; 32];
    let len = bs58::decode(value.trim())
        .onto(&mut buffer)
        .map_err(|_| IndexerError::Base58 {
            field,
            value: value.to_string(),
        })?;
    if len != 32 {
        return Err(IndexerError::Base58 {
            field,
            value: value.to_string(),
        });
    }
    Ok(buffer)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetContent {
    #[serde(default)]
    pub json_uri: String,
    #[serde(default)]
    pub metadata: ContentMetadata,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetCompression {
    #[serde(default)]
    pub eligible: bool,
    pub compressed: bool,
    pub data_hash: String,
    pub creator_hash: String,
    #[serde(default)]
    pub asset_hash: String,
    pub tree: String,
    #[serde(default)]
    pub seq: u64,
    pub leaf_id: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetOwnership {
    pub owner: String,
    #[serde(default)]
    pub delegate: Option<String>,
    #[serde(default)]
    pub delegated: bool,
    #[serde(default)]
    pub frozen: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct AssetRoyalty {
    #[serde(default)]
    pub basis_points: u16,
    #[serde(default)]
    pub primary_sale_happened: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetSupply {
    #[serde(default)]
    pub edition_nonce: Option<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetGrouping {
    pub group_key: String,
    pub group_value: String,
    #[serde(default)]
    pub verified: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetCreator {
    pub address: String,
    pub verified: bool,
    pub share: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetUses {
    pub use_method: String,
    pub remaining: u64,
    pub total: u64,
}

/// A compressed asset record as reported by the indexer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub content: AssetContent,
    pub compression: AssetCompression,
    pub ownership: AssetOwnership,
    #[serde(default)]
    pub royalty: AssetRoyalty,
    #[serde(default)]
    pub supply: AssetSupply,
    #[serde(default)]
    pub grouping: Vec<AssetGrouping>,
    #[serde(default)]
    pub creators: Vec<AssetCreator>,
    #[serde(default)]
    pub uses: Option<AssetUses>,
    #[serde(default)]
    pub mutable: bool,
}

impl Asset {
    pub fn asset_id(&self) -> Result<Pubkey, IndexerError> {
        decode_pubkey("id", &self.id)
    }

    pub fn tree(&self) -> Result<Pubkey, IndexerError> {
        decode_pubkey("compression.tree", &self.compression.tree)
    }

    /// Leaf index assigned at mint. Authoritative nonce for transfer,
    /// redeem and decompress; never inferred from the global mint count,
    /// which can disagree under concurrent minting.
    pub fn nonce(&self) -> u64 {
        self.compression.leaf_id
    }

    pub fn data_hash(&self) -> Result<[u8; 32], IndexerError> {
        decode_hash("compression.data_hash", &self.compression.data_hash)
    }

    pub fn creator_hash(&self) -> Result<[u8; 32], IndexerError> {
        decode_hash("compression.creator_hash", &self.compression.creator_hash)
    }

    pub fn owner(&self) -> Result<Pubkey, IndexerError> {
        decode_pubkey("ownership.owner", &self.ownership.owner)
    }

    /// The delegate, falling back to the owner when none is set.
    pub fn delegate_or_owner(&self) -> Result<Pubkey, IndexerError> {
        match &self.ownership.delegate {
            Some(delegate) => decode_pubkey("ownership.delegate", delegate),
            None => self.owner(),
        }
    }

    /// The collection reference, if the asset is grouped into one.
    pub fn collection(&self) -> Result<Option<Collection>, IndexerError> {
        for group in &self.grouping {
            if group.group_key == "collection" {
                return Ok(Some(Collection {
                    verified: group.verified.unwrap_or(false),
                    key: decode_pubkey("grouping.group_value", &group.group_value)?,
                }));
            }
        }
        Ok(None)
    }

    /// Reconstructs the on-chain metadata payload from the record, as
    /// needed by decompress.
    pub fn metadata_args(&self) -> Result<MetadataArgs, IndexerError> {
        let creators = self
            .creators
            .iter()
            .map(|creator| {
                Ok(Creator {
                    address: decode_pubkey("creators.address", &creator.address)?,
                    verified: creator.verified,
                    share: creator.share,
                })
            })
            .collect::<Result<Vec<_>, IndexerError>>()?;

        let uses = match &self.uses {
            Some(uses) => Some(Uses {
                use_method: match uses.use_method.to_ascii_lowercase().as_str() {
                    "burn" => UseMethod::Burn,
                    "multiple" => UseMethod::Multiple,
                    "single" => UseMethod::Single,
                    other => {
                        return Err(IndexerError::Malformed(format!(
                            "unknown use method `{other}`"
                        )))
                    }
                },
                remaining: uses.remaining,
                total: uses.total,
            }),
            None => None,
        };

        Ok(MetadataArgs {
            name: self.content.metadata.name.clone(),
            symbol: self.content.metadata.symbol.clone(),
            uri: self.content.json_uri.clone(),
            seller_fee_basis_points: self.royalty.basis_points,
            primary_sale_happened: self.royalty.primary_sale_happened,
            is_mutable: self.mutable,
            edition_nonce: self.supply.edition_nonce,
            token_standard: Some(TokenStandard::NonFungible),
            collection: self.collection()?,
            uses,
            token_program_version: TokenProgramVersion::Original,
            creators,
        })
    }
}

/// Merkle inclusion proof for one asset, fetched fresh per operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetProof {
    pub root: String,
    pub proof: Vec<String>,
    pub node_index: u64,
    #[serde(default)]
    pub leaf: String,
    pub tree_id: String,
}

impl AssetProof {
    pub fn root_bytes(&self) -> Result<[u8; 32], IndexerError> {
        decode_hash("root", &self.root)
    }

    pub fn tree(&self) -> Result<Pubkey, IndexerError> {
        decode_pubkey("tree_id", &self.tree_id)
    }

    /// Leaf index recovered from the flattened node index: leaves of a
    /// depth-D tree occupy node indices `2^D ..`.
    pub fn leaf_index(&self) -> Result<u64, IndexerError> {
        let first_leaf = 1u64 << self.proof.len();
        self.node_index.checked_sub(first_leaf).ok_or_else(|| {
            IndexerError::Malformed(format!(
                "node index {} below first leaf {first_leaf}",
                self.node_index
            ))
        })
    }

    /// The proof path as readonly instruction accounts, truncated by
    /// `canopy_depth` nodes from the end. The omitted tail is cached
    /// on-chain; supplying a different number of nodes than the program
    /// expects fails verification.
    pub fn proof_path(&self, canopy_depth: u32) -> Result<Vec<AccountMeta>, IndexerError> {
        let keep = self.proof.len().saturating_sub(canopy_depth as usize);
        self.proof[..keep]
            .iter()
            .map(|node| {
                Ok(AccountMeta::new_readonly(
                    decode_pubkey("proof", node)?,
                    false,
                ))
            })
            .collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssetSortBy {
    Created,
    Updated,
    RecentAction,
    Id,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssetSortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct GetAssetsByOwnerOptions {
    pub sort_by: Option<AssetSortBy>,
    pub sort_direction: Option<AssetSortDirection>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// One page of assets for an owner.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct AssetPage {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub page: Option<u32>,
    pub items: Vec<Asset>,
}
