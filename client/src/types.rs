//! Borsh mirrors of the on-chain payload types.
//!
//! Field order is the wire contract of the external programs. Reordering a
//! field changes the serialized bytes and the content hashes derived from
//! them, so these structs must stay byte-compatible with the program
//! version in use.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::keccak;
use solana_sdk::pubkey::Pubkey;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum TokenProgramVersion {
    Original,
    Token2022,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStandard {
    NonFungible,
    FungibleAsset,
    Fungible,
    NonFungibleEdition,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseMethod {
    Burn,
    Multiple,
    Single,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Creator {
    pub address: Pubkey,
    pub verified: bool,
    /// Share of royalties, in percent, 0..=100.
    pub share: u8,
}

/// Reference from a compressed asset to its collection NFT.
///
/// `verified` must be false at mint time; verification is a separate
/// signer-constrained step enforced on-chain.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub verified: bool,
    pub key: Pubkey,
}

/// Metadata payload of a compressed NFT leaf.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct MetadataArgs {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    /// Royalty basis points, 0..=10000.
    pub seller_fee_basis_points: u16,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
    pub edition_nonce: Option<u8>,
    pub token_standard: Option<TokenStandard>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
    pub token_program_version: TokenProgramVersion,
    pub creators: Vec<Creator>,
}

impl MetadataArgs {
    /// Plain non-fungible metadata with no creators, collection or uses.
    pub fn non_fungible(name: String, symbol: String, uri: String) -> Self {
        Self {
            name,
            symbol,
            uri,
            seller_fee_basis_points: 0,
            primary_sale_happened: false,
            is_mutable: false,
            edition_nonce: None,
            token_standard: Some(TokenStandard::NonFungible),
            collection: None,
            uses: None,
            token_program_version: TokenProgramVersion::Original,
            creators: Vec::new(),
        }
    }
}

/// Content hash of a metadata payload, as committed into the Merkle leaf.
///
/// The seller fee basis points are hashed in a second round so royalty
/// checks can run against the hash without the full metadata.
pub fn hash_metadata(metadata: &MetadataArgs) -> Result<[u8; 32], std::io::Error> {
    let serialized = metadata.try_to_vec()?;
    let metadata_hash = keccak::hashv(&[serialized.as_slice()]);
    Ok(keccak::hashv(&[
        metadata_hash.as_ref(),
        &metadata.seller_fee_basis_points.to_le_bytes(),
    ])
    .to_bytes())
}

/// Content hash of the creator list, as committed into the Merkle leaf.
pub fn hash_creators(creators: &[Creator]) -> [u8; 32] {
    let mut bytes = Vec::with_capacity(creators.len() * 34);
    for creator in creators {
        bytes.extend_from_slice(creator.address.as_ref());
        bytes.push(creator.verified as u8);
        bytes.push(creator.share);
    }
    keccak::hashv(&[bytes.as_slice()]).to_bytes()
}

/// Token-metadata `DataV2`, used when bootstrapping a collection NFT.
///
/// The token-metadata program's `Creator`/`Collection`/`Uses` are
/// layout-identical to the compressed-NFT program's, so the same types are
/// reused here.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct DataV2 {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionDetails {
    V1 { size: u64 },
}
