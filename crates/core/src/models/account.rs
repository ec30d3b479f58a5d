use serde::{Deserialize, Serialize};

use super::caip::ChainId;

/// A raw per-chain account record, exactly as a chain adapter returns it.
///
/// Tagged by balance model so the normalizer's dispatch is an exhaustive
/// match — a new chain kind cannot be forgotten without a compile error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountRecord {
    /// Account-based chain (Ethereum-style): one native balance plus a
    /// discrete list of token balances.
    Evm(EvmAccount),
    /// UTXO-based chain (Bitcoin-style): balances spread across derived
    /// addresses under one xpub.
    Utxo(UtxoAccount),
}

impl AccountRecord {
    pub fn chain_id(&self) -> &ChainId {
        match self {
            AccountRecord::Evm(a) => &a.chain_id,
            AccountRecord::Utxo(a) => &a.chain_id,
        }
    }
}

/// Account-based chain data: native balance plus held tokens.
/// All balances are base-unit integer strings (wei for eip155).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmAccount {
    pub chain_id: ChainId,
    /// Native-coin balance in base units.
    pub balance: String,
    /// Tokens held by the account. Empty for an account holding only the
    /// native coin.
    pub tokens: Vec<TokenBalance>,
}

/// One ERC-20 token position on an account-based chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Token contract address as returned by the data source; asset-id
    /// construction lowercases it.
    pub contract: String,
    /// Balance in the token's base units.
    pub balance: String,
    /// Base-unit decimals of the token.
    pub precision: u32,
    pub symbol: String,
    pub name: String,
}

/// UTXO-based chain data: the derived addresses under one account xpub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoAccount {
    pub chain_id: ChainId,
    /// Per-address balances in base units (satoshis for bip122). May be
    /// empty for a fresh account; the normalizer then records balance "0".
    pub addresses: Vec<AddressBalance>,
}

/// Balance of a single derived address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBalance {
    pub address: String,
    pub balance: String,
}
