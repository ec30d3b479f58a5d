use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CoreError;

/// Chain namespace per CAIP-2 (e.g., "eip155", "bip122").
///
/// Deliberately a closed enum: adding a new namespace without handling it
/// everywhere it is matched is a compile error, so chain-kind dispatch can
/// never silently skip an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainNamespace {
    /// Ethereum-style chains (EVM): balances live on accounts with token lists.
    Eip155,
    /// Bitcoin-style chains: balance is the sum of UTXOs across derived addresses.
    Bip122,
}

/// How balances are structured on a chain. Decoded from the namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainKind {
    AccountBased,
    UtxoBased,
}

impl ChainNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainNamespace::Eip155 => "eip155",
            ChainNamespace::Bip122 => "bip122",
        }
    }

    /// Decode the namespace into its balance model.
    pub fn kind(&self) -> ChainKind {
        match self {
            ChainNamespace::Eip155 => ChainKind::AccountBased,
            ChainNamespace::Bip122 => ChainKind::UtxoBased,
        }
    }

    /// SLIP-44 coin type of the namespace's native asset (60 = ETH, 0 = BTC).
    pub fn native_coin_type(&self) -> u32 {
        match self {
            ChainNamespace::Eip155 => 60,
            ChainNamespace::Bip122 => 0,
        }
    }
}

impl fmt::Display for ChainNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChainNamespace {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eip155" => Ok(ChainNamespace::Eip155),
            "bip122" => Ok(ChainNamespace::Bip122),
            other => Err(CoreError::InvalidChainId(format!(
                "unknown namespace '{other}'"
            ))),
        }
    }
}

/// A CAIP-2 chain identifier: `{namespace}:{reference}`,
/// e.g. `eip155:1` (Ethereum mainnet) or
/// `bip122:000000000019d6689c085ae165831e93` (Bitcoin mainnet).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainId {
    pub namespace: ChainNamespace,
    pub reference: String,
}

/// Genesis-hash reference for Bitcoin mainnet (CAIP-2 truncates to 32 chars).
const BITCOIN_MAINNET_REFERENCE: &str = "000000000019d6689c085ae165831e93";

impl ChainId {
    pub fn new(namespace: ChainNamespace, reference: impl Into<String>) -> Self {
        Self {
            namespace,
            reference: reference.into(),
        }
    }

    /// `eip155:1`
    pub fn ethereum_mainnet() -> Self {
        Self::new(ChainNamespace::Eip155, "1")
    }

    /// `bip122:000000000019d6689c085ae165831e93`
    pub fn bitcoin_mainnet() -> Self {
        Self::new(ChainNamespace::Bip122, BITCOIN_MAINNET_REFERENCE)
    }

    pub fn kind(&self) -> ChainKind {
        self.namespace.kind()
    }

    /// The asset id of this chain's native coin (ETH on eip155, BTC on bip122).
    pub fn native_asset_id(&self) -> AssetId {
        AssetId::native(self, self.namespace.native_coin_type())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl FromStr for ChainId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, reference) = s
            .split_once(':')
            .ok_or_else(|| CoreError::InvalidChainId(s.to_string()))?;
        if reference.is_empty()
            || reference.len() > 32
            || !reference
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidChainId(s.to_string()));
        }
        Ok(Self {
            namespace: namespace.parse()?,
            reference: reference.to_string(),
        })
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A CAIP-10 account identifier: `{chain_id}:{public_key}`,
/// e.g. `eip155:1:0xa0b8…` or `bip122:…:xpub6Bi…`.
///
/// EVM public keys are hex and case-insensitive, so they are lowercased to
/// give every account exactly one canonical id. UTXO public keys are base58
/// xpubs where case is significant, so they are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(chain_id: &ChainId, pubkey: &str) -> Self {
        let key = match chain_id.kind() {
            ChainKind::AccountBased => pubkey.to_lowercase(),
            ChainKind::UtxoBased => pubkey.to_string(),
        };
        Self(format!("{chain_id}:{key}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The chain portion of the id.
    pub fn chain_id(&self) -> Result<ChainId, CoreError> {
        let mut parts = self.0.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ns), Some(reference), Some(_)) => {
                format!("{ns}:{reference}").parse()
            }
            _ => Err(CoreError::InvalidAccountId(self.0.clone())),
        }
    }

    /// The public-key portion of the id.
    pub fn pubkey(&self) -> &str {
        self.0.splitn(3, ':').nth(2).unwrap_or("")
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (ns, reference, pubkey) = match (parts.next(), parts.next(), parts.next()) {
            (Some(ns), Some(reference), Some(pubkey)) if !pubkey.is_empty() => {
                (ns, reference, pubkey)
            }
            _ => return Err(CoreError::InvalidAccountId(s.to_string())),
        };
        let chain_id: ChainId = format!("{ns}:{reference}")
            .parse()
            .map_err(|_| CoreError::InvalidAccountId(s.to_string()))?;
        Ok(Self::new(&chain_id, pubkey))
    }
}

/// A CAIP-19 asset identifier: `{chain_id}/{asset_namespace}:{asset_reference}`,
/// e.g. `eip155:1/slip44:60` (ETH) or `eip155:1/erc20:0xc02a…` (WETH).
///
/// ERC-20 contract references are lowercased so the same token always maps to
/// the same id regardless of the checksum casing a data source returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Native-coin asset id from a SLIP-44 coin type.
    pub fn native(chain_id: &ChainId, coin_type: u32) -> Self {
        Self(format!("{chain_id}/slip44:{coin_type}"))
    }

    /// ERC-20 token asset id from a contract address.
    pub fn erc20(chain_id: &ChainId, contract: &str) -> Self {
        Self(format!("{chain_id}/erc20:{}", contract.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The chain portion of the id.
    pub fn chain_id(&self) -> Result<ChainId, CoreError> {
        let (chain, _) = self
            .0
            .split_once('/')
            .ok_or_else(|| CoreError::InvalidAssetId(self.0.clone()))?;
        chain.parse()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chain, asset) = s
            .split_once('/')
            .ok_or_else(|| CoreError::InvalidAssetId(s.to_string()))?;
        let chain_id: ChainId = chain
            .parse()
            .map_err(|_| CoreError::InvalidAssetId(s.to_string()))?;
        match asset.split_once(':') {
            Some(("slip44", coin)) => {
                let coin_type: u32 = coin
                    .parse()
                    .map_err(|_| CoreError::InvalidAssetId(s.to_string()))?;
                Ok(Self::native(&chain_id, coin_type))
            }
            Some(("erc20", contract)) if !contract.is_empty() => {
                Ok(Self::erc20(&chain_id, contract))
            }
            _ => Err(CoreError::InvalidAssetId(s.to_string())),
        }
    }
}
