use thiserror::Error;

/// Unified error type for the entire wallet-portfolio-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Identifier parsing ──────────────────────────────────────────
    #[error("Invalid chain id: {0}")]
    InvalidChainId(String),

    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("Invalid asset id: {0}")]
    InvalidAssetId(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No chain adapter registered for chain: {0}")]
    NoAdapter(String),

    #[error("No market data provider available for asset: {0}")]
    NoProvider(String),

    // ── Account data ────────────────────────────────────────────────
    #[error("Account fetch failed for {account}: {message}")]
    AccountFetch {
        account: String,
        message: String,
    },

    #[error("Invalid balance returned for {context}: {value}")]
    InvalidBalance {
        context: String,
        value: String,
    },
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs to prevent
        // API key leakage. reqwest errors often contain full URLs with secrets.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Network(format!("Malformed JSON response: {e}"))
    }
}
