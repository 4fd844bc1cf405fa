use log::debug;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::cipher::{self, KdfParams};
use super::format::{FileHeader, CURRENT_VERSION};

/// High-level storage operations: save/load the portfolio to/from encrypted
/// bytes or files.
///
/// The returned bytes are the caller's to persist — the core never writes
/// storage behind the application's back.
pub struct StorageManager;

impl StorageManager {
    /// Serialize and encrypt a portfolio to portable raw bytes.
    ///
    /// Flow: Portfolio → bincode → AES-256-GCM(Argon2id(password)) → STKR bytes
    pub fn save_to_bytes(portfolio: &Portfolio, password: &str) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(portfolio)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))?;

        let salt = cipher::random_array::<16>()?;
        let nonce = cipher::random_array::<12>()?;
        let kdf_params = KdfParams::default();
        let body = cipher::seal(&plaintext, password, &salt, &nonce, &kdf_params)?;

        let header = FileHeader {
            version: CURRENT_VERSION,
            kdf_params,
            salt,
            nonce,
            body_len: body.len() as u64,
        };
        debug!(
            "Saved portfolio snapshot: {} holdings, {} log entries",
            portfolio.holdings.len(),
            portfolio.log.len()
        );
        Ok(header.encode(&body))
    }

    /// Decrypt and deserialize a portfolio from raw bytes.
    ///
    /// Flow: STKR bytes → parse header → Argon2id(password, salt) →
    /// AES-256-GCM decrypt → bincode → Portfolio
    pub fn load_from_bytes(data: &[u8], password: &str) -> Result<Portfolio, CoreError> {
        let (header, body) = FileHeader::decode(data)?;
        let plaintext = cipher::open(body, password, &header.salt, &header.nonce, &header.kdf_params)?;
        let portfolio: Portfolio = bincode::deserialize(&plaintext).map_err(|e| {
            CoreError::Deserialization(format!("Failed to deserialize portfolio: {e}"))
        })?;
        Ok(portfolio)
    }

    /// Save portfolio to an encrypted file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(
        portfolio: &Portfolio,
        path: &str,
        password: &str,
    ) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(portfolio, password)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load portfolio from an encrypted file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str, password: &str) -> Result<Portfolio, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes, password)
    }
}
