use super::cipher::KdfParams;
use crate::errors::CoreError;

/// Magic bytes identifying an STKR (Stock Tracker) file.
pub const MAGIC: &[u8; 4] = b"STKR";

/// Current file format version.
pub const CURRENT_VERSION: u16 = 1;

/// Fixed header size in bytes:
/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12) + body_len(8) = 54
pub const HEADER_SIZE: usize = 54;

/// Parsed header of an .stkr file. Everything needed to re-derive the key
/// and authenticate the body travels in the clear here; only the body is
/// encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
    pub body_len: u64,
}

impl FileHeader {
    /// Assemble complete file bytes: this header followed by `body`
    /// (the ciphertext, auth tag included).
    ///
    /// Layout:
    /// ```text
    /// [STKR: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
    /// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [body_len: 8B LE]
    /// [body: variable]
    /// ```
    #[must_use]
    pub fn encode(&self, body: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.memory_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.time_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.parallelism.to_le_bytes());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&(body.len() as u64).to_le_bytes());
        buf.extend_from_slice(body);
        buf
    }

    /// Parse the header from raw file bytes, returning it together with the
    /// body slice. Rejects wrong magic, unknown versions, out-of-range KDF
    /// parameters, and truncated files.
    pub fn decode(data: &[u8]) -> Result<(FileHeader, &[u8]), CoreError> {
        if data.len() < HEADER_SIZE {
            return Err(CoreError::InvalidFileFormat(
                "File too small to be a valid STKR file".into(),
            ));
        }
        if &data[0..4] != MAGIC {
            return Err(CoreError::InvalidFileFormat(
                "Invalid magic bytes — not an STKR file".into(),
            ));
        }

        let mut reader = Reader {
            data,
            offset: 4,
        };
        let version = reader.u16()?;
        if version == 0 || version > CURRENT_VERSION {
            return Err(CoreError::UnsupportedVersion(version));
        }

        let kdf_params = KdfParams {
            memory_cost: reader.u32()?,
            time_cost: reader.u32()?,
            parallelism: reader.u32()?,
        };
        Self::check_kdf_bounds(&kdf_params)?;

        let salt: [u8; 16] = reader.bytes()?;
        let nonce: [u8; 12] = reader.bytes()?;
        let body_len = reader.u64()?;

        let body_start = reader.offset;
        let body_end = body_start + body_len as usize;
        if data.len() < body_end {
            return Err(CoreError::InvalidFileFormat(format!(
                "File truncated: expected {} bytes of body, got {}",
                body_len,
                data.len() - body_start
            )));
        }

        let header = FileHeader {
            version,
            kdf_params,
            salt,
            nonce,
            body_len,
        };
        Ok((header, &data[body_start..body_end]))
    }

    /// Bound the KDF parameters read from a file so a crafted header cannot
    /// drive key derivation into resource exhaustion.
    /// memory_cost: 8 KiB (Argon2 minimum) to 1 GiB; time_cost: 1–20;
    /// parallelism: 1–16.
    fn check_kdf_bounds(params: &KdfParams) -> Result<(), CoreError> {
        if !(8..=1_048_576).contains(&params.memory_cost) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF memory_cost out of safe range: {} KiB (expected 8..1048576)",
                params.memory_cost
            )));
        }
        if !(1..=20).contains(&params.time_cost) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF time_cost out of safe range: {} (expected 1..20)",
                params.time_cost
            )));
        }
        if !(1..=16).contains(&params.parallelism) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF parallelism out of safe range: {} (expected 1..16)",
                params.parallelism
            )));
        }
        Ok(())
    }
}

/// Minimal cursor over the header bytes. Length was checked up front, but
/// every read still validates its slice rather than indexing blindly.
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn u16(&mut self) -> Result<u16, CoreError> {
        Ok(u16::from_le_bytes(self.bytes::<2>()?))
    }

    fn u32(&mut self) -> Result<u32, CoreError> {
        Ok(u32::from_le_bytes(self.bytes::<4>()?))
    }

    fn u64(&mut self) -> Result<u64, CoreError> {
        Ok(u64::from_le_bytes(self.bytes::<8>()?))
    }

    fn bytes<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let end = self.offset + N;
        let slice = self
            .data
            .get(self.offset..end)
            .ok_or_else(|| CoreError::InvalidFileFormat("Header truncated".into()))?;
        self.offset = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }
}
