//! BLAKE3 file hasher with streaming support.
//!
//! Files are read in fixed-size chunks so memory use stays flat regardless
//! of asset size. The whole content is always hashed: duplicate detection
//! relies on exact byte equality, never on a sample.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// A BLAKE3 digest.
pub type Hash = [u8; 32];

/// Read buffer size used for hashing and comparison.
const BUFFER_SIZE: usize = 64 * 1024;

/// Streaming BLAKE3 hasher.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort in-flight hashing when `flag` is raised.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Hash the entire content of `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read, or if
    /// shutdown is requested mid-read.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            let read = reader
                .read(&mut buffer)
                .map_err(|e| HashError::from_io(path, e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

/// Hex-encode a hash (64 lowercase characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Compare two files byte for byte.
///
/// Used to rule out hash collisions in paranoid mode.
///
/// # Errors
///
/// Returns a [`HashError`] if either file cannot be read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, HashError> {
    let meta_a = std::fs::metadata(a).map_err(|e| HashError::from_io(a, e))?;
    let meta_b = std::fs::metadata(b).map_err(|e| HashError::from_io(b, e))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::with_capacity(
        BUFFER_SIZE,
        File::open(a).map_err(|e| HashError::from_io(a, e))?,
    );
    let mut reader_b = BufReader::with_capacity(
        BUFFER_SIZE,
        File::open(b).map_err(|e| HashError::from_io(b, e))?,
    );
    let mut buf_a = vec![0u8; BUFFER_SIZE];
    let mut buf_b = vec![0u8; BUFFER_SIZE];

    loop {
        let read_a = read_full(&mut reader_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
        let read_b = read_full(&mut reader_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;
        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; short only at EOF.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
