//! Constants of the ciphertext format.

/// The AES block size.
pub const BLOCK_SIZE: usize = 16;

/// Size of the initialization vector that prefixes every message.
pub const IV_SIZE: usize = 16;

/// Size of the HMAC-SHA256 authentication tag that ends every message.
pub const TAG_SIZE: usize = 32;

/// Size of a SHA-256 digest.
pub const HASH_SIZE: usize = 32;

/// The smallest possible message:
/// * IV: 16 bytes,
/// * a single padded block: 16 bytes,
/// * tag: 32 bytes,
/// * Totalling: 16 + 16 + 32 = 64 bytes.
pub const MIN_MESSAGE_SIZE: usize = IV_SIZE + BLOCK_SIZE + TAG_SIZE;

/// Default size of the chunks read by the stream adapters (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Size of the CRC32 prefix used by the asymmetric wrapper.
pub const CRC_SIZE: usize = 4;
