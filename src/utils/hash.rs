//! Content hashing for revisioned filenames.
//!
//! Uses `blake3` so the same bytes always produce the same name across
//! runs and machines.
//!
//! ```ignore
//! hash::revisioned_name("main.css", css.as_bytes()) // -> "main-3f2a9c01b4.css"
//! ```

use std::path::Path;

/// Hex digits kept from the digest.
pub const HASH_LEN: usize = 10;

/// Short hex fingerprint of `data`.
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    let digest = blake3::hash(data.as_ref());
    let mut hex = hex::encode(&digest.as_bytes()[..HASH_LEN.div_ceil(2)]);
    hex.truncate(HASH_LEN);
    hex
}

/// `name.ext` -> `name-<fingerprint>.ext`.
pub fn revisioned_name<T: AsRef<[u8]> + ?Sized>(file_name: &str, data: &T) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let hash = fingerprint(data);
    match path.extension() {
        Some(ext) => format!("{stem}-{hash}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{hash}"),
    }
}
