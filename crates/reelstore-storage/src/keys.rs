//! Shared key and identifier generation for storage providers.
//!
//! Render output lives at `renders/{render_id}/...`, or at
//! `renders/{expiry}/{render_id}/...` when the render was started with a
//! folder expiry. Deployed sites live at `sites/{site_id}/`.

use crate::lifecycle::FolderExpiry;
use rand::Rng;

pub const RENDERS_PREFIX: &str = "renders";
pub const SITES_PREFIX: &str = "sites";

/// Length of identifiers produced by [`random_hash`]
pub const RANDOM_HASH_LENGTH: usize = 10;

const HASH_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a short random identifier (e.g. a render id).
///
/// Unique enough per render; not suitable for anything secret.
pub fn random_hash() -> String {
    let mut rng = rand::rng();
    (0..RANDOM_HASH_LENGTH)
        .map(|_| HASH_ALPHABET[rng.random_range(0..HASH_ALPHABET.len())] as char)
        .collect()
}

/// Folder that holds the output of one render.
pub fn render_prefix(render_id: &str, expiry: Option<FolderExpiry>) -> String {
    match expiry {
        Some(expiry) => format!("{}{}/", expiry.prefix(), render_id),
        None => format!("{}/{}/", RENDERS_PREFIX, render_id),
    }
}

/// Entry point of a deployed site.
pub fn site_index_key(site_id: &str) -> String {
    format!("{}/{}/index.html", SITES_PREFIX, site_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_hash_shape() {
        let hash = random_hash();
        assert_eq!(hash.len(), RANDOM_HASH_LENGTH);
        assert!(hash
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(random_hash(), random_hash());
    }

    #[test]
    fn render_prefixes() {
        assert_eq!(render_prefix("abc", None), "renders/abc/");
        assert_eq!(
            render_prefix("abc", Some(FolderExpiry::SevenDays)),
            "renders/7-days/abc/"
        );
        assert_eq!(site_index_key("my-site"), "sites/my-site/index.html");
    }
}
