use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;

pub(crate) fn compute_content_hash(content: &str) -> u64 {
    let mut hasher = XxHash64::default();
    content.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_tracks_text() {
        assert_eq!(compute_content_hash("assert a 1"), compute_content_hash("assert a 1"));
        assert_ne!(compute_content_hash("assert a 1"), compute_content_hash("assert a 2"));
    }
}
