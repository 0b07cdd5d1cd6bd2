//! Content-addressed result cache with a time-to-live
//!
//! Keys are xxh64 digests over everything that determines a result (input
//! file bytes, mode strings). Entries expire `ttl` after insertion and can be
//! dropped explicitly with [`ResultCache::invalidate`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::{Duration, Instant};

use xxhash_rust::xxh64::Xxh64;

use crate::error::Result;

const KEY_SEED: u64 = 0x6762_6b76_697a;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey(u64);

impl ContentKey {
    pub fn builder() -> ContentKeyBuilder {
        ContentKeyBuilder {
            hasher: Xxh64::new(KEY_SEED),
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

pub struct ContentKeyBuilder {
    hasher: Xxh64,
}

impl ContentKeyBuilder {
    /// Each part is length-prefixed so that ("ab", "c") and ("a", "bc") differ
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.hasher.update(&(data.len() as u64).to_le_bytes());
        self.hasher.update(data);
        self
    }

    pub fn text(self, value: &str) -> Self {
        self.bytes(value.as_bytes())
    }

    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        self.hasher.update(&file.metadata()?.len().to_le_bytes());

        let mut reader = BufReader::new(file);
        let mut buffer = [0u8; 64 * 1024];
        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            self.hasher.update(&buffer[..read]);
        }
        Ok(self)
    }

    pub fn finish(self) -> ContentKey {
        ContentKey(self.hasher.digest())
    }
}

#[derive(Debug)]
pub struct ResultCache<V> {
    ttl: Duration,
    entries: HashMap<ContentKey, (Instant, V)>,
}

impl<V> ResultCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_live(&self, inserted: Instant) -> bool {
        inserted.elapsed() < self.ttl
    }

    pub fn get(&self, key: &ContentKey) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|(inserted, _)| self.is_live(*inserted))
            .map(|(_, value)| value)
    }

    pub fn insert(&mut self, key: ContentKey, value: V) {
        self.entries.insert(key, (Instant::now(), value));
    }

    pub fn invalidate(&mut self, key: &ContentKey) -> Option<V> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, (inserted, _)| inserted.elapsed() < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_key_is_length_prefixed() {
        let a = ContentKey::builder().text("ab").text("c").finish();
        let b = ContentKey::builder().text("a").text("bc").finish();
        assert_ne!(a, b);
        assert_eq!(a, ContentKey::builder().text("ab").text("c").finish());
    }

    #[test]
    fn test_file_key_follows_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, ">g1\nACGT\n").unwrap();
        let first = ContentKey::builder().file(file.path()).unwrap().finish();
        write!(file, "ACGT\n").unwrap();
        let second = ContentKey::builder().file(file.path()).unwrap().finish();
        assert_ne!(first, second);
    }

    #[test]
    fn test_get_insert_invalidate() {
        let mut cache = ResultCache::new(Duration::from_secs(3600));
        let key = ContentKey::builder().text("nucleotide").finish();
        assert!(cache.get(&key).is_none());
        cache.insert(key, vec![1, 2, 3]);
        assert_eq!(cache.get(&key), Some(&vec![1, 2, 3]));
        assert_eq!(cache.invalidate(&key), Some(vec![1, 2, 3]));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_expired_entries_are_hidden_and_purged() {
        let mut cache = ResultCache::new(Duration::ZERO);
        let key = ContentKey::builder().text("x").finish();
        cache.insert(key, "value");
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }
}
