use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Ordered set of API keys with a rotation cursor.
///
/// Every call to [`CredentialPool::next`] advances the cursor by one (modulo
/// the pool size) *before* returning the key it lands on, so a fresh pool
/// whose cursor starts at 0 hands out index 1 first. The cursor is atomic,
/// which lets a single pool be shared across tasks behind an `Arc`.
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl CredentialPool {
    pub fn new(keys: Vec<String>) -> Self {
        Self::with_cursor(keys, 0)
    }

    /// Build a pool whose cursor starts at `cursor` (reduced modulo the size).
    pub fn with_cursor(keys: Vec<String>, cursor: usize) -> Self {
        let start = if keys.is_empty() {
            0
        } else {
            cursor % keys.len()
        };
        Self {
            keys,
            cursor: AtomicUsize::new(start),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current cursor position without advancing it.
    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Advance the cursor and return the credential at its new position.
    /// Returns `None` only when the pool holds no keys.
    pub fn next(&self) -> Option<(usize, &str)> {
        let len = self.keys.len();
        if len == 0 {
            return None;
        }
        let previous = self
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some((current + 1) % len)
            })
            .unwrap_or_else(|current| current);
        let index = (previous + 1) % len;
        Some((index, self.keys[index].as_str()))
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("len", &self.keys.len())
            .field("cursor", &self.position())
            .finish()
    }
}

/// Shorten a key for display: first four characters plus a length hint.
pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.is_empty() {
        "(empty)".to_string()
    } else if key.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}… ({} chars)", key.chars().count())
    }
}
