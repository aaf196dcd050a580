use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::RefCell;
use std::num::NonZeroUsize;

/// Upper bound on a grouping key, in characters.
pub const MAX_KEY_CHARS: usize = 200;

static RE_UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});

static RE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{5,}\b").unwrap());

static RE_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}[T\s]\d{2}:\d{2}:\d{2}").unwrap()
});

static RE_PATH: Lazy<Regex> = Lazy::new(|| {
    // Segments may already hold earlier placeholders, so an id inside a path
    // collapses into the single path token.
    Regex::new(r"(?x)
        (?:
            (?:/(?:[\w.\-]|<UUID>|<ID>|<TIMESTAMP>)+){2,}
          | [A-Za-z]:\\(?:[\w.\-\\]|<UUID>|<ID>|<TIMESTAMP>)+
        )
    ").unwrap()
});

thread_local! {
    static KEY_CACHE: RefCell<lru::LruCache<String, String>> = RefCell::new(
        lru::LruCache::new(NonZeroUsize::new(4096).unwrap())
    );
}

/// Grouping key for a message: volatile ids, timestamps and paths replaced by
/// fixed placeholders, bounded to [`MAX_KEY_CHARS`]. Applying it to its own
/// output returns the same key.
///
/// Keys are memoized in a per-thread LRU that outlives any one analyzer. The
/// cache only maps a message to its pure rewrite, so a hit and a miss always
/// return the same key and no analysis can observe another through it.
pub fn normalize(message: &str) -> String {
    if let Some(hit) = KEY_CACHE.with(|c| c.borrow_mut().get(message).cloned()) {
        return hit;
    }
    let key = rewrite(message);
    KEY_CACHE.with(|c| {
        c.borrow_mut().put(message.to_string(), key.clone());
    });
    key
}

fn rewrite(message: &str) -> String {
    // Order matters: UUIDs before bare ids, everything before paths.
    let s = RE_UUID.replace_all(message, "<UUID>");
    let s = RE_ID.replace_all(&s, "<ID>");
    let s = RE_TIMESTAMP.replace_all(&s, "<TIMESTAMP>");
    let s = RE_PATH.replace_all(&s, "<PATH>");
    // A drive path can swallow the letter that glued a digit run to it
    // ("12345C:\\..."); mask the freed run so the key stays a fixed point.
    let s = RE_ID.replace_all(&s, "<ID>");
    truncate_key(&s)
}

fn truncate_key(s: &str) -> String {
    match s.char_indices().nth(MAX_KEY_CHARS) {
        None => s.to_string(),
        // A digit run cut at the boundary becomes standalone; mask it now so a
        // second pass has nothing left to rewrite.
        Some((cut, _)) => RE_ID.replace_all(&s[..cut], "<ID>").into_owned(),
    }
}
