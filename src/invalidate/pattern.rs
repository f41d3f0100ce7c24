//! Key Pattern Module
//!
//! Glob-style key matching where `*` is the only wildcard and matches any
//! substring, including the empty one. All other characters match
//! literally, and the whole key must match the pattern.

// == Glob Match ==
/// Returns true if `key` matches `pattern`.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();

    // No wildcard: the pattern is an exact key
    if segments.len() == 1 {
        return pattern == key;
    }

    let Some((first, rest)) = segments.split_first() else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        return false;
    };

    if !key.starts_with(first) {
        return false;
    }
    let mut remaining = &key[first.len()..];

    // Middle segments match greedily left-to-right; each `*` absorbs
    // whatever lies between them.
    for segment in middle {
        match remaining.find(segment) {
            Some(idx) => remaining = &remaining[idx + segment.len()..],
            None => return false,
        }
    }

    remaining.ends_with(last)
}
