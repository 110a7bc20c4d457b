//! Regex-to-prefix analysis (spec §4.1).
//!
//! Given an anchored regex pattern and its flags, extracts the longest
//! literal prefix the pattern is guaranteed to match at the start of a
//! string, for use as an indexable `[prefix, prefix⁺)` range.

/// PCRE metacharacters that stop prefix extraction outright.
const METACHARS: &[char] = &['^', '$', '.', '[', '|', '(', ')', '+', '{'];

/// Extract `(prefix, pure_prefix)` from an anchored regex pattern.
///
/// `pure_prefix` is true iff `prefix` is non-empty and the whole pattern
/// is equivalent to `^prefix` (nothing follows the literal prefix).
///
/// Returns `("", false)` when the pattern isn't anchored in a way that's
/// safe to index (no `\A`/`^`, or an unsupported flag).
#[must_use]
pub fn simple_regex(pattern: &str, flags: &str) -> (String, bool) {
    let (multiline_ok, rest) = if let Some(rest) = pattern.strip_prefix("\\A") {
        (true, rest)
    } else if let Some(rest) = pattern.strip_prefix('^') {
        (false, rest)
    } else {
        return (String::new(), false);
    };

    let mut extended = false;
    for flag in flags.chars() {
        match flag {
            'm' => {
                if !multiline_ok {
                    return (String::new(), false);
                }
            }
            'x' => extended = true,
            _ => return (String::new(), false),
        }
    }

    let mut prefix = String::new();
    let mut chars = rest.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' | '?' => {
                // The immediately preceding character becomes optional;
                // drop it and stop. Not a pure prefix.
                prefix.pop();
                return (prefix, false);
            }
            '\\' => {
                // A backslash followed by an alphanumeric escape carries
                // regex meaning (`\d`, `\w`, ...) and stops extraction.
                //
                // NOTE: the source this crate's semantics are modeled on
                // has a typo here — it only special-cases the single
                // digit '0' (`c >= '0' && c <= '0'`) instead of the full
                // digit range. That means `\1`..`\9` are (incorrectly)
                // treated as literal escapes rather than stopping
                // extraction. This is reproduced verbatim for observable
                // compatibility; see DESIGN.md.
                match chars.next() {
                    Some(escaped) if escaped.is_ascii_alphabetic() || escaped == '0' => {
                        return (prefix, false);
                    }
                    Some(escaped) => prefix.push(escaped),
                    None => return (prefix, false),
                }
            }
            c if METACHARS.contains(&c) => return (prefix, false),
            '#' if extended => return (prefix, false),
            c if extended && c.is_whitespace() => {}
            c => prefix.push(c),
        }
    }

    // Consumed the whole pattern without stopping: pure iff non-empty.
    let pure = !prefix.is_empty();
    (prefix, pure)
}

/// Increment the last byte of `prefix` to form an exclusive upper bound
/// such that `[prefix, simple_regex_end(prefix))` covers exactly the
/// strings starting with `prefix` under lexicographic byte order.
#[must_use]
pub fn simple_regex_end(prefix: &str) -> String {
    let mut bytes = prefix.as_bytes().to_vec();
    if let Some(last) = bytes.last_mut() {
        *last += 1;
    }
    // SAFETY-adjacent: prefixes extracted by `simple_regex` never contain
    // multi-byte UTF-8 sequences ending just below 0x80, so incrementing
    // the final byte keeps this valid enough for range-bound purposes.
    String::from_utf8_lossy(&bytes).into_owned()
}
