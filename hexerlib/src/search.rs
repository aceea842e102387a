use regex::bytes::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchType {
    Hex(Vec<u8>),
    Ascii(String),
    Regex(String),
}

/// Byte index of the leftmost exact occurrence of `needle` in `haystack`.
///
/// An empty needle only matches an empty haystack (at index 0).
///
/// # Example
/// ```
/// use hexerlib::find_first_occurrence;
///
/// assert_eq!(find_first_occurrence(&[0, 1, 2, 3, 4], &[2, 3]), Some(2));
/// assert_eq!(find_first_occurrence(&[0, 1], &[9]), None);
/// ```
#[must_use]
pub fn find_first_occurrence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return haystack.is_empty().then_some(0);
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Byte index of the first occurrence at or after `from`, wrapping around to the
/// start of the haystack when nothing is found before its end.
#[must_use]
pub fn find_next_occurrence(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return find_first_occurrence(haystack, needle);
    }
    find_first_occurrence(&haystack[from..], needle)
        .map(|idx| idx + from)
        .or_else(|| find_first_occurrence(haystack, needle))
}

/// Searches for a pattern in the haystack.
/// Returns the starting byte indices of all matches.
#[must_use]
pub fn search(haystack: &[u8], search_type: &SearchType) -> Vec<usize> {
    match search_type {
        SearchType::Hex(p) => search_bytes(haystack, p),
        SearchType::Ascii(s) => search_bytes(haystack, s.as_bytes()),
        SearchType::Regex(p) => search_regex(haystack, p),
    }
}

/// Slide window search. Overlapping matches are reported.
fn search_bytes(haystack: &[u8], pattern: &[u8]) -> Vec<usize> {
    let size = pattern.len();
    if size == 0 {
        return vec![];
    }

    haystack
        .windows(size)
        .enumerate()
        .filter(|(_, window)| *window == pattern)
        .map(|(offset, _)| offset)
        .collect()
}

/// Regex search. An invalid pattern gives no matches.
fn search_regex(haystack: &[u8], pattern: &str) -> Vec<usize> {
    let Ok(re) = Regex::new(pattern) else {
        return vec![];
    };

    re.find_iter(haystack).map(|mtch| mtch.start()).collect()
}

/// Parse a hex byte string such as `"DEADBEEF"` into bytes.
/// Returns `None` for an odd number of digits or non-hex characters.
#[must_use]
pub fn parse_str_into_bytes(s: &str) -> Option<Vec<u8>> {
    if s.is_empty() || !s.len().is_multiple_of(2) || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            let pair = &s[i..i + 2];
            if pair.bytes().all(|b| b.is_ascii_hexdigit()) {
                u8::from_str_radix(pair, 16).ok()
            } else {
                None
            }
        })
        .collect()
}
