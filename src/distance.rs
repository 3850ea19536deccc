//! Edit-distance engine
//!
//! Classic Levenshtein distance (insert, delete, substitute; each cost 1)
//! over Unicode scalar values, after trimming and case-folding both inputs.
//! Transpositions are two edits: `distance("Corp", "Crop") == 2`.
//!
//! Edits count `char`s, not UTF-16 code units: a character outside the Basic
//! Multilingual Plane (most emoji) is one edit here where a UTF-16 based
//! metric counts two. No Unicode normalization (NFC/NFD) is applied, so a
//! precomposed `é` and `e` + combining accent are different strings.
//!
//! Cost is O(n·m) time and O(min(n, m)) space. No length cap is applied
//! here; see [`crate::config::InputLimits`] for the caller-side policy.

/// Normalize a name for comparison: trim surrounding whitespace, then
/// lower-case.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Levenshtein distance between the normalized forms of `a` and `b`.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();
    levenshtein_chars(&a, &b, None).unwrap_or(usize::MAX)
}

/// Distance between `a` and `b` if it is at most `max`, otherwise `None`.
///
/// Same result as [`distance`] whenever the true distance is within `max`,
/// but gives up early when the length difference alone exceeds `max` or a
/// whole DP row is already above it.
pub fn distance_within(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();

    // Length difference is a lower bound on edit distance
    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    levenshtein_chars(&a, &b, Some(max))
}

/// Two-row DP over already-normalized characters.
///
/// With `bound = Some(max)` returns `None` as soon as every cell of a row
/// exceeds `max`; row minima never decrease, so the final cell would too.
fn levenshtein_chars(a: &[char], b: &[char], bound: Option<usize>) -> Option<usize> {
    // Keep the shorter string along the row
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return within(long.len(), bound);
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];

        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
            row_min = row_min.min(curr[j + 1]);
        }

        if let Some(max) = bound {
            if row_min > max {
                return None;
            }
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    within(prev[short.len()], bound)
}

fn within(d: usize, bound: Option<usize>) -> Option<usize> {
    match bound {
        Some(max) if d > max => None,
        _ => Some(d),
    }
}
