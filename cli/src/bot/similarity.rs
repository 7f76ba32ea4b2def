//! # String Similarity
//!
//! File: cli/src/bot/similarity.rs
//!
//! Ratcliff/Obershelp "gestalt" similarity: find the longest common block,
//! recurse on the pieces to its left and right, and score `2 * M / T` where
//! `M` is the number of matched characters and `T` the combined length.
//! Used by autocomplete to rank suggestions.
//!

/// Similarity in `0.0..=1.0`. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, k) = longest_match(a, b);
    if k == 0 {
        return 0;
    }
    k + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + k..], &b[j + k..])
}

/// Longest common block as `(start_a, start_b, len)`, earliest on ties.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let k = curr[j + 1];
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_and_empty() {
        assert!(approx(ratio("placement", "placement"), 1.0));
        assert!(approx(ratio("", ""), 1.0));
        assert!(approx(ratio("abc", ""), 0.0));
    }

    #[test]
    fn test_partial_overlap() {
        assert!(approx(ratio("abcd", "bcde"), 0.75));
        // Blocks "ab" and "d" match on either side of the mismatch.
        assert!(approx(ratio("abxd", "abyd"), 0.75));
    }

    #[test]
    fn test_disjoint() {
        assert!(approx(ratio("xyz", "abc"), 0.0));
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let a: Vec<char> = "abab".chars().collect();
        let b: Vec<char> = "ab".chars().collect();
        assert_eq!(longest_match(&a, &b), (0, 0, 2));
    }
}
