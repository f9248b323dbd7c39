//! Sequence similarity for near-duplicate detection.
//!
//! Ratio = 2·M / T, where M is the total size of the matching blocks found by
//! recursively taking the longest common block and T is the combined length
//! of both strings (in chars). Result is in [0.0, 1.0]; two empty strings
//! score 1.0.
//!
//! Matches the classic sequence-matcher behaviour, including the "popular
//! element" heuristic: when the second string is at least 200 chars long,
//! chars occurring in it more than `len / 100 + 1` times never seed a match,
//! though a found match may still extend across them. That keeps long lesson
//! bodies from scoring high just because they share spaces and vowels.
//!
//! - `title_similarity` lowercases both sides first.
//! - `body_similarity` compares raw text.

use std::collections::HashMap;

const AUTOJUNK_MIN_LEN: usize = 200;

/// Ratio for titles (case-folded).
pub fn title_similarity(candidate: &str, seen: &str) -> f64 {
    ratio(&candidate.to_lowercase(), &seen.to_lowercase())
}

/// Ratio for full bodies (case-sensitive).
pub fn body_similarity(candidate: &str, seen: &str) -> f64 {
    ratio(candidate, seen)
}

/// Longest-matching-block ratio of `a` against `b`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = Matcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

/// Max ratio of `candidate` against every entry in `window`, plus the entry
/// that produced it. `None` for an empty window.
pub fn best_match<'w, F>(candidate: &str, window: &'w [String], score: F) -> Option<(f64, &'w str)>
where
    F: Fn(&str, &str) -> f64,
{
    window
        .iter()
        .map(|seen| (score(candidate, seen.as_str()), seen.as_str()))
        .fold(None, |best, cur| match best {
            Some((s, _)) if s >= cur.0 => best,
            _ => Some(cur),
        })
}

struct Matcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// char -> ascending positions in `b`, popular chars removed.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> Matcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, idxs| idxs.len() <= ntest);
        }
        Self { a, b, b2j }
    }

    /// Sum of all matching block sizes.
    fn matched_len(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given ranges;
    /// earliest in `a`, then earliest in `b`, on ties.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|p| j2len.get(&p))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }

        // Extend over chars the popular-element pruning hid from b2j.
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }
}
