//! Conflict resolution: turning scored candidate pairs into a 1:1 matching.
//!
//! One test annotation often overlaps several reference annotations (and
//! vice versa). Resolution picks a subset of candidate pairs in which every
//! annotation appears at most once.
//!
//! ```text
//! Candidates             Greedy                 Optimal
//!   r1 ─0.9─ t1            r1 ─0.9─ t1            r1 ─0.8─ t2
//!   r1 ─0.8─ t2            r2        (deleted)    r2 ─0.8─ t1
//!   r2 ─0.8─ t1            t2        (inserted)
//!                          total 0.9              total 1.6
//! ```
//!
//! Greedy is the Bossy et al. procedure and the default; Optimal solves the
//! maximum-weight assignment (Kuhn-Munkres) and is offered for comparison.

use crate::numeric::SCALE;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Strategy for resolving competing candidate pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingStrategy {
    /// Highest score first; accept a pair if neither side is taken.
    #[default]
    Greedy,
    /// Maximum total score over all 1:1 assignments, then greedy fill.
    Optimal,
}

impl MatchingStrategy {
    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MatchingStrategy::Greedy => "Greedy",
            MatchingStrategy::Optimal => "Optimal",
        }
    }
}

/// A scored pair of internal reference/test positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub reference: usize,
    pub test: usize,
    pub score: Decimal,
}

/// Score descending, then reference position, then test position.
fn greedy_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.reference.cmp(&b.reference))
        .then(a.test.cmp(&b.test))
}

/// Select a conflict-free subset of `candidates`.
///
/// The result is in greedy order regardless of strategy.
pub(crate) fn resolve(candidates: &[Candidate], strategy: MatchingStrategy) -> Vec<Candidate> {
    let mut ordered = candidates.to_vec();
    ordered.sort_by(greedy_order);

    let seed = match strategy {
        MatchingStrategy::Greedy => Vec::new(),
        MatchingStrategy::Optimal => optimal_core(&ordered),
    };
    let mut accepted = greedy_fill(&ordered, seed);
    accepted.sort_by(greedy_order);
    accepted
}

/// Walk `ordered` and add every pair whose sides are both still free.
fn greedy_fill(ordered: &[Candidate], seed: Vec<Candidate>) -> Vec<Candidate> {
    let mut used_ref: HashSet<usize> = seed.iter().map(|c| c.reference).collect();
    let mut used_test: HashSet<usize> = seed.iter().map(|c| c.test).collect();
    let mut accepted = seed;

    for candidate in ordered {
        if used_ref.contains(&candidate.reference) || used_test.contains(&candidate.test) {
            continue;
        }
        used_ref.insert(candidate.reference);
        used_test.insert(candidate.test);
        accepted.push(*candidate);
    }
    accepted
}

/// Maximum-weight assignment restricted to candidate pairs.
fn optimal_core(ordered: &[Candidate]) -> Vec<Candidate> {
    if ordered.is_empty() {
        return Vec::new();
    }

    // compress positions to dense row/column indices
    let rows: BTreeMap<usize, usize> = dense_index(ordered.iter().map(|c| c.reference));
    let cols: BTreeMap<usize, usize> = dense_index(ordered.iter().map(|c| c.test));
    let row_ids: Vec<usize> = rows.keys().copied().collect();
    let col_ids: Vec<usize> = cols.keys().copied().collect();

    let mut lookup: HashMap<(usize, usize), Candidate> = HashMap::new();
    let mut weights = vec![vec![0i64; col_ids.len()]; row_ids.len()];
    for c in ordered {
        let (r, k) = (rows[&c.reference], cols[&c.test]);
        weights[r][k] = to_units(c.score);
        lookup.insert((r, k), *c);
    }

    // Kuhn-Munkres wants rows <= columns
    let transposed = row_ids.len() > col_ids.len();
    let cost: Vec<Vec<i64>> = if transposed {
        (0..col_ids.len())
            .map(|k| (0..row_ids.len()).map(|r| -weights[r][k]).collect())
            .collect()
    } else {
        weights
            .iter()
            .map(|row| row.iter().map(|w| -w).collect())
            .collect()
    };

    hungarian(&cost)
        .into_iter()
        .enumerate()
        .filter_map(|(i, j)| {
            let (r, k) = if transposed { (j, i) } else { (i, j) };
            lookup.get(&(r, k)).copied()
        })
        .collect()
}

fn dense_index(ids: impl Iterator<Item = usize>) -> BTreeMap<usize, usize> {
    let mut map: BTreeMap<usize, usize> = ids.map(|id| (id, 0)).collect();
    for (dense, slot) in map.values_mut().enumerate() {
        *slot = dense;
    }
    map
}

/// A quantized score as an exact integer count of `10^-SCALE` units.
fn to_units(score: Decimal) -> i64 {
    let mut scaled = score;
    scaled.rescale(SCALE);
    i64::try_from(scaled.mantissa()).unwrap_or(i64::MAX / 4)
}

/// Minimum-cost assignment of every row to a distinct column.
///
/// Requires `cost.len() <= cost[0].len()`. Returns the column of each row.
/// Classic O(n²m) potentials formulation, on integers so ties are exact.
fn hungarian(cost: &[Vec<i64>]) -> Vec<usize> {
    let n = cost.len();
    let m = cost.first().map_or(0, Vec::len);
    if n == 0 || m == 0 {
        return Vec::new();
    }
    const INF: i64 = i64::MAX / 4;

    // 1-based; column 0 is a virtual column
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; m + 1];
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; m + 1];
        let mut used = vec![false; m + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=m {
        if p[j] != 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn cand(reference: usize, test: usize, score: &str) -> Candidate {
        Candidate {
            reference,
            test,
            score: Decimal::from_str(score).unwrap(),
        }
    }

    fn total(accepted: &[Candidate]) -> Decimal {
        accepted.iter().map(|c| c.score).sum()
    }

    fn assert_one_to_one(accepted: &[Candidate]) {
        let mut refs: Vec<_> = accepted.iter().map(|c| c.reference).collect();
        let mut tests: Vec<_> = accepted.iter().map(|c| c.test).collect();
        refs.sort_unstable();
        tests.sort_unstable();
        refs.dedup();
        tests.dedup();
        assert_eq!(refs.len(), accepted.len());
        assert_eq!(tests.len(), accepted.len());
    }

    #[test]
    fn test_greedy_takes_highest_first() {
        let cands = vec![cand(0, 0, "0.9"), cand(0, 1, "0.8"), cand(1, 0, "0.8")];
        let accepted = resolve(&cands, MatchingStrategy::Greedy);
        assert_eq!(accepted, vec![cand(0, 0, "0.9")]);
    }

    #[test]
    fn test_optimal_maximizes_total() {
        let cands = vec![cand(0, 0, "0.9"), cand(0, 1, "0.8"), cand(1, 0, "0.8")];
        let accepted = resolve(&cands, MatchingStrategy::Optimal);
        assert_one_to_one(&accepted);
        assert_eq!(total(&accepted), Decimal::from_str("1.6").unwrap());
    }

    #[test]
    fn test_greedy_tie_break_by_position() {
        let cands = vec![cand(1, 0, "0.5"), cand(0, 0, "0.5")];
        let accepted = resolve(&cands, MatchingStrategy::Greedy);
        assert_eq!(accepted, vec![cand(0, 0, "0.5")]);
    }

    #[test]
    fn test_zero_score_pairs_still_consume() {
        let cands = vec![cand(0, 0, "0")];
        for strategy in [MatchingStrategy::Greedy, MatchingStrategy::Optimal] {
            assert_eq!(resolve(&cands, strategy).len(), 1, "{:?}", strategy);
        }
    }

    #[test]
    fn test_optimal_more_refs_than_tests() {
        // three refs competing for two tests
        let cands = vec![
            cand(0, 0, "0.6"),
            cand(1, 0, "0.7"),
            cand(1, 1, "0.65"),
            cand(2, 1, "0.1"),
        ];
        let accepted = resolve(&cands, MatchingStrategy::Optimal);
        assert_one_to_one(&accepted);
        assert_eq!(total(&accepted), Decimal::from_str("1.25").unwrap());
    }

    #[test]
    fn test_optimal_never_below_greedy() {
        let cands = vec![
            cand(0, 0, "0.3"),
            cand(0, 1, "0.9"),
            cand(1, 1, "0.95"),
            cand(1, 2, "0.2"),
            cand(2, 2, "0.4"),
            cand(2, 0, "0.1"),
        ];
        let greedy = resolve(&cands, MatchingStrategy::Greedy);
        let optimal = resolve(&cands, MatchingStrategy::Optimal);
        assert_one_to_one(&greedy);
        assert_one_to_one(&optimal);
        assert!(total(&optimal) >= total(&greedy));
    }

    #[test]
    fn test_empty() {
        assert!(resolve(&[], MatchingStrategy::Greedy).is_empty());
        assert!(resolve(&[], MatchingStrategy::Optimal).is_empty());
    }

    #[test]
    fn test_hungarian_small() {
        let cost = vec![vec![4, 1, 3], vec![2, 0, 5], vec![3, 2, 2]];
        let assignment = hungarian(&cost);
        let total: i64 = assignment.iter().enumerate().map(|(i, &j)| cost[i][j]).sum();
        assert_eq!(total, 5);
    }
}
