//! Combinatorial aligner
//!
//! Picks one candidate per library package so that the mean score is maximal
//! while adjacent library packages keep their structural relationship on the
//! app side. All combinations are enumerated with a mixed-radix counter; the
//! enumeration is refused above [`MAX_COMBINATIONS`].

use super::candidates::Candidate;
use super::{MAX_COMBINATIONS, MIN_PARTIAL_MATCHING_SCORE};
use crate::pkg::{relationship, Relationship};
use crate::types::Score;
use tracing::trace;

/// Result of aligning one partition
#[derive(Debug, Clone)]
pub enum AlignOutcome<'a> {
    /// Best consistent assignment. `selection` holds the chosen candidate of
    /// every library package that had one.
    Best {
        score: Score,
        selection: Vec<Candidate<'a>>,
    },
    /// No consistent assignment beats [`MIN_PARTIAL_MATCHING_SCORE`]
    NoImprovement,
    /// The candidate product exceeds [`MAX_COMBINATIONS`]
    TooManyCombinations { combinations: u64 },
}

/// Number of combinations, empty lists counting as one
pub fn combination_count(lists: &[Vec<Candidate<'_>>]) -> u64 {
    lists
        .iter()
        .fold(1u64, |acc, l| acc.saturating_mul(l.len().max(1) as u64))
}

/// Find the best assignment over `lists`.
///
/// `relationships[i]` is the relationship between library packages `i` and
/// `i + 1`. The mean is taken over all lists, empty ones contributing 0.
/// Pairs involving an empty list are not checked. Only assignments strictly
/// better than [`MIN_PARTIAL_MATCHING_SCORE`] and strictly better than the
/// best so far are taken, so the first of equal assignments wins.
pub fn best_alignment<'a>(
    lists: &[Vec<Candidate<'a>>],
    relationships: &[Relationship],
) -> AlignOutcome<'a> {
    debug_assert_eq!(relationships.len(), lists.len().saturating_sub(1));
    if lists.is_empty() {
        return AlignOutcome::NoImprovement;
    }

    let combinations = combination_count(lists);
    if combinations > MAX_COMBINATIONS {
        trace!("More than {} combinations ({}), stop", MAX_COMBINATIONS, combinations);
        return AlignOutcome::TooManyCombinations { combinations };
    }
    trace!("Testing {} combinations", combinations);

    let sizes: Vec<usize> = lists.iter().map(Vec::len).collect();
    let mut counter = vec![0usize; lists.len()];
    let mut best_score = MIN_PARTIAL_MATCHING_SCORE;
    let mut best: Option<Vec<usize>> = None;

    for _ in 0..combinations {
        let sum: Score = lists
            .iter()
            .zip(&counter)
            .filter_map(|(list, &idx)| list.get(idx))
            .map(|c| c.score)
            .sum();
        let score = sum / lists.len() as Score;

        if score > best_score && is_consistent(lists, &counter, relationships) {
            trace!("New highscore {} at {:?}", score, counter);
            best_score = score;
            best = Some(counter.clone());
        }

        // advance the mixed-radix counter, least significant digit last
        for idx in (0..counter.len()).rev() {
            if counter[idx] + 1 < sizes[idx] {
                counter[idx] += 1;
                break;
            }
            counter[idx] = 0;
        }
    }

    match best {
        Some(indices) => AlignOutcome::Best {
            score: best_score,
            selection: lists
                .iter()
                .zip(&indices)
                .filter_map(|(list, &idx)| list.get(idx).copied())
                .collect(),
        },
        None => AlignOutcome::NoImprovement,
    }
}

fn is_consistent(
    lists: &[Vec<Candidate<'_>>],
    counter: &[usize],
    relationships: &[Relationship],
) -> bool {
    (0..lists.len().saturating_sub(1)).all(|i| {
        match (lists[i].get(counter[i]), lists[i + 1].get(counter[i + 1])) {
            (Some(a), Some(b)) => relationships
                .get(i)
                .map_or(true, |expected| relationship(a.package, b.package) == *expected),
            _ => true,
        }
    })
}
