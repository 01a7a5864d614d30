use log::{debug, info};

use crate::config::{MedianResult, MedianVote};

/// The weight that must be strictly exceeded for a majority of `percent_required`.
///
/// The product is truncated, not rounded: with a total weight of 11 and a simple
/// majority, 5 is returned and 6 votes are needed.
pub fn votes_required(total_weight: u64, percent_required: f64) -> u64 {
    let required = (total_weight as f64 * percent_required).floor();
    if required <= 0.0 {
        0
    } else {
        required as u64
    }
}

/// Evaluates a median voting and returns the greatest value that has the
/// required majority.
///
/// A ballot for a value also supports every smaller value, so the ballots are
/// accumulated from the highest value downwards until their weight strictly
/// exceeds the required votes. The value is 0 if no value reaches a majority,
/// which happens for an empty list of ballots.
///
/// The input slice is left untouched.
pub fn evaluate_median(votes: &[MedianVote], percent_required: f64) -> MedianResult {
    let mut sorted: Vec<&MedianVote> = votes.iter().collect();
    // The relative order of equal values does not change the outcome.
    sorted.sort_unstable_by(|a, b| b.value.cmp(&a.value));

    let total_weight: u64 = votes.iter().map(|v| v.weight).sum();
    let votes_required = votes_required(total_weight, percent_required);
    debug!(
        "evaluate_median: {} ballots, total weight {}, votes required {}",
        votes.len(),
        total_weight,
        votes_required
    );

    let mut weight_so_far: u64 = 0;
    let mut value: i64 = 0;
    for vote in sorted {
        weight_so_far += vote.weight;
        if weight_so_far > votes_required {
            value = vote.value;
            break;
        }
    }
    info!(
        "Median: value {} agreed with more than {} of {} votes",
        value, votes_required, total_weight
    );
    MedianResult {
        value,
        votes_required,
    }
}
