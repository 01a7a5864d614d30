use log::debug;
use std::cmp::Ordering;
use std::thread;

use crate::config::{IntMatrix, SchulzeVote, VotingErrors};

/// Checks that every ballot ranks exactly `n` options and returns the total weight.
pub fn check_rankings(votes: &[SchulzeVote], n: usize) -> Result<u64, VotingErrors> {
    let mut total_weight: u64 = 0;
    for vote in votes.iter() {
        if vote.ranking.len() != n {
            return Err(VotingErrors::RankingLength {
                expected: n,
                actual: vote.ranking.len(),
            });
        }
        total_weight += vote.weight;
    }
    Ok(total_weight)
}

/// Computes the pairwise matrix d: `d[i][j]` is the weight of all the ballots
/// that strictly prefer option i to option j.
///
/// The ballots are split into at most `workers` shards of at least
/// `min_ballots_per_shard` ballots. Each shard is counted on its own thread and
/// the partial matrices are summed afterwards, so the result does not depend on
/// the number of shards.
pub fn compute_d(
    votes: &[SchulzeVote],
    n: usize,
    workers: usize,
    min_ballots_per_shard: usize,
) -> Result<IntMatrix, VotingErrors> {
    check_rankings(votes, n)?;
    Ok(compute_d_checked(votes, n, workers, min_ballots_per_shard))
}

// Rankings must have been checked already.
pub(crate) fn compute_d_checked(
    votes: &[SchulzeVote],
    n: usize,
    workers: usize,
    min_ballots_per_shard: usize,
) -> IntMatrix {
    let shards = shard_count(votes.len(), workers, min_ballots_per_shard);
    debug!(
        "compute_d: {} ballots, {} options, {} shards",
        votes.len(),
        n,
        shards
    );
    if shards <= 1 {
        return count_preferences(votes, n);
    }

    let shard_len = (votes.len() + shards - 1) / shards;
    let partials: Vec<IntMatrix> = thread::scope(|s| {
        let handles: Vec<_> = votes
            .chunks(shard_len)
            .map(|shard| s.spawn(move || count_preferences(shard, n)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    let mut d = IntMatrix::new(n);
    for partial in partials.iter() {
        d += partial;
    }
    d
}

fn shard_count(num_votes: usize, workers: usize, min_ballots_per_shard: usize) -> usize {
    let by_size = if min_ballots_per_shard == 0 {
        num_votes
    } else {
        num_votes / min_ballots_per_shard
    };
    by_size.min(workers).max(1)
}

fn count_preferences(votes: &[SchulzeVote], n: usize) -> IntMatrix {
    let mut d = IntMatrix::new(n);
    for vote in votes.iter() {
        let w = vote.weight;
        let ranking = &vote.ranking;
        for i in 0..n {
            for j in (i + 1)..n {
                match ranking[i].cmp(&ranking[j]) {
                    Ordering::Less => d[(i, j)] += w,
                    Ordering::Greater => d[(j, i)] += w,
                    Ordering::Equal => {}
                }
            }
        }
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_count_bounds() {
        assert_eq!(shard_count(0, 8, 256), 1);
        assert_eq!(shard_count(1000, 8, 256), 3);
        assert_eq!(shard_count(100_000, 8, 256), 8);
        assert_eq!(shard_count(5, 8, 0), 5);
        assert_eq!(shard_count(5, 1, 0), 1);
    }

    #[test]
    fn indifference_adds_nothing() {
        let votes = vec![SchulzeVote::new(3, vec![1, 1, 0])];
        let d = compute_d(&votes, 3, 1, 1).unwrap();
        assert_eq!(d.to_rows(), vec![vec![0, 0, 0], vec![0, 0, 0], vec![3, 3, 0]]);
    }

    #[test]
    fn wrong_length_is_reported() {
        let votes = vec![
            SchulzeVote::new(1, vec![0, 1, 2]),
            SchulzeVote::new(1, vec![0, 1]),
        ];
        assert_eq!(
            compute_d(&votes, 3, 1, 1),
            Err(VotingErrors::RankingLength {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn shards_sum_up() {
        let votes: Vec<SchulzeVote> = (0..40)
            .map(|i| SchulzeVote::new(i % 5, vec![i as i64 % 3, 1, (i as i64 * 7) % 4]))
            .collect();
        let sequential = compute_d(&votes, 3, 1, 1).unwrap();
        let sharded = compute_d(&votes, 3, 6, 1).unwrap();
        assert_eq!(sequential, sharded);
    }
}
