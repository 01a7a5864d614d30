/*!
Tallying of weighted votings for committees.

Two procedures are supported:

- the **median** procedure, for votings about an amount: every voter names
  the highest amount they support, and the greatest amount supported by the
  required majority wins;
- the **Schulze** method, for votings between options: every voter ranks the
  options, ties allowed, and the options are ranked by their strongest paths
  in the graph of pairwise victories.

Every ballot carries a weight, so a voter may represent more than one vote.

```
use weighted_voting::*;

let votes = vec![
    MedianVote::new(4, 200),
    MedianVote::new(3, 1000),
    MedianVote::new(2, 700),
    MedianVote::new(2, 500),
];
let res = evaluate_median(&votes, 0.5);
assert_eq!(res.votes_required, 5);
assert_eq!(res.value, 500);

// Three options, the last one being "no".
let votes = vec![
    SchulzeVote::new(2, vec![0, 1, 2]),
    SchulzeVote::new(1, vec![1, 0, 2]),
];
let res = evaluate_schulze(&votes, 3, 0.5)?;
assert_eq!(res.ranked, vec![vec![0], vec![1], vec![2]]);
assert_eq!(res.percentages, vec![1.0, 1.0]);
# Ok::<(), VotingErrors>(())
```

The evaluations are pure functions: the same ballots always give the same
result, whatever the [`Parallelism`] used.
*/

pub mod builder;
mod config;
pub mod manual;
mod median;
pub mod pairwise;
pub mod ranking;
pub mod strongest_path;

use log::{debug, info};
use std::thread;

pub use crate::config::*;
pub use crate::median::{evaluate_median, votes_required};

/// Evaluates a Schulze voting with the default rules.
///
/// Arguments:
/// * `votes` the ballots. Every ranking must have length `n`.
/// * `n` the number of options. The last option is the reference option for
///   the percentages.
/// * `percent_required` the majority, strictly between 0 and 1.
pub fn evaluate_schulze(
    votes: &[SchulzeVote],
    n: usize,
    percent_required: f64,
) -> Result<SchulzeResult, VotingErrors> {
    evaluate_schulze_with_rules(votes, n, percent_required, &EvaluationRules::DEFAULT_RULES)
}

/// Evaluates a Schulze voting.
///
/// Fails only if the length of a ranking is not `n`.
pub fn evaluate_schulze_with_rules(
    votes: &[SchulzeVote],
    n: usize,
    percent_required: f64,
    rules: &EvaluationRules,
) -> Result<SchulzeResult, VotingErrors> {
    let total_weight = pairwise::check_rankings(votes, n)?;
    let votes_required = votes_required(total_weight, percent_required);
    let workers = rules.parallelism.workers();
    info!(
        "Processing {} Schulze ballots, {} options, total weight {}, votes required {}",
        votes.len(),
        n,
        total_weight,
        votes_required
    );

    let d = pairwise::compute_d_checked(votes, n, workers, rules.min_ballots_per_shard);
    debug!("evaluate_schulze: d: {:?}", d.to_rows());

    // Both only read d.
    let (p, percentages) = if workers > 1 {
        thread::scope(|s| {
            let p_handle = s.spawn(|| strongest_path::compute_p(&d, workers));
            let percentages = ranking::compute_percentages(&d, total_weight);
            let p = p_handle
                .join()
                .unwrap_or_else(|e| std::panic::resume_unwind(e));
            (p, percentages)
        })
    } else {
        (
            strongest_path::compute_p(&d, 1),
            ranking::compute_percentages(&d, total_weight),
        )
    };
    debug!("evaluate_schulze: p: {:?}", p.to_rows());

    let ranked = ranking::rank_p(&p);
    info!("Schulze ranking: {:?}", ranked);
    Ok(SchulzeResult {
        votes_required,
        d,
        p,
        ranked,
        percentages,
    })
}
