pub use crate::config::*;

use std::collections::HashMap;

/// A builder for Schulze ballots expressed with option names.
///
/// ```
/// pub use weighted_voting::builder::Builder;
/// pub use weighted_voting::EvaluationRules;
/// # use weighted_voting::VotingErrors;
///
/// let mut builder = Builder::new(&EvaluationRules::DEFAULT_RULES)?
///     .options(&["Anna".to_string(), "Bob".to_string(), "No".to_string()])?;
///
/// builder.add_vote_simple(&["Bob".to_string(), "Anna".to_string()])?;
/// // Anna and Bob are tied, both preferred to the other options.
/// builder.add_vote(&[vec!["Anna".to_string(), "Bob".to_string()]], 3)?;
///
/// let res = builder.evaluate(0.5)?;
/// assert_eq!(res.ranked, vec![vec![1], vec![0], vec![2]]);
///
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: EvaluationRules,
    pub(crate) _options: Vec<String>,
    pub(crate) _votes: Vec<SchulzeVote>,
}

impl Builder {
    pub fn new(rules: &EvaluationRules) -> Result<Builder, VotingErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _options: Vec::new(),
            _votes: Vec::new(),
        })
    }

    /// Registers the options of the voting, in order. The last one is the
    /// reference option for the percentages.
    ///
    /// Any vote added before is discarded.
    pub fn options(self, names: &[String]) -> Result<Builder, VotingErrors> {
        if names.is_empty() {
            return Err(VotingErrors::EmptyOptions);
        }
        for (idx, name) in names.iter().enumerate() {
            if names[..idx].contains(name) {
                return Err(VotingErrors::DuplicateOption(name.clone()));
            }
        }
        Ok(Builder {
            _rules: self._rules,
            _options: names.to_vec(),
            _votes: Vec::new(),
        })
    }

    pub fn num_options(&self) -> usize {
        self._options.len()
    }

    /// Adds a strict order of options with weight 1.
    ///
    /// The options that are not named are tied after the named ones.
    pub fn add_vote_simple(&mut self, names: &[String]) -> Result<(), VotingErrors> {
        let tiers: Vec<Vec<String>> = names.iter().map(|n| vec![n.clone()]).collect();
        self.add_vote(&tiers, 1)
    }

    /// Adds a vote with a weight attached to it.
    ///
    /// tiers: the ranking made by the voter, best first. Each tier contains the
    /// options the voter is indifferent between. An empty tier is allowed and
    /// simply skipped. Every option may be named at most once.
    pub fn add_vote(&mut self, tiers: &[Vec<String>], weight: u64) -> Result<(), VotingErrors> {
        let positions: HashMap<&str, usize> = self
            ._options
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();
        let unranked = tiers.len() as i64;
        let mut ranking: Vec<i64> = vec![unranked; self._options.len()];
        let mut seen: Vec<bool> = vec![false; self._options.len()];
        for (rank, tier) in tiers.iter().enumerate() {
            for name in tier {
                let idx = *positions
                    .get(name.as_str())
                    .ok_or_else(|| VotingErrors::UnknownOption(name.clone()))?;
                if seen[idx] {
                    return Err(VotingErrors::DuplicateOption(name.clone()));
                }
                seen[idx] = true;
                ranking[idx] = rank as i64;
            }
        }
        self._votes.push(SchulzeVote::new(weight, ranking));
        Ok(())
    }

    /// Adds a vote given as raw ranks, one per option.
    pub fn add_vote_ranking(&mut self, weight: u64, ranking: Vec<i64>) -> Result<(), VotingErrors> {
        if ranking.len() != self._options.len() {
            return Err(VotingErrors::RankingLength {
                expected: self._options.len(),
                actual: ranking.len(),
            });
        }
        self._votes.push(SchulzeVote::new(weight, ranking));
        Ok(())
    }

    pub fn votes(&self) -> &[SchulzeVote] {
        &self._votes
    }

    pub fn evaluate(&self, percent_required: f64) -> Result<SchulzeResult, VotingErrors> {
        if self._options.is_empty() {
            return Err(VotingErrors::EmptyOptions);
        }
        crate::evaluate_schulze_with_rules(
            &self._votes,
            self._options.len(),
            percent_required,
            &self._rules,
        )
    }
}
