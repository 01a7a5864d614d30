use log::debug;

use crate::config::IntMatrix;

/// For every option except the last one, the fraction of the total weight that
/// strictly preferred it to the last option.
///
/// The last option is the reference ("no" or status quo). All the fractions are
/// 0 when the total weight is 0.
pub fn compute_percentages(d: &IntMatrix, total_weight: u64) -> Vec<f64> {
    let n = d.size();
    if n == 0 {
        return Vec::new();
    }
    let reference = n - 1;
    if total_weight == 0 {
        return vec![0.0; reference];
    }
    let total = total_weight as f64;
    (0..reference)
        .map(|i| d.get(i, reference) as f64 / total)
        .collect()
}

/// Groups the options by the number of other options they beat in p, most
/// wins first. Options of one group are listed by increasing index.
pub fn rank_p(p: &IntMatrix) -> Vec<Vec<usize>> {
    let n = p.size();
    // An option beats at most n - 1 others: one bucket per possible count.
    let mut by_wins: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        let wins = (0..n)
            .filter(|&j| j != i && p.get(i, j) > p.get(j, i))
            .count();
        by_wins[wins].push(i);
    }
    debug!("rank_p: options by number of wins: {:?}", by_wins);
    by_wins.into_iter().rev().filter(|g| !g.is_empty()).collect()
}
