use log::debug;
use std::thread;

use crate::config::IntMatrix;

/// Computes the matrix p of the strongest path strengths from the pairwise matrix d.
///
/// There is an edge from option i to option j of strength `d[i][j]` when
/// `d[i][j] > d[j][i]`. `p[i][j]` is the strength of the strongest path from i
/// to j, where the strength of a path is its weakest edge, or 0 without a path.
///
/// The initial edges are filled in by up to `workers` threads, each one owning
/// a disjoint band of rows. The widening that follows is sequential.
pub fn compute_p(d: &IntMatrix, workers: usize) -> IntMatrix {
    let n = d.size();
    let mut p = IntMatrix::new(n);
    let workers = workers.max(1).min(n.max(1));
    let rows_per_band = (n + workers - 1) / workers;
    debug!(
        "compute_p: {} options, {} workers, {} rows per band",
        n, workers, rows_per_band
    );

    if workers == 1 {
        for band in p.row_bands_mut(n) {
            seed_rows(d, band, 0);
        }
    } else {
        thread::scope(|s| {
            for (band_idx, band) in p.row_bands_mut(rows_per_band).enumerate() {
                s.spawn(move || seed_rows(d, band, band_idx * rows_per_band));
            }
        });
    }

    widen(&mut p);
    p
}

// Fills the rows [first_row, first_row + band.len() / n) of p.
fn seed_rows(d: &IntMatrix, band: &mut [u64], first_row: usize) {
    let n = d.size();
    for (offset, row) in band.chunks_mut(n).enumerate() {
        let i = first_row + offset;
        for (j, cell) in row.iter_mut().enumerate() {
            if i != j && d.get(i, j) > d.get(j, i) {
                *cell = d.get(i, j);
            }
        }
    }
}

// Every pass over an intermediate option i reads the values written by the
// previous passes, and cells written earlier in the same pass: the loops must
// stay in this order.
fn widen(p: &mut IntMatrix) {
    let n = p.size();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let to_i = p[(j, i)];
            if to_i == 0 {
                continue;
            }
            for k in 0..n {
                if k == i || k == j {
                    continue;
                }
                let through_i = to_i.min(p[(i, k)]);
                if through_i > p[(j, k)] {
                    p[(j, k)] = through_i;
                }
            }
        }
    }
}
