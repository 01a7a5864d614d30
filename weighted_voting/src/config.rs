// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::ops::{AddAssign, Index, IndexMut};

/// A ballot in a median voting.
///
/// The voter supports `value` and, implicitly, every smaller value.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct MedianVote {
    /// The voting power of this ballot.
    pub weight: u64,
    pub value: i64,
}

impl MedianVote {
    pub fn new(weight: u64, value: i64) -> MedianVote {
        MedianVote { weight, value }
    }
}

/// A ballot in a Schulze voting.
///
/// `ranking` holds one entry per option: `ranking[i]` is the rank given to
/// option `i`. Smaller values are preferred, equal values mean that the voter
/// has no preference between the two options. For three options where the
/// first and the third are preferred to the second: `[0, 1, 0]`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct SchulzeVote {
    /// The voting power of this ballot.
    pub weight: u64,
    pub ranking: Vec<i64>,
}

impl SchulzeVote {
    pub fn new(weight: u64, ranking: Vec<i64>) -> SchulzeVote {
        SchulzeVote { weight, ranking }
    }
}

/// A square matrix of vote counts, stored row by row.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct IntMatrix {
    size: usize,
    cells: Vec<u64>,
}

impl IntMatrix {
    /// A `size` x `size` matrix filled with zeros.
    pub fn new(size: usize) -> IntMatrix {
        IntMatrix {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Builds a matrix from its rows. Panics if the rows do not form a square.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> IntMatrix {
        let size = rows.len();
        let mut cells: Vec<u64> = Vec::with_capacity(size * size);
        for row in rows {
            assert_eq!(row.len(), size, "IntMatrix::from_rows: matrix is not square");
            cells.extend(row);
        }
        IntMatrix { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> u64 {
        self.cells[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[u64] {
        &self.cells[i * self.size..(i + 1) * self.size]
    }

    pub fn to_rows(&self) -> Vec<Vec<u64>> {
        (0..self.size).map(|i| self.row(i).to_vec()).collect()
    }

    /// Splits the matrix into disjoint mutable bands of `rows_per_band` rows.
    /// Every band is a contiguous slice; band `b` starts at row `b * rows_per_band`.
    pub(crate) fn row_bands_mut(
        &mut self,
        rows_per_band: usize,
    ) -> std::slice::ChunksMut<'_, u64> {
        let band_len = (rows_per_band * self.size).max(1);
        self.cells.chunks_mut(band_len)
    }
}

impl Index<(usize, usize)> for IntMatrix {
    type Output = u64;
    fn index(&self, (i, j): (usize, usize)) -> &u64 {
        &self.cells[i * self.size + j]
    }
}

impl IndexMut<(usize, usize)> for IntMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut u64 {
        &mut self.cells[i * self.size + j]
    }
}

impl AddAssign<&IntMatrix> for IntMatrix {
    fn add_assign(&mut self, rhs: &IntMatrix) {
        assert_eq!(self.size, rhs.size, "IntMatrix: adding matrices of different sizes");
        for (c, r) in self.cells.iter_mut().zip(rhs.cells.iter()) {
            *c += *r;
        }
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct MedianResult {
    /// The greatest value supported by the required majority, 0 if there is none.
    pub value: i64,
    /// The weight that must be strictly exceeded to form a majority.
    pub votes_required: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SchulzeResult {
    /// The weight that must be strictly exceeded to form a majority.
    pub votes_required: u64,
    /// `d[i][j]`: the weight of the ballots that strictly prefer option i to option j.
    pub d: IntMatrix,
    /// `p[i][j]`: the strength of the strongest path from option i to option j.
    pub p: IntMatrix,
    /// The options grouped by rank, best group first.
    /// Options of one group are tied and listed in increasing index order.
    pub ranked: Vec<Vec<usize>>,
    /// For every option except the last one, the fraction of the total weight that
    /// preferred this option to the last option.
    pub percentages: Vec<f64>,
}

impl SchulzeResult {
    /// The options in the first rank group.
    pub fn winners(&self) -> &[usize] {
        self.ranked.first().map(|g| g.as_slice()).unwrap_or(&[])
    }
}

/// Errors that prevent an evaluation from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// A Schulze ballot does not rank every option exactly once.
    RankingLength { expected: usize, actual: usize },
    /// The builder was given a name that is not one of the options.
    UnknownOption(String),
    /// The same option name was registered twice.
    DuplicateOption(String),
    EmptyOptions,
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::RankingLength { expected, actual } => write!(
                f,
                "expected ranking of length {}, got length {}",
                expected, actual
            ),
            VotingErrors::UnknownOption(name) => write!(f, "unknown option {:?}", name),
            VotingErrors::DuplicateOption(name) => write!(f, "duplicate option {:?}", name),
            VotingErrors::EmptyOptions => write!(f, "a Schulze voting needs at least one option"),
        }
    }
}

// ********* Configuration **********

/// How many threads an evaluation may use.
///
/// The results do not depend on this setting, only the running time does.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Parallelism {
    Sequential,
    /// As many workers as the machine reports.
    Available,
    MaxWorkers(u32),
}

impl Parallelism {
    /// The number of workers to use, at least 1.
    pub fn workers(&self) -> usize {
        match self {
            Parallelism::Sequential => 1,
            Parallelism::Available => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Parallelism::MaxWorkers(k) => (*k as usize).max(1),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EvaluationRules {
    pub parallelism: Parallelism,
    /// Ballot batches smaller than this are not split across workers
    /// when building the pairwise matrix.
    pub min_ballots_per_shard: usize,
}

impl EvaluationRules {
    pub const DEFAULT_RULES: EvaluationRules = EvaluationRules {
        parallelism: Parallelism::Available,
        min_ballots_per_shard: 256,
    };

    pub const SEQUENTIAL_RULES: EvaluationRules = EvaluationRules {
        parallelism: Parallelism::Sequential,
        min_ballots_per_shard: 256,
    };
}
