//! Orthogonal-array-based Latin hypercube sampling in two dimensions.
//!
//! # Construction
//!
//! 1. The orthogonal array is the full factorial `{1..s} x {1..s}` with
//!    `s = ceil(sqrt(n))`, enumerated row-major (`s²` cells).
//! 2. For each column and each level `k`, the cells holding `k` receive the
//!    rank block `(k-1)s + 1 ..= (k-1)s + count` in a random order. Every
//!    column therefore uses each rank in `1..=s²` exactly once.
//! 3. Each rank is jittered by a uniform offset and normalized by the largest
//!    rank of its column: `u = (rank - U) / max_rank`.
//!
//! The sampler over-generates: it always returns `s²` points, and callers
//! that need exactly `n` take a prefix.
//!
//! # Randomness order
//!
//! Column 0 blocks are shuffled first (levels ascending), then column 1,
//! then `s²` pairs of offsets are drawn row-major (x then y per cell).

use super::{check_request, Bounds, Sample, Sampler};
use crate::error::{McError, McResult};
use crate::rng::SimRng;

/// Number of factors (columns) in the array.
pub const FACTORS: usize = 2;

/// Smallest `s` with `s * s >= n`.
#[must_use]
pub fn levels_for(n_samples: usize) -> usize {
    let mut s = (n_samples as f64).sqrt() as usize;
    while s.saturating_mul(s) < n_samples {
        s += 1;
    }
    while s > 0 && (s - 1) * (s - 1) >= n_samples {
        s -= 1;
    }
    s
}

/// One column of the array, and the sample axis it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Column 0, the real axis.
    X,
    /// Column 1, the imaginary axis.
    Y,
}

impl Axis {
    /// Both axes in column order.
    pub const ALL: [Self; FACTORS] = [Self::X, Self::Y];

    /// Column index of this axis.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }
}

/// Full-factorial orthogonal array of strength 2 over two factors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrthogonalArray {
    levels: usize,
    cells: Vec<[usize; FACTORS]>,
}

impl OrthogonalArray {
    /// Array with `levels` levels per factor (`levels²` cells).
    #[must_use]
    pub fn full_factorial(levels: usize) -> Self {
        let cells = (1..=levels)
            .flat_map(|i| (1..=levels).map(move |j| [i, j]))
            .collect();
        Self { levels, cells }
    }

    /// Smallest array with at least `n_samples` cells.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `n_samples == 0`.
    pub fn for_samples(n_samples: usize) -> McResult<Self> {
        if n_samples == 0 {
            return Err(McError::invalid_argument("n_samples must be positive"));
        }
        Ok(Self::full_factorial(levels_for(n_samples)))
    }

    /// Levels per factor (`s`).
    #[must_use]
    pub const fn levels(&self) -> usize {
        self.levels
    }

    /// Number of cells (`s²`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the array has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells as `(row_level, col_level)` pairs in enumeration order.
    #[must_use]
    pub fn cells(&self) -> &[[usize; FACTORS]] {
        &self.cells
    }

    /// Cell indices holding `level` in the column of `axis`, ascending.
    ///
    /// The row-major layout puts level `k` of column 0 in the contiguous run
    /// `(k-1)s .. ks` and level `k` of column 1 at stride `s` from `k-1`.
    /// Levels outside `1..=s` have no members.
    pub fn members(&self, axis: Axis, level: usize) -> impl Iterator<Item = usize> {
        let s = self.levels;
        let count = if (1..=s).contains(&level) { s } else { 0 };
        let (start, step) = match axis {
            Axis::X => (level.saturating_sub(1) * s, 1),
            Axis::Y => (level.saturating_sub(1), s),
        };
        (0..count).map(move |i| start + i * step)
    }

    /// Assign stratified, randomly permuted ranks to every cell and column.
    ///
    /// Runs in `O(s²)`: each level's cells are located arithmetically.
    #[must_use]
    pub fn assign_strata(&self, rng: &mut SimRng) -> StratumAssignment {
        let s = self.levels;
        let mut ranks = [vec![0usize; self.len()], vec![0usize; self.len()]];
        let mut block = Vec::with_capacity(s);

        for axis in Axis::ALL {
            let column_ranks = &mut ranks[axis.index()];
            for k in 1..=s {
                let first = (k - 1) * s + 1;
                block.clear();
                block.extend(first..first + s);
                rng.shuffle(&mut block);

                for (idx, &rank) in self.members(axis, k).zip(&block) {
                    column_ranks[idx] = rank;
                }
            }
        }

        StratumAssignment { ranks }
    }
}

/// Per-cell integer ranks for both columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratumAssignment {
    ranks: [Vec<usize>; FACTORS],
}

impl StratumAssignment {
    /// Ranks of one column, indexed by cell.
    #[must_use]
    pub fn ranks(&self, axis: Axis) -> &[usize] {
        &self.ranks[axis.index()]
    }

    /// Normalizing constant of a column: its largest assigned rank.
    ///
    /// Equals `s²` for a full-factorial array.
    #[must_use]
    pub fn normalizer(&self, axis: Axis) -> usize {
        self.ranks(axis).iter().copied().max().unwrap_or(0)
    }

    /// Jitter every rank into the unit interval.
    ///
    /// Coordinates fall in `((rank - 1) / max, rank / max]`; the upper end is
    /// only reached when the offset draw is exactly zero.
    #[must_use]
    pub fn jitter(&self, rng: &mut SimRng) -> Vec<[f64; FACTORS]> {
        let norms = [
            self.normalizer(Axis::X) as f64,
            self.normalizer(Axis::Y) as f64,
        ];
        (0..self.ranks[0].len())
            .map(|cell| {
                let ox = rng.gen_f64();
                let oy = rng.gen_f64();
                [
                    (self.ranks[0][cell] as f64 - ox) / norms[0],
                    (self.ranks[1][cell] as f64 - oy) / norms[1],
                ]
            })
            .collect()
    }
}

/// Orthogonal-array Latin hypercube sampler.
///
/// # Example
///
/// ```rust
/// use mandelbrot_mc::rng::SimRng;
/// use mandelbrot_mc::sampling::{Bounds, OrthogonalSampler, Sampler};
///
/// let mut rng = SimRng::new(42);
/// // 10 requested points round up to a 4 x 4 array.
/// let sample = OrthogonalSampler.generate(&mut rng, &Bounds::MANDELBROT, 10).unwrap();
/// assert_eq!(sample.len(), 16);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OrthogonalSampler;

impl OrthogonalSampler {
    /// Unit-square points for `n_samples` (returns `s²` points).
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `n_samples == 0`.
    pub fn unit_sample(rng: &mut SimRng, n_samples: usize) -> McResult<Vec<[f64; FACTORS]>> {
        let array = OrthogonalArray::for_samples(n_samples)?;
        let strata = array.assign_strata(rng);
        Ok(strata.jitter(rng))
    }
}

impl Sampler for OrthogonalSampler {
    fn name(&self) -> &'static str {
        "orthogonal"
    }

    fn generate(&self, rng: &mut SimRng, bounds: &Bounds, n_samples: usize) -> McResult<Sample> {
        check_request(bounds, n_samples)?;

        Ok(Self::unit_sample(rng, n_samples)?
            .into_iter()
            .map(|[u, v]| bounds.rescale(u, v))
            .collect())
    }
}
