//! Highest-density regions.
//!
//! The region is the smallest-measure set holding at least the target
//! probability: every point inside has higher estimated density than every
//! point outside. For a multimodal density it may be a union of disjoint
//! intervals.

use pmc_core::{EmpiricalSample, Error, Result};
use serde::{Deserialize, Serialize};

use crate::density::{DensityEstimator, DensityGrid};

/// One contiguous piece of an HDR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HdrInterval {
    /// Left end.
    pub lower: f64,
    /// Right end.
    pub upper: f64,
    /// Estimated probability mass in this piece.
    pub mass: f64,
}

impl HdrInterval {
    /// Interval width.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// A highest-density region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HdrResult {
    /// Disjoint intervals in ascending order.
    pub intervals: Vec<HdrInterval>,
    /// Boundary level on the grid normalized so cell weights sum to one
    /// (`inf` for a point mass).
    pub cutoff: f64,
    /// Requested probability mass.
    pub target_mass: f64,
    /// Mass of the region under the estimated density.
    pub grid_mass: f64,
    /// Fraction of the sample falling inside the region.
    pub empirical_mass: f64,
    /// Density strategy used.
    pub estimator: String,
}

impl HdrResult {
    /// Whether `x` lies in any interval.
    pub fn contains(&self, x: f64) -> bool {
        self.intervals.iter().any(|iv| iv.lower <= x && x <= iv.upper)
    }

    /// Summed width of all intervals.
    pub fn total_width(&self) -> f64 {
        self.intervals.iter().map(HdrInterval::width).sum()
    }
}

fn check_target(target_mass: f64) -> Result<()> {
    if !(target_mass > 0.0 && target_mass <= 1.0) {
        return Err(Error::InvalidMass(target_mass));
    }
    Ok(())
}

/// Highest-density region holding `target_mass` of the sample's distribution.
///
/// `target_mass` must lie in `(0, 1]`; exactly `1` returns the full sample
/// support. A sample with zero range yields the single point interval.
///
/// Both the estimated density mass and the fraction of sample points inside
/// the region are at least `target_mass`: when the grid reaches the target
/// before the sample does, the next densest cells are added.
pub fn highest_density_region(
    sample: &EmpiricalSample,
    target_mass: f64,
    estimator: &dyn DensityEstimator,
) -> Result<HdrResult> {
    check_target(target_mass)?;
    let sorted = sample.sorted();
    let (lo, hi) = (sorted[0], sorted[sorted.len() - 1]);

    if target_mass == 1.0 || hi == lo {
        return Ok(HdrResult {
            intervals: vec![HdrInterval { lower: lo, upper: hi, mass: 1.0 }],
            cutoff: if hi == lo { f64::INFINITY } else { 0.0 },
            target_mass,
            grid_mass: 1.0,
            empirical_mass: 1.0,
            estimator: estimator.name().to_string(),
        });
    }

    let grid = estimator.estimate(&sorted)?;
    let total = grid.mass();
    if !(total.is_finite() && total > 0.0) {
        return Err(Error::Validation(format!(
            "{} produced a density with total mass {total}",
            estimator.name()
        )));
    }

    let counts = cell_counts(&grid, &sorted);
    let Selection { in_region, cutoff, extended } = select_cells(&grid, &counts, target_mass);
    let intervals = merge_cells(&grid, &in_region, total);
    let grid_mass: f64 = intervals.iter().map(|iv| iv.mass).sum();

    let inside: usize =
        counts.iter().zip(&in_region).filter(|(_, &r)| r).map(|(&c, _)| c).sum();
    let empirical_mass = inside as f64 / sorted.len() as f64;

    if extended > 0 {
        log::debug!(
            "{}: {extended} cell(s) added past grid mass {target_mass} to cover the sample",
            estimator.name()
        );
    }
    if empirical_mass < target_mass - 1e-9 {
        log::warn!(
            "HDR empirical mass {empirical_mass:.6} is short of target {target_mass} ({} cells)",
            grid.len()
        );
    }
    log::debug!(
        "{}: cutoff={cutoff:.6e}, {} interval(s), grid_mass={grid_mass:.6}, empirical_mass={empirical_mass:.6}",
        estimator.name(),
        intervals.len()
    );

    Ok(HdrResult {
        intervals,
        cutoff,
        target_mass,
        grid_mass,
        empirical_mass,
        estimator: estimator.name().to_string(),
    })
}

/// Sample points per grid cell.
fn cell_counts(grid: &DensityGrid, sorted: &[f64]) -> Vec<usize> {
    let mut counts = vec![0; grid.len()];
    for &x in sorted {
        if let Some(i) = grid.cell_of(x) {
            counts[i] += 1;
        }
    }
    counts
}

struct Selection {
    in_region: Vec<bool>,
    cutoff: f64,
    extended: usize,
}

/// Take cells by descending density until both the grid mass and the share
/// of sample points inside reach `target`. Cells tied at the boundary
/// density are taken together.
fn select_cells(grid: &DensityGrid, counts: &[usize], target: f64) -> Selection {
    let weights = grid.cell_weights();
    let n: usize = counts.iter().sum();
    let mut order: Vec<usize> = (0..grid.len()).collect();
    // Descending density; ties resolved by grid index.
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]).then(a.cmp(&b)));

    let mut in_region = vec![false; grid.len()];
    let (mut cum, mut hits) = (0.0, 0usize);
    let mut cutoff = 0.0;
    let mut extended = 0;
    let mut k = 0;
    while k < order.len() {
        let level = weights[order[k]];
        let grid_reached = cum >= target;
        while k < order.len() && weights[order[k]] == level {
            let i = order[k];
            in_region[i] = true;
            cum += weights[i];
            hits += counts[i];
            k += 1;
            if grid_reached {
                extended += 1;
            }
        }
        cutoff = level;
        if cum >= target && hits as f64 / n as f64 >= target {
            break;
        }
    }
    Selection { in_region, cutoff, extended }
}

fn merge_cells(grid: &DensityGrid, in_region: &[bool], total: f64) -> Vec<HdrInterval> {
    let mut out = Vec::new();
    let mut open: Option<(usize, f64)> = None;
    for (i, &inside) in in_region.iter().enumerate() {
        let cell_mass = grid.density[i] / total * grid.step;
        open = match (inside, open) {
            (true, Some((start, mass))) => Some((start, mass + cell_mass)),
            (true, None) => Some((i, cell_mass)),
            (false, Some((start, mass))) => {
                out.push(HdrInterval { lower: grid.edge(start), upper: grid.edge(i), mass });
                None
            }
            (false, None) => None,
        };
    }
    if let Some((start, mass)) = open {
        out.push(HdrInterval { lower: grid.edge(start), upper: grid.upper(), mass });
    }
    out
}
