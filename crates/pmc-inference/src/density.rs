//! Density estimation strategies on a regular grid.
//!
//! A [`DensityEstimator`] turns a sorted sample into a [`DensityGrid`]: equal
//! width cells covering the sample, each carrying a density value. The HDR
//! estimator only ever looks at the grid, so any strategy that produces one
//! can be plugged in.

use pmc_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::estimator::quantile_linear_sorted;
use crate::welford::Welford;

/// `1 / sqrt(2π)`.
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Kernels further than this many bandwidths from a cell are skipped.
const KERNEL_CUTOFF_SIGMAS: f64 = 6.0;

/// Default number of KDE grid cells.
pub const DEFAULT_GRID_POINTS: usize = 512;

/// Upper bound on histogram bins for data-driven rules.
const MAX_BINS: usize = 10_000;

/// Density values on equal-width cells `[lower + i·step, lower + (i+1)·step)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityGrid {
    /// Left edge of cell 0.
    pub lower: f64,
    /// Cell width (> 0).
    pub step: f64,
    /// Non-negative density per cell.
    pub density: Vec<f64>,
}

impl DensityGrid {
    /// Number of cells.
    pub fn len(&self) -> usize {
        self.density.len()
    }

    /// `true` if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.density.is_empty()
    }

    /// Right edge of the last cell.
    pub fn upper(&self) -> f64 {
        self.lower + self.step * self.len() as f64
    }

    /// Left edge of cell `i`.
    #[inline]
    pub fn edge(&self, i: usize) -> f64 {
        self.lower + self.step * i as f64
    }

    /// Midpoint of cell `i`.
    #[inline]
    pub fn center(&self, i: usize) -> f64 {
        self.lower + self.step * (i as f64 + 0.5)
    }

    /// Cell containing `x`; the right edge of the grid belongs to the last cell.
    pub fn cell_of(&self, x: f64) -> Option<usize> {
        if !(x >= self.lower) || self.is_empty() {
            return None;
        }
        let i = ((x - self.lower) / self.step).floor() as usize;
        if i < self.len() {
            return Some(i);
        }
        // Absorb rounding in `lower + step * len` at the right edge.
        (x <= self.upper() + self.step * 1e-9).then(|| self.len() - 1)
    }

    /// Integral of the density over the grid.
    pub fn mass(&self) -> f64 {
        self.density.iter().sum::<f64>() * self.step
    }

    /// Per-cell probability: density rescaled so the cells sum to one.
    pub fn cell_weights(&self) -> Vec<f64> {
        let total: f64 = self.density.iter().sum();
        self.density.iter().map(|&d| d / total).collect()
    }
}

/// A strategy that estimates a density on a grid from a sorted sample.
pub trait DensityEstimator: Send + Sync {
    /// Strategy name for reports and logs.
    fn name(&self) -> &str;

    /// Estimate the density. `sorted` is ascending, finite, and has a
    /// strictly positive range.
    fn estimate(&self, sorted: &[f64]) -> Result<DensityGrid>;
}

fn check_spread(sorted: &[f64]) -> Result<(f64, f64)> {
    let (Some(&lo), Some(&hi)) = (sorted.first(), sorted.last()) else {
        return Err(Error::InsufficientSample { required: 1, got: 0 });
    };
    if !(hi > lo) {
        return Err(Error::Validation(format!(
            "density estimation requires a sample with positive range, got [{lo}, {hi}]"
        )));
    }
    Ok((lo, hi))
}

fn iqr(sorted: &[f64]) -> f64 {
    quantile_linear_sorted(sorted, 0.75) - quantile_linear_sorted(sorted, 0.25)
}

/// KDE bandwidth selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bandwidth {
    /// `0.9 · min(σ, IQR/1.34) · n^(-1/5)`.
    Silverman,
    /// `1.06 · σ · n^(-1/5)`.
    Scott,
    /// Caller-chosen bandwidth.
    Fixed(f64),
}

impl Bandwidth {
    /// Resolve to a concrete bandwidth for `sorted`.
    pub fn select(&self, sorted: &[f64]) -> Result<f64> {
        let n = sorted.len() as f64;
        let sd = Welford::from_slice(sorted).variance().unwrap_or(0.0).sqrt();
        let h = match *self {
            Bandwidth::Fixed(h) => h,
            Bandwidth::Scott => 1.06 * sd * n.powf(-0.2),
            Bandwidth::Silverman => {
                let robust = iqr(sorted) / 1.34;
                let a = if robust > 0.0 { sd.min(robust) } else { sd };
                0.9 * a * n.powf(-0.2)
            }
        };
        if !(h.is_finite() && h > 0.0) {
            return Err(Error::Validation(format!(
                "KDE bandwidth must be finite and > 0, got {h} ({self:?})"
            )));
        }
        Ok(h)
    }
}

/// Gaussian kernel density estimate evaluated at cell centers.
///
/// The grid spans `[min - 3h, max + 3h]` so the tails of the outermost
/// kernels are represented.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianKde {
    /// Bandwidth rule.
    pub bandwidth: Bandwidth,
    /// Number of grid cells.
    pub grid_points: usize,
}

impl Default for GaussianKde {
    fn default() -> Self {
        Self { bandwidth: Bandwidth::Silverman, grid_points: DEFAULT_GRID_POINTS }
    }
}

impl GaussianKde {
    /// KDE with a bandwidth rule and the default grid.
    pub fn new(bandwidth: Bandwidth) -> Self {
        Self { bandwidth, ..Self::default() }
    }
}

impl DensityEstimator for GaussianKde {
    fn name(&self) -> &str {
        "gaussian_kde"
    }

    fn estimate(&self, sorted: &[f64]) -> Result<DensityGrid> {
        use rayon::prelude::*;

        let (lo, hi) = check_spread(sorted)?;
        if self.grid_points < 2 {
            return Err(Error::Validation(format!(
                "KDE grid_points must be >= 2, got {}",
                self.grid_points
            )));
        }
        let h = self.bandwidth.select(sorted)?;
        let lower = lo - 3.0 * h;
        let step = (hi - lo + 6.0 * h) / self.grid_points as f64;
        let inv_h = 1.0 / h;
        let norm = INV_SQRT_2PI * inv_h / sorted.len() as f64;
        let reach = KERNEL_CUTOFF_SIGMAS * h;
        log::debug!(
            "gaussian_kde: n={}, h={h:.6e}, grid=[{lower:.6e}, {:.6e}] x {}",
            sorted.len(),
            lower + step * self.grid_points as f64,
            self.grid_points
        );

        let density: Vec<f64> = (0..self.grid_points)
            .into_par_iter()
            .map(|i| {
                let c = lower + step * (i as f64 + 0.5);
                let a = sorted.partition_point(|&x| x < c - reach);
                let b = sorted.partition_point(|&x| x <= c + reach);
                let s: f64 = sorted[a..b]
                    .iter()
                    .map(|&x| {
                        let z = (c - x) * inv_h;
                        (-0.5 * z * z).exp()
                    })
                    .sum();
                s * norm
            })
            .collect();

        Ok(DensityGrid { lower, step, density })
    }
}

/// Histogram bin-count rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinRule {
    /// Exactly `k` bins.
    Fixed(usize),
    /// `ceil(log2 n) + 1`.
    Sturges,
    /// Bin width `2 · IQR · n^(-1/3)`; falls back to Sturges when IQR is 0.
    FreedmanDiaconis,
}

impl BinRule {
    /// Number of bins for `sorted` (range must be positive).
    pub fn bins(&self, sorted: &[f64]) -> Result<usize> {
        let n = sorted.len();
        let sturges = || (n as f64).log2().ceil() as usize + 1;
        let k = match *self {
            BinRule::Fixed(k) => {
                if k == 0 {
                    return Err(Error::Validation("histogram needs at least 1 bin".to_string()));
                }
                return Ok(k);
            }
            BinRule::Sturges => sturges(),
            BinRule::FreedmanDiaconis => {
                let (lo, hi) = check_spread(sorted)?;
                let width = 2.0 * iqr(sorted) * (n as f64).powf(-1.0 / 3.0);
                if width > 0.0 {
                    ((hi - lo) / width).ceil() as usize
                } else {
                    sturges()
                }
            }
        };
        Ok(k.clamp(1, MAX_BINS))
    }
}

/// Normalized histogram: density `count / (n · width)` per bin over `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin-count rule.
    pub bins: BinRule,
}

impl Default for Histogram {
    fn default() -> Self {
        Self { bins: BinRule::FreedmanDiaconis }
    }
}

impl DensityEstimator for Histogram {
    fn name(&self) -> &str {
        "histogram"
    }

    fn estimate(&self, sorted: &[f64]) -> Result<DensityGrid> {
        let (lo, hi) = check_spread(sorted)?;
        let k = self.bins.bins(sorted)?;
        let step = (hi - lo) / k as f64;
        let mut grid = DensityGrid { lower: lo, step, density: vec![0.0; k] };
        log::debug!("histogram: n={}, bins={k}, width={step:.6e}", sorted.len());

        let w = 1.0 / (sorted.len() as f64 * step);
        for &x in sorted {
            // Values come from [lo, hi], so every one has a cell.
            if let Some(i) = grid.cell_of(x) {
                grid.density[i] += w;
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_of(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn test_cell_of_edges() {
        let g = DensityGrid { lower: 0.0, step: 0.25, density: vec![1.0; 4] };
        assert_eq!(g.cell_of(0.0), Some(0));
        assert_eq!(g.cell_of(0.25), Some(1));
        assert_eq!(g.cell_of(1.0), Some(3));
        assert_eq!(g.cell_of(-0.01), None);
        assert_eq!(g.cell_of(1.01), None);
        assert_relative_eq!(g.center(0), 0.125, epsilon = 1e-12);
        assert_relative_eq!(g.mass(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_histogram_mass_is_one() {
        let xs = grid_of(101);
        for bins in [BinRule::Fixed(7), BinRule::Sturges, BinRule::FreedmanDiaconis] {
            let g = Histogram { bins }.estimate(&xs).unwrap();
            assert_relative_eq!(g.mass(), 1.0, epsilon = 1e-9);
            assert_eq!(g.lower, 0.0);
            assert_relative_eq!(g.upper(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_bin_rules() {
        let xs = grid_of(100);
        assert_eq!(BinRule::Sturges.bins(&xs).unwrap(), 8);
        assert_eq!(BinRule::Fixed(3).bins(&xs).unwrap(), 3);
        assert!(BinRule::Fixed(0).bins(&xs).is_err());
        assert!(BinRule::FreedmanDiaconis.bins(&xs).unwrap() >= 1);
    }

    #[test]
    fn test_kde_mass_close_to_one() {
        let xs = grid_of(200);
        let g = GaussianKde::default().estimate(&xs).unwrap();
        assert_eq!(g.len(), DEFAULT_GRID_POINTS);
        assert_relative_eq!(g.mass(), 1.0, epsilon = 1e-2);
        assert!(g.density.iter().all(|d| *d >= 0.0));
    }

    #[test]
    fn test_bandwidth_rules() {
        let xs = grid_of(100);
        let s = Bandwidth::Silverman.select(&xs).unwrap();
        let c = Bandwidth::Scott.select(&xs).unwrap();
        assert!(s > 0.0 && c > 0.0);
        assert!(s < c);
        assert_eq!(Bandwidth::Fixed(0.3).select(&xs).unwrap(), 0.3);
        assert!(Bandwidth::Fixed(0.0).select(&xs).is_err());
    }

    #[test]
    fn test_zero_range_rejected() {
        let xs = [2.0, 2.0, 2.0];
        assert!(GaussianKde::default().estimate(&xs).is_err());
        assert!(Histogram::default().estimate(&xs).is_err());
    }

    #[test]
    fn test_kde_is_deterministic() {
        let xs = grid_of(300);
        let a = GaussianKde::new(Bandwidth::Scott).estimate(&xs).unwrap();
        let b = GaussianKde::new(Bandwidth::Scott).estimate(&xs).unwrap();
        assert_eq!(a, b);
    }
}
