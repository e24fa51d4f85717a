//! Online Welford accumulator for a scalar stream.

/// Running count, mean and sum of squared deviations (`M2`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Welford {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Welford {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate every value of `xs`.
    pub fn from_slice(xs: &[f64]) -> Self {
        let mut w = Self::new();
        for &x in xs {
            w.update(x);
        }
        w
    }

    /// Incorporate one value.
    #[inline]
    pub fn update(&mut self, x: f64) {
        self.count += 1;
        let n = self.count as f64;
        let delta = x - self.mean;
        self.mean += delta / n;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    /// Number of values seen.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Running mean (`0.0` before the first value).
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased variance, `None` if `count < 2`.
    pub fn variance(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        Some((self.m2 / (self.count - 1) as f64).max(0.0))
    }

    /// Standard error of the mean, `sqrt(variance / count)`.
    pub fn standard_error(&self) -> Option<f64> {
        self.variance().map(|v| (v / self.count as f64).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_matches_two_pass() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let w = Welford::from_slice(&xs);
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
        assert_eq!(w.count(), 8);
        assert_relative_eq!(w.mean(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(w.variance().unwrap(), var, epsilon = 1e-12);
        assert_relative_eq!(w.standard_error().unwrap(), (var / 8.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_single_value_has_no_variance() {
        let w = Welford::from_slice(&[3.0]);
        assert_eq!(w.mean(), 3.0);
        assert!(w.variance().is_none());
    }
}
