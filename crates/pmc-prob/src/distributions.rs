//! The shipped families as one tagged union.
//!
//! [`Family`] names a family without parameters; `Family::build` turns a
//! parameter vector into a boxed [`Distribution`]. This is what configs
//! and the predictive checker use to re-parameterize a data-generating
//! model per posterior draw.

use std::fmt;
use std::str::FromStr;

use pmc_core::{Distribution, DistributionFamily, Error, Result};
use serde::{Deserialize, Serialize};

use crate::beta::Beta;
use crate::exponential::Exponential;
use crate::gamma::Gamma;
use crate::math::check_arity;
use crate::normal::Normal;
use crate::poisson::Poisson;

/// Built-in distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// `gamma(shape, rate)`
    Gamma,
    /// `beta(a, b)`
    Beta,
    /// `normal(mu, sigma)`
    Normal,
    /// `poisson(lambda)`
    Poisson,
    /// `exponential(rate)`
    Exponential,
}

impl Family {
    /// All built-in families.
    pub const ALL: [Family; 5] =
        [Family::Gamma, Family::Beta, Family::Normal, Family::Poisson, Family::Exponential];

    /// Canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Gamma => "gamma",
            Family::Beta => "beta",
            Family::Normal => "normal",
            Family::Poisson => "poisson",
            Family::Exponential => "exponential",
        }
    }

    /// Parameter names, in `build` order.
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            Family::Gamma => &["shape", "rate"],
            Family::Beta => &["a", "b"],
            Family::Normal => &["mu", "sigma"],
            Family::Poisson => &["lambda"],
            Family::Exponential => &["rate"],
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Family::ALL.into_iter().find(|f| f.as_str() == lower).ok_or_else(|| {
            Error::Validation(format!(
                "unknown distribution family '{s}' (expected one of: gamma, beta, normal, poisson, exponential)"
            ))
        })
    }
}

impl DistributionFamily for Family {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn n_params(&self) -> usize {
        self.param_names().len()
    }

    fn build(&self, params: &[f64]) -> Result<Box<dyn Distribution>> {
        check_arity(self.as_str(), params, self.n_params())?;
        Ok(match self {
            Family::Gamma => Box::new(Gamma::new(params[0], params[1])?),
            Family::Beta => Box::new(Beta::new(params[0], params[1])?),
            Family::Normal => Box::new(Normal::new(params[0], params[1])?),
            Family::Poisson => Box::new(Poisson::new(params[0])?),
            Family::Exponential => Box::new(Exponential::new(params[0])?),
        })
    }
}
