use crate::error::{Result, SurfaceError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root-finding strategy used to invert the pricing formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMethod {
    /// Damped secant seeded by the Brenner-Subrahmanyam approximation
    #[default]
    DampedSecant,
    /// Plain Newton-Raphson using vega as the derivative
    NewtonRaphson,
    /// Bracketed Brent search over the volatility band
    Brent,
}

/// Implied volatility solver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub method: SolverMethod,

    /// Convergence tolerance on successive volatility iterates
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Lower clamp for any volatility iterate
    #[serde(default = "default_vol_min")]
    pub vol_min: f64,

    /// Upper clamp for any volatility iterate
    #[serde(default = "default_vol_max")]
    pub vol_max: f64,

    /// Residual above which secant steps are scaled down
    #[serde(default = "default_residual_threshold")]
    pub residual_threshold: f64,

    /// Floor for the initial volatility seed
    #[serde(default = "default_seed_floor")]
    pub seed_floor: f64,

    /// Seed multiplier when spot is above strike
    #[serde(default = "default_itm_seed_factor")]
    pub itm_seed_factor: f64,

    /// Seed multiplier when spot is below strike
    #[serde(default = "default_otm_seed_factor")]
    pub otm_seed_factor: f64,

    /// Offset between the two secant seeds
    #[serde(default = "default_second_seed_offset")]
    pub second_seed_offset: f64,

    /// Bump applied to the second iterate when the secant slope collapses
    #[serde(default = "default_perturbation")]
    pub perturbation: f64,

    /// Secant denominators below this are treated as zero
    #[serde(default = "default_denominator_floor")]
    pub denominator_floor: f64,

    /// Newton-Raphson gives up below this vega
    #[serde(default = "default_min_vega")]
    pub min_vega: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: SolverMethod::default(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            vol_min: default_vol_min(),
            vol_max: default_vol_max(),
            residual_threshold: default_residual_threshold(),
            seed_floor: default_seed_floor(),
            itm_seed_factor: default_itm_seed_factor(),
            otm_seed_factor: default_otm_seed_factor(),
            second_seed_offset: default_second_seed_offset(),
            perturbation: default_perturbation(),
            denominator_floor: default_denominator_floor(),
            min_vega: default_min_vega(),
        }
    }
}

impl SolverConfig {
    pub fn with_method(mut self, method: SolverMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the volatility clamp band.
    pub fn with_bounds(mut self, vol_min: f64, vol_max: f64) -> Self {
        self.vol_min = vol_min;
        self.vol_max = vol_max;
        self
    }

    /// Rejects settings under which the solvers cannot terminate sensibly.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(SurfaceError::config(format!(
                "tolerance must be > 0, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(SurfaceError::config("max_iterations must be at least 1"));
        }
        if !(self.vol_min > 0.0 && self.vol_min < self.vol_max && self.vol_max.is_finite()) {
            return Err(SurfaceError::config(format!(
                "volatility bounds must satisfy 0 < vol_min < vol_max, got [{}, {}]",
                self.vol_min, self.vol_max
            )));
        }
        if !(self.residual_threshold > 0.0) {
            return Err(SurfaceError::config(format!(
                "residual_threshold must be > 0, got {}",
                self.residual_threshold
            )));
        }
        if !(self.perturbation > 0.0) {
            return Err(SurfaceError::config(format!(
                "perturbation must be > 0, got {}",
                self.perturbation
            )));
        }
        Ok(())
    }
}

/// Main configuration for a surface build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Continuously compounded risk-free rate
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    /// Fewer quotes than this is a top-level error
    #[serde(default = "default_min_quotes")]
    pub min_quotes: usize,

    /// Solve quotes on the rayon pool (needs the `parallel` feature)
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default)]
    pub solver: SolverConfig,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            min_quotes: default_min_quotes(),
            parallel: default_parallel(),
            solver: SolverConfig::default(),
        }
    }
}

impl SurfaceConfig {
    /// Default settings: damped secant, tol 1e-6, 1000 iterations, r = 5%
    pub fn standard() -> Self {
        Self::default()
    }

    /// Tighter tolerance and a larger iteration budget for research use
    pub fn precise() -> Self {
        Self {
            solver: SolverConfig {
                tolerance: 1e-10,
                max_iterations: 5000,
                ..SolverConfig::default()
            },
            ..Self::default()
        }
    }

    /// Loose tolerance for quick previews
    pub fn fast() -> Self {
        Self {
            solver: SolverConfig {
                tolerance: 1e-4,
                max_iterations: 200,
                ..SolverConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SurfaceConfig =
            toml::from_str(s).map_err(|e| SurfaceError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SurfaceError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(SurfaceError::config(format!(
                "risk_free_rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        self.solver.validate()
    }
}

fn default_risk_free_rate() -> f64 {
    0.05
}

fn default_min_quotes() -> usize {
    1
}

fn default_parallel() -> bool {
    true
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_iterations() -> usize {
    1000
}

fn default_vol_min() -> f64 {
    0.01
}

fn default_vol_max() -> f64 {
    5.0
}

fn default_residual_threshold() -> f64 {
    1.0
}

fn default_seed_floor() -> f64 {
    0.01
}

fn default_itm_seed_factor() -> f64 {
    0.8
}

fn default_otm_seed_factor() -> f64 {
    1.2
}

fn default_second_seed_offset() -> f64 {
    0.2
}

fn default_perturbation() -> f64 {
    0.01
}

fn default_denominator_floor() -> f64 {
    1e-10
}

fn default_min_vega() -> f64 {
    1e-10
}
