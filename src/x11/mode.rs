//! Decomposition modes and the operator set each one induces.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How trend, seasonal and irregular components combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecompositionMode {
    /// Y = T + S + I.
    Additive,
    /// Y = T · S · I.
    #[default]
    Multiplicative,
    /// log Y = T + S + I, decomposed additively in log space.
    LogAdditive,
    /// Y = T · (S + I − 1), for series with values close to zero.
    PseudoAdditive,
}

impl DecompositionMode {
    /// Whether input values must be strictly positive.
    pub fn requires_positive(self) -> bool {
        matches!(
            self,
            DecompositionMode::Multiplicative | DecompositionMode::LogAdditive
        )
    }

    /// Operator set used by the filtering steps.
    ///
    /// Log-additive series are filtered additively after the log transform.
    pub fn ops(self) -> ModeOps {
        let arithmetic = match self {
            DecompositionMode::Additive | DecompositionMode::LogAdditive => Arithmetic::Additive,
            DecompositionMode::Multiplicative => Arithmetic::Multiplicative,
            DecompositionMode::PseudoAdditive => Arithmetic::PseudoAdditive,
        };
        ModeOps { arithmetic }
    }
}

impl std::fmt::Display for DecompositionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DecompositionMode::Additive => "additive",
            DecompositionMode::Multiplicative => "multiplicative",
            DecompositionMode::LogAdditive => "log-additive",
            DecompositionMode::PseudoAdditive => "pseudo-additive",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arithmetic {
    Additive,
    Multiplicative,
    PseudoAdditive,
}

/// Mode-dependent arithmetic shared by every step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeOps {
    arithmetic: Arithmetic,
}

impl ModeOps {
    /// Neutral value of seasonal and irregular components.
    pub fn neutral(&self) -> f64 {
        match self.arithmetic {
            Arithmetic::Additive => 0.0,
            Arithmetic::Multiplicative | Arithmetic::PseudoAdditive => 1.0,
        }
    }

    /// Whether components are ratios (and trends must stay positive).
    pub fn is_multiplicative(&self) -> bool {
        self.arithmetic != Arithmetic::Additive
    }

    /// Remove component `b` from `a` (e.g. SI = Y ⊘ T).
    pub fn remove(&self, a: f64, b: f64) -> f64 {
        match self.arithmetic {
            Arithmetic::Additive => a - b,
            Arithmetic::Multiplicative | Arithmetic::PseudoAdditive => a / b,
        }
    }

    /// Rebuild an observation from its components.
    pub fn combine(&self, trend: f64, seasonal: f64, irregular: f64) -> f64 {
        match self.arithmetic {
            Arithmetic::Additive => trend + seasonal + irregular,
            Arithmetic::Multiplicative => trend * seasonal * irregular,
            Arithmetic::PseudoAdditive => trend * (seasonal + irregular - 1.0),
        }
    }

    /// Irregular part of a seasonal-irregular value.
    pub fn irregular_of(&self, si: f64, seasonal: f64) -> f64 {
        match self.arithmetic {
            Arithmetic::Additive => si - seasonal,
            Arithmetic::Multiplicative => si / seasonal,
            Arithmetic::PseudoAdditive => si - seasonal + 1.0,
        }
    }

    /// Seasonally adjust `y`.
    ///
    /// Pseudo-additive adjustment needs the trend, Y − T·(S − 1); without one
    /// it falls back to the ratio Y / S.
    pub fn adjust(&self, y: f64, seasonal: f64, trend: Option<f64>) -> f64 {
        match (self.arithmetic, trend) {
            (Arithmetic::Additive, _) => y - seasonal,
            (Arithmetic::Multiplicative, _) | (Arithmetic::PseudoAdditive, None) => y / seasonal,
            (Arithmetic::PseudoAdditive, Some(t)) => y - t * (seasonal - 1.0),
        }
    }

    /// Centre raw seasonal factors on the neutral element.
    pub fn normalize_by(&self, seasonal: f64, level: f64) -> f64 {
        match self.arithmetic {
            Arithmetic::Additive => seasonal - level,
            Arithmetic::Multiplicative => seasonal / level,
            Arithmetic::PseudoAdditive => seasonal - level + 1.0,
        }
    }

    /// Factor that turns an irregular into its extreme-corrected version.
    pub fn correction_factor(&self, irregular: f64, corrected: f64) -> f64 {
        match self.arithmetic {
            Arithmetic::Additive => irregular - corrected,
            Arithmetic::Multiplicative | Arithmetic::PseudoAdditive => irregular / corrected,
        }
    }

    /// Whether `level` is an unsafe divisor for `normalize_by`.
    pub fn is_degenerate_level(&self, level: f64) -> bool {
        self.arithmetic == Arithmetic::Multiplicative && level.abs() < 1e-12
    }
}
