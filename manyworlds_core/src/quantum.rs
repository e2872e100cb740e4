//! The "STATE" half of the engine - amplitudes over one observable's basis.
//!
//! A [`QuantumSystem`] is an immutable, normalized list of
//! `(outcome, amplitude)` pairs. Insertion order is preserved because it
//! fixes the order in which measurement creates child universes.

use crate::error::MultiverseError;
use nalgebra::Complex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance for normalization and definite-state detection.
pub const EPS: f64 = 1e-9;

/// Outcomes below this probability do not get a branch.
pub const NEGLIGIBLE_PROBABILITY: f64 = 1e-12;

/// Complex amplitudes over the outcomes of a single observable.
///
/// Deserialization goes through [`QuantumSystem::new`], so decoded systems
/// are validated and normalized like constructed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSystem", into = "RawSystem")]
pub struct QuantumSystem {
    amplitudes: Vec<(String, Complex<f64>)>,
}

/// Unchecked wire form of a [`QuantumSystem`].
#[derive(Serialize, Deserialize)]
struct RawSystem {
    amplitudes: Vec<(String, Complex<f64>)>,
}

impl TryFrom<RawSystem> for QuantumSystem {
    type Error = MultiverseError;

    fn try_from(raw: RawSystem) -> Result<Self, Self::Error> {
        Self::new(raw.amplitudes)
    }
}

impl From<QuantumSystem> for RawSystem {
    fn from(system: QuantumSystem) -> Self {
        Self {
            amplitudes: system.amplitudes,
        }
    }
}

impl QuantumSystem {
    /// Validates and normalizes an amplitude mapping.
    ///
    /// # Errors
    /// `InvalidState` when the mapping is empty, repeats a label, holds a
    /// non-finite amplitude, or has zero total probability.
    pub fn new<I, S>(amplitudes: I) -> Result<Self, MultiverseError>
    where
        I: IntoIterator<Item = (S, Complex<f64>)>,
        S: Into<String>,
    {
        let mut pairs: Vec<(String, Complex<f64>)> = Vec::new();

        for (label, amp) in amplitudes {
            let label = label.into();
            if !amp.re.is_finite() || !amp.im.is_finite() {
                return Err(MultiverseError::invalid_state(format!(
                    "amplitude for '{}' is not finite",
                    label
                )));
            }
            if pairs.iter().any(|(l, _)| *l == label) {
                return Err(MultiverseError::invalid_state(format!(
                    "duplicate outcome '{}'",
                    label
                )));
            }
            pairs.push((label, amp));
        }

        if pairs.is_empty() {
            return Err(MultiverseError::invalid_state("no outcomes"));
        }

        let norm_sq: f64 = pairs.iter().map(|(_, a)| a.norm_sqr()).sum();
        if norm_sq < EPS {
            return Err(MultiverseError::invalid_state(
                "all amplitudes are zero, cannot normalize",
            ));
        }

        let norm = norm_sq.sqrt();
        for (_, amp) in pairs.iter_mut() {
            *amp /= norm;
        }

        Ok(Self { amplitudes: pairs })
    }

    /// Equal real amplitudes over the given labels.
    pub fn uniform<I, S>(labels: I) -> Result<Self, MultiverseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(labels.into_iter().map(|l| (l, Complex::new(1.0, 0.0))))
    }

    /// A definite state: amplitude 1 on `outcome`, nothing else.
    pub fn definite(outcome: impl Into<String>) -> Self {
        Self {
            amplitudes: vec![(outcome.into(), Complex::new(1.0, 0.0))],
        }
    }

    /// Born probability |a|² of `outcome`, 0 when absent.
    pub fn probability(&self, outcome: &str) -> f64 {
        self.amplitude(outcome).map(|a| a.norm_sqr()).unwrap_or(0.0)
    }

    /// Probabilities of all outcomes in insertion order.
    pub fn probabilities(&self) -> Vec<(&str, f64)> {
        self.amplitudes
            .iter()
            .map(|(label, amp)| (label.as_str(), amp.norm_sqr()))
            .collect()
    }

    /// Amplitude of `outcome`, if it is part of the basis.
    pub fn amplitude(&self, outcome: &str) -> Option<Complex<f64>> {
        self.amplitudes
            .iter()
            .find(|(label, _)| label == outcome)
            .map(|(_, amp)| *amp)
    }

    /// All `(outcome, amplitude)` pairs in insertion order.
    pub fn amplitudes(&self) -> &[(String, Complex<f64>)] {
        &self.amplitudes
    }

    /// Outcome labels in insertion order.
    pub fn outcomes(&self) -> impl Iterator<Item = &str> {
        self.amplitudes.iter().map(|(label, _)| label.as_str())
    }

    /// Number of outcomes in the basis.
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Always false for a constructed system.
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// The single outcome holding all probability, if any.
    pub fn definite_outcome(&self) -> Option<&str> {
        let mut definite = None;

        for (label, amp) in &self.amplitudes {
            let p = amp.norm_sqr();
            if (p - 1.0).abs() < EPS {
                if definite.is_some() {
                    return None;
                }
                definite = Some(label.as_str());
            } else if p > EPS {
                return None;
            }
        }

        definite
    }

    /// True when no superposition remains.
    pub fn is_definite(&self) -> bool {
        self.definite_outcome().is_some()
    }

    /// New system collapsed onto `outcome`, keeping the basis order.
    pub fn collapsed_to(&self, outcome: &str) -> Result<Self, MultiverseError> {
        if self.amplitude(outcome).is_none() {
            return Err(MultiverseError::invalid_state(format!(
                "cannot collapse onto unknown outcome '{}'",
                outcome
            )));
        }

        let amplitudes = self
            .amplitudes
            .iter()
            .map(|(label, _)| {
                let amp = if label == outcome {
                    Complex::new(1.0, 0.0)
                } else {
                    Complex::new(0.0, 0.0)
                };
                (label.clone(), amp)
            })
            .collect();

        Ok(Self { amplitudes })
    }
}

impl fmt::Display for QuantumSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuantumSystem(")?;
        for (i, (label, amp)) in self.amplitudes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let sign = if amp.im >= 0.0 { "+" } else { "-" };
            write!(f, "{}: {:.3}{}{:.3}j", label, amp.re, sign, amp.im.abs())?;
        }
        write!(f, ")")
    }
}
