//! Final classification of optimized conformers.
//!
//! Wells are judged by graph isomorphism against the species, transition states by
//! the number of imaginary (negative) frequencies. Neither check runs here: the
//! isomorphism verdict and the frequencies arrive as data.

use super::state::ConformerState;
use std::fmt;

/// Outcome of an external isomorphism check between the optimized geometry and the
/// species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsomorphismVerdict {
    Isomorphic,
    NotIsomorphic,
    /// No check was run (typical for transition states).
    NotChecked,
}

impl IsomorphismVerdict {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            IsomorphismVerdict::Isomorphic => Some(true),
            IsomorphismVerdict::NotIsomorphic => Some(false),
            IsomorphismVerdict::NotChecked => None,
        }
    }
}

/// Data a classification needs but was not given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    Optimization,
    NegativeFrequencies,
    IsomorphismVerdict,
    DownstreamEnergies,
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Prerequisite::Optimization => "optimization has not finished",
            Prerequisite::NegativeFrequencies => "negative frequencies were not recorded",
            Prerequisite::IsomorphismVerdict => "no isomorphism verdict for a non-TS species",
            Prerequisite::DownstreamEnergies => "required downstream stages are still pending",
        })
    }
}

/// The terminal state of an optimized conformer.
///
/// A transition state is valid iff it has exactly one negative frequency. Any other
/// species is valid iff it is isomorphic to the species graph.
pub fn classify_outcome(
    is_ts: bool,
    verdict: IsomorphismVerdict,
    negative_frequencies: Option<&[f64]>,
) -> Result<ConformerState, Prerequisite> {
    if is_ts {
        let negatives = negative_frequencies.ok_or(Prerequisite::NegativeFrequencies)?;
        return Ok(if negatives.len() == 1 {
            ConformerState::TsValid
        } else {
            ConformerState::Invalid
        });
    }
    match verdict {
        IsomorphismVerdict::Isomorphic => Ok(ConformerState::IsomorphicValid),
        IsomorphismVerdict::NotIsomorphic => Ok(ConformerState::Invalid),
        IsomorphismVerdict::NotChecked => Err(Prerequisite::IsomorphismVerdict),
    }
}

/// The imaginary modes among `frequencies` (cm⁻¹), reported as negative values.
pub fn negative_frequencies(frequencies: &[f64]) -> Vec<f64> {
    frequencies.iter().copied().filter(|&f| f < 0.0).collect()
}
