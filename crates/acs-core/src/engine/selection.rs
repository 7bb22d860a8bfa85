//! Policies deciding which screened conformers are optimized.
//!
//! The pipeline does not prescribe a screening cutoff; a policy is always supplied
//! by the caller.

use crate::core::models::ids::HashId;

/// A screened conformer offered for selection, with its screening energy (Hartree).
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: HashId,
    pub energy: f64,
}

pub trait SelectionPolicy {
    /// Returns the ids to optimize, in the order they should be added.
    fn select(&self, candidates: &[Candidate]) -> Vec<HashId>;
}

/// Keeps every screened conformer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectAll;

impl SelectionPolicy for SelectAll {
    fn select(&self, candidates: &[Candidate]) -> Vec<HashId> {
        candidates.iter().map(|c| c.id.clone()).collect()
    }
}

/// Keeps the `count` lowest-energy conformers. Ties are broken by hash id so the
/// result does not depend on input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowestEnergies {
    pub count: usize,
}

impl SelectionPolicy for LowestEnergies {
    fn select(&self, candidates: &[Candidate]) -> Vec<HashId> {
        let mut ranked: Vec<&Candidate> = candidates.iter().collect();
        ranked.sort_by(|a, b| a.energy.total_cmp(&b.energy).then_with(|| a.id.cmp(&b.id)));
        ranked
            .into_iter()
            .take(self.count)
            .map(|c| c.id.clone())
            .collect()
    }
}

/// Configurable choice between the provided policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    LowestEnergies { count: usize },
}

impl SelectionPolicy for Selection {
    fn select(&self, candidates: &[Candidate]) -> Vec<HashId> {
        match *self {
            Selection::All => SelectAll.select(candidates),
            Selection::LowestEnergies { count } => LowestEnergies { count }.select(candidates),
        }
    }
}
