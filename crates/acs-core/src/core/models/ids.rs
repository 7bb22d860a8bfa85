use super::species::Torsion;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

const HASH_ID_HEX_LEN: usize = 16;

/// Opaque identifier of a conformer within a job's `conformers` mapping.
///
/// Outcome sets reference conformers only through these ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashId(String);

impl HashId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the id of a conformer from the perturbation that generated it.
    ///
    /// The digest covers the species name and the sorted `(torsion, step)` pairs, so
    /// the same perturbation always maps to the same id and conformers produced from
    /// disjoint dihedral subsets never share one.
    pub fn from_perturbation<'a, I>(species_name: &str, perturbation: I) -> Self
    where
        I: IntoIterator<Item = (&'a Torsion, i32)>,
    {
        let mut entries: Vec<(&Torsion, i32)> = perturbation.into_iter().collect();
        entries.sort();

        let mut hasher = Sha256::new();
        hasher.update(species_name.as_bytes());
        for (torsion, step) in entries {
            hasher.update(format!("|{}:{}", torsion, step).as_bytes());
        }
        let digest = format!("{:x}", hasher.finalize());
        Self(digest[..HASH_ID_HEX_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HashId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for HashId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_perturbation_yields_same_id_regardless_of_order() {
        let a = Torsion([1, 2, 3, 4]);
        let b = Torsion([7, 8, 9, 10]);
        let first = HashId::from_perturbation("ethanol", [(&a, 0), (&b, 5)]);
        let second = HashId::from_perturbation("ethanol", [(&b, 5), (&a, 0)]);
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), HASH_ID_HEX_LEN);
    }

    #[test]
    fn different_steps_or_species_yield_different_ids() {
        let a = Torsion([1, 2, 3, 4]);
        let base = HashId::from_perturbation("ethanol", [(&a, 0)]);
        assert_ne!(base, HashId::from_perturbation("ethanol", [(&a, 1)]));
        assert_ne!(base, HashId::from_perturbation("propanol", [(&a, 0)]));
    }

    #[test]
    fn serializes_as_a_plain_string() {
        let id = HashId::new("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
        let back: HashId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(back, id);
    }
}
