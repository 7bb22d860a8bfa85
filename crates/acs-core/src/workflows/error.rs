use thiserror::Error;

use crate::core::models::ids::HashId;
use crate::core::models::species::Torsion;
use crate::engine::error::EngineError;

#[derive(Debug, Error, PartialEq)]
pub enum WorkflowError {
    #[error("No partitions to merge")]
    NoPartitions,

    #[error("Dihedral subset {index} is empty")]
    EmptySubset { index: usize },

    #[error("Torsion {torsion} in subset {index} is not declared by the species")]
    UndeclaredTorsion { index: usize, torsion: Torsion },

    #[error("Hash id '{0}' names different perturbations in different partitions")]
    HashIdConflict(HashId),

    #[error("Partitions cannot be merged: {0}")]
    IncompatiblePartitions(String),

    #[error("Engine error: {source}")]
    Engine {
        #[from]
        source: EngineError,
    },
}
