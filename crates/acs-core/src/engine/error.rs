use thiserror::Error;

use super::classify::Prerequisite;
use super::state::ConformerState;
use crate::core::io::xyz::XyzError;
use crate::core::models::ids::HashId;
use crate::core::models::ledger::Stage;
use crate::core::models::species::Torsion;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Conformer '{0}' not found in this job")]
    UnknownConformer(HashId),

    #[error("Conformer '{0}' already exists in this job")]
    DuplicateConformer(HashId),

    #[error("Conformer '{0}' is not in any outcome set")]
    Unplaced(HashId),

    #[error("Conformer '{id}' cannot move from {from} to {to}")]
    IllegalTransition {
        id: HashId,
        from: ConformerState,
        to: ConformerState,
    },

    #[error("Conformer '{id}' is already {state} and cannot change")]
    Terminal { id: HashId, state: ConformerState },

    #[error("Stage '{stage}' is not enabled for this job (conformer '{id}')")]
    StageNotEnabled { id: HashId, stage: Stage },

    #[error("Conformer '{id}' cannot record '{stage}' now; next stage is {}", describe_next(.expected))]
    StageOutOfOrder {
        id: HashId,
        stage: Stage,
        expected: Option<Stage>,
    },

    #[error("Conformer '{id}' has no '{stage}' energy")]
    MissingEnergy { id: HashId, stage: Stage },

    #[error("Conformer '{id}' cannot be classified: {missing}")]
    MissingPrerequisite { id: HashId, missing: Prerequisite },

    #[error("Non-finite value for '{field}' on conformer '{id}'")]
    NonFinite { id: HashId, field: &'static str },

    #[error("Torsion {torsion} is not declared by the species")]
    UndeclaredTorsion { torsion: Torsion },

    #[error("Invalid geometry for conformer '{id}': {source}")]
    Geometry {
        id: HashId,
        #[source]
        source: XyzError,
    },
}

fn describe_next(expected: &Option<Stage>) -> String {
    match expected {
        Some(stage) => format!("'{}'", stage),
        None => "none (all stages recorded)".to_string(),
    }
}
