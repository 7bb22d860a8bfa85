use std::fmt;

/// Where a conformer stands in the pipeline.
///
/// The first four states are in progress; the remaining five are terminal and
/// mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConformerState {
    /// Geometry built from a dihedral perturbation, nothing computed yet.
    Generated,
    /// Initial screening single point recorded.
    Screened,
    /// Chosen for optimization; optimization not finished.
    SelectedForOptimization,
    /// Optimization (and fine optimization, when requested) finished.
    Optimized,
    Colliding,
    Crashing,
    IsomorphicValid,
    TsValid,
    Invalid,
}

impl ConformerState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ConformerState::Colliding
                | ConformerState::Crashing
                | ConformerState::IsomorphicValid
                | ConformerState::TsValid
                | ConformerState::Invalid
        )
    }

    pub fn is_valid(self) -> bool {
        matches!(self, ConformerState::IsomorphicValid | ConformerState::TsValid)
    }

    /// Whether the state machine has an edge from `self` to `next`.
    ///
    /// Side conditions that depend on record contents (no post-optimization single
    /// point before a collision, all downstream energies before classification) are
    /// checked by the lifecycle operations, not here.
    pub fn can_transition_to(self, next: ConformerState) -> bool {
        use ConformerState::*;
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, Crashing) => true,
            (Generated, Screened | Colliding) => true,
            (Screened, SelectedForOptimization) => true,
            (SelectedForOptimization, Optimized) => true,
            (Optimized, Colliding | IsomorphicValid | TsValid | Invalid) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ConformerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConformerState::Generated => "generated",
            ConformerState::Screened => "screened",
            ConformerState::SelectedForOptimization => "selected for optimization",
            ConformerState::Optimized => "optimized",
            ConformerState::Colliding => "colliding",
            ConformerState::Crashing => "crashing",
            ConformerState::IsomorphicValid => "valid (isomorphic)",
            ConformerState::TsValid => "valid (transition state)",
            ConformerState::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::ConformerState::*;
    use super::*;

    const ALL: [ConformerState; 9] = [
        Generated,
        Screened,
        SelectedForOptimization,
        Optimized,
        Colliding,
        Crashing,
        IsomorphicValid,
        TsValid,
        Invalid,
    ];

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn every_in_progress_state_can_crash() {
        for from in ALL.into_iter().filter(|s| !s.is_terminal()) {
            assert!(from.can_transition_to(Crashing));
        }
    }

    #[test]
    fn pipeline_edges_are_allowed() {
        assert!(Generated.can_transition_to(Screened));
        assert!(Generated.can_transition_to(Colliding));
        assert!(Screened.can_transition_to(SelectedForOptimization));
        assert!(SelectedForOptimization.can_transition_to(Optimized));
        assert!(Optimized.can_transition_to(Colliding));
        assert!(Optimized.can_transition_to(IsomorphicValid));
        assert!(Optimized.can_transition_to(TsValid));
        assert!(Optimized.can_transition_to(Invalid));
    }

    #[test]
    fn skipping_stages_is_not_allowed() {
        assert!(!Generated.can_transition_to(Optimized));
        assert!(!Screened.can_transition_to(Colliding));
        assert!(!Screened.can_transition_to(IsomorphicValid));
        assert!(!SelectedForOptimization.can_transition_to(Colliding));
        assert!(!SelectedForOptimization.can_transition_to(Invalid));
        assert!(!Optimized.can_transition_to(Screened));
    }
}
