//! Reconciliation strategy
//!
//! Creating a goal remotely auto-creates its first journey and, inside it, a
//! first checkpoint holding a navigation step. These pure decision functions
//! encode how those auto-created resources are adopted instead of
//! duplicated. The orchestrator and the preview renderer both go through
//! them, so they can never disagree.

use serde::Serialize;

/// Whether a declared node maps onto an existing remote resource or a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Reuse the auto-created remote resource, renaming/updating as needed
    Adopt,
    /// Create a fresh remote resource
    Create,
}

/// Decide how to materialize the journey at index `journey_idx` of a goal
///
/// Only the first declared journey ever adopts, and only when the remote
/// service actually reports a pre-existing journey.
pub fn journey_decision(journey_idx: usize, existing: usize) -> Decision {
    if journey_idx == 0 && existing > 0 {
        Decision::Adopt
    } else {
        Decision::Create
    }
}

/// Decide how to materialize checkpoint `(journey_idx, checkpoint_idx)`
///
/// Only index (0, 0) adopts - the auto-created navigation checkpoint. Every
/// other position is freshly created even if the remote service reports
/// further pre-existing checkpoints.
pub fn checkpoint_decision(journey_idx: usize, checkpoint_idx: usize) -> Decision {
    if journey_idx == 0 && checkpoint_idx == 0 {
        Decision::Adopt
    } else {
        Decision::Create
    }
}

/// Position at which a freshly created checkpoint is attached to its journey
///
/// Position 1 is reserved for the auto-created navigation checkpoint in the
/// first journey; journeys beyond the first start their own checkpoints at
/// position 2.
pub fn attach_position(journey_idx: usize, checkpoint_idx: usize) -> i32 {
    let base = if journey_idx == 0 { 1 } else { 2 };
    checkpoint_idx as i32 + base
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Adopt => f.write_str("adopt"),
            Decision::Create => f.write_str("create"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_journey_adopts_when_one_exists() {
        assert_eq!(journey_decision(0, 1), Decision::Adopt);
        assert_eq!(journey_decision(0, 3), Decision::Adopt);
    }

    #[test]
    fn test_first_journey_creates_when_none_exist() {
        assert_eq!(journey_decision(0, 0), Decision::Create);
    }

    #[test]
    fn test_later_journeys_always_create() {
        assert_eq!(journey_decision(1, 1), Decision::Create);
        assert_eq!(journey_decision(2, 5), Decision::Create);
    }

    #[test]
    fn test_only_origin_checkpoint_adopts() {
        assert_eq!(checkpoint_decision(0, 0), Decision::Adopt);
        assert_eq!(checkpoint_decision(0, 1), Decision::Create);
        assert_eq!(checkpoint_decision(1, 0), Decision::Create);
        assert_eq!(checkpoint_decision(2, 3), Decision::Create);
    }

    #[test]
    fn test_attach_positions_skip_reserved_slot() {
        // First journey: second declared checkpoint lands at position 2
        assert_eq!(attach_position(0, 1), 2);
        assert_eq!(attach_position(0, 2), 3);
        // Later journeys: first declared checkpoint lands at position 2
        assert_eq!(attach_position(1, 0), 2);
        assert_eq!(attach_position(1, 1), 3);
    }
}
