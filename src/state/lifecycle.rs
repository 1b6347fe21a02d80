use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    /// Lobby: members can join, leave and configure the room.
    Waiting,
    /// A game is running.
    InProgress,
    /// The game ended; the room only serves the final state.
    Completed,
}

/// Events that can be applied to the room lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    /// Host starts the game from the lobby.
    StartGame,
    /// The last round was finalised.
    FinishGame,
    /// Too few members remain to keep playing.
    AbandonGame,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The status the room was in when the invalid event was received.
    pub from: RoomStatus,
    /// The event that cannot be applied from this status.
    pub event: RoomEvent,
}

/// Errors that can occur when planning a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    AlreadyPending,
    /// The requested transition is not valid from the current status.
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
    /// Status changed since the plan was created.
    StatusMismatch {
        /// Status when plan was created.
        expected: RoomStatus,
        /// Current status.
        actual: RoomStatus,
    },
}

/// Errors that can occur when aborting a planned lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Unique identifier for a planned transition.
pub type PlanId = Uuid;

/// A planned transition that has been validated but not yet applied.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Status the room is currently in.
    pub from: RoomStatus,
    /// Status the room will transition to.
    pub to: RoomStatus,
    /// Event that triggered this transition.
    pub event: RoomEvent,
}

/// Waiting → InProgress → Completed, with plan/apply/abort so asynchronous work can
/// run between validation and commit.
#[derive(Debug, Clone)]
pub struct RoomLifecycle {
    status: RoomStatus,
    pending: Option<Plan>,
}

impl Default for RoomLifecycle {
    fn default() -> Self {
        Self {
            status: RoomStatus::Waiting,
            pending: None,
        }
    }
}

impl RoomLifecycle {
    /// Create a lifecycle in the waiting status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status.
    pub fn status(&self) -> RoomStatus {
        self.status
    }

    /// Whether a transition is waiting to be applied or aborted.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Validate that `event` can be applied and reserve the transition.
    pub fn plan(&mut self, event: RoomEvent) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let next = self
            .compute_transition(event)
            .map_err(PlanError::InvalidTransition)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.status,
            to: next,
            event,
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Apply a planned transition and return the new status.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<RoomStatus, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected,
                got: plan_id,
            });
        }

        if self.status != plan.from {
            return Err(ApplyError::StatusMismatch {
                expected: plan.from,
                actual: self.status,
            });
        }

        self.status = plan.to;

        Ok(self.status)
    }

    /// Plan and apply in one step, for transitions with no asynchronous work in between.
    pub fn transition(&mut self, event: RoomEvent) -> Result<RoomStatus, PlanError> {
        let plan = self.plan(event)?;
        self.status = plan.to;
        self.pending = None;
        Ok(self.status)
    }

    /// Drop a planned transition without applying it.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    fn compute_transition(&self, event: RoomEvent) -> Result<RoomStatus, InvalidTransition> {
        let next = match (self.status, event) {
            (RoomStatus::Waiting, RoomEvent::StartGame) => RoomStatus::InProgress,
            (RoomStatus::InProgress, RoomEvent::FinishGame) => RoomStatus::Completed,
            (RoomStatus::InProgress, RoomEvent::AbandonGame) => RoomStatus::Completed,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_status_is_waiting() {
        let lifecycle = RoomLifecycle::new();
        assert_eq!(lifecycle.status(), RoomStatus::Waiting);
        assert!(!lifecycle.is_pending());
    }

    #[test]
    fn happy_path_reaches_completed() {
        let mut lifecycle = RoomLifecycle::new();
        let plan = lifecycle.plan(RoomEvent::StartGame).unwrap();
        assert_eq!(plan.to, RoomStatus::InProgress);
        assert_eq!(lifecycle.status(), RoomStatus::Waiting);
        assert_eq!(lifecycle.apply(plan.id).unwrap(), RoomStatus::InProgress);
        assert_eq!(
            lifecycle.transition(RoomEvent::FinishGame).unwrap(),
            RoomStatus::Completed
        );
        assert!(!lifecycle.is_pending());
    }

    #[test]
    fn second_plan_is_rejected_while_pending() {
        let mut lifecycle = RoomLifecycle::new();
        lifecycle.plan(RoomEvent::StartGame).unwrap();
        assert!(lifecycle.is_pending());
        assert_eq!(
            lifecycle.plan(RoomEvent::StartGame).unwrap_err(),
            PlanError::AlreadyPending
        );
    }

    #[test]
    fn abort_leaves_status_untouched() {
        let mut lifecycle = RoomLifecycle::new();
        let plan = lifecycle.plan(RoomEvent::StartGame).unwrap();
        lifecycle.abort(plan.id).unwrap();
        assert!(!lifecycle.is_pending());
        assert_eq!(lifecycle.status(), RoomStatus::Waiting);
    }

    #[test]
    fn apply_with_wrong_id_keeps_plan() {
        let mut lifecycle = RoomLifecycle::new();
        let plan = lifecycle.plan(RoomEvent::StartGame).unwrap();
        let err = lifecycle.apply(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApplyError::IdMismatch { .. }));
        assert_eq!(lifecycle.apply(plan.id).unwrap(), RoomStatus::InProgress);
    }

    #[test]
    fn invalid_transition_returns_error() {
        let mut lifecycle = RoomLifecycle::new();
        match lifecycle.plan(RoomEvent::FinishGame).unwrap_err() {
            PlanError::InvalidTransition(invalid) => {
                assert_eq!(invalid.from, RoomStatus::Waiting);
                assert_eq!(invalid.event, RoomEvent::FinishGame);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
