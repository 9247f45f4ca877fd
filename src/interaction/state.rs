//! Interaction state machine.
//!
//! ```text
//! Locating ──position ok──▶ MapReady ──map initialised──▶ Idle
//!    │                                                    │ ▲
//!  failure (stays, records why)            surface click  │ │ accepted
//!                                                         ▼ │
//!                             FormOpen ◀──rejected── Submitting
//!                                 └──────── submit ────────▲
//! ```
//! Transitions are pure; the controller performs the side effects around them.

use serde::Serialize;

use crate::gateways::{GeolocationError, PositionResult};
use crate::models::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum InteractionState {
    /// Waiting for the position. `failure` is set once the lookup has failed;
    /// nothing retries it, so the machine stays here for the session.
    Locating {
        #[serde(skip)]
        failure: Option<GeolocationError>,
    },
    MapReady { center: Coordinates },
    Idle,
    /// `pending` is where the map was clicked; submit uses it, not the form.
    FormOpen { pending: Coordinates },
    Submitting { pending: Coordinates },
}

impl Default for InteractionState {
    fn default() -> Self {
        InteractionState::Locating { failure: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateEvent {
    PositionResolved(PositionResult),
    MapInitialized,
    SurfaceClicked(Coordinates),
    Submit,
    SubmissionRejected,
    SubmissionAccepted,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next state; events that make no sense in the current state
    /// leave it unchanged.
    pub fn apply(self, event: StateEvent) -> Self {
        use InteractionState::*;

        match (self, event) {
            (Locating { .. }, StateEvent::PositionResolved(Ok(center))) => MapReady { center },
            (Locating { .. }, StateEvent::PositionResolved(Err(err))) => Locating {
                failure: Some(err),
            },

            (MapReady { .. }, StateEvent::MapInitialized) => Idle,

            // A second click while the form is open re-targets it.
            (Idle | FormOpen { .. }, StateEvent::SurfaceClicked(pending)) => FormOpen { pending },

            (FormOpen { pending }, StateEvent::Submit) => Submitting { pending },
            (Submitting { pending }, StateEvent::SubmissionRejected) => FormOpen { pending },
            (Submitting { .. }, StateEvent::SubmissionAccepted) => Idle,

            (state, _) => state,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Locating { .. } => "Locating",
            InteractionState::MapReady { .. } => "MapReady",
            InteractionState::Idle => "Idle",
            InteractionState::FormOpen { .. } => "FormOpen",
            InteractionState::Submitting { .. } => "Submitting",
        }
    }

    /// True once the map exists; map-dependent actions are inert before that.
    pub fn has_map(&self) -> bool {
        !matches!(self, InteractionState::Locating { .. })
    }

    pub fn pending_click(&self) -> Option<Coordinates> {
        match *self {
            InteractionState::FormOpen { pending } | InteractionState::Submitting { pending } => {
                Some(pending)
            }
            _ => None,
        }
    }
}
