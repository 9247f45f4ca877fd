//! Seams to the outside world. The controller only ever talks to these traits;
//! browsers, consoles and test recorders provide the implementations.

pub mod render;

pub use render::{ListEntry, MarkerPopup, PanOptions};

use thiserror::Error;
use tokio::sync::oneshot;

use crate::factory::FormInput;
use crate::models::{Coordinates, WorkoutId, WorkoutKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Unable to fetch location: permission denied")]
    Denied,

    #[error("Unable to fetch location")]
    Unavailable,
}

pub type PositionResult = Result<Coordinates, GeolocationError>;

/// Single-shot position lookup. The receiver resolves exactly once; a sender
/// dropped without sending counts as [`GeolocationError::Unavailable`].
pub trait GeolocationProvider: Send {
    fn request_position(&mut self) -> oneshot::Receiver<PositionResult>;
}

pub type SurfaceClickHandler = Box<dyn Fn(Coordinates) + Send + Sync>;

pub trait MapGateway: Send {
    fn initialize(&mut self, center: Coordinates, zoom: u8);
    fn add_marker(&mut self, coordinates: Coordinates, popup: &MarkerPopup);
    fn on_surface_click(&mut self, handler: SurfaceClickHandler);
    fn pan_to(&mut self, coordinates: Coordinates, options: &PanOptions);
}

pub trait ListGateway: Send {
    fn append_entry(&mut self, id: &WorkoutId, entry: &ListEntry);
}

pub trait FormView: Send {
    fn read(&self) -> FormInput;
    /// Reveal the form and focus the distance input.
    fn show(&mut self);
    fn hide(&mut self);
    /// Put the form back into its normal layout after [`FormView::hide`]
    /// pulled it out, without making it visible.
    fn restore_layout(&mut self);
    fn clear(&mut self);
    /// Cadence row for runs, elevation row for rides.
    fn show_fields_for(&mut self, kind: WorkoutKind);
}

/// User-facing, alert-level messages.
pub trait Notifier: Send {
    fn alert(&mut self, message: &str);
}

pub struct Gateways {
    pub map: Box<dyn MapGateway>,
    pub list: Box<dyn ListGateway>,
    pub form: Box<dyn FormView>,
    pub notifier: Box<dyn Notifier>,
}

/// Geolocation provider that always answers with the same result.
#[derive(Debug, Clone)]
pub struct FixedPosition(pub PositionResult);

impl GeolocationProvider for FixedPosition {
    fn request_position(&mut self) -> oneshot::Receiver<PositionResult> {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(self.0);
        rx
    }
}
