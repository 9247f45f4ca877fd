//! Recording fakes for every gateway, plus fixtures shared by the unit tests.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use tokio::sync::mpsc;

use crate::factory::{FixedClock, FormInput, SequentialIds, WorkoutFactory};
use crate::gateways::{
    FormView, Gateways, ListEntry, ListGateway, MapGateway, MarkerPopup, Notifier, PanOptions,
    SurfaceClickHandler,
};
use crate::interaction::{EventSink, InteractionController, UiEvent};
use crate::models::{Coordinates, WorkoutId, WorkoutKind};
use crate::settings::TrackerSettings;

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    Initialize(Coordinates, u8),
    AddMarker(Coordinates, MarkerPopup),
    PanTo(Coordinates, PanOptions),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCall {
    Show,
    Hide,
    RestoreLayout,
    Clear,
    ShowFieldsFor(WorkoutKind),
}

#[derive(Default)]
struct Recorded {
    map: Vec<MapCall>,
    list: Vec<(WorkoutId, ListEntry)>,
    form: Vec<FormCall>,
    alerts: Vec<String>,
    input: FormInput,
    click_handler: Option<SurfaceClickHandler>,
}

/// One shared log behind all four gateway fakes.
#[derive(Clone, Default)]
pub struct Recorder {
    inner: Arc<Mutex<Recorded>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gateways(&self) -> Gateways {
        Gateways {
            map: Box::new(self.clone()),
            list: Box::new(self.clone()),
            form: Box::new(self.clone()),
            notifier: Box::new(self.clone()),
        }
    }

    pub fn set_input(&self, input: FormInput) {
        self.inner.lock().unwrap().input = input;
    }

    pub fn current_input(&self) -> FormInput {
        self.inner.lock().unwrap().input.clone()
    }

    pub fn map_calls(&self) -> Vec<MapCall> {
        self.inner.lock().unwrap().map.clone()
    }

    pub fn form_calls(&self) -> Vec<FormCall> {
        self.inner.lock().unwrap().form.clone()
    }

    pub fn list_entries(&self) -> Vec<(WorkoutId, ListEntry)> {
        self.inner.lock().unwrap().list.clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.inner.lock().unwrap().alerts.clone()
    }

    pub fn has_click_handler(&self) -> bool {
        self.inner.lock().unwrap().click_handler.is_some()
    }

    /// Fires the registered surface handler, as a user clicking the map would.
    /// Returns false when no handler has been registered yet.
    pub fn click_map(&self, coordinates: Coordinates) -> bool {
        let guard = self.inner.lock().unwrap();
        match guard.click_handler.as_ref() {
            Some(handler) => {
                handler(coordinates);
                true
            }
            None => false,
        }
    }
}

impl MapGateway for Recorder {
    fn initialize(&mut self, center: Coordinates, zoom: u8) {
        self.inner.lock().unwrap().map.push(MapCall::Initialize(center, zoom));
    }

    fn add_marker(&mut self, coordinates: Coordinates, popup: &MarkerPopup) {
        self.inner
            .lock()
            .unwrap()
            .map
            .push(MapCall::AddMarker(coordinates, popup.clone()));
    }

    fn on_surface_click(&mut self, handler: SurfaceClickHandler) {
        self.inner.lock().unwrap().click_handler = Some(handler);
    }

    fn pan_to(&mut self, coordinates: Coordinates, options: &PanOptions) {
        self.inner
            .lock()
            .unwrap()
            .map
            .push(MapCall::PanTo(coordinates, *options));
    }
}

impl ListGateway for Recorder {
    fn append_entry(&mut self, id: &WorkoutId, entry: &ListEntry) {
        self.inner
            .lock()
            .unwrap()
            .list
            .push((id.clone(), entry.clone()));
    }
}

impl FormView for Recorder {
    fn read(&self) -> FormInput {
        self.current_input()
    }

    fn show(&mut self) {
        self.inner.lock().unwrap().form.push(FormCall::Show);
    }

    fn hide(&mut self) {
        self.inner.lock().unwrap().form.push(FormCall::Hide);
    }

    fn restore_layout(&mut self) {
        self.inner.lock().unwrap().form.push(FormCall::RestoreLayout);
    }

    fn clear(&mut self) {
        let mut guard = self.inner.lock().unwrap();
        guard.form.push(FormCall::Clear);
        let kind = std::mem::take(&mut guard.input.kind);
        guard.input = FormInput {
            kind,
            ..FormInput::default()
        };
    }

    fn show_fields_for(&mut self, kind: WorkoutKind) {
        self.inner
            .lock()
            .unwrap()
            .form
            .push(FormCall::ShowFieldsFor(kind));
    }
}

impl Notifier for Recorder {
    fn alert(&mut self, message: &str) {
        self.inner.lock().unwrap().alerts.push(message.to_string());
    }
}

pub fn london() -> Coordinates {
    Coordinates::new(51.5, -0.1)
}

pub fn form_input(
    kind: &str,
    distance: &str,
    duration: &str,
    cadence: &str,
    elevation: &str,
) -> FormInput {
    FormInput {
        kind: kind.into(),
        distance: distance.into(),
        duration: duration.into(),
        cadence: cadence.into(),
        elevation: elevation.into(),
    }
}

/// Controller wired to `recorder`, with `w-N` ids and a fixed clock.
pub fn test_controller(
    recorder: &Recorder,
) -> (InteractionController, mpsc::UnboundedReceiver<UiEvent>) {
    let (events, receiver) = EventSink::channel();
    let factory = WorkoutFactory::new(
        Box::new(SequentialIds::new("w")),
        Box::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 10, 19, 7, 45, 0).unwrap().fixed_offset(),
        )),
    );
    let controller = InteractionController::new(
        recorder.gateways(),
        factory,
        TrackerSettings::default(),
        events,
    );
    (controller, receiver)
}
