use std::time::Duration;

use tokio::sync::mpsc;

use crate::{
    factory::WorkoutFactory,
    gateways::{Gateways, ListEntry, MarkerPopup, PanOptions, PositionResult},
    models::{Coordinates, WorkoutKind},
    settings::TrackerSettings,
    store::WorkoutStore,
};

use super::state::{InteractionState, StateEvent};

// Set to false to silence per-event logging from the controller
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Everything the host can report to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    PositionResolved(PositionResult),
    MapClicked(Coordinates),
    /// Raw value of the workout-type selector.
    KindChanged(String),
    Submitted,
    /// `entry_id` is `None` when the click landed outside any entry.
    ListClicked { entry_id: Option<String> },
    FormLayoutRestored,
}

/// Work the controller wants done later, outside the current handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    RestoreFormLayout { after: Duration },
}

/// Cloneable sending half of the controller's event queue.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues an event. Returns false if the session is gone.
    pub fn post(&self, event: UiEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Owns the session's state, records and gateways. Every handler takes
/// `&mut self`, so whoever owns the controller serialises access to it.
pub struct InteractionController {
    state: InteractionState,
    store: WorkoutStore,
    factory: WorkoutFactory,
    gateways: Gateways,
    settings: TrackerSettings,
    events: EventSink,
}

impl InteractionController {
    pub fn new(
        gateways: Gateways,
        factory: WorkoutFactory,
        settings: TrackerSettings,
        events: EventSink,
    ) -> Self {
        Self {
            state: InteractionState::new(),
            store: WorkoutStore::new(),
            factory,
            gateways,
            settings,
            events,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn handle(&mut self, event: UiEvent) -> Option<FollowUp> {
        match event {
            UiEvent::PositionResolved(result) => self.on_position(result),
            UiEvent::MapClicked(coordinates) => self.on_map_click(coordinates),
            UiEvent::KindChanged(raw) => self.on_kind_changed(&raw),
            UiEvent::Submitted => return self.on_submit(),
            UiEvent::ListClicked { entry_id } => self.on_select(entry_id.as_deref()),
            UiEvent::FormLayoutRestored => self.gateways.form.restore_layout(),
        }
        None
    }

    fn transition(&mut self, event: StateEvent) {
        let previous = self.state;
        self.state = previous.apply(event);
        if previous.name() != self.state.name() {
            log_info!("{} -> {}", previous.name(), self.state.name());
        }
    }

    fn on_position(&mut self, result: PositionResult) {
        if !matches!(self.state, InteractionState::Locating { failure: None }) {
            log_warn!("Ignoring repeated position result in {}", self.state.name());
            return;
        }

        self.transition(StateEvent::PositionResolved(result));
        match result {
            Ok(center) => self.load_map(center),
            Err(err) => {
                log_error!("Geolocation failed: {err}");
                self.gateways.notifier.alert(&err.to_string());
            }
        }
    }

    fn load_map(&mut self, center: Coordinates) {
        let zoom = self.settings.map_zoom;
        log_info!("Loading map at {center} (zoom {zoom})");

        self.gateways.map.initialize(center, zoom);
        self.gateways
            .map
            .add_marker(center, &MarkerPopup::plain(self.settings.initial_popup.clone()));

        let events = self.events.clone();
        self.gateways.map.on_surface_click(Box::new(move |coordinates| {
            events.post(UiEvent::MapClicked(coordinates));
        }));

        self.transition(StateEvent::MapInitialized);
    }

    fn on_map_click(&mut self, coordinates: Coordinates) {
        if !matches!(
            self.state,
            InteractionState::Idle | InteractionState::FormOpen { .. }
        ) {
            log_debug!("Map click at {coordinates} ignored in {}", self.state.name());
            return;
        }

        self.transition(StateEvent::SurfaceClicked(coordinates));
        self.gateways.form.show();
    }

    fn on_kind_changed(&mut self, raw: &str) {
        match raw.parse::<WorkoutKind>() {
            Ok(kind) => self.gateways.form.show_fields_for(kind),
            Err(unknown) => log_warn!("Ignoring unknown workout type '{unknown}'"),
        }
    }

    fn on_submit(&mut self) -> Option<FollowUp> {
        let pending = match (self.state, self.state.pending_click()) {
            (InteractionState::FormOpen { .. }, Some(pending)) => pending,
            _ => {
                log_warn!("Submit ignored in {}", self.state.name());
                return None;
            }
        };
        self.transition(StateEvent::Submit);

        let input = self.gateways.form.read();
        let workout = match self.factory.create_from_input(pending, &input) {
            Ok(workout) => workout,
            Err(err) => {
                log_warn!("Rejected workout input: {err}");
                self.gateways.notifier.alert(&err.to_string());
                self.transition(StateEvent::SubmissionRejected);
                return None;
            }
        };

        let workout = match self.store.append(workout) {
            Ok(stored) => stored,
            Err(err) => {
                log_error!("Failed to store workout: {err}");
                self.gateways.notifier.alert(&err.to_string());
                self.transition(StateEvent::SubmissionRejected);
                return None;
            }
        };
        log_info!("Stored {} ({})", workout.label(), workout.id());

        self.gateways
            .map
            .add_marker(workout.coordinates(), &MarkerPopup::for_workout(workout));
        self.gateways
            .list
            .append_entry(workout.id(), &ListEntry::from_workout(workout));

        self.gateways.form.clear();
        self.gateways.form.hide();
        self.transition(StateEvent::SubmissionAccepted);

        Some(FollowUp::RestoreFormLayout {
            after: self.settings.form_restore_delay(),
        })
    }

    fn on_select(&mut self, entry_id: Option<&str>) {
        let Some(id) = entry_id else {
            log_debug!("List click outside any entry");
            return;
        };
        if !self.state.has_map() {
            log_debug!("Selection of {id} ignored: no map");
            return;
        }

        let coordinates = match self.store.find_by_id(id) {
            Ok(workout) => workout.coordinates(),
            Err(err) => {
                log_debug!("Selection ignored: {err}");
                return;
            }
        };

        let options = PanOptions {
            zoom: self.settings.map_zoom,
            animate: true,
            duration: self.settings.pan_duration(),
        };
        self.gateways.map.pan_to(coordinates, &options);

        if let Ok(workout) = self.store.record_click(id) {
            log_debug!("{} selected {} time(s)", workout.id(), workout.click_count());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{FormField, ValidationError};
    use crate::gateways::GeolocationError;
    use crate::test_utils::{form_input, london, test_controller, FormCall, MapCall, Recorder};

    fn ready_controller(recorder: &Recorder) -> (InteractionController, mpsc::UnboundedReceiver<UiEvent>) {
        let (mut controller, rx) = test_controller(recorder);
        controller.handle(UiEvent::PositionResolved(Ok(london())));
        (controller, rx)
    }

    fn submit_run(
        controller: &mut InteractionController,
        recorder: &Recorder,
        at: Coordinates,
    ) -> Option<FollowUp> {
        controller.handle(UiEvent::MapClicked(at));
        recorder.set_input(form_input("running", "5", "25", "150", ""));
        controller.handle(UiEvent::Submitted)
    }

    #[test]
    fn position_loads_map_and_goes_idle() {
        let recorder = Recorder::new();
        let (controller, _rx) = ready_controller(&recorder);

        assert_eq!(controller.state(), &InteractionState::Idle);
        let calls = recorder.map_calls();
        assert_eq!(calls[0], MapCall::Initialize(london(), 13));
        assert!(matches!(&calls[1], MapCall::AddMarker(c, popup) if *c == london() && popup.content == "You are here"));
        assert!(recorder.has_click_handler());
    }

    #[test]
    fn registered_surface_handler_posts_map_clicks() {
        let recorder = Recorder::new();
        let (_controller, mut rx) = ready_controller(&recorder);
        let target = Coordinates::new(51.51, -0.12);

        assert!(recorder.click_map(target));
        assert_eq!(rx.try_recv().unwrap(), UiEvent::MapClicked(target));
    }

    #[test]
    fn geolocation_failure_alerts_and_leaves_map_uninitialised() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = test_controller(&recorder);

        controller.handle(UiEvent::PositionResolved(Err(GeolocationError::Unavailable)));
        controller.handle(UiEvent::MapClicked(london()));
        controller.handle(UiEvent::Submitted);
        controller.handle(UiEvent::ListClicked {
            entry_id: Some("w-1".into()),
        });

        assert_eq!(recorder.alerts(), vec!["Unable to fetch location".to_string()]);
        assert!(recorder.map_calls().is_empty());
        assert!(recorder.form_calls().is_empty());
        assert!(!recorder.has_click_handler());
        assert!(matches!(
            controller.state(),
            InteractionState::Locating { failure: Some(GeolocationError::Unavailable) }
        ));
    }

    #[test]
    fn late_second_position_is_ignored() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);

        controller.handle(UiEvent::PositionResolved(Ok(Coordinates::new(0.0, 0.0))));

        assert_eq!(recorder.map_calls().len(), 2);
        assert_eq!(controller.state(), &InteractionState::Idle);
    }

    #[test]
    fn map_click_opens_form() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);

        controller.handle(UiEvent::MapClicked(london()));

        assert_eq!(controller.state(), &InteractionState::FormOpen { pending: london() });
        assert_eq!(recorder.form_calls(), vec![FormCall::Show]);
    }

    #[test]
    fn kind_change_toggles_fields_in_any_state() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = test_controller(&recorder);

        controller.handle(UiEvent::KindChanged("cycling".into()));
        controller.handle(UiEvent::KindChanged("bogus".into()));
        controller.handle(UiEvent::KindChanged("running".into()));

        assert_eq!(
            recorder.form_calls(),
            vec![
                FormCall::ShowFieldsFor(WorkoutKind::Cycling),
                FormCall::ShowFieldsFor(WorkoutKind::Running),
            ]
        );
    }

    #[test]
    fn successful_submit_stores_renders_and_resets_form() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);
        let target = Coordinates::new(51.52, -0.09);

        let follow_up = submit_run(&mut controller, &recorder, target);

        assert_eq!(
            follow_up,
            Some(FollowUp::RestoreFormLayout {
                after: Duration::from_millis(1000)
            })
        );
        assert_eq!(controller.state(), &InteractionState::Idle);
        assert_eq!(controller.store().len(), 1);

        let workout = controller.store().all().next().unwrap();
        assert_eq!(workout.coordinates(), target);
        assert_eq!(workout.pace_min_per_km(), Some(5.0));

        let marker = recorder.map_calls().pop().unwrap();
        assert!(matches!(marker, MapCall::AddMarker(c, ref popup)
            if c == target && popup.class_name.as_deref() == Some("running-popup")));

        let entries = recorder.list_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(&entries[0].0, workout.id());
        assert_eq!(entries[0].1, ListEntry::from_workout(workout));

        assert_eq!(
            recorder.form_calls(),
            vec![FormCall::Show, FormCall::Clear, FormCall::Hide]
        );
        assert_eq!(recorder.current_input().distance, "");
    }

    #[test]
    fn submit_uses_click_coordinates_not_later_state() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);
        let first = Coordinates::new(10.0, 10.0);
        let second = Coordinates::new(20.0, 20.0);

        controller.handle(UiEvent::MapClicked(first));
        controller.handle(UiEvent::MapClicked(second));
        recorder.set_input(form_input("cycling", "20", "60", "", "0"));
        controller.handle(UiEvent::Submitted);

        let workout = controller.store().all().next().unwrap();
        assert_eq!(workout.coordinates(), second);
        assert_eq!(workout.speed_km_per_h(), Some(20.0 / 60.0));
    }

    #[test]
    fn invalid_input_alerts_and_keeps_form_intact() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);

        controller.handle(UiEvent::MapClicked(london()));
        let input = form_input("running", "abc", "25", "150", "");
        recorder.set_input(input.clone());
        let follow_up = controller.handle(UiEvent::Submitted);

        assert_eq!(follow_up, None);
        assert!(controller.store().is_empty());
        assert_eq!(controller.state(), &InteractionState::FormOpen { pending: london() });
        assert_eq!(recorder.form_calls(), vec![FormCall::Show]);
        assert_eq!(recorder.current_input(), input);
        assert_eq!(
            recorder.alerts(),
            vec![ValidationError::NotANumber {
                field: FormField::Distance
            }
            .to_string()]
        );
        assert!(recorder.list_entries().is_empty());
    }

    #[test]
    fn user_can_fix_input_after_rejection() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);

        controller.handle(UiEvent::MapClicked(london()));
        recorder.set_input(form_input("running", "5", "0", "150", ""));
        assert_eq!(controller.handle(UiEvent::Submitted), None);

        recorder.set_input(form_input("running", "5", "30", "150", ""));
        assert!(controller.handle(UiEvent::Submitted).is_some());
        assert_eq!(controller.store().len(), 1);
    }

    #[test]
    fn submit_without_open_form_is_ignored() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);
        recorder.set_input(form_input("running", "5", "25", "150", ""));

        assert_eq!(controller.handle(UiEvent::Submitted), None);
        assert!(controller.store().is_empty());
    }

    #[test]
    fn restore_event_restores_form_layout() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);

        controller.handle(UiEvent::FormLayoutRestored);

        assert_eq!(recorder.form_calls(), vec![FormCall::RestoreLayout]);
    }

    #[test]
    fn selecting_pans_and_counts_clicks() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);
        let target = Coordinates::new(51.52, -0.09);
        submit_run(&mut controller, &recorder, target);
        let before = controller.store().all().next().unwrap().clone();
        let id = before.id().to_string();

        controller.handle(UiEvent::ListClicked {
            entry_id: Some(id.clone()),
        });
        controller.handle(UiEvent::ListClicked {
            entry_id: Some(id.clone()),
        });

        let after = controller.store().find_by_id(&id).unwrap();
        assert_eq!(after.click_count(), 2);
        assert_eq!(after.label(), before.label());
        assert_eq!(after.metrics(), before.metrics());
        assert_eq!(after.coordinates(), before.coordinates());

        let pans: Vec<_> = recorder
            .map_calls()
            .into_iter()
            .filter(|call| matches!(call, MapCall::PanTo(..)))
            .collect();
        assert_eq!(
            pans,
            vec![
                MapCall::PanTo(
                    target,
                    PanOptions {
                        zoom: 13,
                        animate: true,
                        duration: Duration::from_secs(1)
                    }
                );
                2
            ]
        );
    }

    #[test]
    fn selecting_while_form_is_open_leaves_the_form_alone() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);
        let stored_at = Coordinates::new(51.52, -0.09);
        submit_run(&mut controller, &recorder, stored_at);
        let id = controller.store().all().next().unwrap().id().to_string();

        let pending = Coordinates::new(51.49, -0.2);
        controller.handle(UiEvent::MapClicked(pending));
        let form_calls = recorder.form_calls().len();

        controller.handle(UiEvent::ListClicked {
            entry_id: Some(id.clone()),
        });

        assert!(matches!(
            recorder.map_calls().last(),
            Some(MapCall::PanTo(c, _)) if *c == stored_at
        ));
        assert_eq!(controller.store().find_by_id(&id).unwrap().click_count(), 1);
        assert_eq!(controller.state(), &InteractionState::FormOpen { pending });
        assert_eq!(recorder.form_calls().len(), form_calls);
    }

    #[test]
    fn unknown_or_missing_selection_is_a_no_op() {
        let recorder = Recorder::new();
        let (mut controller, _rx) = ready_controller(&recorder);
        submit_run(&mut controller, &recorder, london());
        let map_calls = recorder.map_calls().len();

        controller.handle(UiEvent::ListClicked {
            entry_id: Some("does-not-exist".into()),
        });
        controller.handle(UiEvent::ListClicked { entry_id: None });

        assert_eq!(recorder.map_calls().len(), map_calls);
        assert_eq!(controller.store().all().next().unwrap().click_count(), 0);
        assert_eq!(controller.state(), &InteractionState::Idle);
    }
}
