//! Stdin/stdout host: prints what a browser would render and turns typed
//! commands into the events a browser would dispatch.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    factory::{FormField, FormInput, WorkoutFactory},
    gateways::{
        FixedPosition, FormView, Gateways, GeolocationError, ListEntry, ListGateway, MapGateway,
        MarkerPopup, Notifier, PanOptions, SurfaceClickHandler,
    },
    interaction::{commands::HELP, EventSink, HostCommand, InteractionController, Session, UiEvent},
    models::{Coordinates, WorkoutId, WorkoutKind},
    settings::{SettingsStore, TrackerSettings},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Where the map keeps its surface-click handler so the command loop can fire it.
#[derive(Clone, Default)]
struct ClickSlot(Arc<Mutex<Option<SurfaceClickHandler>>>);

impl ClickSlot {
    fn fire(&self, coordinates: Coordinates) -> bool {
        match lock(&self.0).as_ref() {
            Some(handler) => {
                handler(coordinates);
                true
            }
            None => false,
        }
    }
}

struct ConsoleMap {
    clicks: ClickSlot,
}

impl MapGateway for ConsoleMap {
    fn initialize(&mut self, center: Coordinates, zoom: u8) {
        println!("[map] centred on {center} at zoom {zoom}");
    }

    fn add_marker(&mut self, coordinates: Coordinates, popup: &MarkerPopup) {
        println!("[map] marker at {coordinates}: {}", popup.content);
    }

    fn on_surface_click(&mut self, handler: SurfaceClickHandler) {
        *lock(&self.clicks.0) = Some(handler);
    }

    fn pan_to(&mut self, coordinates: Coordinates, options: &PanOptions) {
        println!(
            "[map] panning to {coordinates} (zoom {}, {} ms)",
            options.zoom,
            options.duration.as_millis()
        );
    }
}

struct ConsoleList;

impl ListGateway for ConsoleList {
    fn append_entry(&mut self, id: &WorkoutId, entry: &ListEntry) {
        println!(
            "[list] {id}  {} {} | {} km | {} min | {:.1} {} | {} {}",
            entry.kind.icon(),
            entry.title,
            entry.distance_km,
            entry.duration_min,
            entry.metric_value,
            entry.metric_unit,
            entry.extra_value,
            entry.extra_unit
        );
        debug!("list markup:\n{}", entry.to_html());
    }
}

#[derive(Default)]
struct FormState {
    input: FormInput,
    visible: bool,
}

#[derive(Clone, Default)]
struct ConsoleForm(Arc<Mutex<FormState>>);

impl ConsoleForm {
    fn set(&self, field: FormField, value: String) {
        let mut state = lock(&self.0);
        match field {
            FormField::Distance => state.input.distance = value,
            FormField::Duration => state.input.duration = value,
            FormField::Cadence => state.input.cadence = value,
            FormField::Elevation => state.input.elevation = value,
            FormField::Coordinates => {}
        }
    }

    fn set_kind(&self, kind: &str) {
        lock(&self.0).input.kind = kind.to_string();
    }
}

impl FormView for ConsoleForm {
    fn read(&self) -> FormInput {
        lock(&self.0).input.clone()
    }

    fn show(&mut self) {
        lock(&self.0).visible = true;
        println!("[form] open, cursor in distance");
    }

    fn hide(&mut self) {
        lock(&self.0).visible = false;
        println!("[form] hidden");
    }

    fn restore_layout(&mut self) {
        debug!("[form] layout restored");
    }

    fn clear(&mut self) {
        let mut state = lock(&self.0);
        state.input.distance.clear();
        state.input.duration.clear();
        state.input.cadence.clear();
        state.input.elevation.clear();
    }

    fn show_fields_for(&mut self, kind: WorkoutKind) {
        let field = match kind {
            WorkoutKind::Running => "cadence",
            WorkoutKind::Cycling => "elevation",
        };
        let visible = if lock(&self.0).visible { "" } else { " (form hidden)" };
        println!("[form] showing {field} field{visible}");
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&mut self, message: &str) {
        println!("[alert] {message}");
    }
}

/// Printed at startup when no start position is configured, since the
/// session would otherwise sit in `Locating` with only an alert to show.
fn missing_position_hint(tracker: &TrackerSettings) -> Option<String> {
    match tracker.start_coordinates() {
        Some(_) => None,
        None => Some(
            "no start position set: export TRAILMARK_START_POSITION=\"lat,lng\" \
             or add startPosition to the settings file"
                .to_string(),
        ),
    }
}

pub async fn run_console(settings: SettingsStore) -> Result<()> {
    let tracker = settings.tracker().clone();
    let clicks = ClickSlot::default();
    let form = ConsoleForm::default();
    form.set_kind(WorkoutKind::default().as_str());

    let gateways = Gateways {
        map: Box::new(ConsoleMap {
            clicks: clicks.clone(),
        }),
        list: Box::new(ConsoleList),
        form: Box::new(form.clone()),
        notifier: Box::new(ConsoleNotifier),
    };

    let (events, receiver) = EventSink::channel();
    let controller =
        InteractionController::new(gateways, WorkoutFactory::system(), tracker.clone(), events);
    if let Some(hint) = missing_position_hint(&tracker) {
        println!("{hint}");
    }
    let mut geolocation = FixedPosition(
        tracker
            .start_coordinates()
            .ok_or(GeolocationError::Unavailable),
    );
    let session = Session::spawn(controller, receiver, &mut geolocation);

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match HostCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match command {
            HostCommand::Click(coordinates) => {
                if !clicks.fire(coordinates) {
                    println!("the map is not ready");
                }
            }
            HostCommand::Kind(kind) => {
                form.set_kind(&kind);
                session.dispatch(UiEvent::KindChanged(kind))?;
            }
            HostCommand::Set(field, value) => form.set(field, value),
            HostCommand::Submit => session.dispatch(UiEvent::Submitted)?,
            HostCommand::Select(id) => session.dispatch(UiEvent::ListClicked {
                entry_id: Some(id),
            })?,
            HostCommand::Dump => {
                let json = session
                    .inspect(|controller: &InteractionController| {
                        serde_json::to_string_pretty(&controller.store().all().collect::<Vec<_>>())
                    })
                    .await??;
                println!("{json}");
            }
            HostCommand::State => {
                let state = session.inspect(|controller| *controller.state()).await?;
                println!("{}", serde_json::to_string(&state)?);
            }
            HostCommand::SaveSettings => {
                settings.persist()?;
                println!("settings written to {}", settings.path().display());
            }
            HostCommand::Help => println!("{HELP}"),
            HostCommand::Quit => break,
        }
    }

    let controller = session.shutdown().await?;
    info!(
        "Session ended with {} workout(s)",
        controller.store().len()
    );
    Ok(())
}
