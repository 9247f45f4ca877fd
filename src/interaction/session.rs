use anyhow::{anyhow, Context, Result};
use log::info;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::gateways::{GeolocationError, GeolocationProvider, PositionResult};

use super::controller::{EventSink, FollowUp, InteractionController, UiEvent};

type InspectTask = Box<dyn FnOnce(&InteractionController) + Send + 'static>;

/// Runs an [`InteractionController`] on a single tokio task. All events are
/// handled there, one at a time and in the order they were posted.
pub struct Session {
    events: EventSink,
    inspect_tx: mpsc::UnboundedSender<InspectTask>,
    // Cancels the worker and any pending timers if the session is dropped.
    cancel_guard: DropGuard,
    worker: JoinHandle<InteractionController>,
}

impl Session {
    /// Moves the controller onto its own task and fires the one position
    /// request. Must be called from within a tokio runtime.
    pub fn spawn(
        controller: InteractionController,
        receiver: mpsc::UnboundedReceiver<UiEvent>,
        geolocation: &mut dyn GeolocationProvider,
    ) -> Self {
        let events = controller.events().clone();
        let cancel_token = CancellationToken::new();

        let position = geolocation.request_position();
        tokio::spawn(forward_position(
            position,
            events.clone(),
            cancel_token.clone(),
        ));

        let (inspect_tx, inspect_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(event_loop(
            controller,
            receiver,
            inspect_rx,
            cancel_token.clone(),
        ));

        Self {
            events,
            inspect_tx,
            cancel_guard: cancel_token.drop_guard(),
            worker,
        }
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn dispatch(&self, event: UiEvent) -> Result<()> {
        if self.events.post(event) {
            Ok(())
        } else {
            Err(anyhow!("session is no longer running"))
        }
    }

    /// Runs `task` against the controller once every event posted before this
    /// call has been handled.
    pub async fn inspect<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&InteractionController) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command: InspectTask = Box::new(move |controller| {
            let _ = reply_tx.send(task(controller));
        });

        self.inspect_tx
            .send(command)
            .map_err(|_| anyhow!("session is no longer running"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("session terminated before answering"))
    }

    /// Stops the session and hands the controller back.
    pub async fn shutdown(self) -> Result<InteractionController> {
        let Session {
            cancel_guard,
            worker,
            ..
        } = self;
        drop(cancel_guard);
        worker.await.context("session task failed to join")
    }
}

async fn forward_position(
    position: oneshot::Receiver<PositionResult>,
    events: EventSink,
    cancel_token: CancellationToken,
) {
    tokio::select! {
        result = position => {
            let result = result.unwrap_or(Err(GeolocationError::Unavailable));
            events.post(UiEvent::PositionResolved(result));
        }
        _ = cancel_token.cancelled() => {}
    }
}

async fn event_loop(
    mut controller: InteractionController,
    mut receiver: mpsc::UnboundedReceiver<UiEvent>,
    mut inspect_rx: mpsc::UnboundedReceiver<InspectTask>,
    cancel_token: CancellationToken,
) -> InteractionController {
    loop {
        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => {
                info!("Session shutting down");
                break;
            }
            event = receiver.recv() => {
                let Some(event) = event else { break };
                if let Some(follow_up) = controller.handle(event) {
                    schedule(follow_up, controller.events().clone(), cancel_token.clone());
                }
            }
            Some(task) = inspect_rx.recv() => task(&controller),
        }
    }
    controller
}

fn schedule(follow_up: FollowUp, events: EventSink, cancel_token: CancellationToken) {
    match follow_up {
        FollowUp::RestoreFormLayout { after } => {
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(after) => {
                        events.post(UiEvent::FormLayoutRestored);
                    }
                    _ = cancel_token.cancelled() => {}
                }
            });
        }
    }
}
