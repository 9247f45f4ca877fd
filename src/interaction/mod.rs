pub mod commands;
pub mod controller;
pub mod session;
pub mod state;

pub use commands::HostCommand;
pub use controller::{EventSink, FollowUp, InteractionController, UiEvent};
pub use session::Session;
pub use state::{InteractionState, StateEvent};
