//! Events and the listener dispatcher.

mod dispatcher;
mod event;

pub use dispatcher::{Dispatcher, Listener, ListenerId, Reaction};
pub use event::{EventKind, GameEvent};
