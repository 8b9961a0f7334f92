use crossbeam::channel::unbounded;

mod booths;
mod config;
mod errors;
mod events;
mod participant;
mod playlist;
mod stream;
mod sync;
mod util;

pub use booths::*;
pub use config::*;
pub use errors::*;
pub use events::*;
pub use participant::*;
pub use playlist::*;
pub use stream::*;
pub use sync::*;
pub use util::*;

/// The jukebox engine, creating coordinators and collecting their events.
pub struct Engine {
    context: EngineContext,
    event_receiver: EventReceiver,
}

/// A type passed to coordinators, to access the config and the event channel.
#[derive(Clone)]
pub struct EngineContext {
    pub config: Config,

    event_sender: EventSender,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let (event_sender, event_receiver) = unbounded();

        let context = EngineContext {
            config,
            event_sender,
        };

        Self {
            context,
            event_receiver,
        }
    }

    /// Spawns a new coordinator and returns a handle to it.
    /// Must be called from within a tokio runtime.
    pub fn create_coordinator(&self) -> Coordinator {
        Coordinator::spawn(&self.context)
    }

    /// Blocks until a coordinator emits an event.
    /// Returns [None] once the engine is gone.
    pub fn wait_for_event(&self) -> Option<SyncEvent> {
        self.event_receiver.recv().ok()
    }

    pub fn event_receiver(&self) -> &EventReceiver {
        &self.event_receiver
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl EngineContext {
    pub fn event_sender(&self) -> EventSender {
        self.event_sender.clone()
    }
}
