pub mod handle;
pub mod runtime;
pub mod state;
pub mod timers;

pub use handle::{ChatHandle, EngineHandles, spawn_engine};
pub use runtime::ChatEngine;
pub use state::{ChatState, Effect, Timer};
pub use timers::Scheduler;
