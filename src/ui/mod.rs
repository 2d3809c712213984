pub mod command;
pub mod console;
pub mod controller;
pub mod event_loop;
pub mod gate;

pub use console::ConsolePresenter;
pub use controller::{Controller, JobOutcome};
pub use event_loop::run_event_loop;
