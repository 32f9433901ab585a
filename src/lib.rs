//! Dispatch and door-cycle simulation for a bank of elevator cars.
//!
//! The `Dispatcher` owns the whole simulation: the car bank, the request queue, the
//! outstanding-call table and a virtual clock. Calls go in through `Dispatcher::submit_call`,
//! view updates come out over a `crossbeam_channel`. Time only moves when the owner advances
//! the clock, either directly (tests, scripted runs) or through a `Runner` thread that follows
//! the wall clock.

/* Modules */
pub mod clock;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod elevator;
pub mod runner;
pub mod shared;

pub use config::Config;
pub use dispatcher::Dispatcher;
pub use runner::Runner;
pub use shared::{AcceptanceResult, CallRequest, Direction, ElevatorError, ElevatorEvent, ViewUpdate};
