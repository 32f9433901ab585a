pub mod runner;

pub use runner::send_call;
pub use runner::Runner;
