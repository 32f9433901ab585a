pub mod timer;

pub use timer::TimerId;
pub use timer::TimerService;
