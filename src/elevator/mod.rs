pub mod car;

pub use car::Car;
pub use car::Transition;
