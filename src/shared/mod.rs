pub mod error;
pub mod macros;
pub mod structs;

pub use error::ElevatorError;
pub use error::ElevatorResult;
pub use structs::AcceptanceResult;
pub use structs::CallKey;
pub use structs::CallRequest;
pub use structs::CarState;
pub use structs::Direction;
pub use structs::ElevatorEvent;
pub use structs::Phase;
pub use structs::ServiceRequest;
pub use structs::ViewUpdate;
