pub mod dispatcher;
pub mod dispatcher_tests;
pub mod pending_calls;
pub mod request_queue;

pub use dispatcher::Dispatcher;
pub use dispatcher::Task;
pub use pending_calls::PendingCalls;
pub use request_queue::RequestQueue;
