pub mod input;
pub mod view;

pub use input::parse_call;
pub use input::StdinInput;
pub use view::format_update;
pub use view::ConsoleView;
