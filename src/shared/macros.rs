/***************************************/
/*               Macros                */
/***************************************/
/// Unwraps a `Result` in the binary shell, logging the error and exiting with status 1.
/// An optional context string is prepended to the logged error.
#[macro_export]
macro_rules! unwrap_or_exit {
    ($expr:expr) => {
        $crate::unwrap_or_exit!($expr, "fatal")
    };
    ($expr:expr, $context:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => {
                log::error!("{}: {}", $context, e);
                std::process::exit(1);
            }
        }
    };
}
