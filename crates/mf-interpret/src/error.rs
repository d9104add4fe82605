use mf_core::error::{configuration_error, runtime_error, Error};

/// Create an error raised while a compiled program runs
pub fn interpretation_error(message: impl Into<String>) -> Error {
    runtime_error(message)
}

/// Create an error raised while lowering a program; the program is rejected
/// before it ever runs
pub fn lowering_error(message: impl Into<String>) -> Error {
    configuration_error(message)
}

// Convenience macros for generating interpretation errors

/// Macro to return early with an interpretation error
#[macro_export]
macro_rules! interp_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::interpretation_error(format!($($arg)*)))
    };
}

/// Macro to ensure a condition is true, or return an interpretation error
#[macro_export]
macro_rules! interp_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::interp_bail!($($arg)*);
        }
    };
}

/// Macro to return early with a lowering error
#[macro_export]
macro_rules! lowering_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::lowering_error(format!($($arg)*)))
    };
}
