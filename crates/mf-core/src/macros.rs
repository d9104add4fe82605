/// Declares an IR enum with the derives every node shares.
#[macro_export]
macro_rules! common_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($body:tt)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        $vis enum $name { $($body)* }
    };
}

/// Declares an IR struct with the derives every node shares.
#[macro_export]
macro_rules! common_struct {
    ($(#[$meta:meta])* $vis:vis struct $name:ident { $($body:tt)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        $vis struct $name { $($body)* }
    };
}

/// Macro to return early with an error
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::error::generic_error(format!($($arg)*)))
    };
}

/// Return early with a configuration error (a mapping that cannot be generated)
#[macro_export]
macro_rules! config_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::configuration_error(format!($($arg)*)))
    };
}

/// Ensure a generation-time condition holds, or return a configuration error
#[macro_export]
macro_rules! config_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::config_bail!($($arg)*);
        }
    };
}

/// Log a warning message
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

/// Log a debug message
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::tracing::debug!($($arg)*)
    };
}

/// Log an info message
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

/// Log a trace message
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::tracing::trace!($($arg)*)
    };
}
