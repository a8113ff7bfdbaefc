//! Logging abstraction.
//!
//! Crate-internal macros that forward to:
//! - `defmt` when the `defmt` feature is enabled
//! - `log` when the `log` feature is enabled
//! - nothing otherwise (arguments are still type-checked)
//!
//! Only plain `{}` placeholders are used so the same format string is
//! valid for both backends.

/// Log info message
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);

        #[cfg(feature = "log")]
        ::log::info!($($arg)*);

        #[cfg(not(any(feature = "defmt", feature = "log")))]
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Log warning message
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);

        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);

        #[cfg(not(any(feature = "defmt", feature = "log")))]
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Log debug message
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);

        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);

        #[cfg(not(any(feature = "defmt", feature = "log")))]
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}
