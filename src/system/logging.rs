//! Logging macros
//!
//! Library modules log through these so the same code builds everywhere:
//! - `rp2350` feature: forwarded to `defmt` (RTT transport set up by the firmware binary)
//! - host tests: printed with `println!`
//! - anything else: compiled out
//!
//! Stick to `{}` for integers/bools and `{:?}` for enums, which both defmt and `core::fmt`
//! understand.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "rp2350")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "rp2350"), test))]
        println!("[INFO] {}", format!($($arg)*));

        #[cfg(all(not(feature = "rp2350"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "rp2350")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "rp2350"), test))]
        println!("[WARN] {}", format!($($arg)*));

        #[cfg(all(not(feature = "rp2350"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "rp2350")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "rp2350"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));

        #[cfg(all(not(feature = "rp2350"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "rp2350")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "rp2350"), test))]
        println!("[DEBUG] {}", format!($($arg)*));

        #[cfg(all(not(feature = "rp2350"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}
