//! Crate-internal logging macros forwarding to `tracing` under the `transcript_scanner` target.
//!
//! When the `tracing` feature is disabled, all logging calls compile to no-ops and only borrow
//! their field values, so nothing is evaluated twice and no warnings about unused bindings fire.

#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! log_at {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "transcript_scanner", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! log_at {
    ($level:ident, $($arg:tt)*) => {
        $crate::__trace_consume!($($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => {
        log_at!(error, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => {
        log_at!(warn, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! info {
    ($($arg:tt)*) => {
        log_at!(info, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        log_at!(debug, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        log_at!(trace, $($arg)*)
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(not(feature = "tracing"))]
macro_rules! __trace_consume {
    ($field:ident = % $value:expr, $($rest:tt)*) => {
        { let _ = &$value; $crate::__trace_consume!($($rest)*); }
    };
    ($field:ident = ? $value:expr, $($rest:tt)*) => {
        { let _ = &$value; $crate::__trace_consume!($($rest)*); }
    };
    ($field:ident = $value:expr, $($rest:tt)*) => {
        { let _ = &$value; $crate::__trace_consume!($($rest)*); }
    };
    ($lit:literal $($rest:tt)*) => {};
    () => {};
}

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    #[test]
    fn messages_accept_any_trailing_tokens() {
        let block = 7u64;
        warn!(block = block, "Skipping block {}", block);
        debug!(block = %block, "Scan finished", extra = 1);
        info!("Scan finished");
    }
}
