//! Logging abstraction layer for sprig-pages
//!
//! Thin macros over [`tracing`] so that call sites inside the mount engine,
//! components and the router stay short. Whatever subscriber the host
//! application installs decides where the records go.
//!
//! ## Macro Overview
//!
//! | Macro | Feature Required | Level |
//! |-------|------------------|-------|
//! | `debug_log!` | `debug-hooks` (and `debug_assertions`) | `DEBUG` |
//! | `info_log!` | None | `INFO` |
//! | `warn_log!` | None | `WARN` |
//! | `error_log!` | None | `ERROR` |
//!
//! ## Example
//!
//! ```ignore
//! use sprig_pages::{debug_log, info_log, warn_log, error_log};
//!
//! // Only emitted when both `debug-hooks` and `debug_assertions` are enabled
//! debug_log!("materialized {} nodes", count);
//!
//! info_log!("Component mounted");
//! warn_log!("css rule `{}` is not terminated", selector);
//! error_log!("failed to mount resolved node: {}", error);
//! ```

/// Logs a debug message (requires `debug-hooks` feature + `debug_assertions`)
///
/// Used for per-node traces in the mount engine. Compiles to a no-op when
/// the conditions are not met.
#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-hooks"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::__tracing::debug!($($arg)*);
	}};
}

/// No-op debug_log when conditions are not met
#[macro_export]
#[cfg(not(all(debug_assertions, feature = "debug-hooks")))]
macro_rules! debug_log {
	($($arg:tt)*) => {{}};
}

/// Logs an info message.
#[macro_export]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::__tracing::info!($($arg)*);
	}};
}

/// Logs a warning message.
///
/// Used for recoverable template problems such as a stylesheet rule that
/// never closed or a future leaf whose marker could not be removed.
#[macro_export]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::__tracing::warn!($($arg)*);
	}};
}

/// Logs an error message.
///
/// Errors raised inside signal subscribers and spawned tasks have nowhere to
/// propagate, so they end up here.
#[macro_export]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::__tracing::error!($($arg)*);
	}};
}

#[cfg(test)]
mod tests {
	use crate::{debug_log, error_log, info_log, warn_log};
	use rstest::rstest;

	#[rstest]
	fn test_logging_macros_compile() {
		debug_log!("Debug message: {}", 42);
		info_log!("Info message: {}", "test");
		warn_log!("Warning message: {:?}", vec![1, 2, 3]);
		error_log!("Error message: {}", "error");
	}

	#[rstest]
	fn test_logging_macros_accept_fields() {
		info_log!(nodes = 3, "mounted");
		warn_log!(selector = ".a", "unterminated rule");
	}
}
