//! Warnings for the user, as opposed to `tracing` diagnostics for developers.
//!
//! Warnings never change the outcome of a command. They are off until [`enable`] is called,
//! which the CLI skips under `--quiet`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex};

use owo_colors::OwoColorize;
use rustc_hash::FxHashSet;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// The messages already shown by [`warn_user_once!`].
static SHOWN: LazyLock<Mutex<FxHashSet<String>>> = LazyLock::new(Mutex::default);

/// Enable user-facing warnings.
pub fn enable() {
    ENABLED.store(true, Ordering::Relaxed);
}

pub fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Record the message as shown. Returns `false` if it was shown before.
#[doc(hidden)]
pub fn first_occurrence(message: &str) -> bool {
    SHOWN
        .lock()
        .map(|mut shown| shown.insert(message.to_string()))
        .unwrap_or(true)
}

/// Print a warning to stderr, with a bold yellow `warning:` prefix.
#[doc(hidden)]
pub fn emit(message: &str) {
    anstream::eprintln!(
        "{}{} {}",
        "warning".yellow().bold(),
        ":".bold(),
        message.bold()
    );
}

/// Warn the user, if warnings are enabled.
#[macro_export]
macro_rules! warn_user {
    ($($arg:tt)*) => {{
        if $crate::enabled() {
            $crate::emit(&format!($($arg)*));
        }
    }};
}

/// Warn the user, if warnings are enabled and the same message wasn't shown before.
///
/// Useful for conditions found while inspecting an environment, which happens more than once
/// per command.
#[macro_export]
macro_rules! warn_user_once {
    ($($arg:tt)*) => {{
        if $crate::enabled() {
            let message = format!($($arg)*);
            if $crate::first_occurrence(&message) {
                $crate::emit(&message);
            }
        }
    }};
}
