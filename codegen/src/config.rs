//! Emitter configuration.
//!
//! Supports both explicit configuration and environment variable fallbacks.
//! The emitter never reads the environment itself; callers resolve the
//! configuration once and hand it over at construction.

use bon::bon;

/// Runtime function receiving timer probe labels.
pub const DEFAULT_TIMER_FN: &str = "weave.runtime.function.print_time";

/// Prefix of the reducer handles owned by the generated module.
pub const DEFAULT_REDUCER_PREFIX: &str = "self.wreducer";

/// Configuration for statement emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitConfig {
    /// Emit a timer probe before every instrumented statement.
    pub line_timer: bool,
    /// Callable invoked by timer probes with a single string label.
    pub timer_fn: String,
    /// Reducer handles render as `{reducer_prefix}{reducer_id}`.
    pub reducer_prefix: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            line_timer: false,
            timer_fn: DEFAULT_TIMER_FN.to_string(),
            reducer_prefix: DEFAULT_REDUCER_PREFIX.to_string(),
        }
    }
}

#[bon]
impl EmitConfig {
    /// Create an emitter configuration with builder pattern.
    #[builder]
    pub fn new(
        #[builder(default)] line_timer: bool,
        #[builder(into)] timer_fn: Option<String>,
        #[builder(into)] reducer_prefix: Option<String>,
    ) -> Self {
        Self {
            line_timer,
            timer_fn: timer_fn.unwrap_or_else(|| DEFAULT_TIMER_FN.to_string()),
            reducer_prefix: reducer_prefix.unwrap_or_else(|| DEFAULT_REDUCER_PREFIX.to_string()),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `WEAVE_LINE_TIMER` - Enable timer probes if set to anything but `0`
    /// * `WEAVE_TIMER_FN` - Probe callable (default: `weave.runtime.function.print_time`)
    /// * `WEAVE_REDUCER_PREFIX` - Reducer handle prefix (default: `self.wreducer`)
    pub fn from_env() -> Self {
        let line_timer = std::env::var("WEAVE_LINE_TIMER").is_ok_and(|v| v != "0");
        let timer_fn = std::env::var("WEAVE_TIMER_FN").ok().filter(|v| !v.is_empty());
        let reducer_prefix = std::env::var("WEAVE_REDUCER_PREFIX").ok().filter(|v| !v.is_empty());

        Self::builder().line_timer(line_timer).maybe_timer_fn(timer_fn).maybe_reducer_prefix(reducer_prefix).build()
    }
}
