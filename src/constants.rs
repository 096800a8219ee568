use std::time::Duration;

// -
// Document layout

/// Synthetic top-level key wrapping the materialized subtree content.
pub(crate) const DOCUMENT_ROOT_KEY: &str = "configuration";

/// Extension appended verbatim to the configured output base path.
pub(crate) const OUTPUT_FILE_SUFFIX: &str = ".json";

/// Suffix of the scratch file the writer renames over the target.
pub(crate) const TEMP_FILE_SUFFIX: &str = ".tmp";

// -
// Watchers

/// Pause before re-arming a leaf watcher whose arming call failed,
/// so a dead store connection cannot spin the reactor loop hot.
pub(crate) const WATCH_REARM_DELAY: Duration = Duration::from_millis(500);
