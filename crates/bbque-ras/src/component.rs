//! Availability and priority reported to the launcher's component selection.

use bbque_config::Config;
use tracing::debug;

/// Name the allocator registers under.
pub const COMPONENT_NAME: &str = "bbque";

/// Answer to the launcher's selection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The resource manager is not configured; skip this allocator.
    Unavailable,
    /// The allocator can be selected with the given priority.
    Available { priority: i32 },
}

impl Selection {
    /// Priority to rank this allocator with; zero when unavailable.
    #[must_use]
    pub const fn priority(self) -> i32 {
        match self {
            Self::Unavailable => 0,
            Self::Available { priority } => priority,
        }
    }

    /// Whether the allocator should be considered at all.
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// Reports whether the allocator applies under `config`.
///
/// Only the presence of the endpoint values is checked here; malformed
/// values surface later as configuration errors when connecting.
#[must_use]
pub fn query(config: &Config) -> Selection {
    if !config.is_available() {
        debug!(
            target: concat!(env!("CARGO_PKG_NAME"), "::component"),
            component = COMPONENT_NAME,
            "resource manager endpoint not configured"
        );
        return Selection::Unavailable;
    }
    let priority = config.priority();
    debug!(
        target: concat!(env!("CARGO_PKG_NAME"), "::component"),
        component = COMPONENT_NAME,
        priority,
        "available for selection"
    );
    Selection::Available { priority }
}
