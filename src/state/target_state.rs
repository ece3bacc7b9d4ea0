/// Lifecycle states of one search target
///
/// A target starts `Pending`, moves to `Paging` once its first page has been
/// fetched, and ends in exactly one terminal state.
use std::fmt;

/// Represents the current state of a search target in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    // ===== Active States =====
    /// Created from a seed URL, nothing fetched yet
    Pending,

    /// At least one page fetched, more may follow
    Paging,

    // ===== Terminal States =====
    /// Every page was walked, or a page produced no new card numbers
    Exhausted,

    /// A fetch or parse error ended pagination for this target
    Failed,

    /// The run-wide record limit was reached while on this target
    LimitReached,
}

impl TargetState {
    /// Returns true if no further page will be fetched for this target
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if pages may still be fetched
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Paging)
    }

    /// Returns true if the target finished without an error
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exhausted | Self::LimitReached)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paging => "paging",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
            Self::LimitReached => "limit_reached",
        }
    }

    /// Returns all possible target states
    pub fn all_states() -> [Self; 5] {
        [
            Self::Pending,
            Self::Paging,
            Self::Exhausted,
            Self::Failed,
            Self::LimitReached,
        ]
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
