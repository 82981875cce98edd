/// Crawl lifecycle phases
use std::fmt;

/// Represents where a crawl is in its lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Fetching and expanding the seed before the pool starts
    #[default]
    Seeding,

    /// Workers are draining the queue
    Running,

    /// The queue has been joined (or the crawl cancelled); workers are being stopped
    Draining,

    /// All workers have exited
    Stopped,
}

impl CrawlPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// A failed seed goes straight from `Seeding` to `Stopped`.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Seeding, Self::Running)
                | (Self::Seeding, Self::Stopped)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Stopped)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
