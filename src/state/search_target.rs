use crate::crawler::PaginationMode;
use crate::state::TargetState;
use url::Url;

/// One seed URL being walked page by page
///
/// Holds the resolved pagination mode, the 1-based page cursor and the page
/// bound learned from fetched pages. Created per seed at the start of a run and
/// dropped once it reaches a terminal state.
#[derive(Debug, Clone)]
pub struct SearchTarget {
    pub seed: Url,
    pub mode: PaginationMode,

    /// Page about to be fetched (or last fetched, once terminal)
    pub cursor: u32,

    /// Highest page number known to exist; None means "single page"
    pub max_page: Option<u32>,

    pub state: TargetState,
    pub pages_fetched: u32,

    /// Records this target contributed to the output (after dedup and filter)
    pub records_added: usize,

    pub last_error: Option<String>,
}

impl SearchTarget {
    pub fn new(seed: Url, mode: PaginationMode) -> Self {
        Self {
            seed,
            mode,
            cursor: 1,
            max_page: None,
            state: TargetState::Pending,
            pages_fetched: 0,
            records_added: 0,
            last_error: None,
        }
    }

    /// URL of the page at the cursor
    pub fn current_url(&self) -> Url {
        self.mode.page_url(&self.seed, self.cursor)
    }

    /// Folds a fetched page's bound into the target
    ///
    /// Classic pagers only show a window of page links, so the bound is the
    /// largest seen so far. The infinite-scroll bound is read from the first
    /// page only; later fragments do not carry it.
    pub fn record_page(&mut self, page_max: Option<u32>) {
        self.pages_fetched += 1;
        self.state = TargetState::Paging;

        match self.mode {
            PaginationMode::Classic => {
                self.max_page = match (self.max_page, page_max) {
                    (Some(known), Some(seen)) => Some(known.max(seen)),
                    (known, seen) => known.or(seen),
                };
            }
            PaginationMode::InfiniteScroll => {
                if self.cursor == 1 {
                    self.max_page = page_max;
                }
            }
        }
    }

    /// Moves the cursor to the next page
    ///
    /// Returns false, and marks the target exhausted, once the cursor has
    /// reached the known bound (or no bound is known).
    pub fn advance(&mut self) -> bool {
        if self.mode.has_next(self.cursor, self.max_page) {
            self.cursor += 1;
            true
        } else {
            self.finish(TargetState::Exhausted);
            false
        }
    }

    /// Ends the target in a terminal state
    pub fn finish(&mut self, state: TargetState) {
        debug_assert!(state.is_terminal());
        self.state = state;
    }

    /// Ends the target after an error
    pub fn fail(&mut self, error: impl ToString) {
        self.last_error = Some(error.to_string());
        self.state = TargetState::Failed;
    }
}
