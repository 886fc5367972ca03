//! Pagination state for a brand's search results
//!
//! The search form never says reliably how many pages there are. This module
//! tracks what the listing loop knows so far and decides, after every page,
//! whether to advance, retry past an empty page, or stop.

use std::fmt;

/// Why the listing loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The very first page had no devices: the brand has no matches
    NoMatches,

    /// The number of devices collected reached the total estimate
    Complete,

    /// Too many consecutive empty pages in a row
    EmptyPageLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoMatches => "no matches",
            Self::Complete => "complete",
            Self::EmptyPageLimit => "empty page limit",
        };
        write!(f, "{}", s)
    }
}

/// What the listing loop does after a page has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDecision {
    /// The page had devices and more are expected
    Advance,

    /// The page was empty but the run is not over yet; move on to the next page
    RetryEmpty,

    /// Stop paging
    Stop(StopReason),
}

/// Running state of one listing run
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    page: usize,
    consecutive_empty: u32,
    collected: usize,
    estimate: usize,
    pages_fetched: usize,
}

impl PaginationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-based index of the page currently being handled
    pub fn page(&self) -> usize {
        self.page
    }

    /// Devices seen so far, duplicates included
    pub fn collected(&self) -> usize {
        self.collected
    }

    /// Best current guess at the number of results; 0 means unknown
    pub fn estimate(&self) -> usize {
        self.estimate
    }

    pub fn consecutive_empty(&self) -> u32 {
        self.consecutive_empty
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Folds a page's total estimate into the running one
    ///
    /// The estimate only ever grows: a page that reports fewer results (or
    /// none, after a failed fetch) does not lower what earlier pages revealed.
    pub fn revise_estimate(&mut self, page_estimate: usize) {
        if page_estimate > self.estimate {
            if self.estimate > 0 {
                tracing::info!(
                    "Updated total results from {} to {}",
                    self.estimate,
                    page_estimate
                );
            }
            self.estimate = page_estimate;
        }
    }

    /// Records a page that yielded no devices
    pub fn on_empty_page(&mut self, max_empty_pages: u32) -> PageDecision {
        self.pages_fetched += 1;
        self.consecutive_empty += 1;

        let decision = if self.page == 0 {
            PageDecision::Stop(StopReason::NoMatches)
        } else if self.collected >= self.estimate {
            PageDecision::Stop(StopReason::Complete)
        } else if self.consecutive_empty >= max_empty_pages {
            PageDecision::Stop(StopReason::EmptyPageLimit)
        } else {
            PageDecision::RetryEmpty
        };

        self.advance_unless_stopped(decision)
    }

    /// Records a page that yielded `count` devices (count > 0)
    pub fn on_devices(&mut self, count: usize) -> PageDecision {
        self.pages_fetched += 1;
        self.consecutive_empty = 0;
        self.collected += count;

        let decision = if self.estimate > 0 && self.collected >= self.estimate {
            PageDecision::Stop(StopReason::Complete)
        } else {
            PageDecision::Advance
        };

        self.advance_unless_stopped(decision)
    }

    fn advance_unless_stopped(&mut self, decision: PageDecision) -> PageDecision {
        if !matches!(decision, PageDecision::Stop(_)) {
            self.page += 1;
        }
        decision
    }
}
