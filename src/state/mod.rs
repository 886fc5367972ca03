//! State module for tracking mining progress
//!
//! # Components
//!
//! - `PaginationState`: what the listing loop knows about a brand's result pages,
//!   and the advance / retry / stop decision taken after each page
//! - `ListRunReport` / `DetailRunReport`: counters returned by the two drivers

mod pagination;
mod report;

// Re-export main types
pub use pagination::{PageDecision, PaginationState, StopReason};
pub use report::{DetailRunReport, ListRunReport};
