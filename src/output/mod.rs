//! Output module for reporting mining results
//!
//! The collections themselves are written by the storage module; this module
//! only renders the end-of-run summaries shown on the command line.

mod summary;

pub use summary::{
    format_detail_summary, format_list_summary, print_detail_summary, print_list_summary,
};
