//! Run summaries printed at the end of a command

use crate::state::{DetailRunReport, ListRunReport};
use std::fmt::Write;

/// Renders the summary of a listing run
pub fn format_list_summary(report: &ListRunReport) -> String {
    let mut out = String::new();

    if report.update_mode {
        let _ = writeln!(
            out,
            "PhoneDB mining update complete! Total {} devices in database: {}",
            report.brand,
            report.total()
        );
        let _ = writeln!(out, "  New devices: {}", report.new_devices);
    } else {
        let _ = writeln!(
            out,
            "PhoneDB mining complete! Collected {} {} devices.",
            report.total(),
            report.brand
        );
        let _ = writeln!(out, "  Stored (unique): {}", report.stored);
    }

    let _ = writeln!(out, "  Pages fetched: {}", report.pages_fetched);
    let _ = writeln!(out, "  Estimated results: {}", report.estimate);
    let _ = write!(out, "  Stopped: {}", report.stop_reason);
    out
}

/// Renders the summary of a detail run
pub fn format_detail_summary(report: &DetailRunReport) -> String {
    let mut out = String::new();

    if report.update_mode {
        let _ = writeln!(
            out,
            "PhoneDB data extraction update complete for {} devices.",
            report.brand
        );
        let _ = writeln!(
            out,
            "  Added {} new devices, skipped {} existing devices.",
            report.succeeded, report.skipped
        );
    } else {
        let _ = writeln!(
            out,
            "PhoneDB data extraction complete! Collected detailed information for {} {} devices.",
            report.succeeded, report.brand
        );
        if report.skipped > 0 {
            let _ = writeln!(out, "  Duplicates skipped: {}", report.skipped);
        }
    }

    let _ = writeln!(
        out,
        "  Processed: {} (succeeded {}, failed {})",
        report.processed, report.succeeded, report.failed
    );
    let _ = write!(out, "  Records in collection: {}", report.stored);
    out
}

/// Prints the summary of a listing run to stdout
pub fn print_list_summary(report: &ListRunReport) {
    println!("{}", format_list_summary(report));
}

/// Prints the summary of a detail run to stdout
pub fn print_detail_summary(report: &DetailRunReport) {
    println!("{}", format_detail_summary(report));
}
