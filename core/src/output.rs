//! Output of tables and reports.
//!
//! Tables are tab-separated with a header row. Writers are generic over [`std::io::Write`], so
//! that the caller decides where the output goes.

pub mod report;
pub use report::write_markdown;

pub mod table;

/// Token used for missing values in output.
pub const MISSING: &str = "NA";

/// Formats a value with a fixed number of decimals, or as [`MISSING`] if it is NaN.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        MISSING.to_string()
    } else {
        format!("{value:.6}")
    }
}
