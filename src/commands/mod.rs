//! Command implementations behind the `scrubsum` binary.
//!
//! - [`scan`]: Scan a directory, report changes, and optionally commit them

pub mod scan;

pub use scan::ScanCommand;
