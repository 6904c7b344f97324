//! Export of result tables for display and download.

mod report;
mod tabular;

pub use report::*;
pub use tabular::*;
