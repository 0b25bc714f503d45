//! Pure extraction over already-fetched markup. No I/O happens here; the
//! browser session hands these functions a rendered HTML string.

pub mod detail;
pub mod listing;
pub mod selectors;
