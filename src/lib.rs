//! Weekly macro dashboard.
//!
//! The `fetch` binary mirrors a fixed set of FRED series into JSON snapshot
//! files, writing only what changed. The `dashboard` binary reads whatever is
//! currently published, derives week-over-week changes and a TLT
//! buy/hold/hedge signal, and serves the result as a page.

pub mod catalog;
pub mod dashboard;
pub mod fetcher;
pub mod format;
pub mod loader;
pub mod signal;
pub mod store;
pub mod transform;
pub mod types;

pub use crate::catalog::{DashboardConfig, FetchPlan};
pub use crate::fetcher::{run_fetch, FetchError};
