// Sales Dashboard - Core Library
// Exposes the render pipeline for the TUI, the web server, and tests

pub mod error;
pub mod config;
pub mod logging;
pub mod record;
pub mod filters;      // Filter State: region, year, sellers
pub mod fetcher;      // Fetcher: GET against the sales API
pub mod normalizer;   // Normalizer: dates + seller allow-list
pub mod aggregator;   // Aggregator: summary tables
pub mod charts;       // Chart Builder: chart specs + Plotly figures
pub mod format;
pub mod dashboard;    // View model: one full render pass

// Re-export commonly used types
pub use error::{DashboardError, DashboardResult};
pub use config::Config;
pub use record::{RawRecord, Sale};
pub use filters::{FilterState, Region, TopN};
pub use fetcher::{HttpFetcher, RecordSource, StaticSource};
pub use normalizer::{normalize, seller_options};
pub use aggregator::{
    by_category, by_month, by_seller, by_state, month_number, top_n, top_sellers, totals,
    CategorySummary, Measure, MonthSummary, SellerSummary, StateSummary, Totals,
};
pub use charts::{ChartKind, ChartSpec, Point, Series};
pub use format::format_number;
pub use dashboard::{compute, render_pass, Dashboard, Metric, Section, SectionKind, Summaries};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
