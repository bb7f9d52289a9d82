use thiserror::Error;

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Every way a render pass can fail. None of them are retried: the pass
/// is aborted and the front-end shows the error instead of partial data.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("request to sales API failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("sales API answered {status} for {url}")]
    Status { status: u16, url: String },

    #[error("row {row}: purchase date {value:?} is not DD/MM/YYYY")]
    InvalidDate { row: usize, value: String },

    #[error("unknown region: {0}")]
    InvalidRegion(String),

    #[error("year {0} is outside 2020..=2023")]
    InvalidYear(i32),

    #[error("not a year: {0:?}")]
    UnparsableYear(String),

    #[error("seller list is not a JSON array of names: {0}")]
    InvalidSellerList(String),

    #[error("seller count {0} is outside 2..=10")]
    InvalidTopN(usize),
}

impl DashboardError {
    /// True for errors caused by the upstream API rather than by the input.
    pub fn is_upstream(&self) -> bool {
        matches!(self, DashboardError::Fetch(_) | DashboardError::Status { .. })
    }
}
