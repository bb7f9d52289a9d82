// Fetcher - one GET against the sales API per render pass
// No retries, no pagination: any failure aborts the pass.

use crate::error::{DashboardError, DashboardResult};
use crate::filters::{FilterState, Region};
use crate::record::RawRecord;
use tracing::{debug, info};

/// RecordSource - where raw sales come from
///
/// The HTTP source is the real one; the static source lets tests and
/// offline runs drive the same pipeline.
pub trait RecordSource: Send + Sync {
    fn fetch(&self, filters: &FilterState) -> DashboardResult<Vec<RawRecord>>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Uses the client's default timeouts
    pub fn new(base_url: impl Into<String>) -> DashboardResult<Self> {
        Ok(Self {
            client: reqwest::blocking::Client::builder().build()?,
            base_url: base_url.into(),
        })
    }
}

impl RecordSource for HttpFetcher {
    fn fetch(&self, filters: &FilterState) -> DashboardResult<Vec<RawRecord>> {
        let params = filters.query_params();
        info!(url = %self.base_url, regiao = %params[0].1, ano = %params[1].1, "fetching sales");

        let response = self.client.get(&self.base_url).query(&params).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let records: Vec<RawRecord> = response.json()?;
        debug!(rows = records.len(), "sales payload decoded");

        Ok(records)
    }
}

/// StaticSource - fixed in-memory records
///
/// The API filters by region and year server-side; this source mimics
/// the year filter (it can read the date) and ignores the region, since
/// records carry only their state.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<RawRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for StaticSource {
    fn fetch(&self, filters: &FilterState) -> DashboardResult<Vec<RawRecord>> {
        if filters.region != Region::Brasil {
            debug!(region = filters.region.name(), "static source ignores region filter");
        }

        let records = match filters.year {
            None => self.records.clone(),
            Some(year) => {
                let suffix = format!("/{}", year);
                self.records
                    .iter()
                    .filter(|r| r.purchase_date.ends_with(&suffix))
                    .cloned()
                    .collect()
            }
        };

        Ok(records)
    }
}
