// Filter State - region, year and seller allow-list
// Drives the query sent to the sales API and the normalizer's row filter.

use crate::error::{DashboardError, DashboardResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

pub const FIRST_YEAR: i32 = 2020;
pub const LAST_YEAR: i32 = 2023;

pub const MIN_TOP_SELLERS: usize = 2;
pub const MAX_TOP_SELLERS: usize = 10;
pub const DEFAULT_TOP_SELLERS: usize = 5;

/// Region - geographic grouping of states, as offered in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Region {
    /// The whole country, i.e. no region filter
    #[default]
    Brasil,
    #[serde(rename = "Centro-Oeste")]
    CentroOeste,
    Nordeste,
    Norte,
    Sudeste,
    Sul,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Brasil,
        Region::CentroOeste,
        Region::Nordeste,
        Region::Norte,
        Region::Sudeste,
        Region::Sul,
    ];

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            Region::Brasil => "Brasil",
            Region::CentroOeste => "Centro-Oeste",
            Region::Nordeste => "Nordeste",
            Region::Norte => "Norte",
            Region::Sudeste => "Sudeste",
            Region::Sul => "Sul",
        }
    }

    /// Value of the `regiao` query parameter ("" means every region)
    pub fn query_value(&self) -> String {
        match self {
            Region::Brasil => String::new(),
            other => other.name().to_lowercase(),
        }
    }

    pub fn next(&self) -> Self {
        let idx = Region::ALL.iter().position(|r| r == self).unwrap_or(0);
        Region::ALL[(idx + 1) % Region::ALL.len()]
    }
}

impl FromStr for Region {
    type Err = DashboardError;

    /// Accepts the display name or the query value, case-insensitively.
    /// The empty string selects Brasil.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if wanted.is_empty() {
            return Ok(Region::Brasil);
        }
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.name().to_lowercase() == wanted)
            .ok_or_else(|| DashboardError::InvalidRegion(s.to_string()))
    }
}

/// Number of sellers shown in the sellers tab, bounded to 2..=10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct TopN(usize);

impl TopN {
    pub fn new(n: usize) -> DashboardResult<Self> {
        if (MIN_TOP_SELLERS..=MAX_TOP_SELLERS).contains(&n) {
            Ok(TopN(n))
        } else {
            Err(DashboardError::InvalidTopN(n))
        }
    }

    /// Like `new`, but pins out-of-range values to the nearest bound
    pub fn clamped(n: usize) -> Self {
        TopN(n.clamp(MIN_TOP_SELLERS, MAX_TOP_SELLERS))
    }

    pub fn get(&self) -> usize {
        self.0
    }

    pub fn increment(&self) -> Self {
        TopN::clamped(self.0 + 1)
    }

    pub fn decrement(&self) -> Self {
        TopN::clamped(self.0.saturating_sub(1))
    }
}

impl Default for TopN {
    fn default() -> Self {
        TopN(DEFAULT_TOP_SELLERS)
    }
}

impl TryFrom<usize> for TopN {
    type Error = DashboardError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        TopN::new(n)
    }
}

impl From<TopN> for usize {
    fn from(n: TopN) -> usize {
        n.0
    }
}

/// Everything the user can change in the sidebar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub region: Region,
    /// None = whole period
    pub year: Option<i32>,
    /// Empty = no seller filtering
    pub sellers: BTreeSet<String>,
}

impl FilterState {
    pub fn new(region: Region, year: Option<i32>) -> DashboardResult<Self> {
        if let Some(y) = year {
            validate_year(y)?;
        }
        Ok(FilterState {
            region,
            year,
            sellers: BTreeSet::new(),
        })
    }

    /// Builder pattern: add sellers to the allow-list
    pub fn with_sellers<I, S>(mut self, sellers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sellers.extend(sellers.into_iter().map(Into::into));
        self
    }

    /// Query parameters for the sales API: `regiao` and `ano`,
    /// each empty when the filter means "all".
    pub fn query_params(&self) -> [(&'static str, String); 2] {
        [
            ("regiao", self.region.query_value()),
            ("ano", self.year.map(|y| y.to_string()).unwrap_or_default()),
        ]
    }

    pub fn toggle_seller(&mut self, seller: &str) {
        if !self.sellers.remove(seller) {
            self.sellers.insert(seller.to_string());
        }
    }
}

pub fn validate_year(year: i32) -> DashboardResult<i32> {
    if (FIRST_YEAR..=LAST_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(DashboardError::InvalidYear(year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_is_all_empty() {
        let filters = FilterState::default();
        let params = filters.query_params();

        assert_eq!(params[0], ("regiao", String::new()));
        assert_eq!(params[1], ("ano", String::new()));
    }

    #[test]
    fn test_query_for_every_region_and_year() {
        for region in Region::ALL {
            for year in [None, Some(2020), Some(2021), Some(2022), Some(2023)] {
                let filters = FilterState::new(region, year).unwrap();
                let [(rk, rv), (ak, av)] = filters.query_params();

                assert_eq!(rk, "regiao");
                assert_eq!(ak, "ano");

                if region == Region::Brasil {
                    assert_eq!(rv, "");
                } else {
                    assert_eq!(rv, region.name().to_lowercase());
                }

                match year {
                    None => assert_eq!(av, ""),
                    Some(y) => assert_eq!(av, y.to_string()),
                }
            }
        }
    }

    #[test]
    fn test_region_query_values() {
        assert_eq!(Region::CentroOeste.query_value(), "centro-oeste");
        assert_eq!(Region::Sudeste.query_value(), "sudeste");
        assert_eq!(Region::Brasil.query_value(), "");
    }

    #[test]
    fn test_region_from_str() {
        assert_eq!("Centro-Oeste".parse::<Region>().unwrap(), Region::CentroOeste);
        assert_eq!("nordeste".parse::<Region>().unwrap(), Region::Nordeste);
        assert_eq!("".parse::<Region>().unwrap(), Region::Brasil);
        assert!("Atlantis".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_cycle_wraps() {
        assert_eq!(Region::Brasil.next(), Region::CentroOeste);
        assert_eq!(Region::Sul.next(), Region::Brasil);
    }

    #[test]
    fn test_year_bounds() {
        assert!(FilterState::new(Region::Sul, Some(2019)).is_err());
        assert!(FilterState::new(Region::Sul, Some(2024)).is_err());
        assert!(FilterState::new(Region::Sul, Some(2020)).is_ok());
    }

    #[test]
    fn test_top_n_bounds() {
        assert_eq!(TopN::default().get(), 5);
        assert!(TopN::new(1).is_err());
        assert!(TopN::new(11).is_err());
        assert_eq!(TopN::new(10).unwrap().get(), 10);
        assert_eq!(TopN::clamped(0).get(), 2);
        assert_eq!(TopN::clamped(99).get(), 10);
        assert_eq!(TopN::new(10).unwrap().increment().get(), 10);
        assert_eq!(TopN::new(2).unwrap().decrement().get(), 2);
    }

    #[test]
    fn test_toggle_seller() {
        let mut filters = FilterState::default();
        filters.toggle_seller("Ana");
        assert!(filters.sellers.contains("Ana"));
        filters.toggle_seller("Ana");
        assert!(filters.sellers.is_empty());
    }
}
