// Normalizer - parse purchase dates and apply the seller allow-list

use crate::error::{DashboardError, DashboardResult};
use crate::record::{RawRecord, Sale};
use chrono::NaiveDate;
use indexmap::IndexSet;
use std::collections::BTreeSet;
use tracing::debug;

pub const PURCHASE_DATE_FORMAT: &str = "%d/%m/%Y";

pub fn parse_purchase_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), PURCHASE_DATE_FORMAT).ok()
}

/// Turn raw records into sales.
///
/// Every date is parsed before the allow-list is applied, so a bad date
/// aborts the pass even when its row would have been filtered out.
pub fn normalize(raw: &[RawRecord], allow_list: &BTreeSet<String>) -> DashboardResult<Vec<Sale>> {
    let mut sales = Vec::with_capacity(raw.len());

    for (row, record) in raw.iter().enumerate() {
        let purchase_date =
            parse_purchase_date(&record.purchase_date).ok_or_else(|| DashboardError::InvalidDate {
                row,
                value: record.purchase_date.clone(),
            })?;

        sales.push(Sale {
            price: record.price,
            purchase_date,
            state: record.state.clone(),
            lat: record.lat,
            lon: record.lon,
            category: record.category.clone(),
            seller: record.seller.clone(),
        });
    }

    if !allow_list.is_empty() {
        sales.retain(|s| allow_list.contains(&s.seller));
    }

    debug!(input = raw.len(), output = sales.len(), "records normalized");
    Ok(sales)
}

/// Distinct sellers in first-seen order, for the seller picker.
/// Computed on the fetched rows, before any allow-list.
pub fn seller_options(raw: &[RawRecord]) -> Vec<String> {
    raw.iter()
        .map(|r| r.seller.as_str())
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_dates() {
        let raw = vec![RawRecord::new(10.0, "31/12/2022", "SP", "livros", "Ana")];
        let sales = normalize(&raw, &BTreeSet::new()).unwrap();

        assert_eq!(sales[0].purchase_date, NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
    }

    #[test]
    fn test_bad_date_is_fatal() {
        let raw = vec![
            RawRecord::new(10.0, "01/01/2020", "SP", "livros", "Ana"),
            RawRecord::new(10.0, "2020-01-02", "SP", "livros", "Ana"),
        ];

        match normalize(&raw, &BTreeSet::new()) {
            Err(DashboardError::InvalidDate { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "2020-01-02");
            }
            other => panic!("expected InvalidDate, got {:?}", other),
        }
    }

    #[test]
    fn test_month_day_swap_is_rejected() {
        // 13 is not a month: the format is day first
        let raw = vec![RawRecord::new(10.0, "12/13/2020", "SP", "livros", "Ana")];
        assert!(normalize(&raw, &BTreeSet::new()).is_err());
    }

    #[test]
    fn test_bad_date_in_filtered_row_is_still_fatal() {
        let raw = vec![
            RawRecord::new(10.0, "01/01/2020", "SP", "livros", "Ana"),
            RawRecord::new(10.0, "not a date", "SP", "livros", "Bruno"),
        ];
        assert!(normalize(&raw, &allow(&["Ana"])).is_err());
    }

    #[test]
    fn test_allow_list_removes_other_sellers() {
        let raw = vec![
            RawRecord::new(10.0, "01/01/2020", "SP", "livros", "Ana"),
            RawRecord::new(20.0, "02/01/2020", "RJ", "livros", "Bruno"),
            RawRecord::new(30.0, "03/01/2020", "MG", "brinquedos", "Ana"),
            RawRecord::new(40.0, "04/01/2020", "BA", "brinquedos", "Bruno"),
        ];

        let sales = normalize(&raw, &allow(&["Ana"])).unwrap();

        assert_eq!(sales.len(), 2);
        assert!(sales.iter().all(|s| s.seller == "Ana"));
        assert_eq!(sales[0].price, 10.0);
        assert_eq!(sales[1].price, 30.0);
    }

    #[test]
    fn test_empty_allow_list_keeps_everything() {
        let raw = vec![
            RawRecord::new(10.0, "01/01/2020", "SP", "livros", "Ana"),
            RawRecord::new(20.0, "02/01/2020", "RJ", "livros", "Bruno"),
        ];
        assert_eq!(normalize(&raw, &BTreeSet::new()).unwrap().len(), 2);
    }

    #[test]
    fn test_allow_list_is_exact_match() {
        let raw = vec![RawRecord::new(10.0, "01/01/2020", "SP", "livros", "Ana Maria")];
        assert!(normalize(&raw, &allow(&["Ana"])).unwrap().is_empty());
    }

    #[test]
    fn test_seller_options_first_seen_order() {
        let raw = vec![
            RawRecord::new(10.0, "01/01/2020", "SP", "livros", "Bruno"),
            RawRecord::new(20.0, "02/01/2020", "RJ", "livros", "Ana"),
            RawRecord::new(30.0, "03/01/2020", "MG", "livros", "Bruno"),
        ];
        assert_eq!(seller_options(&raw), vec!["Bruno", "Ana"]);
    }
}
