// Aggregator - summary tables over normalized sales
//
// Every table is rebuilt from scratch on each pass. Sorted tables use a
// stable sort, so ties keep the order they had before sorting:
// - states: first appearance in the input
// - categories and sellers: alphabetical

use crate::record::Sale;
use chrono::{Datelike, Months, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Calendar number (1..=12) of a month name used in the monthly table
pub fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES.iter().position(|m| *m == name).map(|i| i as u32 + 1)
}

/// Measure - how the price column is reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Measure {
    /// Sum of price
    Revenue,
    /// Count of records
    Volume,
}

impl Measure {
    /// Axis label used on charts
    pub fn label(&self) -> &'static str {
        match self {
            Measure::Revenue => "Receita",
            Measure::Volume => "Vendas",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Accumulator {
    revenue: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, price: f64) {
        self.revenue += price;
        self.count += 1;
    }

    fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Revenue => self.revenue,
            Measure::Volume => self.count as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    /// Last day of the bucket's month
    pub month_end: NaiveDate,
    pub year: i32,
    pub month: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerSummary {
    pub seller: String,
    pub revenue: f64,
    pub sales: usize,
}

impl SellerSummary {
    pub fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Revenue => self.revenue,
            Measure::Volume => self.sales as f64,
        }
    }
}

/// Headline numbers for the metric cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub revenue: f64,
    pub count: usize,
}

pub fn totals(sales: &[Sale]) -> Totals {
    Totals {
        revenue: sales.iter().fold(0.0, |acc, s| acc + s.price),
        count: sales.len(),
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Group by state; coordinates come from the first row of each state.
/// Sorted descending by the measure.
pub fn by_state(sales: &[Sale], measure: Measure) -> Vec<StateSummary> {
    let mut groups: IndexMap<&str, (f64, f64, Accumulator)> = IndexMap::new();

    for sale in sales {
        groups
            .entry(sale.state.as_str())
            .or_insert((sale.lat, sale.lon, Accumulator::default()))
            .2
            .add(sale.price);
    }

    let mut rows: Vec<StateSummary> = groups
        .into_iter()
        .map(|(state, (lat, lon, acc))| StateSummary {
            state: state.to_string(),
            lat,
            lon,
            value: acc.value(measure),
        })
        .collect();

    rows.sort_by(|a, b| descending(a.value, b.value));
    rows
}

/// Bucket by calendar month end, oldest first.
/// Months between the first and last sale with no sales are kept at zero.
pub fn by_month(sales: &[Sale], measure: Measure) -> Vec<MonthSummary> {
    let mut buckets: BTreeMap<(i32, u32), Accumulator> = BTreeMap::new();

    for sale in sales {
        let key = (sale.purchase_date.year(), sale.purchase_date.month());
        buckets.entry(key).or_default().add(sale.price);
    }

    let (first, last) = match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };

    let mut rows = Vec::new();
    let (mut year, mut month) = first;

    while (year, month) <= last {
        let acc = buckets.get(&(year, month)).copied().unwrap_or_default();

        if let Some(month_end) = month_end(year, month) {
            rows.push(MonthSummary {
                month_end,
                year,
                month: MONTH_NAMES[(month - 1) as usize],
                value: acc.value(measure),
            });
        }

        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }

    rows
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// Group by product category, sorted descending by the measure.
pub fn by_category(sales: &[Sale], measure: Measure) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for sale in sales {
        groups.entry(sale.category.as_str()).or_default().add(sale.price);
    }

    let mut rows: Vec<CategorySummary> = groups
        .into_iter()
        .map(|(category, acc)| CategorySummary {
            category: category.to_string(),
            value: acc.value(measure),
        })
        .collect();

    rows.sort_by(|a, b| descending(a.value, b.value));
    rows
}

/// Revenue and sales count per seller, keyed (and ordered) by name.
pub fn by_seller(sales: &[Sale]) -> Vec<SellerSummary> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for sale in sales {
        groups.entry(sale.seller.as_str()).or_default().add(sale.price);
    }

    groups
        .into_iter()
        .map(|(seller, acc)| SellerSummary {
            seller: seller.to_string(),
            revenue: acc.revenue,
            sales: acc.count,
        })
        .collect()
}

/// The `n` best sellers by the given measure.
pub fn top_sellers(table: &[SellerSummary], measure: Measure, n: usize) -> Vec<SellerSummary> {
    let mut rows = table.to_vec();
    rows.sort_by(|a, b| descending(a.value(measure), b.value(measure)));
    rows.truncate(n);
    rows
}

/// First `n` rows of an already sorted table
pub fn top_n<T>(rows: &[T], n: usize) -> &[T] {
    &rows[..n.min(rows.len())]
}
