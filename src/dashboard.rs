// Dashboard - one full render pass
//
// filter state changed → fetch → normalize → aggregate → charts.
// `compute` is pure; `render_pass` adds the single fetch in front of it.

use crate::aggregator::{self, CategorySummary, Measure, MonthSummary, SellerSummary, StateSummary, Totals};
use crate::charts::{self, ChartSpec};
use crate::error::DashboardResult;
use crate::fetcher::RecordSource;
use crate::filters::{FilterState, TopN};
use crate::format::format_number;
use crate::normalizer::{normalize, seller_options};
use crate::record::{RawRecord, Sale};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
}

/// Which tab a section belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Revenue,
    Volume,
    Sellers,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [SectionKind::Revenue, SectionKind::Volume, SectionKind::Sellers];

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Revenue => "Receita",
            SectionKind::Volume => "Quantidade de vendas",
            SectionKind::Sellers => "Vendedores",
        }
    }
}

/// One tab: metrics over two columns of charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: &'static str,
    pub metrics: Vec<Metric>,
    pub left: Vec<ChartSpec>,
    pub right: Vec<ChartSpec>,
}

/// Every summary table of a pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summaries {
    pub revenue_by_state: Vec<StateSummary>,
    pub volume_by_state: Vec<StateSummary>,
    pub revenue_by_month: Vec<MonthSummary>,
    pub volume_by_month: Vec<MonthSummary>,
    pub revenue_by_category: Vec<CategorySummary>,
    pub volume_by_category: Vec<CategorySummary>,
    pub sellers: Vec<SellerSummary>,
}

impl Summaries {
    pub fn build(sales: &[Sale]) -> Self {
        Summaries {
            revenue_by_state: aggregator::by_state(sales, Measure::Revenue),
            volume_by_state: aggregator::by_state(sales, Measure::Volume),
            revenue_by_month: aggregator::by_month(sales, Measure::Revenue),
            volume_by_month: aggregator::by_month(sales, Measure::Volume),
            revenue_by_category: aggregator::by_category(sales, Measure::Revenue),
            volume_by_category: aggregator::by_category(sales, Measure::Volume),
            sellers: aggregator::by_seller(sales),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub filters: FilterState,
    pub top_sellers: TopN,
    pub totals: Totals,
    /// Sellers found in the fetched data, before the allow-list
    pub seller_options: Vec<String>,
    pub summaries: Summaries,
    pub sections: Vec<Section>,
}

impl Dashboard {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Rebuild only the sellers tab for a new top-N value
    pub fn set_top_sellers(&mut self, top: TopN) {
        self.top_sellers = top;
        let sellers = seller_section(&self.summaries.sellers, self.totals, top);
        if let Some(section) = self.sections.iter_mut().find(|s| s.kind == SectionKind::Sellers) {
            *section = sellers;
        }
    }
}

pub fn metrics(totals: Totals) -> Vec<Metric> {
    vec![
        Metric {
            label: "Receita",
            value: format_number(totals.revenue, "R$"),
        },
        Metric {
            label: "Quantidade de vendas",
            value: format_number(totals.count as f64, ""),
        },
    ]
}

fn measure_section(kind: SectionKind, measure: Measure, summaries: &Summaries, totals: Totals) -> Section {
    let (states, months, categories) = match measure {
        Measure::Revenue => (
            &summaries.revenue_by_state,
            &summaries.revenue_by_month,
            &summaries.revenue_by_category,
        ),
        Measure::Volume => (
            &summaries.volume_by_state,
            &summaries.volume_by_month,
            &summaries.volume_by_category,
        ),
    };

    Section {
        kind,
        title: kind.title(),
        metrics: metrics(totals),
        left: vec![
            charts::state_map(states, measure),
            charts::top_states_bar(states, measure),
        ],
        right: vec![
            charts::monthly_line(months, measure),
            charts::category_bar(categories, measure),
        ],
    }
}

/// Sellers tab: the two top-N bar charts
pub fn seller_section(table: &[SellerSummary], totals: Totals, top: TopN) -> Section {
    let n = top.get();
    let by_revenue = aggregator::top_sellers(table, Measure::Revenue, n);
    let by_volume = aggregator::top_sellers(table, Measure::Volume, n);

    Section {
        kind: SectionKind::Sellers,
        title: SectionKind::Sellers.title(),
        metrics: metrics(totals),
        left: vec![charts::seller_bar(&by_revenue, Measure::Revenue, n)],
        right: vec![charts::seller_bar(&by_volume, Measure::Volume, n)],
    }
}

/// Pure pipeline from fetched records to a full dashboard.
pub fn compute(records: &[RawRecord], filters: &FilterState, top: TopN) -> DashboardResult<Dashboard> {
    let options = seller_options(records);
    let sales = normalize(records, &filters.sellers)?;

    let totals = aggregator::totals(&sales);
    let summaries = Summaries::build(&sales);

    let sections = vec![
        measure_section(SectionKind::Revenue, Measure::Revenue, &summaries, totals),
        measure_section(SectionKind::Volume, Measure::Volume, &summaries, totals),
        seller_section(&summaries.sellers, totals, top),
    ];

    Ok(Dashboard {
        filters: filters.clone(),
        top_sellers: top,
        totals,
        seller_options: options,
        summaries,
        sections,
    })
}

/// Fetch, then compute. Any error aborts the whole pass.
pub fn render_pass(source: &dyn RecordSource, filters: &FilterState, top: TopN) -> DashboardResult<Dashboard> {
    let started = Instant::now();

    let records = source.fetch(filters)?;
    let dashboard = compute(&records, filters, top)?;

    info!(
        region = filters.region.name(),
        year = ?filters.year,
        sellers = filters.sellers.len(),
        rows = dashboard.totals.count,
        "render pass complete"
    );
    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "render pass timing");

    Ok(dashboard)
}
