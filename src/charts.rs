// Chart Builder - summary tables → chart specifications
//
// No computation happens here beyond picking rows and labels; the
// aggregator already produced the numbers. `to_plotly` turns a spec into
// a Plotly figure for the browser front-end.

use crate::aggregator::{
    top_n, CategorySummary, Measure, MonthSummary, SellerSummary, StateSummary,
};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

/// Rows shown by the "top" bar charts of the revenue and volume tabs
pub const TOP_ROWS: usize = 5;

const LINE_DASHES: [&str; 5] = ["solid", "dot", "dash", "longdash", "dashdot"];
const MAX_BUBBLE_PX: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    GeoBubble,
    Line,
    Bar,
    HorizontalBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub value: f64,
    /// Only set on geo charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl ChartSpec {
    /// One series, named after the measure it plots
    fn single(
        kind: ChartKind,
        title: String,
        x_label: &str,
        y_label: &str,
        measure: Measure,
        points: Vec<Point>,
    ) -> Self {
        ChartSpec {
            kind,
            title,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: vec![Series {
                name: measure.label().to_string(),
                points,
            }],
        }
    }

    /// Number of points across all series (bars, markers or bubbles)
    pub fn len(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Plotly figure (`{"data": [...], "layout": {...}}`)
    pub fn to_plotly(&self) -> Value {
        let data: Vec<Value> = match self.kind {
            ChartKind::GeoBubble => self.series.iter().map(geo_trace).collect(),
            ChartKind::Line => self
                .series
                .iter()
                .enumerate()
                .map(|(i, s)| line_trace(s, LINE_DASHES[i % LINE_DASHES.len()]))
                .collect(),
            ChartKind::Bar => self.series.iter().map(|s| bar_trace(s, false)).collect(),
            ChartKind::HorizontalBar => self.series.iter().map(|s| bar_trace(s, true)).collect(),
        };

        let mut layout = json!({
            "title": { "text": self.title },
            "template": "seaborn",
            "xaxis": { "title": { "text": self.x_label } },
            "yaxis": { "title": { "text": self.y_label } },
        });

        match self.kind {
            ChartKind::GeoBubble => {
                layout["geo"] = json!({ "scope": "south america" });
            }
            ChartKind::Line => {
                layout["yaxis"]["rangemode"] = json!("tozero");
            }
            ChartKind::HorizontalBar => {
                // Best seller on top
                layout["yaxis"]["autorange"] = json!("reversed");
            }
            ChartKind::Bar => {}
        }

        json!({ "data": data, "layout": layout })
    }
}

fn labels(series: &Series) -> Vec<&str> {
    series.points.iter().map(|p| p.label.as_str()).collect()
}

fn values(series: &Series) -> Vec<f64> {
    series.points.iter().map(|p| p.value).collect()
}

fn geo_trace(series: &Series) -> Value {
    let (lat, lon): (Vec<f64>, Vec<f64>) = series
        .points
        .iter()
        .map(|p| p.coordinates.unwrap_or_default())
        .unzip();

    let max = series.points.iter().map(|p| p.value).fold(0.0, f64::max);
    let sizeref = if max > 0.0 {
        2.0 * max / (MAX_BUBBLE_PX * MAX_BUBBLE_PX)
    } else {
        1.0
    };

    json!({
        "type": "scattergeo",
        "name": series.name,
        "lat": lat,
        "lon": lon,
        "hovertext": labels(series),
        "customdata": values(series),
        "hovertemplate": "<b>%{hovertext}</b><br>%{customdata}<extra></extra>",
        "marker": {
            "size": values(series),
            "sizemode": "area",
            "sizeref": sizeref,
        },
    })
}

fn line_trace(series: &Series, dash: &str) -> Value {
    json!({
        "type": "scatter",
        "mode": "lines+markers",
        "name": series.name,
        "x": labels(series),
        "y": values(series),
        "line": { "dash": dash },
    })
}

fn bar_trace(series: &Series, horizontal: bool) -> Value {
    let (x, y) = if horizontal {
        (json!(values(series)), json!(labels(series)))
    } else {
        (json!(labels(series)), json!(values(series)))
    };

    json!({
        "type": "bar",
        "name": series.name,
        "orientation": if horizontal { "h" } else { "v" },
        "x": x,
        "y": y,
        "text": values(series),
        "textposition": "auto",
    })
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Bubble map of every state, bubble size = measure
pub fn state_map(table: &[StateSummary], measure: Measure) -> ChartSpec {
    let title = match measure {
        Measure::Revenue => "Receita por estado",
        Measure::Volume => "Vendas por estado",
    };

    let points = table
        .iter()
        .map(|row| Point {
            label: row.state.clone(),
            value: row.value,
            coordinates: Some((row.lat, row.lon)),
        })
        .collect();

    ChartSpec::single(ChartKind::GeoBubble, title.to_string(), "lon", "lat", measure, points)
}

/// One line per year, x = month name
pub fn monthly_line(table: &[MonthSummary], measure: Measure) -> ChartSpec {
    let title = match measure {
        Measure::Revenue => "Receita mensal",
        Measure::Volume => "Vendas mensais",
    };

    let mut by_year: IndexMap<i32, Vec<Point>> = IndexMap::new();
    for row in table {
        by_year.entry(row.year).or_default().push(Point {
            label: row.month.to_string(),
            value: row.value,
            coordinates: None,
        });
    }

    ChartSpec {
        kind: ChartKind::Line,
        title: title.to_string(),
        x_label: "Mes".to_string(),
        y_label: measure.label().to_string(),
        series: by_year
            .into_iter()
            .map(|(year, points)| Series {
                name: year.to_string(),
                points,
            })
            .collect(),
    }
}

/// First `TOP_ROWS` states of a descending table
pub fn top_states_bar(table: &[StateSummary], measure: Measure) -> ChartSpec {
    let title = match measure {
        Measure::Revenue => "Top estados (Receita)",
        Measure::Volume => "Top estados (vendas)",
    };

    let points = top_n(table, TOP_ROWS)
        .iter()
        .map(|row| Point {
            label: row.state.clone(),
            value: row.value,
            coordinates: None,
        })
        .collect();

    ChartSpec::single(ChartKind::Bar, title.to_string(), "Local da compra", measure.label(), measure, points)
}

/// First `TOP_ROWS` categories of a descending table
pub fn category_bar(table: &[CategorySummary], measure: Measure) -> ChartSpec {
    let title = match measure {
        Measure::Revenue => "Receita por categoria",
        Measure::Volume => "Vendas por categoria",
    };

    let points = top_n(table, TOP_ROWS)
        .iter()
        .map(|row| Point {
            label: row.category.clone(),
            value: row.value,
            coordinates: None,
        })
        .collect();

    ChartSpec::single(ChartKind::Bar, title.to_string(), "Categoria do Produto", measure.label(), measure, points)
}

/// Horizontal bars for an already selected top-N seller list
pub fn seller_bar(top: &[SellerSummary], measure: Measure, n: usize) -> ChartSpec {
    let title = match measure {
        Measure::Revenue => format!("Top {} vendedores (Receita)", n),
        Measure::Volume => format!("Top {} vendedores (Vendas)", n),
    };

    let points = top
        .iter()
        .map(|row| Point {
            label: row.seller.clone(),
            value: row.value(measure),
            coordinates: None,
        })
        .collect();

    ChartSpec::single(ChartKind::HorizontalBar, title, measure.label(), "Vendedor", measure, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn state(name: &str, value: f64) -> StateSummary {
        StateSummary {
            state: name.to_string(),
            lat: -10.0,
            lon: -50.0,
            value,
        }
    }

    fn month(year: i32, m: u32, name: &'static str, value: f64) -> MonthSummary {
        MonthSummary {
            month_end: NaiveDate::from_ymd_opt(year, m, 28).unwrap(),
            year,
            month: name,
            value,
        }
    }

    #[test]
    fn test_state_map_keeps_every_state() {
        let table: Vec<_> = (0..8).map(|i| state(&format!("S{}", i), 8.0 - i as f64)).collect();
        let chart = state_map(&table, Measure::Revenue);

        assert_eq!(chart.kind, ChartKind::GeoBubble);
        assert_eq!(chart.title, "Receita por estado");
        assert_eq!(chart.len(), 8);
        assert_eq!(chart.series[0].points[0].coordinates, Some((-10.0, -50.0)));
        assert_eq!(chart.series[0].name, "Receita");
        assert_eq!(state_map(&table, Measure::Volume).series[0].name, "Vendas");
    }

    #[test]
    fn test_top_states_bar_takes_five() {
        let table: Vec<_> = (0..8).map(|i| state(&format!("S{}", i), 8.0 - i as f64)).collect();
        let chart = top_states_bar(&table, Measure::Volume);

        assert_eq!(chart.title, "Top estados (vendas)");
        assert_eq!(chart.y_label, "Vendas");
        assert_eq!(chart.len(), 5);
        assert_eq!(chart.series[0].points[0].label, "S0");
    }

    #[test]
    fn test_monthly_line_one_series_per_year() {
        let table = vec![
            month(2021, 11, "November", 1.0),
            month(2021, 12, "December", 2.0),
            month(2022, 1, "January", 3.0),
        ];

        let chart = monthly_line(&table, Measure::Revenue);

        assert_eq!(chart.title, "Receita mensal");
        assert_eq!(chart.y_label, "Receita");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "2021");
        assert_eq!(chart.series[0].points.len(), 2);
        assert_eq!(chart.series[1].name, "2022");
    }

    #[test]
    fn test_category_bar_labels() {
        let table = vec![CategorySummary {
            category: "livros".to_string(),
            value: 10.0,
        }];

        let chart = category_bar(&table, Measure::Revenue);

        assert_eq!(chart.title, "Receita por categoria");
        assert_eq!(chart.y_label, "Receita");
        assert_eq!(chart.len(), 1);
    }

    #[test]
    fn test_seller_bar_title_and_values() {
        let top = vec![SellerSummary {
            seller: "Ana".to_string(),
            revenue: 300.0,
            sales: 3,
        }];

        let revenue = seller_bar(&top, Measure::Revenue, 7);
        let volume = seller_bar(&top, Measure::Volume, 7);

        assert_eq!(revenue.title, "Top 7 vendedores (Receita)");
        assert_eq!(volume.title, "Top 7 vendedores (Vendas)");
        assert_eq!(revenue.series[0].points[0].value, 300.0);
        assert_eq!(volume.series[0].points[0].value, 3.0);
    }

    #[test]
    fn test_plotly_bar_figure() {
        let table = vec![state("SP", 300.0), state("RJ", 50.0)];
        let fig = top_states_bar(&table, Measure::Revenue).to_plotly();

        assert_eq!(fig["data"][0]["type"], "bar");
        assert_eq!(fig["data"][0]["x"], json!(["SP", "RJ"]));
        assert_eq!(fig["data"][0]["y"], json!([300.0, 50.0]));
        assert_eq!(fig["layout"]["title"]["text"], "Top estados (Receita)");
        assert_eq!(fig["layout"]["yaxis"]["title"]["text"], "Receita");
    }

    #[test]
    fn test_plotly_horizontal_bar_swaps_axes() {
        let top = vec![SellerSummary {
            seller: "Ana".to_string(),
            revenue: 300.0,
            sales: 3,
        }];
        let fig = seller_bar(&top, Measure::Revenue, 5).to_plotly();

        assert_eq!(fig["data"][0]["orientation"], "h");
        assert_eq!(fig["data"][0]["y"], json!(["Ana"]));
        assert_eq!(fig["data"][0]["x"], json!([300.0]));
    }

    #[test]
    fn test_plotly_geo_and_line_layout() {
        let geo = state_map(&[state("SP", 10.0)], Measure::Revenue).to_plotly();
        assert_eq!(geo["layout"]["geo"]["scope"], "south america");
        assert_eq!(geo["data"][0]["lat"], json!([-10.0]));

        let line = monthly_line(&[month(2020, 1, "January", 1.0)], Measure::Volume).to_plotly();
        assert_eq!(line["layout"]["yaxis"]["rangemode"], "tozero");
        assert_eq!(line["data"][0]["mode"], "lines+markers");
    }

    #[test]
    fn test_empty_tables_give_empty_charts() {
        assert!(state_map(&[], Measure::Revenue).is_empty());
        assert!(monthly_line(&[], Measure::Revenue).series.is_empty());
        assert!(top_states_bar(&[], Measure::Revenue).is_empty());
    }
}
