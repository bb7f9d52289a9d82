// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use sales_dashboard::{
    logging, render_pass, Config, Dashboard, FilterState, HttpFetcher, Region, SectionKind, TopN,
};
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "summary" {
        logging::init();
        run_summary(&args[2..])?;
    } else {
        // UI mode (default)
        logging::init_quiet();
        run_ui_mode()?;
    }

    Ok(())
}

/// `summary [--regiao R] [--ano Y] [--vendedor NAME]... [--top N]`
fn parse_summary_args(args: &[String]) -> Result<(FilterState, TopN)> {
    let mut region = Region::Brasil;
    let mut year = None;
    let mut sellers = Vec::new();
    let mut top = TopN::default();

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .with_context(|| format!("missing value for {}", flag))?;

        match flag.as_str() {
            "--regiao" => region = value.parse()?,
            "--ano" => {
                let y: i32 = value
                    .parse()
                    .with_context(|| format!("invalid year: {}", value))?;
                year = Some(y);
            }
            "--vendedor" => sellers.push(value.clone()),
            "--top" => {
                let n: usize = value
                    .parse()
                    .with_context(|| format!("invalid seller count: {}", value))?;
                top = TopN::new(n)?;
            }
            other => bail!("unknown option: {}", other),
        }
    }

    let filters = FilterState::new(region, year)?.with_sellers(sellers);
    Ok((filters, top))
}

fn run_summary(args: &[String]) -> Result<()> {
    let (filters, top) = parse_summary_args(args)?;
    let config = Config::from_env();

    let fetcher = HttpFetcher::new(&config.api_url)?;
    let dashboard = render_pass(&fetcher, &filters, top).context("render pass failed")?;

    print!("{}", summary_report(&dashboard));
    Ok(())
}

fn summary_report(dashboard: &Dashboard) -> String {
    let mut out = String::new();

    out.push_str("DASHBOARD DE VENDAS\n");
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str(&format!(
        "Região: {}  |  Ano: {}\n",
        dashboard.filters.region.name(),
        dashboard
            .filters
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "todo o período".to_string())
    ));

    for kind in SectionKind::ALL {
        let section = match dashboard.section(kind) {
            Some(s) => s,
            None => continue,
        };

        out.push_str(&format!("\n== {} ==\n", section.title));
        for metric in &section.metrics {
            out.push_str(&format!("  {}: {}\n", metric.label, metric.value.trim()));
        }

        for chart in section.left.iter().chain(section.right.iter()) {
            out.push_str(&format!("\n  {}\n", chart.title));
            for series in &chart.series {
                for point in &series.points {
                    let label = if chart.series.len() > 1 {
                        format!("{} {}", point.label, series.name)
                    } else {
                        point.label.clone()
                    };
                    out.push_str(&format!("    {:<28} {:>14.2}\n", label, point.value));
                }
            }
        }
    }

    out
}

#[cfg(feature = "tui")]
fn run_ui_mode() -> Result<()> {
    let config = Config::from_env();
    println!("🖥️  Loading Sales Dashboard from {}...\n", config.api_url);

    let fetcher = HttpFetcher::new(&config.api_url)?;

    // First pass happens here; errors are shown inside the UI
    let mut app = ui::App::new(Box::new(fetcher));
    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin dashboard-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_dashboard::{compute, RawRecord};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_summary_defaults() {
        let (filters, top) = parse_summary_args(&[]).unwrap();
        assert_eq!(filters, FilterState::default());
        assert_eq!(top, TopN::default());
    }

    #[test]
    fn test_parse_summary_all_flags() {
        let (filters, top) = parse_summary_args(&args(&[
            "--regiao", "Sudeste", "--ano", "2022", "--vendedor", "Ana", "--vendedor", "Bruno", "--top", "3",
        ]))
        .unwrap();

        assert_eq!(filters.region, Region::Sudeste);
        assert_eq!(filters.year, Some(2022));
        assert_eq!(filters.sellers.len(), 2);
        assert_eq!(top.get(), 3);
    }

    #[test]
    fn test_parse_summary_rejects_bad_input() {
        assert!(parse_summary_args(&args(&["--ano", "2019"])).is_err());
        assert!(parse_summary_args(&args(&["--top", "11"])).is_err());
        assert!(parse_summary_args(&args(&["--regiao"])).is_err());
        assert!(parse_summary_args(&args(&["--cidade", "x"])).is_err());
    }

    #[test]
    fn test_summary_report_lists_sections() {
        let records = vec![
            RawRecord::new(100.0, "10/01/2021", "SP", "livros", "Ana"),
            RawRecord::new(50.0, "11/01/2021", "RJ", "livros", "Bruno"),
        ];
        let dashboard = compute(&records, &FilterState::default(), TopN::default()).unwrap();

        let report = summary_report(&dashboard);

        assert!(report.contains("== Receita =="));
        assert!(report.contains("== Quantidade de vendas =="));
        assert!(report.contains("== Vendedores =="));
        assert!(report.contains("Receita: R$ 150.00"));
        assert!(report.contains("Top 5 vendedores (Receita)"));
    }
}
