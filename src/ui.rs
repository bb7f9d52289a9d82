use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame, Terminal,
};
use sales_dashboard::{
    filters::{FIRST_YEAR, LAST_YEAR},
    month_number, render_pass, ChartKind, ChartSpec, Dashboard, FilterState, RecordSource, Section, SectionKind, TopN,
};
use std::io;
use tracing::warn;

pub struct App {
    source: Box<dyn RecordSource>,
    pub filters: FilterState,
    pub top: TopN,
    pub current_tab: SectionKind,
    pub dashboard: Option<Dashboard>,
    pub error: Option<String>,
    pub seller_cursor: usize,
    /// Year slider position, kept while "all time" is on
    pub year: i32,
}

impl App {
    pub fn new(source: Box<dyn RecordSource>) -> Self {
        let mut app = Self {
            source,
            filters: FilterState::default(),
            top: TopN::default(),
            current_tab: SectionKind::Revenue,
            dashboard: None,
            error: None,
            seller_cursor: 0,
            year: FIRST_YEAR,
        };
        app.refresh();
        app
    }

    /// Full pass: fetch → normalize → aggregate → charts.
    /// A failed pass shows the error instead of stale charts.
    pub fn refresh(&mut self) {
        match render_pass(self.source.as_ref(), &self.filters, self.top) {
            Ok(dashboard) => {
                self.dashboard = Some(dashboard);
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "render pass failed");
                self.dashboard = None;
                self.error = Some(e.to_string());
            }
        }

        let options = self.seller_options().len();
        if self.seller_cursor >= options {
            self.seller_cursor = options.saturating_sub(1);
        }
    }

    pub fn seller_options(&self) -> &[String] {
        self.dashboard
            .as_ref()
            .map(|d| d.seller_options.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_tab(&mut self) {
        self.current_tab = match self.current_tab {
            SectionKind::Revenue => SectionKind::Volume,
            SectionKind::Volume => SectionKind::Sellers,
            SectionKind::Sellers => SectionKind::Revenue,
        };
    }

    pub fn previous_tab(&mut self) {
        self.current_tab = match self.current_tab {
            SectionKind::Revenue => SectionKind::Sellers,
            SectionKind::Volume => SectionKind::Revenue,
            SectionKind::Sellers => SectionKind::Volume,
        };
    }

    pub fn cycle_region(&mut self) {
        self.filters.region = self.filters.region.next();
        self.refresh();
    }

    pub fn toggle_all_time(&mut self) {
        self.filters.year = match self.filters.year {
            Some(_) => None,
            None => Some(self.year),
        };
        self.refresh();
    }

    /// Moves the year slider; only refetches when a year is selected
    pub fn shift_year(&mut self, delta: i32) {
        self.year = (self.year + delta).clamp(FIRST_YEAR, LAST_YEAR);
        if self.filters.year.is_some() && self.filters.year != Some(self.year) {
            self.filters.year = Some(self.year);
            self.refresh();
        }
    }

    /// Top-N only affects the sellers tab, rebuilt from the seller table
    pub fn set_top(&mut self, top: TopN) {
        self.top = top;
        if let Some(dashboard) = self.dashboard.as_mut() {
            dashboard.set_top_sellers(top);
        }
    }

    pub fn next_seller(&mut self) {
        let len = self.seller_options().len();
        if len > 0 {
            self.seller_cursor = (self.seller_cursor + 1) % len;
        }
    }

    pub fn previous_seller(&mut self) {
        let len = self.seller_options().len();
        if len > 0 {
            self.seller_cursor = (self.seller_cursor + len - 1) % len;
        }
    }

    pub fn toggle_selected_seller(&mut self) {
        let seller = match self.seller_options().get(self.seller_cursor) {
            Some(s) => s.clone(),
            None => return,
        };
        self.filters.toggle_seller(&seller);
        self.refresh();
    }

    pub fn clear_sellers(&mut self) {
        if !self.filters.sellers.is_empty() {
            self.filters.sellers.clear();
            self.refresh();
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => app.next_tab(),
                KeyCode::BackTab => app.previous_tab(),
                KeyCode::Char('r') => app.cycle_region(),
                KeyCode::Char('a') => app.toggle_all_time(),
                KeyCode::Left => app.shift_year(-1),
                KeyCode::Right => app.shift_year(1),
                KeyCode::Char('+') | KeyCode::Char('=') => app.set_top(app.top.increment()),
                KeyCode::Char('-') => app.set_top(app.top.decrement()),
                KeyCode::Down | KeyCode::Char('j') => app.next_seller(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_seller(),
                KeyCode::Char('s') | KeyCode::Char(' ') => app.toggle_selected_seller(),
                KeyCode::Char('c') => app.clear_sellers(),
                KeyCode::Char('R') => app.refresh(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + tabs
            Constraint::Min(0),    // Sidebar + content
            Constraint::Length(3), // Key help
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(chunks[1]);

    render_sidebar(f, body[0], app);

    match (&app.dashboard, &app.error) {
        (_, Some(error)) => render_error(f, body[1], error),
        (Some(dashboard), None) => {
            if let Some(section) = dashboard.section(app.current_tab) {
                render_section(f, body[1], section);
            }
        }
        (None, None) => {}
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "DASHBOARD DE VENDAS  ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    for (i, kind) in SectionKind::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }

        let style = if *kind == app.current_tab {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        spans.push(Span::styled(kind.title(), style));
    }

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let year_text = match app.filters.year {
        Some(y) => format!("{}", y),
        None => format!("todo o período ({})", app.year),
    };

    let mut lines = vec![
        Line::from(vec![Span::styled(" Região: ", label), Span::raw(app.filters.region.name())]),
        Line::from(vec![Span::styled(" Ano: ", label), Span::raw(year_text)]),
        Line::from(vec![Span::styled(" Top vendedores: ", label), Span::raw(app.top.get().to_string())]),
        Line::from(""),
        Line::from(vec![Span::styled(" Vendedores", label)]),
    ];

    for (i, seller) in app.seller_options().iter().enumerate() {
        let checked = if app.filters.sellers.contains(seller) { "[x]" } else { "[ ]" };
        let style = if i == app.seller_cursor {
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(" {} {}", checked, truncate(seller, 22)),
            style,
        )));
    }

    let sidebar = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filtros "),
    );

    f.render_widget(sidebar, area);
}

fn render_error(f: &mut Frame, area: Rect, error: &str) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Change a filter or press R to try again",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Erro "),
    );

    f.render_widget(paragraph, area);
}

fn render_section(f: &mut Frame, area: Rect, section: &Section) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let halves = [(&section.left, 0usize), (&section.right, 1usize)];

    for (charts, idx) in halves {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(column_constraints(charts.len()))
            .split(columns[idx]);

        if let Some(metric) = section.metrics.get(idx) {
            let card = Paragraph::new(Line::from(vec![
                Span::styled(format!(" {}: ", metric.label), Style::default().fg(Color::Cyan)),
                Span::styled(
                    metric.value.trim().to_string(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ]))
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(card, rows[0]);
        }

        for (i, chart) in charts.iter().enumerate() {
            render_chart(f, rows[i + 1], chart);
        }
    }
}

fn column_constraints(charts: usize) -> Vec<Constraint> {
    let mut constraints = vec![Constraint::Length(3)];
    let share = 100 / charts.max(1) as u16;
    constraints.extend(std::iter::repeat(Constraint::Percentage(share)).take(charts));
    constraints
}

fn render_chart(f: &mut Frame, area: Rect, chart: &ChartSpec) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" {} ", chart.title));

    match chart.kind {
        ChartKind::Bar | ChartKind::HorizontalBar => render_bars(f, area, chart, block),
        ChartKind::Line => render_line(f, area, chart, block),
        ChartKind::GeoBubble => render_geo_table(f, area, chart, block),
    }
}

fn render_bars(f: &mut Frame, area: Rect, chart: &ChartSpec, block: Block) {
    let horizontal = chart.kind == ChartKind::HorizontalBar;
    let bars: Vec<Bar> = chart
        .series
        .iter()
        .flat_map(|s| s.points.iter())
        .map(|p| {
            Bar::default()
                .label(Line::from(truncate(&p.label, 14)))
                .value(p.value.max(0.0).round() as u64)
                .text_value(format!("{:.0}", p.value))
        })
        .collect();

    let mut widget = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));

    widget = if horizontal {
        widget.direction(Direction::Horizontal).bar_width(1).bar_gap(0)
    } else {
        widget.bar_width(9).bar_gap(1)
    };

    f.render_widget(widget, area);
}

fn render_line(f: &mut Frame, area: Rect, chart: &ChartSpec, block: Block) {
    const COLORS: [Color; 4] = [Color::Cyan, Color::Yellow, Color::Magenta, Color::Green];

    let points = line_points(chart);

    let max_y = points
        .iter()
        .flat_map(|s| s.iter().map(|(_, y)| *y))
        .fold(0.0, f64::max);

    let datasets: Vec<Dataset> = chart
        .series
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (series, data))| {
            Dataset::default()
                .name(series.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(COLORS[i % COLORS.len()]))
                .data(data)
        })
        .collect();

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(chart.x_label.clone())
                .bounds([0.0, 11.0])
                .labels(vec![Span::raw("Jan"), Span::raw("Jun"), Span::raw("Dec")]),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.clone())
                .bounds([0.0, max_y.max(1.0)])
                .labels(vec![Span::raw("0"), Span::raw(format!("{:.0}", max_y))]),
        );

    f.render_widget(widget, area);
}

/// One (x, y) list per year, x being the month's slot on the Jan..Dec axis
fn line_points(chart: &ChartSpec) -> Vec<Vec<(f64, f64)>> {
    chart
        .series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .filter_map(|p| month_number(&p.label).map(|m| ((m - 1) as f64, p.value)))
                .collect()
        })
        .collect()
}

fn render_geo_table(f: &mut Frame, area: Rect, chart: &ChartSpec, block: Block) {
    let header = Row::new(["Estado", "Lat", "Lon", chart.series.first().map(|s| s.name.as_str()).unwrap_or("")])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows = chart.series.iter().flat_map(|s| s.points.iter()).map(|p| {
        let (lat, lon) = p.coordinates.unwrap_or_default();
        Row::new(vec![
            Cell::from(p.label.clone()),
            Cell::from(format!("{:.2}", lat)),
            Cell::from(format!("{:.2}", lon)),
            Cell::from(format!("{:.2}", p.value)).style(Style::default().fg(Color::Green)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = Style::default().fg(Color::Yellow);
    let mut spans = vec![];

    if let Some(dashboard) = &app.dashboard {
        spans.push(Span::styled(
            format!(" Rows: {} ", dashboard.totals.count),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::raw("| "));
    }

    for (k, label) in [
        ("Tab", " Aba | "),
        ("r", " Região | "),
        ("a", " Período | "),
        ("←/→", " Ano | "),
        ("+/-", " Top N | "),
        ("↑/↓ s", " Vendedor | "),
        ("c", " Limpar | "),
    ] {
        spans.push(Span::styled(k, key));
        spans.push(Span::raw(label));
    }
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Sair"));

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
