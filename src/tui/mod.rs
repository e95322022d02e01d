//! Ratatui-based terminal UI.
//!
//! The TUI provides a selector panel for the eight categorical market fields
//! and the prediction date, then renders the predicted price and the
//! historical trend chart for the selected commodity/region/market.

use std::io;
use std::time::Duration;

use chrono::Datelike;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::{pipeline, selection_from_args};
use crate::cli::PredictArgs;
use crate::data::history::HistoryData;
use crate::domain::{Field, MarketSelection, PredictOutput, PredictRequest};
use crate::error::AppError;
use crate::report::fmt_price;
use crate::store::{HISTORY_FILE, ReferenceStore, resolve_assets_dir};

mod plotters_chart;

use plotters_chart::TrendChart;

/// Rows in the selector panel: the eight catalogs plus year/month/day.
const FIELD_COUNT: usize = 11;

const YEAR_RANGE: (i32, i32) = (2000, 2050);

/// Start the TUI.
pub fn run(args: PredictArgs) -> Result<(), AppError> {
    let mut app = App::new(&args)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    store: ReferenceStore,
    data: HistoryData,
    /// Selected option index per categorical field (aligned with `Field::ALL`).
    selection_idx: [usize; 8],
    year: i32,
    month: u32,
    day: u32,
    selected_field: usize,
    status: String,
    run: Option<PredictOutput>,
}

impl App {
    fn new(args: &PredictArgs) -> Result<Self, AppError> {
        let assets = resolve_assets_dir(args.assets.as_deref());
        let store = ReferenceStore::load(&assets)?;
        let data = crate::data::load_history(&assets.join(HISTORY_FILE))?;

        // Seed the selectors from the CLI flags (first catalog option when
        // unset or unknown).
        let initial = selection_from_args(&data.catalog, args);
        let mut selection_idx = [0usize; 8];
        for (slot, field) in selection_idx.iter_mut().zip(Field::ALL) {
            *slot = data
                .catalog
                .options(field)
                .iter()
                .position(|v| v == initial.value(field))
                .unwrap_or(0);
        }

        let status = if data.row_errors.is_empty() {
            "Ready. Press Enter to predict.".to_string()
        } else {
            format!(
                "Ready ({} malformed rows skipped). Press Enter to predict.",
                data.row_errors.len()
            )
        };

        Ok(Self {
            store,
            data,
            selection_idx,
            year: args.year,
            month: args.month,
            day: args.day,
            selected_field: 0,
            status,
            run: None,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_COUNT - 1 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter | KeyCode::Char('p') => self.predict(),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i64) {
        match self.selected_field {
            idx @ 0..=7 => {
                let field = Field::ALL[idx];
                let n = self.data.catalog.options(field).len();
                if n == 0 {
                    return;
                }
                let cur = self.selection_idx[idx];
                self.selection_idx[idx] = if delta >= 0 {
                    (cur + 1) % n
                } else {
                    (cur + n - 1) % n
                };
                self.status = format!(
                    "{}: {}",
                    field.display_name(),
                    self.current_value(field)
                );
            }
            8 => {
                self.year = (self.year + delta as i32).clamp(YEAR_RANGE.0, YEAR_RANGE.1);
                self.status = format!("Year: {}", self.year);
            }
            9 => {
                self.month = add_clamped(self.month, delta, 1, 12);
                self.status = format!("Month: {}", self.month);
            }
            10 => {
                self.day = add_clamped(self.day, delta, 1, 31);
                self.status = format!("Day: {}", self.day);
            }
            _ => {}
        }
    }

    fn current_value(&self, field: Field) -> &str {
        let idx = Field::ALL.iter().position(|f| *f == field).unwrap_or(0);
        self.data
            .catalog
            .options(field)
            .get(self.selection_idx[idx])
            .map(String::as_str)
            .unwrap_or("-")
    }

    fn current_selection(&self) -> MarketSelection {
        MarketSelection {
            region: self.current_value(Field::Region).to_string(),
            district: self.current_value(Field::District).to_string(),
            market: self.current_value(Field::Market).to_string(),
            category: self.current_value(Field::Category).to_string(),
            commodity: self.current_value(Field::Commodity).to_string(),
            unit: self.current_value(Field::Unit).to_string(),
            priceflag: self.current_value(Field::PriceFlag).to_string(),
            pricetype: self.current_value(Field::PriceType).to_string(),
        }
    }

    fn predict(&mut self) {
        let req = PredictRequest {
            selection: self.current_selection(),
            year: self.year,
            month: self.month,
            day: self.day,
        };

        match pipeline::run_predict(&self.store, &self.data.records, &req) {
            Ok(output) => {
                let mut status = format!("Predicted price: {} TZS", fmt_price(output.price));
                if output.week_fallback {
                    status.push_str("  (invalid date — using week 1)");
                }
                if output.history.is_empty() {
                    status.push_str("  (no historical data for this selection)");
                }
                self.status = status;
                self.run = Some(output);
            }
            Err(err) => {
                self.status = format!("Prediction failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("mpp", Style::default().fg(Color::Cyan)),
            Span::raw(" — market food price prediction"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "dataset: {} rows | {} → {} | skipped: {}",
                self.data.rows_used,
                self.data.stats.date_min,
                self.data.stats.date_max,
                self.data.row_errors.len()
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            lines.push(Line::from(Span::styled(
                format!(
                    "predicted: {} TZS | {} in {}, {} | history n={}",
                    fmt_price(run.price),
                    run.input.selection.commodity,
                    run.input.selection.market,
                    run.input.selection.region,
                    run.history.len()
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(13)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_selectors(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Historical Price Trend").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("Press Enter to predict.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        if run.history.is_empty() {
            let msg = Paragraph::new("No historical data available for trend chart.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        let series = history_series(run);
        let (x_bounds, y_bounds) = chart_bounds(&series, run.price);

        let widget = TrendChart {
            history: &series,
            predicted: run.price,
            x_bounds,
            y_bounds,
            x_label: "date",
            y_label: "price (TZS)",
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_price,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_selectors(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::with_capacity(FIELD_COUNT);
        for field in Field::ALL {
            items.push(ListItem::new(format!(
                "{}: {}",
                field.display_name(),
                self.current_value(field)
            )));
        }
        items.push(ListItem::new(format!("Year: {}", self.year)));
        items.push(ListItem::new(format!("Month: {}", self.month)));
        items.push(ListItem::new(format!("Day: {}", self.day)));

        let list = List::new(items)
            .block(Block::default().title("Selection").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter predict  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn add_clamped(value: u32, delta: i64, min: u32, max: u32) -> u32 {
    let next = i64::from(value) + delta;
    next.clamp(i64::from(min), i64::from(max)) as u32
}

/// History as (day-number, price) points for Plotters.
fn history_series(run: &PredictOutput) -> Vec<(f64, f64)> {
    run.history
        .iter()
        .map(|r| (f64::from(r.date.num_days_from_ce()), r.price))
        .collect()
}

/// Chart bounds padded so the line and the predicted level stay visible.
fn chart_bounds(series: &[(f64, f64)], predicted: f64) -> ([f64; 2], [f64; 2]) {
    let mut x0 = f64::INFINITY;
    let mut x1 = f64::NEG_INFINITY;
    let mut y0 = f64::INFINITY;
    let mut y1 = f64::NEG_INFINITY;
    for &(x, y) in series {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y0 = y0.min(y);
        y1 = y1.max(y);
    }
    y0 = y0.min(predicted);
    y1 = y1.max(predicted);

    // Single-observation histories still need a non-degenerate x range.
    if !(x1 > x0) {
        x0 -= 15.0;
        x1 += 15.0;
    }
    let y_pad = ((y1 - y0) * 0.05).max(1.0);

    ([x0, x1], [y0 - y_pad, y1 + y_pad])
}

fn fmt_axis_date(day_number: f64) -> String {
    chrono::NaiveDate::from_num_days_from_ce_opt(day_number.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_axis_price(value: f64) -> String {
    if value.abs() >= 10_000.0 {
        format!("{:.0}k", value / 1000.0)
    } else {
        format!("{value:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_bounds_cover_the_predicted_level() {
        let series = vec![(100.0, 800.0), (130.0, 900.0)];
        let ([x0, x1], [y0, y1]) = chart_bounds(&series, 1200.0);
        assert_eq!(x0, 100.0);
        assert_eq!(x1, 130.0);
        assert!(y0 < 800.0);
        assert!(y1 > 1200.0);
    }

    #[test]
    fn single_point_history_gets_a_nondegenerate_x_range() {
        let series = vec![(100.0, 800.0)];
        let ([x0, x1], _) = chart_bounds(&series, 800.0);
        assert!(x1 > x0);
    }

    #[test]
    fn numeric_fields_clamp_at_their_bounds() {
        assert_eq!(add_clamped(12, 1, 1, 12), 12);
        assert_eq!(add_clamped(1, -1, 1, 12), 1);
        assert_eq!(add_clamped(6, 1, 1, 12), 7);
    }

    #[test]
    fn axis_date_formatter_round_trips_a_day_number() {
        let date = chrono::NaiveDate::from_ymd_opt(2023, 5, 15).unwrap();
        let label = fmt_axis_date(f64::from(date.num_days_from_ce()));
        assert_eq!(label, "2023-05");
    }
}
