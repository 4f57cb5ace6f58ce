//! Ratatui-based terminal UI.
//!
//! Shows the fitted equation, a scatter chart with the fit line, and the
//! merged rows with fitted values and residuals. Data is fetched before the
//! UI starts; the view is read-only.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::RunOutput;
use crate::error::AppError;
use crate::plot::ascii::{pad_range, sample_line, x_range, y_range};
use crate::report::{FittedRow, compute_residuals, format_equation};

mod plotters_chart;

use plotters_chart::ScatterFitChart;

/// Start the TUI for a completed run.
pub fn run(output: RunOutput) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::Terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(output);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::Terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Terminal(format!("Failed to enter alternate screen: {e}")));
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
    output: RunOutput,
    rows: Vec<FittedRow>,
    selected: usize,
}

impl App {
    fn new(output: RunOutput) -> Self {
        let rows = compute_residuals(&output.merged, &output.fit);
        Self {
            output,
            rows,
            selected: 0,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::Terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::Terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::Terminal(format!("Event read error: {e}")))? {
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

    /// Returns `true` when the UI should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let last = self.rows.len().saturating_sub(1);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = (self.selected + 1).min(last),
            KeyCode::PageUp => self.selected = self.selected.saturating_sub(12),
            KeyCode::PageDown => self.selected = (self.selected + 12).min(last),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = last,
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);
        self.draw_chart(frame, body[0]);
        self.draw_rows(frame, body[1]);

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cfg = &self.output.config;
        let fit = &self.output.fit;
        let lines = vec![
            Line::from(vec![
                Span::styled("fredfit", Style::default().fg(Color::Cyan)),
                Span::raw(format!(
                    " | {} ({}) vs {} ({}) | {}..{}",
                    cfg.response.series_id,
                    cfg.response.units.label(),
                    cfg.predictor.series_id,
                    cfg.predictor.units.label(),
                    cfg.predictor.start,
                    cfg.predictor.end,
                )),
            ]),
            Line::from(Span::styled(
                format!("{} | n={} | R^2={:.4}", format_equation(fit), fit.n, fit.r_squared),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Scatter + fit").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let series = chart_series(&self.rows, &self.output.fit);
        let selected = self.rows.get(self.selected).map(|r| (r.x, r.y));
        let widget = ScatterFitChart {
            line: &series.line,
            points: &series.points,
            selected,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: &self.output.fit.predictor,
            y_label: &self.output.fit.response,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_rows(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|r| {
                ListItem::new(format!(
                    "{} {:>8.3} {:>8.3} {:>+8.3}",
                    r.date, r.x, r.y, r.residual
                ))
            })
            .collect();

        let title = format!("date       {:>8} {:>8} {:>8}", "x", "y", "resid");
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD));

        let mut state = ListState::default();
        if !self.rows.is_empty() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ j/k select  PgUp/PgDn page  Home/End  q quit";
        let status = format!(
            "{} rows merged from {} + {}",
            self.output.merged.len(),
            self.output.predictor.len(),
            self.output.response.len()
        );
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

struct ChartSeries {
    line: Vec<(f64, f64)>,
    points: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series and padded bounds for Plotters.
fn chart_series(rows: &[FittedRow], fit: &crate::domain::FitResult) -> ChartSeries {
    let (x_min, x_max) = x_range(rows).unwrap_or((0.0, 1.0));
    let line = sample_line(fit, x_min, x_max, 200);
    let points: Vec<(f64, f64)> = rows.iter().map(|r| (r.x, r.y)).collect();

    let (y_min, y_max) = y_range(rows, &line).unwrap_or((0.0, 1.0));

    let (x0, x1) = pad_range(x_min, x_max, 0.03);
    let (y0, y1) = pad_range(y_min, y_max, 0.05);

    ChartSeries {
        line,
        points,
        x_bounds: [x0, x1],
        y_bounds: [y0, y1],
    }
}
