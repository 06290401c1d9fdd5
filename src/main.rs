use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::{error, info};

use fpl_scout::config::{self, ScoutConfig};
use fpl_scout::logging;
use fpl_scout::scout;
use fpl_scout::scout_export;
use fpl_scout::scout_score::ScoredPlayer;
use fpl_scout::state::{AppState, Screen, player_detail, position_filter_label, screen_label};

const SCORE_NOTE: &str =
    "Smart Score = 50% Form + 30% Fixture Ease (5 - FDR, next 3 GWs) + 20% Season Value (pts/£m)";

struct App {
    state: AppState,
    cfg: ScoutConfig,
    should_quit: bool,
    refresh_pending: bool,
}

impl App {
    fn new(cfg: ScoutConfig) -> Self {
        let mut state = AppState::new();
        state.loading = true;
        Self {
            state,
            cfg,
            should_quit: false,
            refresh_pending: true,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_refresh(),
            KeyCode::Char('p') | KeyCode::Char('P') => self.state.cycle_position(),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => self.state.raise_price(),
            KeyCode::Char('-') | KeyCode::Left => self.state.lower_price(),
            KeyCode::Tab => self.state.cycle_screen(),
            KeyCode::Char('1') => self.state.screen = Screen::Picks,
            KeyCode::Char('2') => self.state.screen = Screen::Standings,
            KeyCode::Char('3') => self.state.screen = Screen::Fixtures,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn request_refresh(&mut self) {
        if self.state.loading {
            return;
        }
        self.state.loading = true;
        self.refresh_pending = true;
        self.state.push_log("[INFO] Refreshing FPL data");
    }

    // Blocks the UI until both requests finish.
    fn refresh(&mut self) {
        self.refresh_pending = false;
        match scout::run_scout(&self.cfg) {
            Ok(report) => self.state.set_report(report),
            Err(err) => {
                error!("refresh failed: {err:#}");
                self.state.set_error(&err);
            }
        }
    }

    fn export(&mut self) {
        let Some(report) = &self.state.report else {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        };
        let path = export_path();
        let picks = self.state.filtered_players();
        let result = scout_export::export_report(&path, report, &picks);
        match result {
            Ok(summary) => self.state.push_log(format!(
                "[INFO] Exported {} picks to {}",
                summary.players,
                path.display()
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }
}

fn export_path() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("fpl_scout_{stamp}.xlsx"))
}

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_file_tracing(Path::new("logs"))?;
    let cfg = ScoutConfig::from_env();
    info!(api = %cfg.api_base, "dashboard starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(cfg);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui(f, app))?;

        // Drawn once with the loading banner before the blocking fetch.
        if app.refresh_pending {
            app.refresh();
            continue;
        }

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    if app.state.loading && app.state.report.is_none() {
        let loading = Paragraph::new("Fetching and analyzing FPL data...")
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(loading, chunks[1]);
    } else {
        match app.state.screen {
            Screen::Picks => render_picks(frame, chunks[1], &app.state),
            Screen::Standings => render_standings(frame, chunks[1], &app.state),
            Screen::Fixtures => render_fixtures(frame, chunks[1], &app.state),
        }
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let window = state
        .report
        .as_ref()
        .map(|r| r.window.label())
        .unwrap_or_else(|| "--".to_string());
    let status = if state.loading {
        " | REFRESHING"
    } else if state.last_error.is_some() {
        " | STALE"
    } else {
        ""
    };
    let line1 = format!(
        "FPL SMART SCOUT | {} | {} | Pos: {} | Max £{:.1}m{}",
        screen_label(state.screen),
        window,
        position_filter_label(state.position_filter),
        state.max_price,
        status
    );
    let line2 = match &state.report {
        Some(r) => format!(
            "Current GW: {} | Updated {} UTC",
            r.current_gameweek
                .map(|gw| gw.to_string())
                .unwrap_or_else(|| "-".to_string()),
            r.generated_at.format("%Y-%m-%d %H:%M:%S")
        ),
        None => "No data yet".to_string(),
    };
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    let keys = match state.screen {
        Screen::Picks => {
            "1/2/3 Tab Views | j/k Move | p Position | -/+ Price | r Refresh | e Export | ? Help | q Quit"
        }
        Screen::Standings | Screen::Fixtures => {
            "1/2/3 Tab Views | j/k Scroll | r Refresh | e Export | ? Help | q Quit"
        }
    };
    format!("{keys}\n{SCORE_NOTE}")
}

fn render_picks(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_top_pick(frame, sections[0], state);
    if let Some(p) = state.selected_player() {
        let detail = Paragraph::new(player_detail(p)).style(Style::default().fg(Color::Cyan));
        frame.render_widget(detail, sections[3]);
    }

    let widths = pick_columns();
    render_pick_header(frame, sections[1], &widths);

    let list_area = sections[2];
    let picks = state.filtered_players();
    if picks.is_empty() {
        let empty = Paragraph::new("No players match the current filters")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let best = picks[0].smart_score;
    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, picks.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let p = picks[idx];
        render_cell_text(frame, cols[0], &(idx + 1).to_string(), row_style);
        render_cell_text(frame, cols[1], &p.name, row_style);
        render_cell_text(frame, cols[2], &p.team_name, row_style);
        render_cell_text(frame, cols[3], p.position.label(), row_style);
        render_cell_text(frame, cols[4], &format!("£{:.1}", p.cost), row_style);
        render_cell_text(frame, cols[5], &format!("{:.1}", p.form), row_style);
        render_cell_text(frame, cols[6], &format!("{:.0}", p.total_points), row_style);
        render_cell_text(frame, cols[7], &format!("{:.2}", p.next3_difficulty), row_style);
        render_cell_text(frame, cols[8], &format!("{:.1}", p.value), row_style);
        render_cell_text(
            frame,
            cols[9],
            &format!("{:.2}", p.smart_score),
            score_style(p, best, row_style),
        );
    }
}

fn render_top_pick(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let (name, score, team) = match state.top_pick() {
        Some(p) => (
            p.name.clone(),
            format!("{:.2}", p.smart_score),
            p.team_name.clone(),
        ),
        None => ("-".to_string(), "-".to_string(), "-".to_string()),
    };
    let metrics = [("Top Pick", name), ("Smart Score", score), ("Team", team)];
    for (col, (title, value)) in cols.iter().zip(metrics) {
        let widget = Paragraph::new(value)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(widget, *col);
    }
}

// Approximates a green background gradient relative to the best visible score.
fn score_style(p: &ScoredPlayer, best: f64, base: Style) -> Style {
    let ratio = if best > 0.0 { p.smart_score / best } else { 0.0 };
    if ratio >= 0.85 {
        base.fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if ratio >= 0.65 {
        base.fg(Color::Green)
    } else {
        base
    }
}

fn pick_columns() -> [Constraint; 10] {
    [
        Constraint::Length(5),
        Constraint::Min(16),
        Constraint::Length(16),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(5),
        Constraint::Length(8),
        Constraint::Length(7),
        Constraint::Length(7),
    ]
}

fn render_pick_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    let titles = [
        "#", "Player", "Team", "Pos", "Price", "Form", "Pts", "Next3", "Value", "Score",
    ];
    for (col, title) in cols.iter().zip(titles) {
        render_cell_text(frame, *col, title, style);
    }
}

fn render_standings(frame: &mut Frame, area: Rect, state: &AppState) {
    let teams = state.standings();
    if teams.is_empty() {
        let empty = Paragraph::new("No standings yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }
    let difficulty = state.report.as_ref().map(|r| &r.team_difficulty);

    let mut lines = vec![format!(
        "{:>3}  {:<18} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4}  {:>6}",
        "Pos", "Team", "Pld", "W", "D", "L", "GF", "GA", "Pts", "Next3"
    )];
    for t in teams {
        let fdr = difficulty
            .and_then(|m| m.get(&t.id))
            .map(|d| format!("{d:.2}"))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "{:>3}  {:<18} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4}  {:>6}",
            t.position, t.name, t.played, t.win, t.draw, t.loss, t.goals_for, t.goals_against,
            t.points, fdr
        ));
    }

    let table = Paragraph::new(lines.join("\n"))
        .scroll((state.scroll, 0))
        .block(Block::default().title("League Table").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_fixtures(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(report) = &state.report else {
        let empty = Paragraph::new("No fixtures yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = Vec::new();
    for (gw, rows) in report.fixtures_by_gameweek() {
        lines.push(format!("Gameweek {gw}"));
        for row in rows {
            lines.push(format!(
                "  {:<18} {:>5} ({}) vs {:<5} ({})",
                row.kickoff_label(),
                row.home,
                row.home_difficulty,
                row.away,
                row.away_difficulty
            ));
        }
        lines.push(String::new());
    }
    if lines.is_empty() {
        lines.push(format!("No upcoming fixtures in {}", report.window.label()));
    }

    let title = format!("Upcoming Fixtures ({})", report.window.label());
    let table = Paragraph::new(lines.join("\n"))
        .scroll((state.scroll, 0))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "FPL Smart Scout - Help",
        "",
        "Views:",
        "  1 / 2 / 3    Picks / Table / Fixtures",
        "  Tab          Next view",
        "",
        "Picks:",
        "  j/k or ↑/↓   Move selection",
        "  p            Cycle position (All/GKP/DEF/MID/FWD)",
        "  - / +        Max price down/up (£0.5m)",
        "",
        "Global:",
        "  r            Refresh (refetch and rescore)",
        "  e            Export current view to xlsx",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
