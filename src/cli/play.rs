//! Play command implementation - interactive TUI client.

// The TUI uses intentional casts for layout arithmetic
#![allow(
    clippy::needless_pass_by_value,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use super::output::{cell_glyph, status_lines};
use super::{CliError, new_game};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use space_explore::game::{GameSnapshot, assert_invariants};
use space_explore::{Cell, Command, Direction, GameEngine, Phase, SystemColor};
use std::collections::VecDeque;
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const MESSAGE_LOG_LEN: usize = 8;

/// Execute the play command.
///
/// # Errors
///
/// Returns an error if setup or the terminal fails.
pub(crate) fn execute(
    seed: Option<u64>,
    config: Option<PathBuf>,
    color: Option<SystemColor>,
) -> Result<(), CliError> {
    let engine = new_game(config, seed, color)?;
    run_tui(engine)
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Command(Command),
    Cursor(Direction),
    Confirm,
    Quit,
}

/// Map a key to an input. Arrows steer the cursor while the observer is armed.
fn map_key(code: KeyCode, observer_armed: bool) -> Option<Input> {
    let direction = match code {
        KeyCode::Up | KeyCode::Char('8') => Some(Direction::North),
        KeyCode::Char('9') => Some(Direction::NorthEast),
        KeyCode::Right | KeyCode::Char('6') => Some(Direction::East),
        KeyCode::Char('3') => Some(Direction::SouthEast),
        KeyCode::Down | KeyCode::Char('2') => Some(Direction::South),
        KeyCode::Char('1') => Some(Direction::SouthWest),
        KeyCode::Left | KeyCode::Char('4') => Some(Direction::West),
        KeyCode::Char('7') => Some(Direction::NorthWest),
        _ => None,
    };
    if let Some(direction) = direction {
        return Some(if observer_armed {
            Input::Cursor(direction)
        } else {
            Input::Command(Command::Move(direction))
        });
    }

    match code {
        KeyCode::Char('q') => Some(Input::Quit),
        KeyCode::Char('r') => Some(Input::Command(Command::Collect)),
        KeyCode::Char('d') => Some(Input::Command(Command::Deposit(None))),
        KeyCode::Char('i') => Some(Input::Command(Command::Influence)),
        KeyCode::Char('o') => Some(Input::Command(Command::ObserverArm)),
        KeyCode::Char(' ') => Some(Input::Command(Command::EndTurn)),
        KeyCode::Enter if observer_armed => Some(Input::Confirm),
        KeyCode::Esc if observer_armed => Some(Input::Command(Command::ObserverCancel)),
        KeyCode::Esc => Some(Input::Quit),
        _ => None,
    }
}

/// App state for the TUI.
struct App {
    engine: GameEngine,
    cursor: Cell,
    messages: VecDeque<String>,
    quit: bool,
}

impl App {
    fn new(engine: GameEngine) -> Self {
        let cursor = engine
            .player()
            .map_or(Cell::new(0, 0), |player| player.ship.position);
        let mut app = Self {
            engine,
            cursor,
            messages: VecDeque::new(),
            quit: false,
        };
        app.log(format!("Turn {} begins", app.engine.turn()));
        app
    }

    fn log(&mut self, message: String) {
        self.messages.push_back(message);
        while self.messages.len() > MESSAGE_LOG_LEN {
            self.messages.pop_front();
        }
    }

    fn handle(&mut self, input: Input, now: Instant) {
        match input {
            Input::Quit => self.quit = true,
            Input::Cursor(direction) => {
                let next = direction.step(self.cursor);
                if self.engine.board().in_bounds(next) {
                    self.cursor = next;
                }
            }
            Input::Confirm => self.apply(Command::ObserverTarget(self.cursor), now),
            Input::Command(command) => {
                if command == Command::ObserverArm
                    && let Some(player) = self.engine.player()
                {
                    self.cursor = player.ship.position;
                }
                self.apply(command, now);
            }
        }
    }

    fn apply(&mut self, command: Command, now: Instant) {
        match self.engine.apply(command, now) {
            Ok(outcome) => self.log(format!("{command}: {outcome:?}")),
            Err(err) => self.log(format!("{command}: {err}")),
        }
        assert_invariants(&self.engine);
    }

    fn tick(&mut self, now: Instant) {
        if let Some(system) = self.engine.tick(now) {
            self.log(format!("System {system} fades from view"));
        }
    }
}

fn run_tui(engine: GameEngine) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let mut app = App::new(engine);

    while !app.quit {
        app.tick(Instant::now());
        let snapshot = app.engine.snapshot();
        terminal
            .draw(|f| ui(f, &app, &snapshot))
            .map_err(|e| CliError::new(e.to_string()))?;

        if event::poll(Duration::from_millis(50)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
            && let Some(input) = map_key(key.code, app.engine.observer_armed())
        {
            app.handle(input, Instant::now());
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Some(outcome) = app.engine.outcome() {
        println!(
            "Final score: {} in {} turns",
            outcome.final_score, outcome.turns_played
        );
    }

    Ok(())
}

fn ui(f: &mut Frame, app: &App, snapshot: &GameSnapshot) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(10),    // Main content
            Constraint::Length(MESSAGE_LOG_LEN as u16 + 2),
            Constraint::Length(3),  // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], snapshot);

    let main_chunks = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_board(f, main_chunks[0], app, snapshot);
    render_status(f, main_chunks[1], snapshot);
    render_messages(f, chunks[2], app);
    render_footer(f, chunks[3], snapshot);
}

fn render_header(f: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
    let title = format!(
        " Space Explore | Turn {}/{} | {} | Score {} ",
        snapshot.turn, snapshot.max_turns, snapshot.phase, snapshot.total_score
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_board(f: &mut Frame, area: Rect, app: &App, snapshot: &GameSnapshot) {
    let mut lines: Vec<Line> = Vec::new();

    let visible = (i32::from(area.height) - 2).min(snapshot.board_size).max(0);
    for y in 0..visible {
        let mut spans = Vec::new();
        for x in 0..snapshot.board_size {
            let cell = Cell::new(x, y);
            let glyph = cell_glyph(snapshot, cell, false);
            let mut style = match snapshot.system_at(cell) {
                Some(system) if system.revealed => Style::default().fg(palette(system.color)),
                Some(_) => Style::default().fg(Color::DarkGray),
                None => Style::default().fg(Color::Gray),
            };
            if glyph == '@' {
                style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
            }
            if snapshot.observer_armed && cell == app.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(format!("{glyph} "), style));
        }
        lines.push(Line::from(spans));
    }

    let board = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Board "));
    f.render_widget(board, area);
}

fn palette(color: SystemColor) -> Color {
    match color {
        SystemColor::Yellow => Color::Yellow,
        SystemColor::Red => Color::Red,
        SystemColor::Violet => Color::Magenta,
        SystemColor::Orange => Color::LightRed,
        SystemColor::Green => Color::Green,
        SystemColor::Blue => Color::Blue,
        SystemColor::Rose => Color::LightMagenta,
    }
}

fn render_status(f: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
    let mut lines: Vec<Line> = status_lines(snapshot).into_iter().map(Line::from).collect();

    lines.push(Line::from(""));
    lines.push(Line::from("Racks:"));
    for rack in &snapshot.racks {
        let active = rack
            .active_faction
            .map_or_else(|| "-".to_string(), |faction| faction.to_string());
        lines.push(Line::from(Span::styled(
            format!(
                "  {:<7} card {active}  totems {:>2}  cards {}",
                rack.color.name(),
                rack.totems,
                rack.cards
            ),
            Style::default().fg(palette(rack.color)),
        )));
    }

    let status = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Status "))
        .wrap(Wrap { trim: false });

    f.render_widget(status, area);
}

fn render_messages(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app.messages.iter().map(|m| Line::from(m.as_str())).collect();
    let log = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Log "))
        .wrap(Wrap { trim: true });
    f.render_widget(log, area);
}

fn render_footer(f: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
    let controls = if snapshot.phase == Phase::GameOver {
        " [q] Quit "
    } else if snapshot.observer_armed {
        " [arrows/1-9] Cursor  [Enter] Observe  [Esc] Cancel "
    } else {
        " [arrows/1-9] Move  [r] Collect  [d] Deposit  [i] Influence  [o] Observe  [Space] End turn  [q] Quit "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
