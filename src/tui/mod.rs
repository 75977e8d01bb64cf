//! TUI module - Terminal dashboard for the published routine

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io::{stdout, Stdout};

use crate::db::Database;
use crate::planner::{PlannedExercise, PlannedRoutine, SetKind};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for TUI
pub struct App {
    db: Database,
    routine: Option<PlannedRoutine>,
    should_quit: bool,
}

impl App {
    pub fn new(db: Database) -> Result<Self> {
        let routine = db.latest_routine()?;
        Ok(Self {
            db,
            routine,
            should_quit: false,
        })
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    fn header_text(&self) -> String {
        match &self.routine {
            Some(r) => format!("{} {} day - {}", r.focus.emoji(), r.focus, r.title),
            None => "No routine published yet - run `autocoach plan`".to_string(),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(self.header_text())
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL).title("autocoach"));
        frame.render_widget(header, chunks[0]);

        let rows: Vec<Row> = self
            .routine
            .iter()
            .flat_map(|r| r.exercises.iter())
            .map(exercise_row)
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(30),
                Constraint::Length(12),
                Constraint::Length(24),
                Constraint::Length(6),
                Constraint::Min(20),
            ],
        )
        .header(
            Row::new(vec!["Exercise", "Warm-up", "Working", "Rest", "Notes"])
                .style(Style::default().bold()),
        )
        .block(Block::default().borders(Borders::ALL).title("Today's routine"));

        frame.render_widget(table, chunks[1]);

        let status = match &self.routine {
            Some(r) if !r.is_complete() => format!("{} slot(s) unfilled | q: quit | r: refresh", r.short_by),
            _ => "q: quit | r: refresh".to_string(),
        };
        let footer = Paragraph::new(status)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('r') => {
                    self.routine = self.db.latest_routine()?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn sets_of_kind(exercise: &PlannedExercise, kind: SetKind) -> String {
    exercise
        .sets
        .iter()
        .filter(|s| s.kind == kind)
        .map(|s| s.describe())
        .collect::<Vec<_>>()
        .join(", ")
}

fn exercise_row(exercise: &PlannedExercise) -> Row<'static> {
    Row::new(vec![
        Cell::from(exercise.title.clone()),
        Cell::from(sets_of_kind(exercise, SetKind::Warmup)),
        Cell::from(sets_of_kind(exercise, SetKind::Normal)),
        Cell::from(format!("{}s", exercise.rest_seconds)),
        Cell::from(exercise.notes.clone()),
    ])
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
