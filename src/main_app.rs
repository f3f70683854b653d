use crate::annotation::RedactionKinds;
use crate::engine::{DocumentEngine, EngineEvent, LocalEngine};
use crate::event_source::EventSource;
use crate::redaction_panel::RedactionPanel;
use crate::settings::Settings;
use crate::theme::current_theme;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders, Paragraph},
};
use std::time::Duration;

const HELP_TEXT: &str = "j/k: Move | Enter: Select | Arrows: Prev/Next | Space: Check | \
                         c: Commit | u: Style | d: Delete | X: Clear all | R: Redact all | q: Quit";

/// Top-level application state: the engine, the review panel, and the
/// transient status shown in the footer after a bulk action.
pub struct App {
    pub engine: LocalEngine,
    pub panel: RedactionPanel,
    pub settings: Settings,
    status: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(engine: LocalEngine, settings: Settings) -> Self {
        Self {
            engine,
            panel: RedactionPanel::new(RedactionKinds::standard()),
            settings,
            status: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                _ => {
                    self.status = None;
                    self.panel.handle_key(key, &mut self.engine);
                }
            },
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                if self.settings.mouse_enabled {
                    self.status = None;
                    self.panel
                        .handle_mouse_click(mouse.column, mouse.row, &mut self.engine);
                }
            }
            _ => {}
        }
        for event in self.engine.take_events() {
            self.status = Some(status_line(&event));
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let palette = current_theme();
        self.panel.sync(self.engine.store());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        self.panel.render(
            f,
            chunks[0],
            &self.engine,
            palette,
            &self.settings.date_format,
        );

        let footer_text = self.status.as_deref().unwrap_or(HELP_TEXT);
        let footer = Paragraph::new(footer_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.base_03))
                    .style(Style::default().bg(palette.base_00)),
            )
            .style(Style::default().fg(if self.status.is_some() {
                palette.base_0b
            } else {
                palette.base_03
            }));
        f.render_widget(footer, chunks[1]);
    }
}

fn status_line(event: &EngineEvent) -> String {
    match event {
        EngineEvent::CommitRequested { ids } => {
            format!("Commit requested for {} annotation(s)", ids.len())
        }
        EngineEvent::AllRedactionsApplied { count } => {
            format!("Applied {count} redaction(s)")
        }
        EngineEvent::MarkedCleared { count } => {
            format!("Cleared {count} marked redaction(s)")
        }
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    loop {
        terminal.draw(|f| app.draw(f))?;
        if events.poll(tick_rate)? {
            let event = events.read()?;
            app.handle_event(event);
        }
        if app.should_quit() {
            return Ok(());
        }
    }
}
