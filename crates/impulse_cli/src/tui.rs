//! Terminal screen for the interactive shell.

use crate::keymap::help_line;
use crate::shell::{last_updated_label, Mode, ShellApp};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use impulse_core::{core_version, Goal, GoalRegistry, GoalStore};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(250);

/// Restores the terminal even when the loop exits with an error.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Runs the interactive shell until the user quits.
pub fn run_tui<S: GoalStore>(registry: &mut GoalRegistry<S>) -> anyhow::Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let mut app = ShellApp::new(registry);

    while !app.should_quit {
        guard.terminal.draw(|f| ui(f, &app, registry.list()))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(registry, key)?;
                }
            }
        }
        app.on_tick();
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &ShellApp, goals: &[Goal]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(f.size());

    let header = Paragraph::new(format!("IMPULSE CHECK v{}", core_version()))
        .style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    match app.mode {
        Mode::Menu => draw_menu(f, chunks[1], app, goals),
        Mode::GoalDetail(id) => match goals.iter().find(|goal| goal.id == id) {
            Some(goal) => draw_goal(f, chunks[1], goal),
            None => draw_menu(f, chunks[1], app, goals),
        },
        Mode::CreateGoal => draw_create(f, chunks[1], &app.input),
        Mode::ConfirmDelete(id) => {
            let name = goals
                .iter()
                .find(|goal| goal.id == id)
                .map_or("", |goal| goal.name.as_str());
            draw_confirm_delete(f, chunks[1], name);
        }
    }

    draw_footer(f, chunks[2], app);
}

fn draw_menu(f: &mut Frame, area: Rect, app: &ShellApp, goals: &[Goal]) {
    let block = Block::default().title(" Your goals ").borders(Borders::ALL);
    if goals.is_empty() {
        let empty = Paragraph::new("No goals yet. Press 'c' to create one.")
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = goals
        .iter()
        .map(|goal| {
            let count = goal.count.to_string();
            let pad = width.saturating_sub(goal.name.chars().count() + count.len());
            ListItem::new(Line::from(vec![
                Span::raw(goal.name.clone()),
                Span::raw(" ".repeat(pad)),
                Span::styled(count, Style::default().fg(Color::Green)),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .fg(Color::White)
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default();
    state.select(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_goal(f: &mut Frame, area: Rect, goal: &Goal) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            goal.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            goal.count.to_string(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            last_updated_label(goal),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Every count is a step toward your goal!",
            Style::default().fg(Color::Yellow),
        )),
    ];
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, area);
}

fn draw_create(f: &mut Frame, area: Rect, input: &str) {
    let lines = vec![
        Line::from("What habit or impulse do you want to track?"),
        Line::from(""),
        Line::from(Span::styled(
            format!("> {input}_"),
            Style::default().fg(Color::Cyan),
        )),
    ];
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" New goal ").borders(Borders::ALL));
    f.render_widget(body, area);
}

fn draw_confirm_delete(f: &mut Frame, area: Rect, name: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Delete goal '{name}'?"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from("This cannot be undone."),
    ];
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, area);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &ShellApp) {
    let mut lines = vec![Line::from(Span::styled(
        help_line(app.mode.kind()),
        Style::default().fg(Color::Yellow),
    ))];
    if let Some(status) = &app.status {
        let color = if status.is_error { Color::Red } else { Color::Cyan };
        lines.push(Line::from(Span::styled(
            status.text.clone(),
            Style::default().fg(color),
        )));
    }
    let footer = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, area);
}
