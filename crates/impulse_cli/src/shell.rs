//! Interactive shell state.
//!
//! # Responsibility
//! - Track the current screen mode, menu selection and text input.
//! - Translate key actions into registry calls and status messages.
//!
//! # Invariants
//! - Validation errors keep the user on the create prompt.
//! - A missing goal id sends the shell back to the menu.
//! - Corrupt state and storage failures are returned to the caller.

use crate::keymap::{action_for_event, Action, ModeKind};
use chrono::{Local, TimeZone};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use impulse_core::{Goal, GoalId, GoalRegistry, GoalStore, RegistryError, RegistryResult};
use log::warn;
use std::time::{Duration, Instant};

const STATUS_TTL: Duration = Duration::from_secs(3);
const ENCOURAGEMENT: &str = "Remember: each step matters!";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `Last updated: <local time>` for a goal.
pub fn last_updated_label(goal: &Goal) -> String {
    let when = Local
        .timestamp_millis_opt(goal.updated_at)
        .single()
        .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!("Last updated: {when}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Menu,
    GoalDetail(GoalId),
    CreateGoal,
    ConfirmDelete(GoalId),
}

impl Mode {
    pub fn kind(self) -> ModeKind {
        match self {
            Self::Menu => ModeKind::Menu,
            Self::GoalDetail(_) => ModeKind::GoalDetail,
            Self::CreateGoal => ModeKind::CreateGoal,
            Self::ConfirmDelete(_) => ModeKind::ConfirmDelete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
    shown_at: Instant,
}

pub struct ShellApp {
    pub mode: Mode,
    pub selected: usize,
    pub input: String,
    pub status: Option<Status>,
    pub should_quit: bool,
}

impl ShellApp {
    /// Starts on the menu, or on the create prompt when there are no goals.
    pub fn new<S: GoalStore>(registry: &GoalRegistry<S>) -> Self {
        let mode = if registry.is_empty() {
            Mode::CreateGoal
        } else {
            Mode::Menu
        };
        Self {
            mode,
            selected: 0,
            input: String::new(),
            status: None,
            should_quit: false,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(Status {
            text: text.into(),
            is_error,
            shown_at: Instant::now(),
        });
    }

    /// Drops the status line once it has been visible long enough.
    pub fn on_tick(&mut self) {
        if self
            .status
            .as_ref()
            .is_some_and(|status| status.shown_at.elapsed() > STATUS_TTL)
        {
            self.status = None;
        }
    }

    /// Applies one key press.
    ///
    /// # Errors
    /// Returns only failures the shell cannot recover from (corrupt state,
    /// storage I/O).
    pub fn handle_key<S: GoalStore>(
        &mut self,
        registry: &mut GoalRegistry<S>,
        key: KeyEvent,
    ) -> RegistryResult<()> {
        let action = action_for_event(self.mode.kind(), &key);
        let result = match action {
            Some(action) => self.apply(registry, action),
            None => {
                let plain = !key.modifiers.contains(KeyModifiers::CONTROL);
                if let (Mode::CreateGoal, KeyCode::Char(c), true) = (self.mode, key.code, plain) {
                    self.input.push(c);
                }
                Ok(())
            }
        };

        match result {
            Err(RegistryError::Validation(err)) => {
                self.set_status(err.to_string(), true);
                Ok(())
            }
            Err(RegistryError::NotFound(id)) => {
                warn!("event=shell_desync module=shell status=error goal_id={id}");
                self.mode = Mode::Menu;
                self.clamp_selection(registry.list().len());
                self.set_status("That goal no longer exists", true);
                Ok(())
            }
            other => other,
        }
    }

    /// Goal highlighted in the menu.
    pub fn selected_goal<S: GoalStore>(&self, registry: &GoalRegistry<S>) -> Option<GoalId> {
        registry.list().get(self.selected).map(|goal| goal.id)
    }

    fn apply<S: GoalStore>(
        &mut self,
        registry: &mut GoalRegistry<S>,
        action: Action,
    ) -> RegistryResult<()> {
        let goal_count = registry.list().len();
        match (self.mode, action) {
            (_, Action::Quit) => {
                self.should_quit = true;
            }
            (Mode::Menu, Action::SelectPrevious) => {
                self.selected = self.selected.saturating_sub(1);
                self.announce_selection(registry);
            }
            (Mode::Menu, Action::SelectNext) => {
                if self.selected + 1 < goal_count {
                    self.selected += 1;
                }
                self.announce_selection(registry);
            }
            (Mode::Menu, Action::OpenSelected) => {
                if let Some(id) = self.selected_goal(registry) {
                    let name = registry.get(id)?.name.clone();
                    self.mode = Mode::GoalDetail(id);
                    self.set_status(format!("Viewing goal: {name}"), false);
                }
            }
            (Mode::Menu, Action::StartCreate) => {
                self.input.clear();
                self.mode = Mode::CreateGoal;
            }
            (Mode::Menu, Action::StartDelete) => {
                if let Some(id) = self.selected_goal(registry) {
                    self.mode = Mode::ConfirmDelete(id);
                }
            }
            (Mode::Menu, Action::Encourage) => {
                self.set_status(ENCOURAGEMENT, false);
            }
            (Mode::GoalDetail(id), Action::Increment) => {
                let count = registry.increment(id)?.count;
                self.set_status(format!("Counter increased to {count}"), false);
            }
            (Mode::GoalDetail(id), Action::Undo) => {
                if registry.undo(id)? {
                    let count = registry.get(id)?.count;
                    self.set_status(format!("Counter reset to {count}"), false);
                }
            }
            (Mode::GoalDetail(_), Action::BackToMenu) => {
                self.mode = Mode::Menu;
            }
            (Mode::CreateGoal, Action::DeleteChar) => {
                self.input.pop();
            }
            (Mode::CreateGoal, Action::CancelInput) => {
                self.input.clear();
                self.mode = Mode::Menu;
                self.set_status("Goal creation cancelled", false);
            }
            (Mode::CreateGoal, Action::SubmitName) => {
                let goal = registry.create(&self.input)?;
                let (id, name) = (goal.id, goal.name.clone());
                self.input.clear();
                self.selected = registry.list().len() - 1;
                self.mode = Mode::GoalDetail(id);
                self.set_status(format!("Goal '{name}' created successfully!"), false);
            }
            (Mode::ConfirmDelete(id), Action::ConfirmDelete) => {
                let removed = registry.delete(id)?;
                self.mode = Mode::Menu;
                self.clamp_selection(registry.list().len());
                self.set_status(format!("Goal '{}' deleted successfully", removed.name), false);
            }
            (Mode::ConfirmDelete(_), Action::CancelDelete) => {
                self.mode = Mode::Menu;
                self.set_status("Deletion cancelled", false);
            }
            _ => {}
        }
        Ok(())
    }

    fn announce_selection<S: GoalStore>(&mut self, registry: &GoalRegistry<S>) {
        if let Some(goal) = registry.list().get(self.selected) {
            let text = format!("Selected: {}", goal.name);
            self.set_status(text, false);
        }
    }

    fn clamp_selection(&mut self, goal_count: usize) {
        self.selected = self.selected.min(goal_count.saturating_sub(1));
    }
}
