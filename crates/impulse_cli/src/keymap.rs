//! Key bindings per screen mode.
//!
//! The same physical key means different things on different screens, so
//! every mode owns a static lookup table instead of branching on the screen
//! at dispatch time.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Screen kinds that own a key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Menu,
    GoalDetail,
    CreateGoal,
    ConfirmDelete,
}

/// What a key press asks the shell to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectPrevious,
    SelectNext,
    OpenSelected,
    StartCreate,
    StartDelete,
    Encourage,
    Quit,
    Increment,
    Undo,
    BackToMenu,
    SubmitName,
    CancelInput,
    DeleteChar,
    ConfirmDelete,
    CancelDelete,
}

type KeyTable = &'static [(KeyCode, Action)];

const MENU_KEYS: KeyTable = &[
    (KeyCode::Up, Action::SelectPrevious),
    (KeyCode::Char('k'), Action::SelectPrevious),
    (KeyCode::Down, Action::SelectNext),
    (KeyCode::Char('j'), Action::SelectNext),
    (KeyCode::Enter, Action::OpenSelected),
    (KeyCode::Char('c'), Action::StartCreate),
    (KeyCode::Char('d'), Action::StartDelete),
    (KeyCode::Char('?'), Action::Encourage),
    (KeyCode::Char('q'), Action::Quit),
];

const GOAL_DETAIL_KEYS: KeyTable = &[
    (KeyCode::Char('i'), Action::Increment),
    (KeyCode::Char('u'), Action::Undo),
    (KeyCode::Char('m'), Action::BackToMenu),
    (KeyCode::Esc, Action::BackToMenu),
    (KeyCode::Char('q'), Action::Quit),
];

// Printable characters are text input here and never reach the table.
const CREATE_GOAL_KEYS: KeyTable = &[
    (KeyCode::Enter, Action::SubmitName),
    (KeyCode::Esc, Action::CancelInput),
    (KeyCode::Backspace, Action::DeleteChar),
];

const CONFIRM_DELETE_KEYS: KeyTable = &[
    (KeyCode::Char('y'), Action::ConfirmDelete),
    (KeyCode::Char('n'), Action::CancelDelete),
    (KeyCode::Esc, Action::CancelDelete),
];

fn table(mode: ModeKind) -> KeyTable {
    match mode {
        ModeKind::Menu => MENU_KEYS,
        ModeKind::GoalDetail => GOAL_DETAIL_KEYS,
        ModeKind::CreateGoal => CREATE_GOAL_KEYS,
        ModeKind::ConfirmDelete => CONFIRM_DELETE_KEYS,
    }
}

/// Looks up the action bound to `key` in `mode`.
///
/// Letter bindings are case-insensitive outside of text input.
pub fn action_for(mode: ModeKind, key: KeyCode) -> Option<Action> {
    let key = match (mode, key) {
        (ModeKind::CreateGoal, key) => key,
        (_, KeyCode::Char(c)) => KeyCode::Char(c.to_ascii_lowercase()),
        (_, key) => key,
    };
    table(mode)
        .iter()
        .find(|(bound, _)| *bound == key)
        .map(|(_, action)| *action)
}

/// Looks up the action for a full key event.
///
/// Ctrl+C quits from every mode, text input included. Other control chords
/// are unbound.
pub fn action_for_event(mode: ModeKind, key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            _ => None,
        };
    }
    action_for(mode, key.code)
}

/// Footer hint for a mode.
pub fn help_line(mode: ModeKind) -> &'static str {
    match mode {
        ModeKind::Menu => "↑/↓ select · Enter open · c create · d delete · q quit",
        ModeKind::GoalDetail => "i increment · u undo · m menu · q quit",
        ModeKind::CreateGoal => "type a name · Enter save · Esc cancel",
        ModeKind::ConfirmDelete => "y delete · n cancel",
    }
}

#[cfg(test)]
mod tests {
    use super::{action_for, action_for_event, table, Action, ModeKind};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn same_key_maps_per_mode() {
        assert_eq!(
            action_for(ModeKind::Menu, KeyCode::Char('d')),
            Some(Action::StartDelete)
        );
        assert_eq!(action_for(ModeKind::GoalDetail, KeyCode::Char('d')), None);
        assert_eq!(
            action_for(ModeKind::GoalDetail, KeyCode::Char('u')),
            Some(Action::Undo)
        );
        assert_eq!(action_for(ModeKind::Menu, KeyCode::Char('u')), None);
    }

    #[test]
    fn uppercase_letters_match_outside_text_input() {
        assert_eq!(
            action_for(ModeKind::GoalDetail, KeyCode::Char('I')),
            Some(Action::Increment)
        );
        assert_eq!(
            action_for(ModeKind::ConfirmDelete, KeyCode::Char('Y')),
            Some(Action::ConfirmDelete)
        );
    }

    #[test]
    fn create_mode_leaves_letters_to_text_input() {
        assert_eq!(action_for(ModeKind::CreateGoal, KeyCode::Char('q')), None);
        assert_eq!(
            action_for(ModeKind::CreateGoal, KeyCode::Enter),
            Some(Action::SubmitName)
        );
    }

    #[test]
    fn tables_have_no_duplicate_keys() {
        for mode in [
            ModeKind::Menu,
            ModeKind::GoalDetail,
            ModeKind::CreateGoal,
            ModeKind::ConfirmDelete,
        ] {
            let keys = table(mode);
            for (index, (key, _)) in keys.iter().enumerate() {
                assert!(
                    keys[index + 1..].iter().all(|(other, _)| other != key),
                    "duplicate binding {key:?} in {mode:?}"
                );
            }
        }
    }

    #[test]
    fn ctrl_c_quits_in_every_mode() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [
            ModeKind::Menu,
            ModeKind::GoalDetail,
            ModeKind::CreateGoal,
            ModeKind::ConfirmDelete,
        ] {
            assert_eq!(action_for_event(mode, &ctrl_c), Some(Action::Quit));
        }
        assert_eq!(
            action_for_event(ModeKind::Menu, &KeyEvent::from(KeyCode::Char('c'))),
            Some(Action::StartCreate)
        );
    }
}
