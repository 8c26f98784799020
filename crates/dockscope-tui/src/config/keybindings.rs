use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::Action;

/// Lines moved by a page scroll
const PAGE: usize = 10;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    Grid,
    SearchInput,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // Pane grid bindings
        let mut grid = HashMap::new();
        grid.insert(KeyBinding::new(KeyCode::Char('j')), Action::SelectNext);
        grid.insert(KeyBinding::new(KeyCode::Down), Action::SelectNext);
        grid.insert(KeyBinding::new(KeyCode::Tab), Action::SelectNext);
        grid.insert(KeyBinding::new(KeyCode::Char('k')), Action::SelectPrev);
        grid.insert(KeyBinding::new(KeyCode::Up), Action::SelectPrev);
        grid.insert(KeyBinding::shift(KeyCode::BackTab), Action::SelectPrev);
        grid.insert(KeyBinding::new(KeyCode::BackTab), Action::SelectPrev);
        grid.insert(KeyBinding::new(KeyCode::Char(' ')), Action::ToggleFullscreen);
        grid.insert(KeyBinding::new(KeyCode::Enter), Action::ToggleFullscreen);
        // Scrolling the selected pane
        grid.insert(KeyBinding::new(KeyCode::PageUp), Action::ScrollUp(PAGE));
        grid.insert(KeyBinding::new(KeyCode::PageDown), Action::ScrollDown(PAGE));
        grid.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::ScrollUp(PAGE));
        grid.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::ScrollDown(PAGE));
        grid.insert(KeyBinding::shift(KeyCode::Char('K')), Action::ScrollUp(1));
        grid.insert(KeyBinding::shift(KeyCode::Char('J')), Action::ScrollDown(1));
        grid.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        grid.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        grid.insert(KeyBinding::new(KeyCode::Char('f')), Action::ToggleFollow);
        // Container actions
        grid.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenSearch);
        grid.insert(KeyBinding::new(KeyCode::Char('y')), Action::ExportLogs);
        grid.insert(KeyBinding::new(KeyCode::Char('r')), Action::Refresh);
        bindings.insert(KeyContext::Grid, grid);

        // Search panel bindings (when the search input is active)
        let mut search_input = HashMap::new();
        search_input.insert(KeyBinding::new(KeyCode::Esc), Action::CloseSearch);
        search_input.insert(KeyBinding::new(KeyCode::Enter), Action::CloseSearch);
        search_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CloseSearch);
        search_input.insert(KeyBinding::new(KeyCode::Backspace), Action::SearchBackspace);
        search_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::SearchClear);
        search_input.insert(KeyBinding::ctrl(KeyCode::Char('s')), Action::ToggleCaseSensitive);
        bindings.insert(KeyContext::SearchInput, search_input);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(context_bindings) = self.bindings.get(&context)
            && let Some(action) = context_bindings.get(&binding)
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event in search input mode
    /// Returns Some(Action) for special keys and typed characters
    pub fn get_search_input_action(&self, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(search_bindings) = self.bindings.get(&KeyContext::SearchInput)
            && let Some(action) = search_bindings.get(&binding)
        {
            return Some(action.clone());
        }

        // For regular characters, return SearchInput action
        if let KeyCode::Char(c) = key.code
            && (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT)
        {
            return Some(Action::SearchInput(c));
        }

        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}
