/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Pane navigation
    SelectNext,
    SelectPrev,
    ToggleFullscreen,

    // Scrolling within the selected pane
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToBottom,
    ToggleFollow,

    // UI toggles
    ToggleHelp,

    // Search
    OpenSearch,
    CloseSearch,
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    ToggleCaseSensitive,

    // Container actions
    ExportLogs,
    Refresh,

    // Status line
    ShowStatus(String),

    Render,
}
