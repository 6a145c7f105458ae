//! Application state and event handling.
//!
//! [`App`] owns everything the UI renders: the session gate, the task
//! mirror, the input box, and the error surfaces. Key presses translate
//! into [`SyncCommand`]s for the sync task; confirmations come back as
//! [`SyncEvent`]s and are the only thing allowed to change the mirror.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use termtodo_api::auth::Session;
use termtodo_api::task::{TaskId, TaskRecord, normalize_text};

use crate::remote::{BackendKind, RemoteError};
use crate::store::{Filter, TaskList};
use crate::sync::{OpKind, SyncCommand, SyncEvent};

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// The sign-in / sign-up form. Only used with a hosted backend.
    Login,
    /// The task board.
    Board,
}

/// Which part of the board has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardFocus {
    /// The text input box (default).
    Input,
    /// The task list.
    List,
}

/// Which login form field has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    /// Email field (default).
    Email,
    /// Password field.
    Password,
}

/// Whether the login form submits as sign-in or sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Open a session for an existing account.
    SignIn,
    /// Register a new account.
    SignUp,
}

impl AuthMode {
    /// Submit button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in",
            Self::SignUp => "Sign up",
        }
    }

    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }
}

/// State of the sign-in / sign-up form.
#[derive(Debug, Default)]
pub struct LoginForm {
    /// Email field contents.
    pub email: String,
    /// Password field contents (rendered masked).
    pub password: String,
    /// Which field receives typed characters.
    pub focus: LoginFocus,
    /// Sign-in or sign-up.
    pub mode: AuthMode,
    /// Auth failure or validation message shown on the form.
    pub error: Option<String>,
}

impl Default for LoginFocus {
    fn default() -> Self {
        Self::Email
    }
}

impl Default for AuthMode {
    fn default() -> Self {
        Self::SignIn
    }
}

/// An in-progress text rewrite of one task.
#[derive(Debug, Clone)]
pub struct EditDraft {
    /// Task being rewritten.
    pub id: TaskId,
    /// Whatever was in the add box before editing started; restored when
    /// the edit ends.
    saved_input: String,
}

/// Spinner frames shown while a command is in flight.
const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Main application state.
pub struct App {
    /// Which screen is showing.
    pub screen: Screen,
    /// Sign-in / sign-up form state.
    pub login: LoginForm,
    /// The signed-in session, if any.
    pub session: Option<Session>,

    /// Local mirror of the tasks table.
    pub tasks: TaskList,
    /// Current view filter.
    pub filter: Filter,
    /// Current text input (add box, or edit draft while editing).
    pub input: String,
    /// Cursor position in the input as a character index.
    pub character_index: usize,
    /// Which part of the board is focused.
    pub focus: BoardFocus,
    /// Selected index within the visible (filtered) list.
    pub selected: usize,
    /// Set while the input box holds an edit draft instead of new text.
    pub editing: Option<EditDraft>,

    /// Dismissible banner for failed remote operations.
    pub banner: Option<String>,
    /// Validation message shown next to the input box.
    pub input_error: Option<String>,

    /// Number of commands sent but not yet answered.
    pub pending: usize,
    /// Current spinner frame index.
    spinner_frame: usize,
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Which backend the app is wired to.
    pub backend: BackendKind,
    /// Maximum task text length in characters.
    pub max_task_text_len: usize,
    /// chrono format string for displayed timestamps.
    pub timestamp_format: String,
}

impl App {
    /// Creates the application state for the given backend.
    ///
    /// A hosted backend starts at the login screen; the in-process
    /// backend has no accounts and goes straight to the board.
    #[must_use]
    pub fn new(backend: BackendKind, max_task_text_len: usize, timestamp_format: String) -> Self {
        let screen = match backend {
            BackendKind::Hosted => Screen::Login,
            BackendKind::Local => Screen::Board,
        };

        Self {
            screen,
            login: LoginForm::default(),
            session: None,
            tasks: TaskList::new(),
            filter: Filter::All,
            input: String::new(),
            character_index: 0,
            focus: BoardFocus::Input,
            selected: 0,
            editing: None,
            banner: None,
            input_error: None,
            pending: 0,
            spinner_frame: 0,
            should_quit: false,
            backend,
            max_task_text_len,
            timestamp_format,
        }
    }

    /// Rows visible under the current filter, in display order.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<&TaskRecord> {
        self.tasks.visible(self.filter)
    }

    /// The currently selected row, if the visible list is non-empty.
    #[must_use]
    pub fn selected_task(&self) -> Option<&TaskRecord> {
        self.visible_tasks().get(self.selected).copied()
    }

    /// Whether a command is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.pending > 0
    }

    /// The spinner frame to render, if anything is in flight.
    #[must_use]
    pub fn spinner_symbol(&self) -> Option<&'static str> {
        self.is_busy()
            .then(|| SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()])
    }

    /// Records that a command was handed to the sync task.
    pub const fn command_sent(&mut self) {
        self.pending += 1;
    }

    /// Advances time-based UI state. Called once per poll tick.
    pub const fn tick(&mut self) {
        if self.pending > 0 {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    // -----------------------------------------------------------------
    // Key handling
    // -----------------------------------------------------------------

    /// Handle a key event, returning a command to send to the sync task.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        // Global shortcuts
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            self.should_quit = true;
            return None;
        }

        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Board => self.handle_board_key(key),
        }
    }

    /// Keys on the login screen.
    fn handle_login_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        if key.code == KeyCode::Char('t') && key.modifiers == KeyModifiers::CONTROL {
            self.login.mode = self.login.mode.toggled();
            self.login.error = None;
            return None;
        }

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
                self.login.focus = match self.login.focus {
                    LoginFocus::Email => LoginFocus::Password,
                    LoginFocus::Password => LoginFocus::Email,
                };
                None
            }
            KeyCode::Enter => self.submit_login(),
            KeyCode::Char(c) => {
                self.login.error = None;
                match self.login.focus {
                    LoginFocus::Email => self.login.email.push(c),
                    LoginFocus::Password => self.login.password.push(c),
                }
                None
            }
            KeyCode::Backspace => {
                match self.login.focus {
                    LoginFocus::Email => {
                        self.login.email.pop();
                    }
                    LoginFocus::Password => {
                        self.login.password.pop();
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// Submit the login form as sign-in or sign-up.
    fn submit_login(&mut self) -> Option<SyncCommand> {
        let email = self.login.email.trim().to_string();
        if email.is_empty() || self.login.password.is_empty() {
            self.login.error = Some("enter both email and password".to_string());
            return None;
        }

        let password = self.login.password.clone();
        Some(match self.login.mode {
            AuthMode::SignIn => SyncCommand::SignIn { email, password },
            AuthMode::SignUp => SyncCommand::SignUp { email, password },
        })
    }

    /// Keys on the board.
    fn handle_board_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        if key.code == KeyCode::Char('x') && key.modifiers == KeyModifiers::CONTROL {
            return self.session.is_some().then_some(SyncCommand::SignOut);
        }

        match key.code {
            KeyCode::Esc => {
                // Esc peels one layer at a time: banner, edit, then the app.
                if self.banner.is_some() {
                    self.banner = None;
                } else if self.editing.is_some() {
                    self.cancel_edit();
                } else {
                    self.should_quit = true;
                }
                None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    BoardFocus::Input => BoardFocus::List,
                    BoardFocus::List => BoardFocus::Input,
                };
                None
            }
            _ => match self.focus {
                BoardFocus::Input => self.handle_input_key(key),
                BoardFocus::List => self.handle_list_key(key),
            },
        }
    }

    /// Keys while the input box is focused.
    fn handle_input_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Char(c) => {
                self.input_error = None;
                self.enter_char(c);
                None
            }
            KeyCode::Backspace => {
                self.delete_char();
                None
            }
            KeyCode::Left => {
                self.move_cursor_left();
                None
            }
            KeyCode::Right => {
                self.move_cursor_right();
                None
            }
            KeyCode::Home => {
                self.character_index = 0;
                None
            }
            KeyCode::End => {
                self.character_index = self.input.chars().count();
                None
            }
            KeyCode::Down => {
                self.focus = BoardFocus::List;
                None
            }
            _ => None,
        }
    }

    /// Keys while the task list is focused.
    fn handle_list_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected == 0 {
                    self.focus = BoardFocus::Input;
                } else {
                    self.selected -= 1;
                }
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.visible_tasks().len().saturating_sub(1);
                if self.selected < last {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('e') => {
                self.start_edit();
                None
            }
            KeyCode::Char('d') => self
                .selected_task()
                .map(|task| SyncCommand::Delete { id: task.id }),
            KeyCode::Char('c') => {
                // Nothing completed means nothing to ask the service for.
                self.tasks.has_completed().then_some(SyncCommand::ClearCompleted)
            }
            KeyCode::Char('f') => {
                self.set_filter(self.filter.cycle());
                None
            }
            KeyCode::Char('1') => {
                self.set_filter(Filter::All);
                None
            }
            KeyCode::Char('2') => {
                self.set_filter(Filter::Active);
                None
            }
            KeyCode::Char('3') => {
                self.set_filter(Filter::Completed);
                None
            }
            KeyCode::Char('r') => Some(SyncCommand::Load),
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            _ => None,
        }
    }

    /// Submit the input box as a new task or a finished edit.
    ///
    /// Validation happens here, before anything reaches the service: text
    /// that trims to empty or runs past the length limit produces an
    /// inline error and no command.
    fn submit_input(&mut self) -> Option<SyncCommand> {
        let text = match normalize_text(&self.input, self.max_task_text_len) {
            Ok(text) => text,
            Err(e) => {
                self.input_error = Some(e.to_string());
                return None;
            }
        };

        self.input_error = None;
        match self.editing.take() {
            Some(draft) => {
                self.restore_input(draft.saved_input);
                self.focus = BoardFocus::List;
                Some(SyncCommand::Edit { id: draft.id, text })
            }
            None => {
                self.restore_input(String::new());
                Some(SyncCommand::Add { text })
            }
        }
    }

    /// Flip the selected task, using the mirror's state at keypress time.
    fn toggle_selected(&mut self) -> Option<SyncCommand> {
        self.selected_task().map(|task| SyncCommand::Toggle {
            id: task.id,
            completed: !task.completed,
        })
    }

    /// Move the selected task's text into the input box for rewriting.
    ///
    /// Editing needs a signed-in session; with the in-process backend the
    /// key does nothing.
    fn start_edit(&mut self) {
        if self.session.is_none() {
            return;
        }
        let Some(task) = self.selected_task() else {
            return;
        };

        let id = task.id;
        let text = task.text.clone();
        self.editing = Some(EditDraft {
            id,
            saved_input: std::mem::take(&mut self.input),
        });
        self.character_index = text.chars().count();
        self.input = text;
        self.input_error = None;
        self.focus = BoardFocus::Input;
    }

    /// Abandon the current edit, restoring the add box.
    fn cancel_edit(&mut self) {
        if let Some(draft) = self.editing.take() {
            self.restore_input(draft.saved_input);
            self.focus = BoardFocus::List;
        }
    }

    /// Switch filters, keeping the selection in range.
    fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.clamp_selection();
    }

    fn restore_input(&mut self, contents: String) {
        self.character_index = contents.chars().count();
        self.input = contents;
    }

    fn clamp_selection(&mut self) {
        let last = self.visible_tasks().len().saturating_sub(1);
        if self.selected > last {
            self.selected = last;
        }
    }

    // -----------------------------------------------------------------
    // Event application
    // -----------------------------------------------------------------

    /// Apply a confirmation or failure from the sync task.
    ///
    /// This is the only place the mirror changes. Returns a follow-up
    /// command when one event implies another (a fresh session triggers
    /// the initial load).
    pub fn apply_event(&mut self, event: SyncEvent) -> Option<SyncCommand> {
        self.pending = self.pending.saturating_sub(1);

        match event {
            SyncEvent::Loaded { tasks } => {
                self.tasks.reset(tasks);
                self.clamp_selection();
                None
            }
            SyncEvent::Added { task } => {
                self.tasks.prepend(task);
                None
            }
            SyncEvent::Updated { task } => {
                self.tasks.replace(task);
                None
            }
            SyncEvent::Removed { id } => {
                self.tasks.remove(id);
                self.clamp_selection();
                None
            }
            SyncEvent::CompletedCleared { ids } => {
                self.tasks.remove_many(&ids);
                self.clamp_selection();
                None
            }
            SyncEvent::SignedIn { session } => {
                tracing::info!(user = %session.user.email, "session opened");
                self.session = Some(session);
                self.screen = Screen::Board;
                self.login.password.clear();
                self.login.error = None;
                Some(SyncCommand::Load)
            }
            SyncEvent::SignedOut => {
                tracing::info!("session closed");
                self.session = None;
                self.tasks.clear();
                self.screen = Screen::Login;
                self.login.password.clear();
                self.input.clear();
                self.character_index = 0;
                self.editing = None;
                self.banner = None;
                self.input_error = None;
                self.selected = 0;
                None
            }
            SyncEvent::Failed { op, error } => {
                self.apply_failure(op, &error);
                None
            }
        }
    }

    /// Route a failure to the right surface. The mirror stays untouched,
    /// except that a failed load empties it: showing a stale list as if
    /// it were fresh would be worse than showing nothing.
    fn apply_failure(&mut self, op: OpKind, error: &RemoteError) {
        if op.is_auth() {
            self.login.error = Some(error.to_string());
            return;
        }
        if op == OpKind::Load {
            self.tasks.clear();
            self.selected = 0;
        }
        self.banner = Some(error.to_string());
    }

    // -----------------------------------------------------------------
    // Input box editing
    // -----------------------------------------------------------------

    /// Byte offset of the cursor within the input string.
    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.character_index)
            .unwrap_or(self.input.len())
    }

    /// Insert a character at the cursor position.
    fn enter_char(&mut self, c: char) {
        let index = self.byte_index();
        self.input.insert(index, c);
        self.character_index += 1;
    }

    /// Delete the character before the cursor.
    fn delete_char(&mut self) {
        if self.character_index == 0 {
            return;
        }
        let current = self.character_index;
        let before = self.input.chars().take(current - 1);
        let after = self.input.chars().skip(current);
        self.input = before.chain(after).collect();
        self.character_index -= 1;
    }

    /// Move cursor left.
    const fn move_cursor_left(&mut self) {
        if self.character_index > 0 {
            self.character_index -= 1;
        }
    }

    /// Move cursor right.
    fn move_cursor_right(&mut self) {
        if self.character_index < self.input.chars().count() {
            self.character_index += 1;
        }
    }
}
