//! Interactive session engine
//!
//! A [`Session`] is a small state machine over a list of items. It knows
//! nothing about terminals or devices: keys go in through
//! [`Session::handle_key`], effects come out, and [`Session::view`] renders
//! the current state as plain text. The runner in [`runner`] wires it to an
//! input channel and an async dispatch callback; [`terminal`] puts it on
//! screen.
//!
//! Three kinds share the engine:
//!
//! - [`SessionKind::Select`]: pick one item and finish (device picker, switcher)
//! - [`SessionKind::Dispatch`]: fire an async action per item and stay open
//! - [`SessionKind::Keypad`]: like `Dispatch`, driven by direct key bindings

pub mod keymap;
pub mod runner;
pub mod terminal;

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// How long a completion message stays on screen.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Terminal-independent key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Char(char),
    /// A letter pressed with Control, lowercased
    Ctrl(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Esc,
    Tab,
    Backspace,
    PageUp,
    PageDown,
}

impl SessionKey {
    fn is_quit(&self) -> bool {
        matches!(
            self,
            SessionKey::Char('q') | SessionKey::Esc | SessionKey::Ctrl('c')
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Browsing,
    /// One dispatch in flight; only quit is accepted
    Dispatching,
    /// A completion message is showing until it expires
    Feedback,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Select,
    Dispatch,
    Keypad,
}

/// What the caller must do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Run the dispatch callback for the item at this index
    Dispatch(usize),
    /// The session ended with this item chosen
    Selected(usize),
    /// The session ended without a choice
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    /// `None` while the message should stay until replaced
    pub expires_at: Option<Instant>,
}

/// State of one interactive command.
#[derive(Debug)]
pub struct Session<T> {
    title: String,
    footer: String,
    kind: SessionKind,
    items: Vec<T>,
    labels: Vec<String>,
    bindings: HashMap<SessionKey, usize>,
    legend: Vec<(String, String)>,
    cursor: usize,
    selected: Option<usize>,
    pending: Option<usize>,
    status: Option<Status>,
    phase: Phase,
}

impl<T> Session<T> {
    fn new(kind: SessionKind, title: impl Into<String>, items: Vec<T>, label: impl Fn(&T) -> String) -> Self {
        let labels = items.iter().map(label).collect();
        let footer = match kind {
            SessionKind::Select => "↑/k ↓/j: move  enter: choose  q/esc: quit",
            SessionKind::Dispatch => "↑/k ↓/j: move  enter: send  q/esc: quit",
            SessionKind::Keypad => "q/esc/ctrl+c: quit",
        };
        Self {
            title: title.into(),
            footer: footer.to_string(),
            kind,
            items,
            labels,
            bindings: HashMap::new(),
            legend: Vec::new(),
            cursor: 0,
            selected: None,
            pending: None,
            status: None,
            phase: Phase::Browsing,
        }
    }

    /// Pick one item; enter ends the session.
    pub fn select(title: impl Into<String>, items: Vec<T>, label: impl Fn(&T) -> String) -> Self {
        Self::new(SessionKind::Select, title, items, label)
    }

    /// Send the item under the cursor on enter; the session stays open.
    pub fn dispatch(title: impl Into<String>, items: Vec<T>, label: impl Fn(&T) -> String) -> Self {
        Self::new(SessionKind::Dispatch, title, items, label)
    }

    /// Dispatch items through direct key bindings.
    ///
    /// Each binding is `(key, key legend, item index)`; bindings pointing past
    /// the end of `items` are dropped.
    pub fn keypad(
        title: impl Into<String>,
        items: Vec<T>,
        label: impl Fn(&T) -> String,
        bindings: Vec<(SessionKey, &str, usize)>,
    ) -> Self {
        let mut session = Self::new(SessionKind::Keypad, title, items, label);
        for (key, legend, index) in bindings {
            if index >= session.items.len() {
                continue;
            }
            session.bindings.insert(key, index);
            session
                .legend
                .push((legend.to_string(), session.labels[index].clone()));
        }
        session
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Consume the session, returning the chosen item if any.
    pub fn into_selected(mut self) -> Option<T> {
        let index = self.selected?;
        if index < self.items.len() {
            Some(self.items.swap_remove(index))
        } else {
            None
        }
    }

    /// When the current status message should be cleared.
    pub fn status_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Feedback => self.status.as_ref().and_then(|s| s.expires_at),
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: SessionKey) -> Effect {
        if self.phase == Phase::Terminated {
            return Effect::None;
        }
        if key.is_quit() {
            self.phase = Phase::Terminated;
            return Effect::Quit;
        }
        if self.phase == Phase::Dispatching {
            return Effect::None;
        }

        if self.kind == SessionKind::Keypad {
            return match self.bindings.get(&key).copied() {
                Some(index) => self.start_dispatch(index),
                None => Effect::None,
            };
        }

        match key {
            SessionKey::Up | SessionKey::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                Effect::None
            }
            SessionKey::Down | SessionKey::Char('j') => {
                if self.cursor + 1 < self.items.len() {
                    self.cursor += 1;
                }
                Effect::None
            }
            SessionKey::Enter if !self.items.is_empty() => match self.kind {
                SessionKind::Select => {
                    self.selected = Some(self.cursor);
                    self.phase = Phase::Terminated;
                    Effect::Selected(self.cursor)
                }
                _ => self.start_dispatch(self.cursor),
            },
            _ => Effect::None,
        }
    }

    fn start_dispatch(&mut self, index: usize) -> Effect {
        self.pending = Some(index);
        self.phase = Phase::Dispatching;
        self.status = Some(Status {
            message: format!("Sending '{}'...", self.labels[index]),
            expires_at: None,
        });
        Effect::Dispatch(index)
    }

    /// Record the outcome of the in-flight dispatch.
    ///
    /// Ignored unless a dispatch is pending, so a late completion after quit
    /// changes nothing.
    pub fn complete_dispatch(&mut self, outcome: Result<(), String>, now: Instant) {
        if self.phase != Phase::Dispatching {
            return;
        }
        let Some(index) = self.pending.take() else {
            return;
        };
        let label = &self.labels[index];
        let message = match outcome {
            Ok(()) => format!("Command '{}' sent", label),
            Err(err) => format!("Error sending command '{}': {}", label, err),
        };
        self.status = Some(Status {
            message,
            expires_at: Some(now + STATUS_TTL),
        });
        self.phase = Phase::Feedback;
    }

    /// Clear an expired completion message. Returns whether anything changed.
    pub fn expire_status(&mut self, now: Instant) -> bool {
        match self.status_deadline() {
            Some(deadline) if deadline <= now => {
                self.status = None;
                self.phase = Phase::Browsing;
                true
            }
            _ => false,
        }
    }

    /// End the session without a choice.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.phase = Phase::Terminated;
    }

    /// Plain-text rendering of the current state.
    pub fn view(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push_str("\n\n");

        if self.kind == SessionKind::Keypad {
            let width = self.legend.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
            for (key, label) in &self.legend {
                out.push_str(&format!("  {:<width$}  {}\n", key, label, width = width));
            }
        } else if self.items.is_empty() {
            out.push_str("  (nothing to show)\n");
        } else {
            for (index, label) in self.labels.iter().enumerate() {
                let marker = if index == self.cursor { ">" } else { " " };
                out.push_str(&format!("{} {}\n", marker, label));
            }
        }

        out.push('\n');
        if let Some(status) = &self.status {
            out.push_str(&status.message);
            out.push('\n');
        }
        out.push_str(&self.footer);
        out
    }
}
