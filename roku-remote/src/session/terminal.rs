//! Full-screen terminal front end for sessions
//!
//! Owns raw mode and the alternate screen for the lifetime of one session.
//! Keyboard input is read on a plain thread, since crossterm's reader
//! blocks, and forwarded to the async loop over a channel.

use std::io::{self, Stdout};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::keymap::from_crossterm;
use super::runner::{drive, DispatchFn};
use super::{Session, SessionKey};

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Restores the terminal when dropped, including on early return.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
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

/// Run `session` on the terminal until it ends and hand it back.
pub async fn run_interactive<T>(
    mut session: Session<T>,
    dispatch: Option<DispatchFn<T>>,
    cancel: &CancellationToken,
) -> io::Result<Session<T>>
where
    T: Clone + Send + 'static,
{
    let mut guard = TerminalGuard::enter()?;
    let (tx, mut rx) = mpsc::channel(32);
    let reader = spawn_input_reader(tx);

    let mut draw_error = None;
    drive(&mut session, &mut rx, dispatch, cancel, |session| {
        if draw_error.is_some() {
            return;
        }
        let text = session.view();
        let result = guard.terminal.draw(|frame| {
            let widget = Paragraph::new(text.as_str())
                .block(Block::default().borders(Borders::ALL))
                .wrap(Wrap { trim: false });
            frame.render_widget(widget, frame.size());
        });
        if let Err(e) = result {
            draw_error = Some(e);
        }
    })
    .await;

    // Dropping the receiver makes the reader thread exit on its next poll.
    drop(rx);
    drop(guard);
    if reader.join().is_err() {
        debug!("Input reader thread panicked");
    }

    match draw_error {
        Some(e) => Err(e),
        None => Ok(session),
    }
}

fn spawn_input_reader(tx: mpsc::Sender<SessionKey>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        if tx.is_closed() {
            break;
        }
        match event::poll(INPUT_POLL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(key) = from_crossterm(key) {
                        if tx.blocking_send(key).is_err() {
                            break;
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Terminal read failed: {}", e);
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                debug!("Terminal poll failed: {}", e);
                break;
            }
        }
    })
}
