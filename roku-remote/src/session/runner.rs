//! Event loop that drives a [`Session`]
//!
//! Keys arrive on a channel, dispatches run as spawned tasks and report back
//! on another channel, and the status expiry is a timer. Nothing here blocks,
//! so a slow device never freezes input handling.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Effect, Session, SessionKey};

/// Async action run for a dispatched item. Errors are shown to the user as text.
pub type DispatchFn<T> = Arc<dyn Fn(T) -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// Far enough out that an idle timer never fires.
const IDLE: Duration = Duration::from_secs(86_400);

/// Run `session` until it terminates.
///
/// `render` is called once up front and after every state change. The loop
/// ends on quit, selection, cancellation of `cancel`, or when `keys` closes.
/// A dispatch still running at that point is aborted.
pub async fn drive<T, R>(
    session: &mut Session<T>,
    keys: &mut mpsc::Receiver<SessionKey>,
    dispatch: Option<DispatchFn<T>>,
    cancel: &CancellationToken,
    mut render: R,
) where
    T: Clone + Send + 'static,
    R: FnMut(&Session<T>),
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Result<(), String>>();
    let mut in_flight: Option<JoinHandle<()>> = None;

    render(session);

    while !session.is_terminated() {
        let deadline = session.status_deadline();
        let wake_at = deadline.unwrap_or_else(|| Instant::now() + IDLE);

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("Session cancelled");
                session.cancel();
            }

            Some(outcome) = done_rx.recv() => {
                in_flight = None;
                session.complete_dispatch(outcome, Instant::now());
            }

            key = keys.recv() => match key {
                Some(key) => {
                    if let Effect::Dispatch(index) = session.handle_key(key) {
                        in_flight = start(session, index, dispatch.as_ref(), &done_tx);
                    }
                }
                None => session.cancel(),
            },

            _ = sleep_until(wake_at), if deadline.is_some() => {
                session.expire_status(Instant::now());
            }
        }

        render(session);
    }

    if let Some(handle) = in_flight {
        handle.abort();
    }
}

fn start<T>(
    session: &mut Session<T>,
    index: usize,
    dispatch: Option<&DispatchFn<T>>,
    done: &mpsc::UnboundedSender<Result<(), String>>,
) -> Option<JoinHandle<()>>
where
    T: Clone + Send + 'static,
{
    let (Some(dispatch), Some(item)) = (dispatch, session.item(index).cloned()) else {
        session.complete_dispatch(Ok(()), Instant::now());
        return None;
    };

    let work = dispatch(item);
    let done = done.clone();
    Some(tokio::spawn(async move {
        let _ = done.send(work.await);
    }))
}
