//! Turn driver: feeds a chunk stream into an [`AssistSession`] and paces the reveal.
//!
//! [`run_turn`] is the inline form (one turn, caller owns the task). [`AssistController`] owns
//! the session behind an async mutex, spawns one task per turn and makes the latest request
//! win: starting a turn cancels the previous turn's token, and the superseded task's result is
//! reported as [`StreamError::Superseded`].

use crate::error::StreamError;
use crate::events::StreamEvent;
use assist_core::{
    ApplyOutcome, AssistSession, DocumentHost, EditorSurface, Preview, RevealStatus, TurnId,
};
use futures_util::{Stream, StreamExt};
use std::pin::pin;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Shared, lockable session.
pub type SharedSession<S, H> = Arc<Mutex<AssistSession<S, H>>>;

/// Progress reported by [`AssistController`].
#[derive(Debug)]
pub enum TurnEvent {
    /// A new preview is ready.
    Preview {
        /// Turn the preview belongs to.
        turn: TurnId,
        /// The rendered preview.
        preview: Preview,
    },
    /// The response was finalized and the reveal (if any) completed.
    Finished {
        /// Finished turn.
        turn: TurnId,
        /// What happened to the document.
        outcome: ApplyOutcome,
    },
    /// The turn ended without applying anything.
    Failed {
        /// Failed turn.
        turn: TurnId,
        /// Why it ended.
        error: StreamError,
    },
}

impl TurnEvent {
    /// The turn this event belongs to.
    pub fn turn(&self) -> TurnId {
        match self {
            Self::Preview { turn, .. } | Self::Finished { turn, .. } | Self::Failed { turn, .. } => {
                *turn
            }
        }
    }
}

/// Drive `turn` (already begun on `session`) to completion.
///
/// Chunks are processed strictly in arrival order and `on_preview` runs for each one before the
/// next chunk is awaited. When the stream ends the response is finalized and applied, then the
/// reveal is ticked on the configured interval. Cancelling `token` while streaming aborts the
/// turn without touching the document; cancelling it during the reveal jumps to the final text.
pub async fn run_turn<S, H, E, F>(
    session: &Mutex<AssistSession<S, H>>,
    turn: TurnId,
    events: E,
    token: &CancellationToken,
    mut on_preview: F,
) -> Result<ApplyOutcome, StreamError>
where
    S: EditorSurface,
    H: DocumentHost,
    E: Stream<Item = Result<StreamEvent, StreamError>>,
    F: FnMut(Preview),
{
    let mut events = pin!(events);

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(abort(session, turn, StreamError::Aborted).await),
            next = events.next() => next,
        };
        match next {
            Some(Ok(StreamEvent::Text(chunk))) => {
                let preview = session.lock().await.push_chunk(turn, &chunk);
                match preview {
                    Some(preview) => on_preview(preview),
                    None => return Err(StreamError::Superseded),
                }
            }
            Some(Ok(StreamEvent::Done)) | None => break,
            Some(Ok(StreamEvent::Error(message))) => {
                return Err(abort(session, turn, StreamError::Transport(message)).await);
            }
            Some(Ok(StreamEvent::Other(value))) => {
                tracing::trace!(%value, "ignoring stream event");
            }
            Some(Err(err)) => return Err(abort(session, turn, err).await),
        }
    }

    let (outcome, period) = {
        let mut session = session.lock().await;
        (session.finish_turn(turn), session.options().reveal_interval())
    };
    if outcome == ApplyOutcome::Stale {
        return Err(StreamError::Superseded);
    }
    if outcome.is_applied() {
        reveal_turn(session, turn, period, token).await;
    }
    Ok(outcome)
}

async fn abort<S, H>(
    session: &Mutex<AssistSession<S, H>>,
    turn: TurnId,
    reason: StreamError,
) -> StreamError
where
    S: EditorSurface,
    H: DocumentHost,
{
    if session.lock().await.abort_turn(turn) {
        tracing::debug!(turn = turn.get(), %reason, "turn ended early");
        reason
    } else {
        StreamError::Superseded
    }
}

async fn reveal_turn<S, H>(
    session: &Mutex<AssistSession<S, H>>,
    turn: TurnId,
    period: time::Duration,
    token: &CancellationToken,
) where
    S: EditorSurface,
    H: DocumentHost,
{
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                let mut session = session.lock().await;
                if session.revealing_turn() == Some(turn) {
                    session.finish_reveal();
                }
                return;
            }
            _ = interval.tick() => {
                let mut session = session.lock().await;
                // a newer turn completes this reveal itself
                if session.revealing_turn() != Some(turn)
                    || session.reveal_tick() != RevealStatus::InProgress
                {
                    return;
                }
            }
        }
    }
}

struct RunningTurn {
    turn: TurnId,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// Owns a session and runs one streamed turn at a time; the latest request wins.
pub struct AssistController<S, H> {
    session: SharedSession<S, H>,
    events: mpsc::UnboundedSender<TurnEvent>,
    running: Option<RunningTurn>,
}

impl<S, H> AssistController<S, H>
where
    S: EditorSurface + Send + 'static,
    H: DocumentHost + Send + 'static,
{
    /// Wrap `session`; progress is reported on the returned receiver.
    pub fn new(session: AssistSession<S, H>) -> (Self, mpsc::UnboundedReceiver<TurnEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            session: Arc::new(Mutex::new(session)),
            events,
            running: None,
        };
        (controller, receiver)
    }

    /// The shared session (e.g. to set the active document).
    pub fn session(&self) -> SharedSession<S, H> {
        Arc::clone(&self.session)
    }

    /// The most recently started turn.
    pub fn current_turn(&self) -> Option<TurnId> {
        self.running.as_ref().map(|running| running.turn)
    }

    /// Start a turn reading `events`, cancelling whatever turn is still running.
    pub async fn start_turn<E>(&mut self, events: E) -> TurnId
    where
        E: Stream<Item = Result<StreamEvent, StreamError>> + Send + 'static,
    {
        // begin first so the old task finds its turn superseded rather than aborted
        let turn = self.session.lock().await.begin_turn();
        if let Some(previous) = self.running.take() {
            previous.token.cancel();
        }

        let token = CancellationToken::new();
        let session = Arc::clone(&self.session);
        let sender = self.events.clone();
        let task_token = token.clone();

        let task = tokio::spawn(async move {
            let previews = sender.clone();
            let result = run_turn(&session, turn, events, &task_token, |preview| {
                let _ = previews.send(TurnEvent::Preview { turn, preview });
            })
            .await;
            let event = match result {
                Ok(outcome) => TurnEvent::Finished { turn, outcome },
                Err(error) => TurnEvent::Failed { turn, error },
            };
            let _ = sender.send(event);
        });

        self.running = Some(RunningTurn {
            turn,
            token,
            task: Some(task),
        });
        turn
    }

    /// Cancel the running turn. Returns `false` if no turn was started.
    pub fn abort(&self) -> bool {
        match &self.running {
            Some(running) => {
                running.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Wait for the most recently started turn's task to end.
    pub async fn join(&mut self) -> Result<(), StreamError> {
        if let Some(task) = self.running.as_mut().and_then(|running| running.task.take()) {
            task.await?;
        }
        Ok(())
    }
}
