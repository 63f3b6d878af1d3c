//! Timer-driven reveal of a finalized document.
//!
//! [`reveal`] spawns a task that paints successive prefixes of the target through `on_tick`,
//! one per configured interval. [`RevealHandle::cancel`] jumps straight to the full text: the
//! final text is painted exactly once, and no tick can follow it because both paths go through
//! the same lock and the same [`RevealController`].

use crate::error::StreamError;
use assist_core::{AssistOptions, RevealController};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

struct Painter<F> {
    controller: RevealController,
    on_tick: F,
}

trait Finish: Send {
    /// Paint the remaining text, if any. Returns `true` if something was painted.
    fn finish(&mut self) -> bool;
    fn is_complete(&self) -> bool;
}

impl<F: FnMut(&str) + Send> Finish for Painter<F> {
    fn finish(&mut self) -> bool {
        let Self {
            controller,
            on_tick,
        } = self;
        match controller.finish() {
            Some(text) => {
                on_tick(text);
                true
            }
            None => false,
        }
    }

    fn is_complete(&self) -> bool {
        self.controller.is_complete()
    }
}

/// Handle to a running reveal.
///
/// Dropping the handle does not stop the reveal; it keeps ticking to completion.
pub struct RevealHandle {
    painter: Arc<Mutex<dyn Finish>>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for RevealHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealHandle")
            .field("complete", &self.is_complete())
            .finish_non_exhaustive()
    }
}

impl RevealHandle {
    /// Jump to the final text immediately.
    ///
    /// Returns `true` if the final text was painted by this call, `false` if the reveal had
    /// already completed.
    pub fn cancel(&self) -> bool {
        let painted = self
            .painter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish();
        self.task.abort();
        if painted {
            tracing::debug!("reveal cancelled; final text painted");
        }
        painted
    }

    /// Returns `true` once the full text has been painted.
    pub fn is_complete(&self) -> bool {
        self.painter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_complete()
    }

    /// Wait for the reveal to end, either by completing or by being cancelled.
    pub async fn wait(self) -> Result<(), StreamError> {
        match self.task.await {
            Ok(()) => Ok(()),
            Err(err) if err.is_cancelled() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Reveal `target` on the tokio runtime, calling `on_tick` with each longer prefix.
///
/// Pacing comes from `options` (`reveal-steps`, `reveal-interval-ms`). The first prefix is
/// painted immediately.
pub fn reveal<F>(target: impl Into<String>, options: &AssistOptions, on_tick: F) -> RevealHandle
where
    F: FnMut(&str) + Send + 'static,
{
    let painter = Arc::new(Mutex::new(Painter {
        controller: RevealController::new(target, options.reveal_steps),
        on_tick,
    }));
    let period = options.reveal_interval();

    let task_painter = Arc::clone(&painter);
    let task = tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let mut painter = task_painter.lock().unwrap_or_else(PoisonError::into_inner);
            let Painter {
                controller,
                on_tick,
            } = &mut *painter;
            let Some(prefix) = controller.tick() else {
                return;
            };
            on_tick(prefix);
            if controller.is_complete() {
                return;
            }
        }
    });

    RevealHandle { painter, task }
}

/// Reveal `target` inline, returning once it is fully painted.
///
/// Cancelling `token` paints the full text at once. Returns `false` if the reveal was cut short
/// by cancellation.
pub async fn run_reveal<F>(
    target: impl Into<String>,
    options: &AssistOptions,
    token: &CancellationToken,
    mut on_tick: F,
) -> bool
where
    F: FnMut(&str),
{
    let mut controller = RevealController::new(target, options.reveal_steps);
    let mut interval = time::interval(options.reveal_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                if let Some(text) = controller.finish() {
                    on_tick(text);
                }
                return false;
            }
            _ = interval.tick() => {
                if let Some(prefix) = controller.tick() {
                    on_tick(prefix);
                }
                if controller.is_complete() {
                    return true;
                }
            }
        }
    }
}
