//! The two-phase survey/ranging session.
//!
//! One spawned task owns the transport, the frame buffer, and the session
//! state exclusively -- there is no locking because nothing else touches
//! them. The task drives a small state machine:
//!
//! ```text
//! AwaitingSurvey --(survey frame accepted)--> SurveyAcquired --> Ranging
//!       ^  |                                                       |
//!       +--+ (retry indefinitely)             (cancellation) --> Stopped
//! ```
//!
//! Malformed or incomplete frames never terminate the session; they are a
//! normal operating condition on this link (serial noise, boundary
//! misalignment) and are counted and discarded. Only an external stop
//! request reaches `Stopped`. The stop request is polled once per
//! iteration, between frame attempts, so worst-case stop latency is one
//! full framing cycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use uwblink_core::error::{Error, Result};
use uwblink_core::report::{ReportSink, UwbReport};
use uwblink_core::transport::Transport;

use crate::framer::{FrameOutcome, FramerConfig, MessageFramer};
use crate::wire;

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Surveying the grid; the survey command is re-sent on every retry.
    AwaitingSurvey,
    /// Survey frame accepted; about to begin ranging.
    SurveyAcquired,
    /// Continuous ranging.
    Ranging,
    /// Terminal. The stop-ranging command has been sent exactly once.
    Stopped,
}

/// Frame counters, shared between the session task and its handle.
#[derive(Debug, Default)]
pub struct SessionStats {
    frames_published: AtomicU64,
    frame_errors: AtomicU64,
}

impl SessionStats {
    fn count_published(&self) {
        self.frames_published.fetch_add(1, Ordering::Relaxed);
    }

    fn count_error(&self) {
        self.frame_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Accepted-and-published frame count.
    pub fn frames_published(&self) -> u64 {
        self.frames_published.load(Ordering::Relaxed)
    }

    /// Discarded attempts: malformed frames, mid-frame gaps, cold
    /// timeouts, and range-gate rejections.
    pub fn frame_errors(&self) -> u64 {
        self.frame_errors.load(Ordering::Relaxed)
    }
}

/// A point-in-time snapshot of the session for status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub frames_published: u64,
    pub frame_errors: u64,
}

/// Session tuning, assembled by the builder.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionConfig {
    pub framer: FramerConfig,
    /// Opt-in plausibility limit for decoded positions/distances, in
    /// centimeters. `None` disables the gate (the default).
    pub max_plausible_cm: Option<f32>,
}

/// Handle to a running session task.
///
/// Dropping the handle does not stop the session; call
/// [`request_stop`](RddroneHandle::request_stop) and then
/// [`wait`](RddroneHandle::wait) for an orderly shutdown.
pub struct RddroneHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    state_rx: watch::Receiver<SessionState>,
    stats: Arc<SessionStats>,
}

impl RddroneHandle {
    /// Ask the session to stop.
    ///
    /// Observed between frame attempts; on observation the session sends
    /// the stop-ranging command once and exits. Idempotent: repeated calls
    /// change nothing.
    pub fn request_stop(&self) {
        self.cancel.cancel();
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Snapshot of state and frame counters.
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state(),
            frames_published: self.stats.frames_published(),
            frame_errors: self.stats.frame_errors(),
        }
    }

    /// Wait for the session task to finish.
    pub async fn wait(self) -> Result<()> {
        self.task
            .await
            .map_err(|e| Error::Transport(format!("session task failed: {e}")))
    }
}

/// Spawn the session task. The task owns the transport for its lifetime
/// and releases it on teardown.
pub(crate) fn spawn_session(
    transport: Box<dyn Transport>,
    config: SessionConfig,
    sink: Box<dyn ReportSink>,
) -> RddroneHandle {
    let cancel = CancellationToken::new();
    let (state_tx, state_rx) = watch::channel(SessionState::AwaitingSurvey);
    let stats = Arc::new(SessionStats::default());

    let mut controller = SessionController {
        transport,
        framer: MessageFramer::new(config.framer),
        sink,
        cancel: cancel.clone(),
        state_tx,
        stats: stats.clone(),
        max_plausible_cm: config.max_plausible_cm,
    };
    let task = tokio::spawn(async move { controller.run().await });

    RddroneHandle {
        cancel,
        task,
        state_rx,
        stats,
    }
}

/// Outcome of one survey attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurveyAttempt {
    Acquired,
    Retry,
}

pub(crate) struct SessionController {
    transport: Box<dyn Transport>,
    framer: MessageFramer,
    sink: Box<dyn ReportSink>,
    cancel: CancellationToken,
    state_tx: watch::Sender<SessionState>,
    stats: Arc<SessionStats>,
    max_plausible_cm: Option<f32>,
}

impl SessionController {
    pub(crate) async fn run(&mut self) {
        if let Err(e) = self.run_phases().await {
            // The device vanished mid-session. Per-frame recovery does not
            // apply; end the task.
            error!(error = %e, "session ended on transport error");
        }
        self.enter_stopped().await;
        if let Err(e) = self.transport.close().await {
            warn!(error = %e, "failed to close transport");
        }
    }

    async fn run_phases(&mut self) -> Result<()> {
        while !self.cancel.is_cancelled() {
            if self.survey_attempt().await? == SurveyAttempt::Acquired {
                break;
            }
        }
        if self.cancel.is_cancelled() {
            return Ok(());
        }

        self.set_state(SessionState::Ranging);
        self.send_command(&wire::CMD_PURE_RANGING, "pure ranging")
            .await?;

        while !self.cancel.is_cancelled() {
            self.ranging_cycle().await?;
        }
        Ok(())
    }

    /// One pass of the survey phase: (re)send the survey command, then try
    /// to frame and decode one grid survey message. Every failure mode
    /// means `Retry` -- this is the only state with unbounded retry.
    async fn survey_attempt(&mut self) -> Result<SurveyAttempt> {
        self.send_command(&wire::CMD_GRID_SURVEY, "grid survey")
            .await?;

        let outcome = self
            .framer
            .receive_message(&mut *self.transport, wire::GRID_SURVEY_MSG_LEN)
            .await?;

        match outcome {
            FrameOutcome::Complete(frame) => match wire::decode_grid_survey(&frame) {
                Ok(report) => {
                    if let Some(limit) = self.max_plausible_cm {
                        if !wire::survey_within_range(&report, limit) {
                            debug!(limit_cm = limit, "grid survey outside plausible range");
                            self.stats.count_error();
                            return Ok(SurveyAttempt::Retry);
                        }
                    }
                    debug!(
                        anchors = report.anchor_count,
                        uuid = ?report.grid_uuid,
                        "grid survey acquired"
                    );
                    self.set_state(SessionState::SurveyAcquired);
                    self.stats.count_published();
                    self.sink.publish(UwbReport::GridSurvey(report));
                    Ok(SurveyAttempt::Acquired)
                }
                Err(e) => {
                    debug!(error = %e, "discarding grid survey frame");
                    self.stats.count_error();
                    Ok(SurveyAttempt::Retry)
                }
            },
            FrameOutcome::TimedOut => {
                debug!("no grid survey response, retrying");
                self.stats.count_error();
                Ok(SurveyAttempt::Retry)
            }
            FrameOutcome::Aborted => {
                self.stats.count_error();
                Ok(SurveyAttempt::Retry)
            }
        }
    }

    /// One ranging iteration: frame and decode one distance result.
    /// Failures are counted and the phase continues; nothing here can end
    /// the session except a transport fault.
    async fn ranging_cycle(&mut self) -> Result<()> {
        let outcome = self
            .framer
            .receive_message(&mut *self.transport, wire::DISTANCE_RESULT_MSG_LEN)
            .await?;

        match outcome {
            FrameOutcome::Complete(frame) => match wire::decode_distance_result(&frame) {
                Ok(report) => {
                    if let Some(limit) = self.max_plausible_cm {
                        if !wire::distance_within_range(&report, limit) {
                            debug!(limit_cm = limit, "distance result outside plausible range");
                            self.stats.count_error();
                            return Ok(());
                        }
                    }
                    self.stats.count_published();
                    self.sink.publish(UwbReport::Distance(report));
                }
                Err(e) => {
                    debug!(error = %e, "discarding distance frame");
                    self.stats.count_error();
                }
            },
            FrameOutcome::Aborted => {
                self.stats.count_error();
            }
            FrameOutcome::TimedOut => {
                // Zero bytes over a whole cold wait. One diagnostic per
                // occurrence; no backoff, no reconnect -- keep waiting.
                warn!("UWB module is not responding");
                self.stats.count_error();
            }
        }
        Ok(())
    }

    /// Enter the terminal state, sending the stop-ranging command exactly
    /// once. Safe to call more than once.
    async fn enter_stopped(&mut self) {
        if *self.state_tx.borrow() == SessionState::Stopped {
            return;
        }
        if let Err(e) = self
            .send_command(&wire::CMD_STOP_RANGING, "stop ranging")
            .await
        {
            warn!(error = %e, "failed to send stop-ranging command");
        }
        self.set_state(SessionState::Stopped);
    }

    /// Write one command frame. A short write is logged and tolerated:
    /// commands are effectively idempotent in this protocol, and the
    /// session will retry or the module will keep its previous mode.
    async fn send_command(&mut self, cmd: &[u8], name: &str) -> Result<()> {
        let written = self.transport.send(cmd).await?;
        if written < cmd.len() {
            warn!(
                command = name,
                written,
                expected = cmd.len(),
                "short write on command frame"
            );
        }
        Ok(())
    }

    fn set_state(&self, state: SessionState) {
        debug!(?state, "session state");
        self.state_tx.send_replace(state);
    }
}
