//! Pet Session Runtime
//!
//! One tokio task owns everything mutable: the [`Pet`], the
//! [`GestureInterpreter`], the overlay window and the renderer. It
//! multiplexes five sources in a single `select!`:
//!
//! 1. shutdown (oneshot, or the handle being dropped)
//! 2. pointer events (mpsc)
//! 3. the long-press deadline
//! 4. return-to-ground frames (only while settling)
//! 5. the motion tick
//!
//! Nothing else touches the pet, so there is no locking and no way for a
//! tick to interleave with a drag update.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::animation::SettleAnimation;
use crate::config::PetConfig;
use crate::control::{ControlMode, Pet};
use crate::geometry::{Position, ScreenBounds};
use crate::gesture::{GestureInterpreter, GestureSignal, PointerEvent};
use crate::host::{OverlayHost, OverlayWindow, Renderer};
use crate::motion::{Activity, DecisionSource, Facing, MotionStateMachine, RandomDecisions};

/// Pointer events buffered between the host and the session
const POINTER_CHANNEL_CAPACITY: usize = 256;

/// Pet signals buffered for the host before new ones are dropped
const SIGNAL_CHANNEL_CAPACITY: usize = 64;

/// Notifications for the host application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PetSignal {
    /// The pet was tapped
    Tap,
    /// The pet was long-pressed
    LongPress,
    /// Position authority moved between the user and the motion machine
    ControlChanged(ControlMode),
}

/// Errors talking to a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session task has stopped
    #[error("pet session is closed")]
    Closed,

    /// The session task panicked or was aborted
    #[error("pet session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Observable pet state, published after every change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PetSnapshot {
    /// Authoritative position
    pub position: Position,
    /// Motion activity (frozen while user-controlled)
    pub activity: Activity,
    /// Facing
    pub facing: Facing,
    /// Who drives the position
    pub mode: ControlMode,
    /// Session bounds
    pub bounds: ScreenBounds,
}

/// Cheap clonable sender for pointer events
#[derive(Clone, Debug)]
pub struct PointerSender {
    tx: mpsc::Sender<PointerEvent>,
}

impl PointerSender {
    /// Queue a pointer event
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the session has stopped.
    pub async fn send(&self, event: PointerEvent) -> Result<(), SessionError> {
        self.tx.send(event).await.map_err(|_| SessionError::Closed)
    }

    /// Queue a pointer event without waiting; drops it when the buffer is full
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the session has stopped.
    pub fn try_send(&self, event: PointerEvent) -> Result<(), SessionError> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("pointer buffer full, dropping event");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SessionError::Closed),
        }
    }
}

/// Host-side handle to a running session
///
/// Dropping the handle stops the session and detaches the window.
#[derive(Debug)]
pub struct SessionHandle {
    pointer: PointerSender,
    signals: mpsc::Receiver<PetSignal>,
    snapshot: watch::Receiver<PetSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Sender for pointer events
    #[must_use]
    pub fn pointer(&self) -> PointerSender {
        self.pointer.clone()
    }

    /// Queue a pointer event
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the session has stopped.
    pub async fn send(&self, event: PointerEvent) -> Result<(), SessionError> {
        self.pointer.send(event).await
    }

    /// Wait for the next pet signal; `None` once the session has stopped
    pub async fn next_signal(&mut self) -> Option<PetSignal> {
        self.signals.recv().await
    }

    /// Next pet signal if one is already queued
    pub fn try_signal(&mut self) -> Option<PetSignal> {
        self.signals.try_recv().ok()
    }

    /// Latest published state
    #[must_use]
    pub fn snapshot(&self) -> PetSnapshot {
        *self.snapshot.borrow()
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<PetSnapshot> {
        self.snapshot.clone()
    }

    /// Stop the session and wait for it to detach the window
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Join`] if the session task panicked.
    pub async fn shutdown(mut self) -> Result<(), SessionError> {
        if let Some(tx) = self.shutdown.take() {
            // The task may already be gone; that is the state we want anyway.
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await?;
        }
        Ok(())
    }
}

struct Settling {
    animation: SettleAnimation,
    started: Instant,
}

/// The session actor
pub struct PetSession<H, R, D> {
    pet: Pet<D>,
    gestures: GestureInterpreter,
    window: OverlayWindow<H>,
    renderer: R,
    settling: Option<Settling>,
    settle_duration: Duration,
    shown_facing: Option<Facing>,
    signals: mpsc::Sender<PetSignal>,
    snapshot: watch::Sender<PetSnapshot>,
}

impl<H, R> PetSession<H, R, RandomDecisions>
where
    H: OverlayHost + 'static,
    R: Renderer + 'static,
{
    /// Start a session on the current tokio runtime
    ///
    /// Decisions are seeded from `config.seed` when present.
    pub fn spawn(config: PetConfig, host: H, renderer: R) -> SessionHandle {
        let decisions = RandomDecisions::from_seed(config.seed);
        Self::spawn_with_decisions(config, host, renderer, decisions)
    }
}

impl<H, R, D> PetSession<H, R, D>
where
    H: OverlayHost + 'static,
    R: Renderer + 'static,
    D: DecisionSource + Send + 'static,
{
    /// Start a session with an explicit decision source
    pub fn spawn_with_decisions(
        config: PetConfig,
        host: H,
        renderer: R,
        decisions: D,
    ) -> SessionHandle {
        let window = OverlayWindow::new(host);
        let metrics = window.display_metrics();
        let bounds = ScreenBounds::from_display(metrics, config.sprite_px());
        tracing::info!(
            width = metrics.width_px,
            height = metrics.height_px,
            half_width = bounds.half_width(),
            ground_y = bounds.ground_y(),
            "starting pet session"
        );

        let pet = Pet::new(MotionStateMachine::new(config.motion), bounds, decisions);
        let (snapshot_tx, snapshot_rx) = watch::channel(PetSnapshot {
            position: pet.position(),
            activity: pet.activity(),
            facing: pet.facing(),
            mode: pet.mode(),
            bounds,
        });
        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
        let (pointer_tx, pointer_rx) = mpsc::channel(POINTER_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let session = Self {
            pet,
            gestures: GestureInterpreter::new(config.gesture),
            window,
            renderer,
            settling: None,
            settle_duration: config.settle_duration,
            shown_facing: None,
            signals: signal_tx,
            snapshot: snapshot_tx,
        };

        let task = tokio::spawn(session.run(
            pointer_rx,
            shutdown_rx,
            config.tick_interval,
            config.settle_frame_interval,
        ));

        SessionHandle {
            pointer: PointerSender { tx: pointer_tx },
            signals: signal_rx,
            snapshot: snapshot_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    async fn run(
        mut self,
        mut pointer_rx: mpsc::Receiver<PointerEvent>,
        mut shutdown_rx: oneshot::Receiver<()>,
        tick_interval: Duration,
        frame_interval: Duration,
    ) {
        self.window.attach();
        self.show_facing(self.pet.facing());
        self.window.move_to(self.pet.position());

        let mut ticks = tokio::time::interval(tick_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut frames = tokio::time::interval(frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let long_press = self.gestures.long_press_deadline();
            let was_settling = self.settling.is_some();

            tokio::select! {
                biased;

                _ = &mut shutdown_rx => {
                    tracing::debug!("shutdown requested");
                    break;
                }

                event = pointer_rx.recv() => match event {
                    Some(event) => self.on_pointer(event),
                    None => {
                        tracing::debug!("pointer source closed");
                        break;
                    }
                },

                () = wait_until(long_press) => {
                    if let Some(signal) = self.gestures.poll_long_press(Instant::now()) {
                        self.apply(signal);
                    }
                }

                _ = frames.tick(), if was_settling => self.on_settle_frame(),

                _ = ticks.tick() => self.on_tick(),
            }

            if !was_settling && self.settling.is_some() {
                frames.reset_immediately();
            }
        }

        self.window.detach();
        tracing::info!("pet session stopped");
    }

    fn on_pointer(&mut self, event: PointerEvent) {
        let current = self.pet.position();
        for signal in self.gestures.handle(event, current) {
            self.apply(signal);
        }
    }

    fn apply(&mut self, signal: GestureSignal) {
        match signal {
            GestureSignal::Drag(position) => {
                if self.settling.take().is_some() {
                    tracing::debug!("drag interrupted return-to-ground");
                }
                let was = self.pet.mode();
                let at = self.pet.drag_to(position);
                self.window.move_to(at);
                if was == ControlMode::Autonomous {
                    self.notify(PetSignal::ControlChanged(ControlMode::UserControlled));
                }
            }
            GestureSignal::Nudge { dx, dy } => match self.pet.nudge(dx, dy) {
                Ok(at) => self.window.move_to(at),
                Err(e) => tracing::debug!(error = %e, "ignoring fling"),
            },
            GestureSignal::Tap => self.notify(PetSignal::Tap),
            GestureSignal::LongPress => self.notify(PetSignal::LongPress),
            GestureSignal::Settle(from) => match self.pet.hold_at(from) {
                Ok(at) => {
                    tracing::debug!(from = %at, "returning to ground");
                    self.window.move_to(at);
                    self.settling = Some(Settling {
                        animation: SettleAnimation::new(at, self.settle_duration),
                        started: Instant::now(),
                    });
                }
                Err(e) => tracing::debug!(error = %e, "ignoring settle"),
            },
            GestureSignal::Released(at) => self.hand_back(at),
        }
        self.publish();
    }

    fn on_settle_frame(&mut self) {
        let Some(settling) = self.settling.as_ref() else {
            return;
        };
        let elapsed = settling.started.elapsed();
        let at = settling.animation.sample(elapsed);
        let finished = settling.animation.is_finished(elapsed);

        if finished {
            self.settling = None;
            self.hand_back(at);
        } else if let Ok(at) = self.pet.hold_at(at) {
            self.window.move_to(at);
        }
        self.publish();
    }

    fn hand_back(&mut self, at: Position) {
        match self.pet.release(at) {
            Ok(resumed) => {
                self.window.move_to(resumed);
                self.notify(PetSignal::ControlChanged(ControlMode::Autonomous));
            }
            Err(e) => tracing::debug!(error = %e, "ignoring release"),
        }
    }

    fn on_tick(&mut self) {
        let Some(step) = self.pet.tick() else {
            return;
        };
        self.window.move_to(step.position);
        self.show_facing(step.facing);
        if step.transitioned {
            tracing::debug!(position = %step.position, activity = ?step.activity, "activity changed");
        } else {
            tracing::trace!(position = %step.position, "tick");
        }
        self.publish();
    }

    fn show_facing(&mut self, facing: Facing) {
        if self.shown_facing != Some(facing) {
            self.renderer.show_facing(facing);
            self.shown_facing = Some(facing);
        }
    }

    fn notify(&self, signal: PetSignal) {
        match self.signals.try_send(signal) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(?signal, "signal buffer full, dropping");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    fn publish(&self) {
        let next = PetSnapshot {
            position: self.pet.position(),
            activity: self.pet.activity(),
            facing: self.pet.facing(),
            mode: self.pet.mode(),
            bounds: self.pet.bounds(),
        };
        self.snapshot.send_if_modified(|current| {
            let changed = *current != next;
            *current = next;
            changed
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
