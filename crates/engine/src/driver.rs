//! Paced driver - interleaves resolver steps with animation delays
//!
//! The game sits behind an `Arc<RwLock<_>>`. The lock is held only while a
//! step runs, never across a delay, so observers can read the board mid-pass.
//! The session's busy flag rejects a second placement until the pass closes.
//! Dropping a `place` future mid-pass still closes the pass; chips moved so
//! far stay where they are, as with an aborted pass.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, warn};

use hexstack_core::types::Hex;
use hexstack_core::{GameState, Resolution, StepReport};

use crate::pacing::PacingConfig;
use crate::place::{begin_place, PlaceError};

pub type SharedGame = Arc<RwLock<GameState>>;

const LOG_TARGET: &str = "hexstack::driver";

/// Closes an open pass if the driving future goes away before it does.
struct OpenPass {
    game: SharedGame,
    armed: bool,
}

impl Drop for OpenPass {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(target: LOG_TARGET, "driver.abandoned");
        if let Ok(mut game) = self.game.try_write() {
            game.finish_resolution();
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let game = Arc::clone(&self.game);
                handle.spawn(async move {
                    game.write().await.finish_resolution();
                });
            }
            Err(_) => error!(target: LOG_TARGET, "driver.abandoned_without_runtime"),
        }
    }
}

pub struct PacedDriver {
    game: SharedGame,
    pacing: PacingConfig,
    reports: Option<mpsc::UnboundedSender<StepReport>>,
}

impl PacedDriver {
    pub fn new(game: GameState, pacing: PacingConfig) -> Self {
        Self::from_shared(Arc::new(RwLock::new(game)), pacing)
    }

    pub fn from_shared(game: SharedGame, pacing: PacingConfig) -> Self {
        Self {
            game,
            pacing,
            reports: None,
        }
    }

    /// Receive every step report as it happens
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StepReport> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.reports = Some(tx);
        rx
    }

    pub fn game(&self) -> SharedGame {
        Arc::clone(&self.game)
    }

    pub fn pacing(&self) -> &PacingConfig {
        &self.pacing
    }

    /// Place a pile and resolve the pass, waiting between steps.
    pub async fn place(&self, slot: usize, at: Hex) -> Result<Resolution, PlaceError> {
        let mut cascade = {
            let mut game = self.game.write().await;
            begin_place(&mut game, slot, at)?
        };
        let mut open = OpenPass {
            game: self.game(),
            armed: true,
        };

        let mut events = Vec::new();
        let termination = loop {
            let report = {
                let mut game = self.game.write().await;
                game.step_cascade(&mut cascade)
            };
            let delay = self.pacing.step_delay(&report);
            let termination = report.termination();
            events.extend(report.events.iter().copied());

            if let Some(tx) = &self.reports {
                // A dropped receiver only means nobody is watching.
                let _ = tx.send(report);
            }
            if let Some(termination) = termination {
                break termination;
            }

            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                debug!(target: LOG_TARGET, delay_ms = delay.as_millis() as u64, "driver.wait");
                tokio::time::sleep(delay).await;
            }
        };

        {
            let mut game = self.game.write().await;
            game.finish_resolution();
            open.armed = false;
        }
        Ok(Resolution::from_events(
            cascade.origin(),
            cascade.steps(),
            termination,
            events,
        ))
    }
}
