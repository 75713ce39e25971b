//! Animation pacing between resolver steps
//!
//! Delays only shape how long a driver waits; they never change the outcome.

use std::time::Duration;

use hexstack_core::types::{
    TransferKind, DUMP_STAGGER_MS, ELIMINATION_PAUSE_MS, GATHER_SETTLE_MS, GATHER_STAGGER_MS,
    STEP_PAUSE_MS, TRANSFER_ANIM_MS,
};
use hexstack_core::StepReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Flight time of one chip
    pub transfer_ms: u32,
    /// Extra wait after a gather lands
    pub gather_settle_ms: u32,
    pub gather_stagger_ms: u32,
    pub dump_stagger_ms: u32,
    pub elimination_pause_ms: u32,
    pub step_pause_ms: u32,
    /// Divisor applied to every delay (1 = real time)
    pub speed: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            transfer_ms: TRANSFER_ANIM_MS,
            gather_settle_ms: GATHER_SETTLE_MS,
            gather_stagger_ms: GATHER_STAGGER_MS,
            dump_stagger_ms: DUMP_STAGGER_MS,
            elimination_pause_ms: ELIMINATION_PAUSE_MS,
            step_pause_ms: STEP_PAUSE_MS,
            speed: 1,
        }
    }
}

impl PacingConfig {
    /// No waiting at all (tests, headless runs)
    pub fn instant() -> Self {
        Self {
            transfer_ms: 0,
            gather_settle_ms: 0,
            gather_stagger_ms: 0,
            dump_stagger_ms: 0,
            elimination_pause_ms: 0,
            step_pause_ms: 0,
            speed: 1,
        }
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed.max(1);
        self
    }

    pub fn is_instant(&self) -> bool {
        *self == Self::instant().with_speed(self.speed)
    }

    fn step_delay_ms(&self, gathered: u32, dumped: u32, eliminations: u32, pending: bool) -> u32 {
        let mut total = 0u32;
        if gathered > 0 {
            total += self.transfer_ms
                + self.gather_stagger_ms * (gathered - 1)
                + self.gather_settle_ms;
        }
        if dumped > 0 {
            total += self.transfer_ms + self.dump_stagger_ms * (dumped - 1);
        }
        total += self.elimination_pause_ms * eliminations;
        if pending {
            total += self.step_pause_ms;
        }
        total / self.speed.max(1)
    }

    /// How long to wait after a step before taking the next one.
    ///
    /// The step pause applies only while cells remain queued.
    pub fn step_delay(&self, report: &StepReport) -> Duration {
        if report.is_terminal() {
            return Duration::ZERO;
        }
        let (gathered, dumped) = report.transfers().fold((0u32, 0u32), |(g, d), t| match t.kind {
            TransferKind::Gather => (g + 1, d),
            TransferKind::Dump => (g, d + 1),
        });
        let eliminations = report.elimination_count() as u32;
        let ms = self.step_delay_ms(gathered, dumped, eliminations, report.pending > 0);
        Duration::from_millis(ms as u64)
    }
}
