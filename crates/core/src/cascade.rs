//! Cascade resolver - the queue-driven state machine behind every placement
//!
//! A pass starts from the cell the player just filled and repeatedly pulls
//! coordinates off a [`ResolutionQueue`]. For each coordinate it looks at the
//! six neighbors and decides whether the cell stays put (and maybe eliminates),
//! gathers matching neighbors onto itself, or pumps everything into one chosen
//! neighbor. When the queue runs dry the [`failsafe`](crate::failsafe) sweep
//! looks for work the local cascade missed.
//!
//! The resolver has no notion of time. [`Cascade::step`] performs exactly one
//! step, commits every board mutation of that step, and hands back the events
//! a renderer needs to animate it. Pacing is the caller's business.
//!
//! # States
//!
//! ```text
//! QUEUE_DRAINING --(queue empty)--> FAILSAFE_SCAN --(hit)--> QUEUE_DRAINING
//!                                         |
//!                                    (nothing) / step limit / error
//!                                         v
//!                                    TERMINATED
//! ```

use arrayvec::ArrayVec;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::board::{Board, BoardError, Cell};
use crate::config::RulesConfig;
use crate::failsafe;
use crate::queue::ResolutionQueue;
use crate::scoring::ScoreTracker;
use crate::types::{
    CascadeEvent, ChipTransfer, Color, Hex, TransferKind, ELIMINATION_PRIORITY,
    ELIMINATION_THRESHOLD,
};

const LOG_TARGET: &str = "hexstack::cascade";

/// Unexpected failure inside a step. Aborts the remainder of the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CascadeError {
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Why a pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Queue empty and the failsafe sweep found nothing
    Settled,
    /// Circuit breaker tripped; the board may be mid-cascade
    StepLimit,
    /// A step failed; mutations applied so far are kept
    Aborted,
}

/// What one step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// Coordinate missing, empty or an obstacle
    Skipped,
    /// No matching neighbor and nothing to eliminate
    Settled,
    /// No matching neighbor; the top run was eliminated
    Eliminated { count: usize },
    /// Matching neighbors were pulled onto the hub
    Gather { sources: usize, moved: usize },
    /// Other matches were pulled onto the hub, then the hub run moved to `target`
    PumpAndDump { target: Hex, moved: usize },
    /// The pass is over; further steps are no-ops
    Terminated(Termination),
}

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Steps consumed so far, this one included
    pub step: u32,
    pub at: Option<Hex>,
    pub action: StepAction,
    pub events: Vec<CascadeEvent>,
    /// Cells still queued after this step
    pub pending: usize,
}

impl StepReport {
    pub fn is_terminal(&self) -> bool {
        matches!(self.action, StepAction::Terminated(_))
    }

    pub fn termination(&self) -> Option<Termination> {
        match self.action {
            StepAction::Terminated(t) => Some(t),
            _ => None,
        }
    }

    /// Chip transfers emitted by this step
    pub fn transfers(&self) -> impl Iterator<Item = &ChipTransfer> + '_ {
        self.events.iter().filter_map(|ev| match ev {
            CascadeEvent::Transfer(t) => Some(t),
            _ => None,
        })
    }

    pub fn elimination_count(&self) -> usize {
        self.events
            .iter()
            .filter(|ev| matches!(ev, CascadeEvent::Eliminated { .. }))
            .count()
    }
}

/// Summary of a complete pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub origin: Hex,
    pub steps: u32,
    pub termination: Termination,
    /// Chips removed by eliminations during the pass
    pub eliminated: usize,
    /// Points scored during the pass
    pub points: u32,
    pub events: Vec<CascadeEvent>,
}

impl Resolution {
    /// Summarize a pass from the events it emitted
    pub fn from_events(
        origin: Hex,
        steps: u32,
        termination: Termination,
        events: Vec<CascadeEvent>,
    ) -> Self {
        let (eliminated, points) = events.iter().fold((0, 0), |(n, p), ev| match ev {
            CascadeEvent::Eliminated { count, points, .. } => (n + count, p + points),
            _ => (n, p),
        });
        Self {
            origin,
            steps,
            termination,
            eliminated,
            points,
            events,
        }
    }

    pub fn won(&self) -> bool {
        self.events
            .iter()
            .any(|ev| matches!(ev, CascadeEvent::Won { .. }))
    }
}

/// A candidate destination: the hub or one of its matching neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub at: Hex,
    /// Run of the active color on top of the candidate
    pub size: usize,
}

/// Score every candidate as the merge destination.
///
/// `candidates[0]` must be the hub. When the runs together reach the
/// elimination threshold every candidate gets [`ELIMINATION_PRIORITY`];
/// otherwise a candidate scores its own run size. On top of that each *other*
/// candidate contributes `reveal_bonus` per neighbor matching the color it
/// would expose once its run leaves.
pub fn destination_scores(
    board: &Board,
    candidates: &[Candidate],
    reveal_bonus: u32,
) -> ArrayVec<u32, 7> {
    let total: usize = candidates.iter().map(|c| c.size).sum();
    let reveal: ArrayVec<u32, 7> = candidates
        .iter()
        .map(|c| reveal_value(board, c.at, reveal_bonus))
        .collect();

    candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let base = if total >= ELIMINATION_THRESHOLD {
                ELIMINATION_PRIORITY
            } else {
                candidate.size as u32
            };
            let bonus: u32 = reveal
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(0u32, |acc, (_, &v)| acc.saturating_add(v));
            base.saturating_add(bonus)
        })
        .collect()
}

/// Bonus earned by moving the run off `at`
fn reveal_value(board: &Board, at: Hex, reveal_bonus: u32) -> u32 {
    let Some(color) = board.get(at).and_then(Cell::color_below_top_run) else {
        return 0;
    };
    reveal_bonus.saturating_mul(board.count_neighbor_matches(at, color) as u32)
}

/// Index of the winning destination.
///
/// Only a strictly higher score displaces the incumbent, so the hub at index 0
/// wins every tie and later neighbors never beat earlier ones on a tie.
pub fn choose_destination(scores: &[u32]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

/// Move the whole `color` run from `from` onto `to`, emitting one transfer per chip.
fn transfer_run(
    board: &mut Board,
    from: Hex,
    to: Hex,
    color: Color,
    kind: TransferKind,
    events: &mut Vec<CascadeEvent>,
) -> Result<usize, CascadeError> {
    let dest = board.get(to).ok_or(BoardError::OffBoard(to))?;
    if dest.is_obstacle() {
        return Err(BoardError::Obstacle(to).into());
    }
    let to_len = dest.len();
    let from_len = board.get(from).map(Cell::len).unwrap_or(0);

    let moved = board.remove_top_run(from, color)?;
    board.push_chips(to, color, moved)?;

    // The top chip launches first and lands last, so each run keeps its order.
    for order in 0..moved {
        events.push(CascadeEvent::Transfer(ChipTransfer {
            kind,
            from,
            to,
            color,
            from_index: from_len - 1 - order,
            to_index: to_len + moved - 1 - order,
            order,
        }));
    }
    Ok(moved)
}

/// Pull each source's run onto the hub, in source order.
fn gather(
    board: &mut Board,
    hub: Hex,
    sources: &[Hex],
    color: Color,
    events: &mut Vec<CascadeEvent>,
) -> Result<usize, CascadeError> {
    let mut moved = 0;
    for &source in sources {
        moved += transfer_run(board, source, hub, color, TransferKind::Gather, events)?;
    }
    Ok(moved)
}

/// One resolution pass in progress.
///
/// Holds only the transient queue and step counter; the board and score
/// tracker are borrowed for each step.
#[derive(Debug, Clone)]
pub struct Cascade {
    origin: Hex,
    queue: ResolutionQueue,
    steps: u32,
    max_steps: u32,
    reveal_bonus: u32,
    finished: Option<Termination>,
}

impl Cascade {
    /// Start a pass seeded with `origin`
    pub fn new(origin: Hex, reveal_bonus: u32, max_steps: u32) -> Self {
        Self {
            origin,
            queue: ResolutionQueue::seeded(origin),
            steps: 0,
            max_steps,
            reveal_bonus,
            finished: None,
        }
    }

    pub fn from_rules(origin: Hex, rules: &RulesConfig) -> Self {
        Self::new(origin, rules.reveal_bonus, rules.max_steps)
    }

    pub fn origin(&self) -> Hex {
        self.origin
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn queue(&self) -> &ResolutionQueue {
        &self.queue
    }

    pub fn termination(&self) -> Option<Termination> {
        self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    fn finish(&mut self, termination: Termination) {
        self.finished = Some(termination);
        self.queue.clear();
    }

    /// Stop the pass where it stands
    pub fn abort(&mut self) {
        self.finish(Termination::Aborted);
    }

    fn report(&self, at: Option<Hex>, action: StepAction, events: Vec<CascadeEvent>) -> StepReport {
        StepReport {
            step: self.steps,
            at,
            action,
            events,
            pending: self.queue.len(),
        }
    }

    fn enqueue(&mut self, at: Hex) {
        if self.queue.push(at) {
            trace!(target: LOG_TARGET, at = %at, "cascade.enqueue");
        }
    }

    /// Perform one step.
    ///
    /// Every board mutation of the step is committed before this returns.
    /// Once the pass has terminated, further calls return the terminal report
    /// again without touching anything.
    pub fn step(
        &mut self,
        board: &mut Board,
        scoring: &mut ScoreTracker,
    ) -> Result<StepReport, CascadeError> {
        if let Some(termination) = self.finished {
            return Ok(self.report(None, StepAction::Terminated(termination), Vec::new()));
        }

        let mut events = Vec::new();

        if self.steps >= self.max_steps {
            let termination = if self.queue.is_empty() && failsafe::scan(board).is_none() {
                Termination::Settled
            } else {
                warn!(
                    target: LOG_TARGET,
                    origin = %self.origin,
                    steps = self.steps,
                    pending = self.queue.len(),
                    "cascade.step_limit"
                );
                Termination::StepLimit
            };
            self.finish(termination);
            return Ok(self.report(None, StepAction::Terminated(termination), events));
        }

        if self.queue.is_empty() {
            match failsafe::scan(board) {
                Some((at, reason)) => {
                    debug!(target: LOG_TARGET, at = %at, reason = ?reason, "cascade.failsafe");
                    self.enqueue(at);
                    events.push(CascadeEvent::FailsafeQueued { at, reason });
                }
                None => {
                    self.finish(Termination::Settled);
                    return Ok(self.report(
                        None,
                        StepAction::Terminated(Termination::Settled),
                        events,
                    ));
                }
            }
        }

        self.steps += 1;
        let Some(at) = self.queue.pop() else {
            return Ok(self.report(None, StepAction::Skipped, events));
        };

        let Some((color, my_size)) = board
            .get(at)
            .filter(|cell| cell.is_active())
            .and_then(Cell::top_run)
        else {
            return Ok(self.report(Some(at), StepAction::Skipped, events));
        };

        let matches = board.matching_neighbors(at, color);

        let action = if matches.is_empty() {
            match self.try_eliminate(board, scoring, at, false, &mut events)? {
                Some(count) => {
                    self.enqueue(at);
                    for n in board.neighbors(at) {
                        self.enqueue(n);
                    }
                    StepAction::Eliminated { count }
                }
                None => StepAction::Settled,
            }
        } else {
            let mut candidates: ArrayVec<Candidate, 7> = ArrayVec::new();
            candidates.push(Candidate { at, size: my_size });
            candidates.extend(matches.iter().map(|&(n, size)| Candidate { at: n, size }));

            let scores = destination_scores(board, &candidates, self.reveal_bonus);
            let winner = choose_destination(&scores);

            if winner == 0 {
                let sources: ArrayVec<Hex, 6> = matches.iter().map(|&(n, _)| n).collect();
                let moved = gather(board, at, &sources, color, &mut events)?;
                self.try_eliminate(board, scoring, at, true, &mut events)?;

                self.enqueue(at);
                for &n in &sources {
                    self.enqueue(n);
                }
                StepAction::Gather {
                    sources: sources.len(),
                    moved,
                }
            } else {
                let target = candidates[winner].at;
                let others: ArrayVec<Hex, 6> = matches
                    .iter()
                    .map(|&(n, _)| n)
                    .filter(|&n| n != target)
                    .collect();

                gather(board, at, &others, color, &mut events)?;
                for &n in &others {
                    self.enqueue(n);
                }

                let moved = transfer_run(board, at, target, color, TransferKind::Dump, &mut events)?;
                self.try_eliminate(board, scoring, target, false, &mut events)?;

                self.enqueue(at);
                self.enqueue(target);
                StepAction::PumpAndDump { target, moved }
            }
        };

        debug!(
            target: LOG_TARGET,
            step = self.steps,
            at = %at,
            color = color.as_str(),
            action = ?action,
            "cascade.step"
        );

        Ok(self.report(Some(at), action, events))
    }

    /// Step, turning an internal error into an aborted pass.
    ///
    /// Mutations applied before the failure stay on the board.
    pub fn advance(&mut self, board: &mut Board, scoring: &mut ScoreTracker) -> StepReport {
        match self.step(board, scoring) {
            Ok(report) => report,
            Err(err) => {
                error!(
                    target: LOG_TARGET,
                    origin = %self.origin,
                    step = self.steps,
                    error = %err,
                    "cascade.aborted"
                );
                self.abort();
                self.report(None, StepAction::Terminated(Termination::Aborted), Vec::new())
            }
        }
    }

    /// Drive the pass to termination without pausing
    pub fn run(&mut self, board: &mut Board, scoring: &mut ScoreTracker) -> Resolution {
        let mut events = Vec::new();
        let termination = loop {
            let report = self.advance(board, scoring);
            let done = report.termination();
            events.extend(report.events);
            if let Some(termination) = done {
                break termination;
            }
        };

        let resolution = Resolution::from_events(self.origin, self.steps, termination, events);
        info!(
            target: LOG_TARGET,
            origin = %self.origin,
            steps = resolution.steps,
            termination = ?termination,
            eliminated = resolution.eliminated,
            points = resolution.points,
            "cascade.finished"
        );
        resolution
    }

    /// Eliminate the top run at `at` if it reached the threshold.
    fn try_eliminate(
        &self,
        board: &mut Board,
        scoring: &mut ScoreTracker,
        at: Hex,
        gather_bonus: bool,
        events: &mut Vec<CascadeEvent>,
    ) -> Result<Option<usize>, CascadeError> {
        let Some((color, run)) = board
            .get(at)
            .filter(|cell| cell.is_active())
            .and_then(Cell::top_run)
        else {
            return Ok(None);
        };
        if run < ELIMINATION_THRESHOLD {
            return Ok(None);
        }

        let count = board.remove_top_run(at, color)?;
        let scored = scoring.record_elimination(count, gather_bonus);
        info!(
            target: LOG_TARGET,
            at = %at,
            color = color.as_str(),
            count,
            points = scored.points,
            combo = scored.combo,
            "cascade.eliminated"
        );
        events.push(CascadeEvent::Eliminated {
            at,
            color,
            count,
            points: scored.points,
            combo: scored.combo,
        });

        if scored.won {
            info!(target: LOG_TARGET, score = scoring.score(), goal = scoring.goal(), "cascade.goal_reached");
            events.push(CascadeEvent::Won {
                score: scoring.score(),
            });
        }
        Ok(Some(count))
    }
}

/// Resolve a whole pass from `origin`, resetting the pass-local combo first.
pub fn resolve(
    board: &mut Board,
    scoring: &mut ScoreTracker,
    origin: Hex,
    rules: &RulesConfig,
) -> Resolution {
    scoring.start_pass();
    Cascade::from_rules(origin, rules).run(board, scoring)
}
