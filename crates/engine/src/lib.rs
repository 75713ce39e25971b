//! Placement and pacing on top of the pure core.
//!
//! - [`place`]: validated placements with stable error codes
//! - [`pacing`]: per-step animation delays
//! - [`driver`]: async driver that sleeps between resolver steps
//! - [`autoplay`]: headless player used by the binary and benches

pub mod autoplay;
pub mod driver;
pub mod pacing;
pub mod place;

pub use autoplay::{autoplay, autoplay_paced, next_move, AutoplaySummary};
pub use driver::{PacedDriver, SharedGame};
pub use pacing::PacingConfig;
pub use place::{apply_place, begin_place, validate_place, PlaceError};
