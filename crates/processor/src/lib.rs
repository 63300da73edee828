//! Streak, XP and badge processing

pub mod achievements;
pub mod consistency;
pub mod dates;
pub mod handler;
pub mod recalculate;
pub mod scores;
pub mod store;
pub mod streaks;

pub use handler::{BadgeUnlocked, CompletionOutcome, EventHandler, UndoOutcome};
pub use recalculate::RecalculationStats;
pub use store::{PgStore, ProgressCommit, ProgressStore};

#[cfg(test)]
mod dates_test;
#[cfg(test)]
mod streaks_test;
