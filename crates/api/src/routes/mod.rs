//! API routes

pub mod badges;
pub mod completions;
pub mod habits;
pub mod health;
pub mod notifications;
pub mod profile;
pub mod recalc;
