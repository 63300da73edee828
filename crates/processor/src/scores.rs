//! XP and level calculation

use serde::Serialize;

/// Base XP for any completion
pub const COMPLETION_XP: i64 = 10;

/// XP awarded per newly unlocked badge
pub const BADGE_UNLOCK_XP: i64 = 100;

/// Streak lengths that earn a one-off bonus, and the bonus for each
pub const STREAK_MILESTONES: [(u32, i64); 6] = [
    (7, 50),
    (14, 100),
    (30, 200),
    (60, 350),
    (100, 500),
    (365, 1000),
];

/// Total XP needed to reach each level; index 0 is level 1
pub const LEVEL_THRESHOLDS: [i64; 15] = [
    0, 100, 250, 500, 850, 1300, 1900, 2700, 3800, 5200, 7000, 9500, 12500, 16500, 21500,
];

/// Calculate XP for a completion that produced a streak of `streak` periods.
///
/// Milestones match exactly: skipping past one (e.g. via backfill) does not
/// earn it.
pub fn xp_for_completion(streak: u32) -> i64 {
    let mut xp = COMPLETION_XP;

    if let Some((_, bonus)) = STREAK_MILESTONES.iter().find(|(len, _)| *len == streak) {
        xp += bonus;
    }

    xp
}

/// Level for a total XP amount (levels start at 1)
pub fn level_for_xp(total_xp: i64) -> u32 {
    LEVEL_THRESHOLDS
        .iter()
        .rposition(|threshold| total_xp >= *threshold)
        .map(|idx| idx as u32 + 1)
        .unwrap_or(1)
}

/// XP required to reach the level after `level`, `None` at the top level
pub fn xp_for_next_level(level: u32) -> Option<i64> {
    LEVEL_THRESHOLDS.get(level as usize).copied()
}

pub fn did_level_up(old_xp: i64, new_xp: i64) -> bool {
    level_for_xp(new_xp) > level_for_xp(old_xp)
}

/// Progress within the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpProgress {
    pub level: u32,
    /// XP earned since reaching `level`
    pub current: i64,
    /// XP span of `level`; 0 at the top level
    pub needed: i64,
}

pub fn xp_progress(total_xp: i64) -> XpProgress {
    let level = level_for_xp(total_xp);
    let level_floor = LEVEL_THRESHOLDS[(level - 1) as usize];
    let needed = xp_for_next_level(level)
        .map(|next| next - level_floor)
        .unwrap_or(0);

    XpProgress {
        level,
        current: total_xp - level_floor,
        needed,
    }
}
