//! Badge definitions and unlock evaluation

use chrono::{DateTime, Utc};
use common::models::BadgeCategory;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Badge ids
pub mod defs {
    // Streak badges
    pub const STREAK_3: &str = "streak_3";
    pub const STREAK_7: &str = "streak_7";
    pub const STREAK_14: &str = "streak_14";
    pub const STREAK_30: &str = "streak_30";
    pub const STREAK_60: &str = "streak_60";
    pub const STREAK_100: &str = "streak_100";
    pub const STREAK_365: &str = "streak_365";

    // Completion badges
    pub const COMPLETIONS_10: &str = "completions_10";
    pub const COMPLETIONS_50: &str = "completions_50";
    pub const COMPLETIONS_100: &str = "completions_100";
    pub const COMPLETIONS_500: &str = "completions_500";
    pub const COMPLETIONS_1000: &str = "completions_1000";

    // Habit creation badges
    pub const HABITS_1: &str = "habits_1";
    pub const HABITS_3: &str = "habits_3";
    pub const HABITS_5: &str = "habits_5";

    // Consistency badges
    pub const PERFECT_WEEK: &str = "perfect_week";
    pub const PERFECT_MONTH: &str = "perfect_month";
}

/// A badge definition
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: BadgeCategory,
    pub threshold: u32,
}

const fn badge(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: BadgeCategory,
    threshold: u32,
) -> BadgeDefinition {
    BadgeDefinition {
        id,
        name,
        description,
        icon,
        category,
        threshold,
    }
}

/// All badges, in evaluation order
pub static BADGE_DEFINITIONS: [BadgeDefinition; 17] = [
    badge(defs::STREAK_3, "Getting Started", "Maintain a 3-day streak", "fire", BadgeCategory::Streak, 3),
    badge(defs::STREAK_7, "Week Warrior", "Maintain a 7-day streak", "fire", BadgeCategory::Streak, 7),
    badge(defs::STREAK_14, "Two Week Titan", "Maintain a 14-day streak", "fire", BadgeCategory::Streak, 14),
    badge(defs::STREAK_30, "Monthly Master", "Maintain a 30-day streak", "fire", BadgeCategory::Streak, 30),
    badge(defs::STREAK_60, "Habit Hero", "Maintain a 60-day streak", "fire", BadgeCategory::Streak, 60),
    badge(defs::STREAK_100, "Century Club", "Maintain a 100-day streak", "fire", BadgeCategory::Streak, 100),
    badge(defs::STREAK_365, "Legendary", "Maintain a 365-day streak", "fire", BadgeCategory::Streak, 365),
    badge(defs::COMPLETIONS_10, "First Steps", "Complete 10 habits total", "check-circle", BadgeCategory::Completions, 10),
    badge(defs::COMPLETIONS_50, "Consistent", "Complete 50 habits total", "check-circle", BadgeCategory::Completions, 50),
    badge(defs::COMPLETIONS_100, "Dedicated", "Complete 100 habits total", "check-circle", BadgeCategory::Completions, 100),
    badge(defs::COMPLETIONS_500, "Powerhouse", "Complete 500 habits total", "check-circle", BadgeCategory::Completions, 500),
    badge(defs::COMPLETIONS_1000, "Unstoppable", "Complete 1000 habits total", "check-circle", BadgeCategory::Completions, 1000),
    badge(defs::HABITS_1, "The Beginning", "Create your first habit", "plus-circle", BadgeCategory::HabitCount, 1),
    badge(defs::HABITS_3, "Building Routine", "Create 3 habits", "plus-circle", BadgeCategory::HabitCount, 3),
    badge(defs::HABITS_5, "Habit Builder", "Create 5 habits", "plus-circle", BadgeCategory::HabitCount, 5),
    badge(defs::PERFECT_WEEK, "Perfect Week", "Complete all habits for 7 days straight", "crown", BadgeCategory::Consistency, 1),
    badge(defs::PERFECT_MONTH, "Perfect Month", "Complete all habits for 30 days straight", "crown", BadgeCategory::Consistency, 1),
];

/// Aggregates the badge predicates are evaluated against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AchievementContext {
    pub longest_streak_ever: u32,
    pub total_completions: u32,
    pub habit_count: u32,
    pub perfect_weeks: u32,
    pub perfect_months: u32,
    pub unlocked: BTreeSet<String>,
}

type Metric = fn(&AchievementContext) -> u32;

fn longest_streak(ctx: &AchievementContext) -> u32 {
    ctx.longest_streak_ever
}

fn total_completions(ctx: &AchievementContext) -> u32 {
    ctx.total_completions
}

fn habit_count(ctx: &AchievementContext) -> u32 {
    ctx.habit_count
}

fn perfect_weeks(ctx: &AchievementContext) -> u32 {
    ctx.perfect_weeks
}

fn perfect_months(ctx: &AchievementContext) -> u32 {
    ctx.perfect_months
}

/// Metric shared by every badge of a category
static CATEGORY_METRICS: [(BadgeCategory, Metric); 3] = [
    (BadgeCategory::Streak, longest_streak),
    (BadgeCategory::Completions, total_completions),
    (BadgeCategory::HabitCount, habit_count),
];

/// Badges measured by their own metric rather than their category's
static BADGE_METRICS: [(&str, Metric); 2] = [
    (defs::PERFECT_WEEK, perfect_weeks),
    (defs::PERFECT_MONTH, perfect_months),
];

fn metric_for(badge: &BadgeDefinition) -> Option<Metric> {
    BADGE_METRICS
        .iter()
        .find(|(id, _)| *id == badge.id)
        .map(|(_, metric)| *metric)
        .or_else(|| {
            CATEGORY_METRICS
                .iter()
                .find(|(category, _)| *category == badge.category)
                .map(|(_, metric)| *metric)
        })
}

/// Whether a badge's condition holds, regardless of unlock state
pub fn is_earned(badge: &BadgeDefinition, ctx: &AchievementContext) -> bool {
    metric_for(badge).is_some_and(|metric| metric(ctx) >= badge.threshold)
}

/// Ids of badges whose condition holds and that are not unlocked yet
pub fn evaluate(ctx: &AchievementContext) -> Vec<&'static str> {
    BADGE_DEFINITIONS
        .iter()
        .filter(|badge| !ctx.unlocked.contains(badge.id))
        .filter(|badge| is_earned(badge, ctx))
        .map(|badge| badge.id)
        .collect()
}

pub fn find_badge(id: &str) -> Option<&'static BadgeDefinition> {
    BADGE_DEFINITIONS.iter().find(|badge| badge.id == id)
}

/// A badge definition joined with its unlock state
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BadgeStatus {
    #[serde(flatten)]
    pub badge: BadgeDefinition,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Every badge with its unlock timestamp, in definition order
pub fn badge_statuses(unlocked: &BTreeMap<String, DateTime<Utc>>) -> Vec<BadgeStatus> {
    BADGE_DEFINITIONS
        .iter()
        .map(|badge| BadgeStatus {
            badge: *badge,
            unlocked_at: unlocked.get(badge.id).copied(),
        })
        .collect()
}
