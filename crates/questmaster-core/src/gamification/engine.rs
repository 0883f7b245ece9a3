//! Coin, streak, level and achievement accounting.
//!
//! Every mutating method returns the events it produced instead of
//! notifying anyone directly; the session forwards them to the sink.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::achievements::{catalog, Achievement};
use super::profile::{level_for, UserProfile};
use crate::clock::Clock;
use crate::events::Event;
use crate::task::{Priority, Task};

pub const BASE_TASK_COINS: u32 = 10;
pub const HIGH_PRIORITY_BONUS: u32 = 5;
pub const MEDIUM_PRIORITY_BONUS: u32 = 3;
pub const URGENCY_BONUS: u32 = 5;
pub const COINS_PER_CORRECT_ANSWER: u32 = 10;

/// Local hour before which a completion counts as "early".
pub const EARLY_BIRD_CUTOFF_HOUR: u32 = 12;

#[derive(Debug, Clone)]
pub struct GamificationEngine {
    profile: UserProfile,
    achievements: Vec<Achievement>,
    /// Local calendar date of the last completion that touched the streak.
    last_activity: Option<NaiveDate>,
}

impl GamificationEngine {
    /// A stored level below what the completion count earns is raised to it.
    pub fn new(profile: UserProfile, achievements: Vec<Achievement>, last_activity: Option<NaiveDate>) -> Self {
        Self {
            profile: with_earned_level(profile),
            achievements,
            last_activity,
        }
    }

    /// Fresh profile, locked catalog, no streak history.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self::new(UserProfile::new(now), catalog(), None)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn last_activity(&self) -> Option<NaiveDate> {
        self.last_activity
    }

    /// Leaderboard metric.
    pub fn score(&self) -> u64 {
        u64::from(self.profile.completed_tasks) * 10
            + u64::from(self.profile.coins)
            + u64::from(self.profile.streak) * 5
    }

    /// Reward for completing `task` at `now`.
    ///
    /// The urgency bonus applies whenever the deadline is less than 24h away,
    /// which includes deadlines already passed.
    pub fn coins_for_task(task: &Task, now: DateTime<Utc>) -> u32 {
        let priority_bonus = match task.priority {
            Priority::High => HIGH_PRIORITY_BONUS,
            Priority::Medium => MEDIUM_PRIORITY_BONUS,
            Priority::Low => 0,
        };
        let urgency_bonus = if task.deadline - now < Duration::hours(24) {
            URGENCY_BONUS
        } else {
            0
        };
        BASE_TASK_COINS + priority_bonus + urgency_bonus
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn award_coins(&mut self, amount: u32, now: DateTime<Utc>) -> Event {
        self.profile.coins = self.profile.coins.saturating_add(amount);
        Event::CoinsAwarded {
            amount,
            balance: self.profile.coins,
            at: now,
        }
    }

    /// Account for a task that just transitioned to completed.
    /// Returns the coins awarded for the task itself.
    pub fn on_task_completed(&mut self, task: &Task, clock: &dyn Clock) -> (u32, Vec<Event>) {
        let now = clock.now();
        let mut events = Vec::new();

        self.profile.completed_tasks = self.profile.completed_tasks.saturating_add(1);
        let completed_at = task.completed_at.unwrap_or(now);
        if clock.local_hour(completed_at) < EARLY_BIRD_CUTOFF_HOUR {
            self.profile.early_completions = self.profile.early_completions.saturating_add(1);
        }

        events.extend(self.update_streak(clock));
        events.extend(self.check_level_up(now));

        let coins = Self::coins_for_task(task, now);
        events.push(self.award_coins(coins, now));
        (coins, events)
    }

    /// Advance the daily streak. At most one change per local calendar day.
    pub fn update_streak(&mut self, clock: &dyn Clock) -> Option<Event> {
        let today = clock.today();
        if self.last_activity == Some(today) {
            return None;
        }
        let continues = self
            .last_activity
            .and_then(|last| last.succ_opt())
            .is_some_and(|next| next == today);
        self.profile.streak = if continues {
            self.profile.streak.saturating_add(1)
        } else {
            1
        };
        self.last_activity = Some(today);
        tracing::debug!(streak = self.profile.streak, %today, "streak updated");
        Some(Event::StreakUpdated {
            streak: self.profile.streak,
            at: clock.now(),
        })
    }

    /// Recompute the level from completed tasks. Never lowers it.
    pub fn check_level_up(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let new_level = level_for(self.profile.completed_tasks);
        if new_level <= self.profile.level {
            return None;
        }
        let from = self.profile.level;
        self.profile.level = new_level;
        tracing::info!(from, to = new_level, "level up");
        Some(Event::LevelUp {
            from,
            to: new_level,
            at: now,
        })
    }

    /// Credit a submitted quiz. Returns the coins earned.
    pub fn on_quiz_submitted(&mut self, correct: usize, now: DateTime<Utc>) -> (u32, Event) {
        let correct = u32::try_from(correct).unwrap_or(u32::MAX);
        self.profile.quiz_correct_answers = self.profile.quiz_correct_answers.saturating_add(correct);
        let coins = correct.saturating_mul(COINS_PER_CORRECT_ANSWER);
        (coins, self.award_coins(coins, now))
    }

    /// Unlock every locked achievement whose milestone now holds, awarding
    /// its bonus exactly once.
    pub fn check_achievements(&mut self, tasks: &[Task], now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        for idx in 0..self.achievements.len() {
            let achievement = &self.achievements[idx];
            if achievement.unlocked || !achievement.id.is_met(tasks, &self.profile) {
                continue;
            }
            let (id, name, coins) = (achievement.id, achievement.name.clone(), achievement.coin_reward);
            self.achievements[idx].unlocked = true;
            tracing::info!(achievement = %id, coins, "achievement unlocked");
            events.push(Event::AchievementUnlocked {
                achievement: id,
                name,
                coins,
                at: now,
            });
            events.push(self.award_coins(coins, now));
        }
        events
    }

    pub fn set_profile_details(&mut self, name: String, email: String) {
        self.profile.name = name;
        self.profile.email = email;
    }

    /// Swap in imported records. The level is re-derived so it never lags
    /// behind the imported completion count.
    pub fn replace(&mut self, profile: UserProfile, achievements: Vec<Achievement>) {
        self.profile = with_earned_level(profile);
        self.achievements = achievements;
    }
}

fn with_earned_level(mut profile: UserProfile) -> UserProfile {
    profile.level = profile.level.max(level_for(profile.completed_tasks));
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::gamification::AchievementId;
    use crate::task::TaskCategory;
    use chrono::{FixedOffset, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    fn task(priority: Priority, deadline: DateTime<Utc>, completed_at: Option<DateTime<Utc>>) -> Task {
        Task {
            id: "t1".into(),
            name: "Quest".into(),
            category: TaskCategory::Personal,
            deadline,
            priority,
            description: String::new(),
            completed: completed_at.is_some(),
            created_at: start(),
            completed_at,
        }
    }

    #[test]
    fn stored_level_is_raised_to_the_earned_one() {
        let mut profile = UserProfile::new(start());
        profile.completed_tasks = 12;
        let engine = GamificationEngine::new(profile.clone(), catalog(), None);
        assert_eq!(engine.profile().level, 3);

        profile.level = 7;
        let engine = GamificationEngine::new(profile, catalog(), None);
        assert_eq!(engine.profile().level, 7);
    }

    #[test]
    fn coins_for_task_combines_priority_and_urgency() {
        let now = start();
        let soon = now + Duration::hours(2);
        let later = now + Duration::days(3);
        assert_eq!(GamificationEngine::coins_for_task(&task(Priority::High, soon, None), now), 20);
        assert_eq!(GamificationEngine::coins_for_task(&task(Priority::Medium, later, None), now), 13);
        assert_eq!(GamificationEngine::coins_for_task(&task(Priority::Low, later, None), now), 10);
        let overdue = now - Duration::hours(5);
        assert_eq!(GamificationEngine::coins_for_task(&task(Priority::Low, overdue, None), now), 15);
    }

    #[test]
    fn streak_counts_consecutive_days_once_per_day() {
        let clock = ManualClock::new(start());
        let mut engine = GamificationEngine::fresh(start());

        assert!(engine.update_streak(&clock).is_some());
        assert_eq!(engine.profile().streak, 1);
        assert!(engine.update_streak(&clock).is_none());
        assert_eq!(engine.profile().streak, 1);

        clock.advance(Duration::days(1));
        engine.update_streak(&clock);
        assert_eq!(engine.profile().streak, 2);

        clock.advance(Duration::days(2));
        engine.update_streak(&clock);
        assert_eq!(engine.profile().streak, 1);
    }

    #[test]
    fn streak_uses_local_calendar_days() {
        // 23:30 UTC is already the next day at UTC+2.
        let at = Utc.with_ymd_and_hms(2024, 6, 3, 23, 30, 0).unwrap();
        let clock = ManualClock::with_offset(at, FixedOffset::east_opt(2 * 3600).unwrap());
        let mut engine = GamificationEngine::new(
            UserProfile::new(at),
            catalog(),
            NaiveDate::from_ymd_opt(2024, 6, 3),
        );
        engine.profile.streak = 4;
        engine.update_streak(&clock);
        assert_eq!(engine.profile().streak, 5);
        assert_eq!(engine.last_activity(), NaiveDate::from_ymd_opt(2024, 6, 4));
    }

    #[test]
    fn fifth_completion_levels_up_exactly_once() {
        let clock = ManualClock::new(start());
        let mut engine = GamificationEngine::fresh(start());
        engine.profile.completed_tasks = 4;

        let done = task(Priority::Low, start() + Duration::days(2), Some(start()));
        let (_, events) = engine.on_task_completed(&done, &clock);
        let level_ups: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, Event::LevelUp { from: 1, to: 2, .. }))
            .collect();
        assert_eq!(level_ups.len(), 1);
        assert_eq!(engine.profile().level, 2);
        assert!(engine.check_level_up(start()).is_none());
    }

    #[test]
    fn completion_before_noon_counts_as_early() {
        let clock = ManualClock::new(start());
        let mut engine = GamificationEngine::fresh(start());
        let morning = task(Priority::Low, start(), Some(start()));
        engine.on_task_completed(&morning, &clock);
        let evening = task(Priority::Low, start(), Some(start() + Duration::hours(8)));
        engine.on_task_completed(&evening, &clock);
        assert_eq!(engine.profile().early_completions, 1);
        assert_eq!(engine.profile().completed_tasks, 2);
    }

    #[test]
    fn achievements_unlock_once_and_pay_bonus() {
        let mut engine = GamificationEngine::fresh(start());
        let tasks = vec![task(Priority::Low, start(), Some(start()))];
        let coins_before = engine.profile().coins;

        let events = engine.check_achievements(&tasks, start());
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AchievementUnlocked { achievement: AchievementId::FirstQuest, coins: 25, .. }
        )));
        assert_eq!(engine.profile().coins, coins_before + 25);
        assert!(engine.check_achievements(&tasks, start()).is_empty());
        assert_eq!(engine.profile().coins, coins_before + 25);
    }

    #[test]
    fn quiz_answers_feed_quiz_champion() {
        let mut engine = GamificationEngine::fresh(start());
        let (coins, _) = engine.on_quiz_submitted(7, start());
        assert_eq!(coins, 70);
        assert!(engine.check_achievements(&[], start()).is_empty());
        engine.on_quiz_submitted(3, start());
        let events = engine.check_achievements(&[], start());
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AchievementUnlocked { achievement: AchievementId::QuizChampion, .. }
        )));
    }

    #[test]
    fn score_weights_tasks_coins_and_streak() {
        let mut engine = GamificationEngine::fresh(start());
        engine.profile.completed_tasks = 3;
        engine.profile.coins = 40;
        engine.profile.streak = 2;
        assert_eq!(engine.score(), 30 + 40 + 10);
    }
}
