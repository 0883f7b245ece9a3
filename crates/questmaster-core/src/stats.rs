//! Dashboard figures derived from tasks and profile.

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::gamification::GamificationEngine;
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_tasks: usize,
    pub completed_today: usize,
    pub urgent: usize,
    pub overdue: usize,
    /// Share of tasks due today that are completed, 0-100.
    pub today_progress: u8,
    pub score: u64,
    pub level: u32,
    pub coins: u32,
    pub streak: u32,
}

impl DashboardStats {
    pub fn compute(tasks: &[Task], gamification: &GamificationEngine, clock: &dyn Clock) -> Self {
        let now = clock.now();
        let due_today: Vec<&Task> = tasks.iter().filter(|t| t.is_due_today(clock)).collect();
        let done_today = due_today.iter().filter(|t| t.completed).count();
        let today_progress = if due_today.is_empty() {
            0
        } else {
            ((done_today * 100) as f64 / due_today.len() as f64).round() as u8
        };

        let profile = gamification.profile();
        Self {
            total_tasks: tasks.len(),
            completed_today: tasks.iter().filter(|t| t.completed_today(clock)).count(),
            urgent: tasks.iter().filter(|t| t.is_urgent(now)).count(),
            overdue: tasks.iter().filter(|t| t.is_overdue(now)).count(),
            today_progress,
            score: gamification.score(),
            level: profile.level,
            coins: profile.coins,
            streak: profile.streak,
        }
    }
}
