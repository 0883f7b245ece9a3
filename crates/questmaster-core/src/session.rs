//! One player's session: the single owner of all mutable state.
//!
//! Every mutation goes through [`AppController`]. Each command runs to
//! completion, forwards the events it produced to the notification sink,
//! re-checks achievements where the source of truth changed, and writes the
//! snapshot. A failed write is reported as [`Event::PersistenceFailed`];
//! the in-memory state stays authoritative.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::bundle::{ExportBundle, ImportPlan};
use crate::clock::{Clock, SystemClock};
use crate::error::{PersistenceError, Result, ValidationError};
use crate::events::Event;
use crate::gamification::{Achievement, GamificationEngine, UserProfile};
use crate::notify::NotificationSink;
use crate::quiz::{QuestionBank, QuizEngine, QuizError, QuizResult, TickOutcome};
use crate::settings::Settings;
use crate::stats::DashboardStats;
use crate::storage::{Config, Snapshot, SnapshotStore, SqliteStore};
use crate::task::{Task, TaskFilter, TaskInput, TaskStore, TaskUpdate, Toggle};

pub struct AppController {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink>,
    snapshots: SnapshotStore,
    tasks: TaskStore,
    gamification: GamificationEngine,
    quiz: QuizEngine,
    settings: Settings,
    rng: Box<dyn RngCore + Send>,
    autosave_every: Duration,
    last_saved: DateTime<Utc>,
}

impl AppController {
    /// Load the snapshot and build a session around it.
    pub fn new(
        snapshots: SnapshotStore,
        config: &Config,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let now = clock.now();
        let (snapshot, issues) = snapshots.load_checked(now);
        for message in issues {
            sink.notify(&Event::RecordRecovered { message, at: now });
        }
        let autosave_secs = i64::try_from(config.session.autosave_interval_secs).unwrap_or(i64::MAX);
        tracing::debug!(tasks = snapshot.tasks.len(), "session opened");
        Self {
            tasks: TaskStore::from_tasks(snapshot.tasks),
            gamification: GamificationEngine::new(
                snapshot.profile,
                snapshot.achievements,
                snapshot.last_activity,
            ),
            settings: snapshot.settings,
            quiz: QuizEngine::new(QuestionBank::builtin(), config.quiz_config()),
            rng: Box::new(StdRng::from_entropy()),
            autosave_every: Duration::try_seconds(autosave_secs).unwrap_or(Duration::MAX),
            last_saved: now,
            clock,
            sink,
            snapshots,
        }
    }

    /// Session over the default SQLite database and the system clock.
    pub fn open(config: &Config, sink: Arc<dyn NotificationSink>) -> Result<Self> {
        let store = SqliteStore::open()?;
        Ok(Self::new(
            SnapshotStore::new(store),
            config,
            Arc::new(SystemClock),
            sink,
        ))
    }

    /// Replace the quiz's question bank.
    pub fn with_question_bank(mut self, bank: QuestionBank) -> Self {
        self.quiz = QuizEngine::new(bank, self.quiz.config());
        self
    }

    /// Replace the randomness used to draw quiz questions.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn all_tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn tasks(&self, filter: TaskFilter) -> Vec<Task> {
        self.tasks.filter(filter, self.clock.as_ref())
    }

    /// Search as typed; a blank query shows `view` instead.
    pub fn search(&self, query: &str, view: TaskFilter) -> Vec<Task> {
        self.tasks.search(query, view, self.clock.as_ref())
    }

    pub fn profile(&self) -> &UserProfile {
        self.gamification.profile()
    }

    pub fn achievements(&self) -> &[Achievement] {
        self.gamification.achievements()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn quiz(&self) -> &QuizEngine {
        &self.quiz
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(self.tasks.tasks(), &self.gamification, self.clock.as_ref())
    }

    pub fn export(&self) -> ExportBundle {
        ExportBundle {
            user: self.gamification.profile().clone(),
            tasks: self.tasks.tasks().to_vec(),
            achievements: self.gamification.achievements().to_vec(),
            settings: self.settings.clone(),
            export_date: self.clock.now(),
        }
    }

    // ── Task commands ────────────────────────────────────────────────

    pub fn create_task(&mut self, input: TaskInput) -> Result<Task> {
        let now = self.clock.now();
        let task = self.tasks.create(input, now)?.clone();
        self.emit(Event::TaskCreated {
            task_id: task.id.clone(),
            name: task.name.clone(),
            at: now,
        });
        self.after_mutation(now);
        Ok(task)
    }

    /// Flip a task's completion flag. Completing pays out coins; reopening
    /// does not take them back.
    pub fn toggle_task(&mut self, id: &str) -> Result<Toggle> {
        let now = self.clock.now();
        let toggle = self
            .tasks
            .toggle_complete(id, now)
            .inspect_err(|e| tracing::warn!(id, error = %e, "toggle ignored"))?;

        match &toggle {
            Toggle::Completed(task) => {
                let (coins, events) = self.gamification.on_task_completed(task, self.clock.as_ref());
                self.emit(Event::TaskCompleted {
                    task_id: task.id.clone(),
                    name: task.name.clone(),
                    coins,
                    at: now,
                });
                self.emit_all(events);
            }
            Toggle::Reopened(task) => self.emit(Event::TaskReopened {
                task_id: task.id.clone(),
                name: task.name.clone(),
                at: now,
            }),
        }
        self.after_mutation(now);
        Ok(toggle)
    }

    pub fn update_task(&mut self, id: &str, fields: TaskUpdate) -> Result<Task> {
        let now = self.clock.now();
        let task = self
            .tasks
            .update(id, fields)
            .inspect_err(|e| tracing::warn!(id, error = %e, "update ignored"))?
            .clone();
        self.emit(Event::TaskUpdated {
            task_id: task.id.clone(),
            at: now,
        });
        self.after_mutation(now);
        Ok(task)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let now = self.clock.now();
        let task = self
            .tasks
            .delete(id)
            .inspect_err(|e| tracing::warn!(id, error = %e, "delete ignored"))?;
        self.emit(Event::TaskDeleted {
            task_id: task.id.clone(),
            name: task.name.clone(),
            at: now,
        });
        self.persist(now);
        Ok(task)
    }

    // ── Quiz commands ────────────────────────────────────────────────

    pub fn start_quiz(&mut self) -> Result<(), QuizError> {
        let now = self.clock.now();
        let event = self.quiz.start(&mut *self.rng, now).inspect_err(log_quiz_error)?;
        self.emit(event);
        Ok(())
    }

    pub fn select_answer(&mut self, option: usize) -> Result<(), QuizError> {
        self.quiz.select_answer(option).inspect_err(log_quiz_error)
    }

    pub fn next_question(&mut self) -> Result<usize, QuizError> {
        self.quiz.next().inspect_err(log_quiz_error)
    }

    pub fn prev_question(&mut self) -> Result<usize, QuizError> {
        self.quiz.prev().inspect_err(log_quiz_error)
    }

    /// One second of quiz countdown.
    pub fn quiz_tick(&mut self) -> Result<TickOutcome, QuizError> {
        let outcome = self.quiz.tick().inspect_err(log_quiz_error)?;
        let now = self.clock.now();
        match &outcome {
            TickOutcome::Counting { .. } => {}
            TickOutcome::Advanced { from, to } => self.emit(Event::QuizTimedOut {
                from_question: *from,
                to_question: *to,
                at: now,
            }),
            TickOutcome::AutoSubmitted(result) => self.credit_quiz(result, now),
        }
        Ok(outcome)
    }

    pub fn submit_quiz(&mut self) -> Result<QuizResult, QuizError> {
        let result = self.quiz.submit().inspect_err(log_quiz_error)?;
        self.credit_quiz(&result, self.clock.now());
        Ok(result)
    }

    pub fn reset_quiz(&mut self) {
        let event = self.quiz.reset(self.clock.now());
        self.emit(event);
    }

    // ── Profile, settings, data ──────────────────────────────────────

    pub fn update_profile(&mut self, name: &str, email: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        let now = self.clock.now();
        self.gamification
            .set_profile_details(name.to_string(), email.trim().to_string());
        self.emit(Event::ProfileUpdated { at: now });
        self.persist(now);
        Ok(())
    }

    pub fn update_settings(&mut self, settings: Settings) {
        let now = self.clock.now();
        self.settings = settings;
        self.emit(Event::SettingsUpdated { at: now });
        self.persist(now);
    }

    /// Replace state from an export document. Nothing changes when the
    /// document is rejected.
    pub fn import(&mut self, raw: &str) -> Result<ImportPlan> {
        let now = self.clock.now();
        let plan = ImportPlan::parse(raw, now)?;

        if let Some(tasks) = plan.tasks.clone() {
            self.tasks.replace_all(tasks);
        }
        if plan.user.is_some() || plan.achievements.is_some() {
            let profile = plan
                .user
                .clone()
                .unwrap_or_else(|| self.gamification.profile().clone());
            let achievements = plan
                .achievements
                .clone()
                .unwrap_or_else(|| self.gamification.achievements().to_vec());
            self.gamification.replace(profile, achievements);
        }
        if let Some(settings) = plan.settings.clone() {
            self.settings = settings;
        }

        tracing::info!(tasks = self.tasks.len(), "data imported");
        self.emit(Event::DataImported {
            tasks: self.tasks.len(),
            at: now,
        });
        self.persist(now);
        Ok(plan)
    }

    /// Forget the profile, tasks, achievements and streak, and remove every
    /// stored player record. Settings stay in effect for this session and
    /// are written again with the next save.
    pub fn clear_all_data(&mut self) -> Result<(), PersistenceError> {
        let now = self.clock.now();
        self.tasks.replace_all(Vec::new());
        self.gamification = GamificationEngine::fresh(now);
        self.quiz.reset(now);

        let cleared = self.snapshots.clear();
        match &cleared {
            Ok(()) => {
                self.last_saved = now;
                self.emit(Event::DataCleared { at: now });
            }
            Err(e) => self.emit(Event::PersistenceFailed {
                message: e.to_string(),
                at: now,
            }),
        }
        cleared
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Write the snapshot now.
    pub fn save(&mut self) -> Result<(), PersistenceError> {
        let now = self.clock.now();
        self.snapshots.save(&self.snapshot())?;
        self.last_saved = now;
        Ok(())
    }

    /// Periodic refresh: recompute the dashboard and autosave when due.
    pub fn tick(&mut self) -> DashboardStats {
        let now = self.clock.now();
        if now - self.last_saved >= self.autosave_every {
            tracing::debug!("autosave");
            self.persist(now);
        }
        self.stats()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            profile: self.gamification.profile().clone(),
            tasks: self.tasks.tasks().to_vec(),
            achievements: self.gamification.achievements().to_vec(),
            settings: self.settings.clone(),
            last_activity: self.gamification.last_activity(),
        }
    }

    fn credit_quiz(&mut self, result: &QuizResult, now: DateTime<Utc>) {
        let (coins, award) = self.gamification.on_quiz_submitted(result.correct, now);
        self.emit(Event::QuizSubmitted {
            correct: result.correct,
            total: result.total,
            coins,
            at: now,
        });
        self.emit(award);
        self.after_mutation(now);
    }

    fn after_mutation(&mut self, now: DateTime<Utc>) {
        let events = self.gamification.check_achievements(self.tasks.tasks(), now);
        self.emit_all(events);
        self.persist(now);
    }

    /// Best-effort save.
    fn persist(&mut self, now: DateTime<Utc>) {
        match self.snapshots.save(&self.snapshot()) {
            Ok(()) => self.last_saved = now,
            Err(e) => {
                tracing::warn!(error = %e, "failed to save snapshot");
                self.emit(Event::PersistenceFailed {
                    message: e.to_string(),
                    at: now,
                });
            }
        }
    }

    fn emit(&self, event: Event) {
        self.sink.notify(&event);
    }

    fn emit_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.emit(event);
        }
    }
}

fn log_quiz_error(e: &QuizError) {
    tracing::warn!(error = %e, "quiz command ignored");
}
