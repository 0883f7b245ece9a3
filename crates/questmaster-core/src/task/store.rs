//! In-memory task collection.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use super::{Task, TaskFilter, TaskInput, TaskUpdate};
use crate::clock::Clock;
use crate::error::{NotFoundError, ValidationError};

/// Outcome of flipping a task's completion flag.
#[derive(Debug, Clone, PartialEq)]
pub enum Toggle {
    /// false → true; carries the task as it is now.
    Completed(Task),
    /// true → false
    Reopened(Task),
}

/// Owns the task list exclusively.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Tasks accepted by `filter`, highest priority first, then earliest deadline.
    pub fn filter(&self, filter: TaskFilter, clock: &dyn Clock) -> Vec<Task> {
        let mut out: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| filter.accepts(t, clock))
            .cloned()
            .collect();
        out.sort_by(by_priority_then_deadline);
        out
    }

    /// Case-insensitive substring search over name, description and category,
    /// in insertion order. A blank query falls back to the sorted `view`.
    pub fn search(&self, query: &str, view: TaskFilter, clock: &dyn Clock) -> Vec<Task> {
        if query.trim().is_empty() {
            return self.filter(view, clock);
        }
        let needle = query.to_lowercase();
        self.tasks
            .iter()
            .filter(|t| t.matches(&needle))
            .cloned()
            .collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn create(&mut self, input: TaskInput, now: DateTime<Utc>) -> Result<&Task, ValidationError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        let category = input.category.ok_or(ValidationError::MissingField("category"))?;
        let deadline = input.deadline.ok_or(ValidationError::MissingField("deadline"))?;
        let priority = input.priority.ok_or(ValidationError::MissingField("priority"))?;

        let task = Task {
            id: self.next_id(now),
            name: name.to_string(),
            category,
            deadline,
            priority,
            description: input.description.trim().to_string(),
            completed: false,
            created_at: now,
            completed_at: None,
        };
        tracing::debug!(id = %task.id, name = %task.name, "task created");
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn toggle_complete(&mut self, id: &str, now: DateTime<Utc>) -> Result<Toggle, NotFoundError> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        tracing::debug!(id, completed = task.completed, "task toggled");
        Ok(if task.completed {
            Toggle::Completed(task.clone())
        } else {
            Toggle::Reopened(task.clone())
        })
    }

    /// Replace editable fields. `id`, `created_at` and completion state are untouched.
    pub fn update(&mut self, id: &str, fields: TaskUpdate) -> crate::error::Result<&Task> {
        if let Some(name) = &fields.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField("name").into());
            }
        }
        let task = self.get_mut(id)?;
        if let Some(name) = fields.name {
            task.name = name.trim().to_string();
        }
        if let Some(category) = fields.category {
            task.category = category;
        }
        if let Some(deadline) = fields.deadline {
            task.deadline = deadline;
        }
        if let Some(priority) = fields.priority {
            task.priority = priority;
        }
        if let Some(description) = fields.description {
            task.description = description.trim().to_string();
        }
        tracing::debug!(id, "task updated");
        Ok(task)
    }

    pub fn delete(&mut self, id: &str) -> Result<Task, NotFoundError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| NotFoundError::task(id))?;
        tracing::debug!(id, "task deleted");
        Ok(self.tasks.remove(idx))
    }

    /// Swap in a whole new task list.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn get_mut(&mut self, id: &str) -> Result<&mut Task, NotFoundError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| NotFoundError::task(id))
    }

    /// Timestamp plus random suffix; retried in the (theoretical) event of a clash.
    fn next_id(&self, now: DateTime<Utc>) -> String {
        loop {
            let id = format!("task-{}-{}", now.timestamp_millis(), uuid::Uuid::new_v4().simple());
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn by_priority_then_deadline(a: &Task, b: &Task) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.deadline.cmp(&b.deadline))
}
