use crate::error::AppError;
use crate::model::{Filter, Task};
use crate::storage::{JsonFile, Persistence};
use time::OffsetDateTime;

/// One row of the filtered view: a task plus whether it renders as a subtask
/// of the row above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleTask {
    pub task: Task,
    pub is_subtask: bool,
}

/// Owns the ordered task collection and the active display filter. Every
/// mutating operation writes the whole collection back through the injected
/// persistence handle before returning.
pub struct TaskStore {
    tasks: Vec<Task>,
    filter: Filter,
    store: Box<dyn Persistence>,
    last_id_nanos: i128,
}

impl TaskStore {
    pub fn open(store: Box<dyn Persistence>) -> Result<Self, AppError> {
        let tasks = store.load()?;
        Ok(Self {
            tasks,
            filter: Filter::All,
            store,
            last_id_nanos: 0,
        })
    }

    pub fn open_default() -> Result<Self, AppError> {
        Self::open(Box::new(JsonFile::default_location()?))
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Display-only; never persisted.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Appends a new task, optionally under a top-level parent. The text must
    /// be non-empty after trimming; a parent must exist and must not itself
    /// be a subtask (depth is capped at two levels by construction).
    pub fn add(&mut self, text: &str, parent_id: Option<&str>) -> Result<Task, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("text is required"));
        }

        let parent_id = match parent_id {
            Some(id) => {
                let parent = self
                    .get(id)
                    .ok_or_else(|| AppError::invalid_input("parent task not found"))?;
                if parent.is_subtask() {
                    return Err(AppError::invalid_input("subtasks cannot have subtasks"));
                }
                Some(parent.id.clone())
            }
            None => None,
        };

        let task = Task {
            id: self.next_id(),
            text: trimmed.to_string(),
            completed: false,
            parent_id,
        };

        self.tasks.push(task.clone());
        self.store.save(&self.tasks)?;

        Ok(task)
    }

    /// Flips the completed state. Unknown ids are a silent no-op so stale
    /// references from an earlier view degrade gracefully.
    pub fn toggle(&mut self, id: &str) -> Result<(), AppError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(());
        };

        task.completed = !task.completed;
        self.store.save(&self.tasks)
    }

    /// Removes the task and all of its direct subtasks in one pass. Unknown
    /// ids are a no-op.
    pub fn delete(&mut self, id: &str) -> Result<(), AppError> {
        let before = self.tasks.len();
        self.tasks
            .retain(|task| task.id != id && task.parent_id.as_deref() != Some(id));

        if self.tasks.len() == before {
            return Ok(());
        }
        self.store.save(&self.tasks)
    }

    /// Drops the dragged task onto the target. A dragged subtask adopts the
    /// target's parent (or the target itself when the target is top-level)
    /// without moving in collection order. A dragged top-level task moves,
    /// with its subtasks in tow, to sit immediately before the target.
    pub fn reparent(&mut self, dragged_id: &str, target_id: &str) -> Result<(), AppError> {
        if dragged_id == target_id {
            return Ok(());
        }

        let Some(dragged) = self.get(dragged_id) else {
            return Ok(());
        };
        let dragged_is_subtask = dragged.is_subtask();

        let Some(target) = self.get(target_id) else {
            return Ok(());
        };

        if dragged_is_subtask {
            let adopted = target
                .parent_id
                .clone()
                .unwrap_or_else(|| target.id.clone());
            if let Some(task) = self.tasks.iter_mut().find(|task| task.id == dragged_id) {
                task.parent_id = Some(adopted);
            }
        } else {
            // Dropping a parent onto one of its own subtasks has no sensible
            // insertion point; treat it as a no-op.
            if target.parent_id.as_deref() == Some(dragged_id) {
                return Ok(());
            }

            let mut group = Vec::new();
            let mut rest = Vec::with_capacity(self.tasks.len());
            for task in self.tasks.drain(..) {
                if task.id == dragged_id || task.parent_id.as_deref() == Some(dragged_id) {
                    group.push(task);
                } else {
                    rest.push(task);
                }
            }

            let index = rest
                .iter()
                .position(|task| task.id == target_id)
                .unwrap_or(rest.len());
            rest.splice(index..index, group);
            self.tasks = rest;
        }

        self.store.save(&self.tasks)
    }

    /// Produces the current filtered view: surviving top-level tasks in
    /// collection order, each immediately followed by its surviving subtasks.
    /// Subtasks are filtered on their own completion state, but subtasks of a
    /// filtered-out parent never appear because emission is parent-driven.
    pub fn visible_tasks(&self) -> Vec<VisibleTask> {
        let filtered: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| self.filter.matches(task))
            .collect();

        let mut rows = Vec::new();
        for parent in filtered.iter().filter(|task| !task.is_subtask()) {
            rows.push(VisibleTask {
                task: (*parent).clone(),
                is_subtask: false,
            });

            for child in filtered
                .iter()
                .filter(|task| task.parent_id.as_deref() == Some(parent.id.as_str()))
            {
                rows.push(VisibleTask {
                    task: (*child).clone(),
                    is_subtask: true,
                });
            }
        }

        rows
    }

    // Wall-clock nanos, bumped past the previous id so same-process calls
    // never collide even within one timer tick.
    fn next_id(&mut self) -> String {
        let mut nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        if nanos <= self.last_id_nanos {
            nanos = self.last_id_nanos + 1;
        }
        self.last_id_nanos = nanos;
        format!("task-{nanos}")
    }
}
