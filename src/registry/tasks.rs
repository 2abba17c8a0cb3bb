use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::session::AuthToken;
use crate::task::{Task, TaskDraft, TaskId};
use crate::traits::TaskServer;

/// Identifies a fetch, so that its result can be discarded if another date has been selected in the meantime
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    date: NaiveDate,
    generation: u64,
}

impl FetchTicket {
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}


/// The tasks of the selected date, and the task shown in the detail panel (if any)
#[derive(Clone, Debug, Default)]
pub struct TaskRegistry {
    date: Option<NaiveDate>,
    /// Incremented every time a fetch starts
    generation: u64,
    tasks: Vec<Task>,
    selected: Option<TaskId>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The date the cached tasks belong to
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Show a task in the detail panel. Returns `false` if it is not cached
    pub fn select(&mut self, id: &TaskId) -> bool {
        if self.get(id).is_none() {
            log::warn!("Cannot select task {}, it is not displayed", id);
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    /// The task shown in the detail panel, always as it is currently cached
    pub fn selected(&self) -> Option<&Task> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Switch to another date.
    ///
    /// The previous tasks are dropped right away, and the returned ticket must be given to [`Self::finish_fetch`]
    pub fn begin_fetch(&mut self, date: NaiveDate) -> FetchTicket {
        self.generation += 1;
        self.date = Some(date);
        self.tasks.clear();
        self.selected = None;
        FetchTicket { date, generation: self.generation }
    }

    /// Apply the result of a fetch.
    ///
    /// Results of outdated fetches are discarded. A failed fetch leaves the registry empty.
    /// Returns whether the result has been applied
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Task>>) -> bool {
        if ticket.generation != self.generation {
            log::debug!("Discarding outdated tasks for {} (fetch #{}, current is #{})", ticket.date, ticket.generation, self.generation);
            return false;
        }

        match result {
            Ok(tasks) => {
                log::debug!("Fetched {} tasks for {}", tasks.len(), ticket.date);
                self.tasks = tasks;
            },
            Err(err) => {
                log::error!("Unable to fetch tasks for {}: {}", ticket.date, err);
                self.tasks.clear();
            },
        }
        self.selected = None;
        true
    }

    /// Replace the cached tasks with the ones of `date`
    pub async fn fetch_for_date<S>(&mut self, server: &S, token: &AuthToken, date: NaiveDate) -> bool
    where
        S: TaskServer + ?Sized,
    {
        let ticket = self.begin_fetch(date);
        let result = server.get_tasks(token, date).await;
        self.finish_fetch(ticket, result)
    }

    pub async fn create<S>(&mut self, server: &S, token: &AuthToken, draft: &TaskDraft) -> Result<Task>
    where
        S: TaskServer + ?Sized,
    {
        let task = server.create_task(token, draft).await.map_err(|err| {
            log::error!("Unable to create task {:?}: {}", draft.title, err);
            err
        })?;
        self.apply_created(task.clone());
        Ok(task)
    }

    pub async fn update<S>(&mut self, server: &S, token: &AuthToken, id: &TaskId, draft: &TaskDraft) -> Result<Task>
    where
        S: TaskServer + ?Sized,
    {
        let task = server.update_task(token, id, draft).await.map_err(|err| {
            log::error!("Unable to update task {}: {}", id, err);
            err
        })?;
        self.apply_updated(task.clone());
        Ok(task)
    }

    pub async fn delete<S>(&mut self, server: &S, token: &AuthToken, id: &TaskId) -> Result<()>
    where
        S: TaskServer + ?Sized,
    {
        server.delete_task(token, id).await.map_err(|err| {
            log::error!("Unable to delete task {}: {}", id, err);
            err
        })?;
        self.apply_deleted(id);
        Ok(())
    }

    /// Invert the completion of a cached task.
    ///
    /// Returns the completion status the server has stored, which is the one that is cached afterwards
    pub async fn toggle_complete<S>(&mut self, server: &S, token: &AuthToken, id: &TaskId) -> Result<bool>
    where
        S: TaskServer + ?Sized,
    {
        let wanted = match self.get(id) {
            Some(task) => task.completed() == false,
            None => return Err(Error::UnknownTask(id.clone())),
        };

        let task = server.set_completion(token, id, wanted).await.map_err(|err| {
            log::error!("Unable to update completion status of task {}: {}", id, err);
            err
        })?;
        if task.completed() != wanted {
            log::info!("Server stored completion {} for task {} (requested {})", task.completed(), id, wanted);
        }
        self.apply_completion(id, task.completed());
        Ok(task.completed())
    }

    /// Merge a task the server has just created.
    ///
    /// Tasks of another date are not kept, and a duplicate reply replaces the previous copy
    pub fn apply_created(&mut self, task: Task) {
        if Some(task.date()) != self.date {
            log::debug!("Created task {} belongs to {}, which is not displayed", task.id(), task.date());
            return;
        }
        match self.tasks.iter_mut().find(|t| t.id() == task.id()) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Merge a task the server has just updated.
    ///
    /// Tasks that are not cached (e.g. deleted in the meantime) are ignored. A task that has moved to another date
    /// is removed from the cache
    pub fn apply_updated(&mut self, task: Task) {
        let index = match self.tasks.iter().position(|t| t.id() == task.id()) {
            Some(i) => i,
            None => {
                log::debug!("Updated task {} is not displayed, ignoring it", task.id());
                return;
            }
        };

        if Some(task.date()) != self.date {
            log::debug!("Task {} has moved to {}", task.id(), task.date());
            let id = task.id().clone();
            self.apply_deleted(&id);
            return;
        }
        self.tasks[index] = task;
    }

    /// Forget a task. Deleting an unknown task is a no-op
    pub fn apply_deleted(&mut self, id: &TaskId) {
        self.tasks.retain(|t| t.id() != id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
    }

    pub fn apply_completion(&mut self, id: &TaskId, completed: bool) {
        match self.tasks.iter_mut().find(|t| t.id() == id) {
            Some(task) => task.set_completed(completed),
            None => log::debug!("Task {} is not displayed, ignoring its completion status", id),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryId;
    use crate::memory_server::MemoryServer;
    use crate::task::Priority;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn draft(title: &str, category: &CategoryId, date: NaiveDate) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: "something".to_string(),
            date,
            category: category.clone(),
            priority: Priority::Medium,
        }
    }

    async fn setup() -> (MemoryServer, AuthToken, CategoryId) {
        let server = MemoryServer::new();
        let token = server.register_user("a@b.fr", "Passw0rd");
        let category = server.add_category(&token, "Home").await.unwrap();
        (server, token, category.id().clone())
    }

    #[tokio::test]
    async fn stale_fetches_are_discarded() {
        let (server, token, home) = setup().await;
        server.create_task(&token, &draft("on 15", &home, day(15))).await.unwrap();
        server.create_task(&token, &draft("on 16", &home, day(16))).await.unwrap();

        let mut registry = TaskRegistry::new();
        let first = registry.begin_fetch(day(15));
        let second = registry.begin_fetch(day(16));
        assert_eq!(first.date(), day(15));

        // The second request resolves first
        let result = server.get_tasks(&token, day(16)).await;
        assert!(registry.finish_fetch(second, result));
        let result = server.get_tasks(&token, day(15)).await;
        assert!(registry.finish_fetch(first, result) == false);

        assert_eq!(registry.date(), Some(day(16)));
        let titles: Vec<&str> = registry.tasks().iter().map(|t| t.title()).collect();
        assert_eq!(titles, vec!["on 16"]);
    }

    #[tokio::test]
    async fn failed_fetch_empties_the_cache() {
        let (server, token, home) = setup().await;
        server.create_task(&token, &draft("on 15", &home, day(15))).await.unwrap();

        let mut registry = TaskRegistry::new();
        assert!(registry.fetch_for_date(&server, &token, day(15)).await);
        assert_eq!(registry.tasks().len(), 1);

        let ticket = registry.begin_fetch(day(15));
        assert!(registry.finish_fetch(ticket, Err(Error::Network("down".to_string()))));
        assert!(registry.tasks().is_empty());
    }

    #[tokio::test]
    async fn duplicate_and_out_of_order_replies() {
        let (server, token, home) = setup().await;
        let mut registry = TaskRegistry::new();
        registry.fetch_for_date(&server, &token, day(15)).await;

        let created = registry.create(&server, &token, &draft("Groceries", &home, day(15))).await.unwrap();
        registry.apply_created(created.clone());
        assert_eq!(registry.tasks().len(), 1);

        // A task created for another day is not displayed here
        registry.create(&server, &token, &draft("Later", &home, day(20))).await.unwrap();
        assert_eq!(registry.tasks().len(), 1);

        assert!(registry.select(created.id()));
        registry.delete(&server, &token, created.id()).await.unwrap();
        assert!(registry.selected().is_none());

        // A second delete of the same task is rejected by the server, and changes nothing
        assert!(registry.delete(&server, &token, created.id()).await.is_err());
        // An update reply arriving after the deletion is ignored
        registry.apply_updated(created.clone());
        registry.apply_deleted(created.id());
        assert!(registry.tasks().is_empty());
    }

    #[tokio::test]
    async fn updates_follow_the_selection() {
        let (server, token, home) = setup().await;
        let mut registry = TaskRegistry::new();
        registry.fetch_for_date(&server, &token, day(15)).await;
        let task = registry.create(&server, &token, &draft("Groceries", &home, day(15))).await.unwrap();
        registry.select(task.id());

        let mut changes = draft("Groceries!", &home, day(15));
        changes.priority = Priority::High;
        registry.update(&server, &token, task.id(), &changes).await.unwrap();
        let selected = registry.selected().unwrap();
        assert_eq!(selected.title(), "Groceries!");
        assert_eq!(selected.priority(), Priority::High);

        // Moving it to another day removes it from this one
        registry.update(&server, &token, task.id(), &draft("Groceries!", &home, day(16))).await.unwrap();
        assert!(registry.tasks().is_empty());
        assert!(registry.selected().is_none());
    }

    #[tokio::test]
    async fn toggling_unknown_tasks() {
        let (server, token, _) = setup().await;
        let mut registry = TaskRegistry::new();
        registry.fetch_for_date(&server, &token, day(15)).await;
        let err = registry.toggle_complete(&server, &token, &TaskId::from("ghost")).await.unwrap_err();
        assert!(matches!(err, Error::UnknownTask(_)));
        assert_eq!(server.request_count(), 2);
    }

    #[tokio::test]
    async fn completion_replies_reach_the_selection() {
        let (server, token, home) = setup().await;
        let task = server.create_task(&token, &draft("on 15", &home, day(15))).await.unwrap();
        let mut registry = TaskRegistry::new();
        registry.fetch_for_date(&server, &token, day(15)).await;
        assert!(registry.select(task.id()));

        // A reply that disagrees with the cached status still wins
        registry.apply_completion(task.id(), true);
        assert!(registry.get(task.id()).unwrap().completed());
        assert!(registry.selected().unwrap().completed());
        registry.apply_completion(task.id(), false);
        assert_eq!(registry.selected().unwrap().completed(), false);
    }
}
