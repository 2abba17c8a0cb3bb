//! An in-process implementation of the task board API
//!
//! It behaves like the real server (per-user data, token checks, category checks, populated categories in replies),
//! so that the board can be exercised without any network. Its failures can be tweaked with a [`MockBehaviour`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::category::{Category, CategoryId};
use crate::error::{Error, Result};
use crate::mock_behaviour::MockBehaviour;
use crate::session::AuthToken;
use crate::task::{Task, TaskCategory, TaskDraft, TaskId};
use crate::traits::{Authenticator, TaskServer};

#[derive(Debug)]
struct StoredTask {
    owner: String,
    id: TaskId,
    draft: TaskDraft,
    is_completed: bool,
}

#[derive(Debug, Default)]
struct ServerState {
    /// email -> password
    users: HashMap<String, String>,
    /// token -> email
    sessions: HashMap<String, String>,
    /// email -> categories, in creation order
    categories: HashMap<String, Vec<Category>>,
    tasks: Vec<StoredTask>,
    request_count: usize,
}

impl ServerState {
    fn owner_of(&self, token: &AuthToken) -> Result<String> {
        match self.sessions.get(token.as_str()) {
            Some(email) => Ok(email.clone()),
            None => Err(Error::server(401, Some("Token invalide".to_string()))),
        }
    }

    fn find_category(&self, owner: &str, id: &CategoryId) -> Option<&Category> {
        self.categories.get(owner)
            .and_then(|cats| cats.iter().find(|c| c.id() == id))
    }

    fn render(&self, stored: &StoredTask) -> Task {
        let category = self.find_category(&stored.owner, &stored.draft.category)
            .map(|c| TaskCategory::Populated(c.clone()));
        Task::new(stored.id.clone(), stored.draft.clone(), category, stored.is_completed)
    }

    fn position_of(&self, owner: &str, id: &TaskId) -> Result<usize> {
        self.tasks.iter()
            .position(|t| t.owner == owner && &t.id == id)
            .ok_or_else(|| Error::server(404, Some("Tâche introuvable".to_string())))
    }
}


/// A server that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryServer {
    state: Mutex<ServerState>,
    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a server whose failures are driven by `mock_behaviour`
    pub fn with_mock_behaviour(mock_behaviour: Arc<Mutex<MockBehaviour>>) -> Self {
        Self {
            state: Mutex::new(ServerState::default()),
            mock_behaviour: Some(mock_behaviour),
        }
    }

    /// Create an account and a session for it in a single step
    pub fn register_user(&self, email: &str, password: &str) -> AuthToken {
        let mut state = self.lock();
        state.users.insert(email.to_string(), password.to_string());
        let token = new_id();
        state.sessions.insert(token.clone(), email.to_string());
        AuthToken::new(token)
    }

    /// How many requests this server has received
    pub fn request_count(&self) -> usize {
        self.lock().request_count
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Count a request, then ask the mock behaviour whether it should succeed
    fn receive<F>(&self, check: F) -> Result<MutexGuard<'_, ServerState>>
    where
        F: FnOnce(&mut MockBehaviour) -> Result<()>,
    {
        let mut state = self.lock();
        state.request_count += 1;
        if let Some(behaviour) = &self.mock_behaviour {
            let mut behaviour = match behaviour.lock() {
                Ok(b) => b,
                Err(poisoned) => poisoned.into_inner(),
            };
            check(&mut behaviour)?;
        }
        Ok(state)
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_hyphenated().to_string()
}

#[async_trait]
impl Authenticator for MemoryServer {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        let state = self.receive(|_| Ok(()))?;
        Ok(state.users.contains_key(email))
    }

    async fn signup(&self, email: &str, password: &str) -> Result<()> {
        let mut state = self.receive(|_| Ok(()))?;
        if state.users.contains_key(email) {
            return Err(Error::server(400, Some("Cet utilisateur existe déjà".to_string())));
        }
        state.users.insert(email.to_string(), password.to_string());
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthToken> {
        let mut state = self.receive(|b| b.can_login())?;
        match state.users.get(email) {
            None => Err(Error::server(400, Some("Email invalide".to_string()))),
            Some(p) if p != password => Err(Error::server(400, Some("Mot de passe incorrect".to_string()))),
            Some(_) => {
                let token = new_id();
                state.sessions.insert(token.clone(), email.to_string());
                Ok(AuthToken::new(token))
            }
        }
    }
}

#[async_trait]
impl TaskServer for MemoryServer {
    async fn get_categories(&self, token: &AuthToken) -> Result<Vec<Category>> {
        let state = self.receive(|b| b.can_get_categories())?;
        let owner = state.owner_of(token)?;
        Ok(state.categories.get(&owner).cloned().unwrap_or_default())
    }

    async fn add_category(&self, token: &AuthToken, name: &str) -> Result<Category> {
        let mut state = self.receive(|b| b.can_add_category())?;
        let owner = state.owner_of(token)?;
        if name.trim().is_empty() {
            return Err(Error::server(400, Some("Le nom de la catégorie est requis".to_string())));
        }
        let category = Category::new(CategoryId::from(new_id()), name.to_string());
        state.categories.entry(owner).or_default().push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, token: &AuthToken, id: &CategoryId) -> Result<()> {
        let mut state = self.receive(|b| b.can_delete_category())?;
        let owner = state.owner_of(token)?;
        let categories = state.categories.entry(owner).or_default();
        match categories.iter().position(|c| c.id() == id) {
            None => Err(Error::server(404, Some("Catégorie introuvable".to_string()))),
            Some(index) => {
                categories.remove(index);
                Ok(())
            }
        }
    }

    async fn get_tasks(&self, token: &AuthToken, date: NaiveDate) -> Result<Vec<Task>> {
        let state = self.receive(|b| b.can_get_tasks())?;
        let owner = state.owner_of(token)?;
        Ok(state.tasks.iter()
            .filter(|t| t.owner == owner && t.draft.date == date)
            .map(|t| state.render(t))
            .collect())
    }

    async fn create_task(&self, token: &AuthToken, draft: &TaskDraft) -> Result<Task> {
        let mut state = self.receive(|b| b.can_create_task())?;
        let owner = state.owner_of(token)?;
        if state.find_category(&owner, &draft.category).is_none() {
            return Err(Error::server(400, Some("Catégorie introuvable".to_string())));
        }
        let stored = StoredTask {
            owner,
            id: TaskId::from(new_id()),
            draft: draft.clone(),
            is_completed: false,
        };
        let task = state.render(&stored);
        state.tasks.push(stored);
        Ok(task)
    }

    async fn update_task(&self, token: &AuthToken, id: &TaskId, draft: &TaskDraft) -> Result<Task> {
        let mut state = self.receive(|b| b.can_update_task())?;
        let owner = state.owner_of(token)?;
        if state.find_category(&owner, &draft.category).is_none() {
            return Err(Error::server(400, Some("Catégorie introuvable".to_string())));
        }
        let index = state.position_of(&owner, id)?;
        state.tasks[index].draft = draft.clone();
        Ok(state.render(&state.tasks[index]))
    }

    async fn delete_task(&self, token: &AuthToken, id: &TaskId) -> Result<()> {
        let mut state = self.receive(|b| b.can_delete_task())?;
        let owner = state.owner_of(token)?;
        let index = state.position_of(&owner, id)?;
        state.tasks.remove(index);
        Ok(())
    }

    async fn set_completion(&self, token: &AuthToken, id: &TaskId, completed: bool) -> Result<Task> {
        let mut state = self.receive(|b| b.can_set_completion())?;
        let owner = state.owner_of(token)?;
        let index = state.position_of(&owner, id)?;
        state.tasks[index].is_completed = completed;
        Ok(state.render(&state.tasks[index]))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn draft(category: &CategoryId, day: u32) -> TaskDraft {
        TaskDraft {
            title: "Groceries".to_string(),
            description: "Buy milk".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            category: category.clone(),
            priority: Priority::High,
        }
    }

    #[tokio::test]
    async fn data_is_per_user() {
        let server = MemoryServer::new();
        let alice = server.register_user("alice@example.com", "Passw0rd");
        let bob = server.register_user("bob@example.com", "Passw0rd");

        let home = server.add_category(&alice, "Home").await.unwrap();
        server.create_task(&alice, &draft(home.id(), 15)).await.unwrap();

        assert!(server.get_categories(&bob).await.unwrap().is_empty());
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert!(server.get_tasks(&bob, day).await.unwrap().is_empty());
        assert_eq!(server.get_tasks(&alice, day).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let server = MemoryServer::new();
        let err = server.get_categories(&AuthToken::new("forged")).await.unwrap_err();
        assert!(matches!(err, Error::Server { status: 401, .. }));
    }

    #[tokio::test]
    async fn deleting_a_category_does_not_cascade() {
        let server = MemoryServer::new();
        let token = server.register_user("alice@example.com", "Passw0rd");
        let home = server.add_category(&token, "Home").await.unwrap();
        let task = server.create_task(&token, &draft(home.id(), 15)).await.unwrap();
        assert_eq!(task.category().and_then(|c| c.name()), Some("Home"));

        server.delete_category(&token, home.id()).await.unwrap();
        let tasks = server.get_tasks(&token, task.date()).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].category().is_none());

        // The category must exist when creating a task
        let err = server.create_task(&token, &draft(home.id(), 15)).await.unwrap_err();
        assert!(matches!(err, Error::Server { status: 400, .. }));
    }

    #[tokio::test]
    async fn login_and_mocked_failures() {
        let behaviour = Arc::new(Mutex::new(MockBehaviour { login_behaviour: (0, 1), ..MockBehaviour::default() }));
        let server = MemoryServer::with_mock_behaviour(behaviour);
        server.signup("alice@example.com", "Passw0rd").await.unwrap();

        assert!(matches!(server.login("alice@example.com", "Passw0rd").await, Err(Error::Network(_))));
        assert!(server.login("alice@example.com", "wrong").await.is_err());
        let token = server.login("alice@example.com", "Passw0rd").await.unwrap();
        assert!(server.get_categories(&token).await.unwrap().is_empty());
        assert_eq!(server.request_count(), 5);
    }
}
