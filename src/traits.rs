//! The seams between the board and its data sources

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::category::{Category, CategoryId};
use crate::error::Result;
use crate::session::AuthToken;
use crate::task::{Task, TaskDraft, TaskId};

/// The authenticated part of the task board API.
///
/// This is usually a [`Client`](crate::client::Client), but tests and demos use a
/// [`MemoryServer`](crate::memory_server::MemoryServer). Every call receives the token explicitly.
#[async_trait]
pub trait TaskServer {
    /// Returns the categories of the user, in the server order
    async fn get_categories(&self, token: &AuthToken) -> Result<Vec<Category>>;
    /// Create a category and returns it with its server-assigned id
    async fn add_category(&self, token: &AuthToken, name: &str) -> Result<Category>;
    /// Delete a category. Tasks that reference it are left untouched
    async fn delete_category(&self, token: &AuthToken, id: &CategoryId) -> Result<()>;

    /// Returns the tasks of a single calendar day
    async fn get_tasks(&self, token: &AuthToken, date: NaiveDate) -> Result<Vec<Task>>;
    /// Create a (not completed) task
    async fn create_task(&self, token: &AuthToken, draft: &TaskDraft) -> Result<Task>;
    /// Replace every editable field of a task
    async fn update_task(&self, token: &AuthToken, id: &TaskId, draft: &TaskDraft) -> Result<Task>;
    async fn delete_task(&self, token: &AuthToken, id: &TaskId) -> Result<()>;
    /// Set the completion status of a task, and returns the task as it is now stored
    async fn set_completion(&self, token: &AuthToken, id: &TaskId, completed: bool) -> Result<Task>;
}

/// The account routes of the API, that do not require a token
#[async_trait]
pub trait Authenticator {
    /// Whether an account already uses this email
    async fn email_exists(&self, email: &str) -> Result<bool>;
    async fn signup(&self, email: &str, password: &str) -> Result<()>;
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken>;
}

/// Somewhere an authentication token can be kept
pub trait SessionStore {
    /// Returns the current token, or `None` if the user is not authenticated
    fn token(&self) -> Option<AuthToken>;
    /// Remember a token (usually after a successful login)
    fn store_token(&mut self, token: AuthToken) -> Result<()>;
}
