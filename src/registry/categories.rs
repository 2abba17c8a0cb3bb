use crate::category::{Category, CategoryId};
use crate::error::{Result, ValidationError};
use crate::session::AuthToken;
use crate::traits::TaskServer;

/// The categories of the current user, in server order
#[derive(Clone, Debug, Default)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id() == id)
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.get(id).is_some()
    }

    /// Replace the cached list with the server's one.
    ///
    /// Failures are only logged, and the previous list is kept. Returns whether the fetch succeeded
    pub async fn fetch_all<S>(&mut self, server: &S, token: &AuthToken) -> bool
    where
        S: TaskServer + ?Sized,
    {
        match server.get_categories(token).await {
            Ok(categories) => {
                log::debug!("Fetched {} categories", categories.len());
                self.categories = categories;
                true
            },
            Err(err) => {
                log::error!("Unable to fetch categories: {}", err);
                false
            },
        }
    }

    /// Create a category on the server, then append it here
    pub async fn add<S>(&mut self, server: &S, token: &AuthToken, name: &str) -> Result<Category>
    where
        S: TaskServer + ?Sized,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCategoryName.into());
        }

        let category = server.add_category(token, name).await.map_err(|err| {
            log::error!("Unable to add category {:?}: {}", name, err);
            err
        })?;
        self.apply_added(category.clone());
        Ok(category)
    }

    /// Delete a category on the server, then forget it here
    pub async fn remove<S>(&mut self, server: &S, token: &AuthToken, id: &CategoryId) -> Result<()>
    where
        S: TaskServer + ?Sized,
    {
        server.delete_category(token, id).await.map_err(|err| {
            log::error!("Unable to delete category {}: {}", id, err);
            err
        })?;
        self.apply_removed(id);
        Ok(())
    }

    /// Merge a category the server has created. A duplicate reply replaces the previous copy
    pub fn apply_added(&mut self, category: Category) {
        match self.categories.iter_mut().find(|c| c.id() == category.id()) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }

    pub fn apply_removed(&mut self, id: &CategoryId) {
        self.categories.retain(|c| c.id() != id);
    }
}
