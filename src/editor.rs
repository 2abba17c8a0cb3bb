//! The form used to create or edit a task

use bitflags::bitflags;
use chrono::NaiveDate;

use crate::category::{Category, CategoryId};
use crate::error::{Error, Result, ValidationError};
use crate::registry::CategoryRegistry;
use crate::session::AuthToken;
use crate::task::{Priority, Task, TaskDraft, TaskId};
use crate::traits::TaskServer;

/// Titles longer than this (once trimmed) are rejected
pub const MAX_TITLE_LENGTH: usize = 16;

bitflags! {
    /// The pop-up parts of the editor that are currently shown
    pub struct Dropdowns: u8 {
        /// The category picker
        const CATEGORY_LIST = 1;
        /// The priority picker
        const PRIORITY_LIST = 2;
        /// The inline "new category" form
        const NEW_CATEGORY = 4;
    }
}

/// Whether the editor creates a new task, or edits an existing one
#[derive(Clone, Debug, PartialEq)]
pub enum EditorMode {
    Create,
    Edit(TaskId),
}


/// A task form.
///
/// Errors are only reported after the user has tried to submit once. From then on, every change re-runs the validation.
#[derive(Clone, Debug)]
pub struct TaskEditor {
    mode: EditorMode,

    title: String,
    description: String,
    category: Option<CategoryId>,
    priority: Option<Priority>,
    date: Option<NaiveDate>,

    new_category_name: String,
    /// Only set by a failed check of the inline category form
    new_category_error: Option<ValidationError>,
    open: Dropdowns,

    submit_attempted: bool,
    error: Option<ValidationError>,
}

impl TaskEditor {
    /// An empty form for a task on `date` (the date currently selected in the calendar)
    pub fn for_creation(date: Option<NaiveDate>) -> Self {
        Self {
            mode: EditorMode::Create,
            title: String::new(),
            description: String::new(),
            category: None,
            priority: None,
            date,
            new_category_name: String::new(),
            new_category_error: None,
            open: Dropdowns::empty(),
            submit_attempted: false,
            error: None,
        }
    }

    /// A form pre-filled with the current values of `task`
    pub fn for_edition(task: &Task) -> Self {
        Self {
            mode: EditorMode::Edit(task.id().clone()),
            title: task.title().to_string(),
            description: task.description().to_string(),
            category: task.category_id().cloned(),
            priority: Some(task.priority()),
            date: Some(task.date()),
            new_category_name: String::new(),
            new_category_error: None,
            open: Dropdowns::empty(),
            submit_attempted: false,
            error: None,
        }
    }

    pub fn mode(&self) -> &EditorMode              { &self.mode        }
    pub fn title(&self) -> &str                    { &self.title       }
    pub fn description(&self) -> &str              { &self.description }
    pub fn category(&self) -> Option<&CategoryId>  { self.category.as_ref() }
    pub fn priority(&self) -> Option<Priority>     { self.priority     }
    pub fn date(&self) -> Option<NaiveDate>        { self.date         }
    pub fn new_category_name(&self) -> &str        { &self.new_category_name }

    /// The error to display, if any
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// The error to display under the inline category form
    pub fn new_category_error(&self) -> Option<&ValidationError> {
        self.new_category_error.as_ref()
    }

    pub fn set_title<S: ToString>(&mut self, title: S) {
        self.title = title.to_string();
        self.revalidate();
    }

    pub fn set_description<S: ToString>(&mut self, description: S) {
        self.description = description.to_string();
        self.revalidate();
    }

    /// Pick a category (and close the category list)
    pub fn select_category(&mut self, id: CategoryId) {
        self.category = Some(id);
        self.open.remove(Dropdowns::CATEGORY_LIST);
        self.revalidate();
    }

    /// Pick a priority (and close the priority list)
    pub fn select_priority(&mut self, priority: Priority) {
        self.priority = Some(priority);
        self.open.remove(Dropdowns::PRIORITY_LIST);
        self.revalidate();
    }

    /// Follow the date selected in the calendar. Only a creation form follows it; an edited task keeps its own date
    pub fn follow_date(&mut self, date: Option<NaiveDate>) {
        if self.mode == EditorMode::Create {
            self.date = date;
            self.revalidate();
        }
    }

    /// Forget a category that no longer exists
    pub fn forget_category(&mut self, id: &CategoryId) {
        if self.category.as_ref() == Some(id) {
            log::debug!("Category {} has been deleted, unselecting it", id);
            self.category = None;
            self.revalidate();
        }
    }

    pub fn open_dropdowns(&self) -> Dropdowns {
        self.open
    }

    pub fn is_open(&self, dropdown: Dropdowns) -> bool {
        self.open.contains(dropdown)
    }

    pub fn toggle_category_list(&mut self) {
        self.open.toggle(Dropdowns::CATEGORY_LIST);
    }

    pub fn toggle_priority_list(&mut self) {
        self.open.toggle(Dropdowns::PRIORITY_LIST);
    }

    pub fn open_new_category_form(&mut self) {
        self.open.insert(Dropdowns::NEW_CATEGORY);
    }

    pub fn set_new_category_name<S: ToString>(&mut self, name: S) {
        self.new_category_name = name.to_string();
        self.new_category_error = None;
    }

    /// A click anywhere outside the pop-ups closes them. Nothing that has been typed is lost
    pub fn click_outside(&mut self) {
        self.open = Dropdowns::empty();
    }

    /// Check the fields, and returns the (trimmed) task they describe
    pub fn validate(&self) -> std::result::Result<TaskDraft, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ValidationError::TitleTooLong);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let category = self.category.clone().ok_or(ValidationError::NoCategory)?;
        let priority = self.priority.ok_or(ValidationError::NoPriority)?;
        let date = self.date.ok_or(ValidationError::NoDate)?;

        Ok(TaskDraft {
            title: title.to_string(),
            description: description.to_string(),
            date,
            category,
            priority,
        })
    }

    /// A submission attempt. From now on, errors are displayed
    pub fn submit(&mut self) -> std::result::Result<TaskDraft, ValidationError> {
        self.submit_attempted = true;
        let result = self.validate();
        self.error = result.as_ref().err().copied();
        result
    }

    fn revalidate(&mut self) {
        if self.submit_attempted {
            self.error = self.validate().err();
        }
    }

    /// Submit the inline "new category" form.
    ///
    /// On success, the new category is selected and the inline form is closed
    pub async fn add_category<S>(&mut self, categories: &mut CategoryRegistry, server: &S, token: &AuthToken) -> Result<Category>
    where
        S: TaskServer + ?Sized,
    {
        let category = match categories.add(server, token, &self.new_category_name).await {
            Ok(c) => c,
            Err(err) => {
                if let Error::Validation(invalid) = &err {
                    self.new_category_error = Some(*invalid);
                }
                return Err(err);
            }
        };
        self.new_category_name.clear();
        self.new_category_error = None;
        self.open.remove(Dropdowns::NEW_CATEGORY);
        self.select_category(category.id().clone());
        Ok(category)
    }

    /// Delete a category from the category list. It is unselected if it was the selected one
    pub async fn delete_category<S>(&mut self, categories: &mut CategoryRegistry, server: &S, token: &AuthToken, id: &CategoryId) -> Result<()>
    where
        S: TaskServer + ?Sized,
    {
        categories.remove(server, token, id).await?;
        self.forget_category(id);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> TaskEditor {
        let mut editor = TaskEditor::for_creation(NaiveDate::from_ymd_opt(2024, 3, 15));
        editor.set_title("Groceries");
        editor.set_description("Buy milk");
        editor.select_category(CategoryId::from("home"));
        editor.select_priority(Priority::High);
        editor
    }

    #[test]
    fn title_length() {
        let mut editor = filled();
        editor.set_title("exactly 16 chars");
        assert_eq!(editor.title().chars().count(), 16);
        assert!(editor.validate().is_ok());

        editor.set_title("seventeen chars!!");
        assert_eq!(editor.validate(), Err(ValidationError::TitleTooLong));

        // Surrounding spaces do not count, accents count as one character
        editor.set_title("  Déjà vu, encore  ");
        assert_eq!(editor.validate().map(|d| d.title), Ok("Déjà vu, encore".to_string()));

        // So does an emoji, even outside the Basic Multilingual Plane
        editor.set_title("fifteen chars 🎉");
        assert_eq!(editor.title().chars().count(), 15);
        assert!(editor.validate().is_ok());
        editor.set_title("sixteen chars!🎉🎉🎉");
        assert_eq!(editor.validate(), Err(ValidationError::TitleTooLong));
    }

    #[test]
    fn validation_order() {
        let mut editor = TaskEditor::for_creation(None);
        assert_eq!(editor.validate(), Err(ValidationError::EmptyTitle));
        editor.set_title("   ");
        assert_eq!(editor.validate(), Err(ValidationError::EmptyTitle));
        editor.set_title("Groceries that are too long");
        assert_eq!(editor.validate(), Err(ValidationError::TitleTooLong));
        editor.set_title("Groceries");
        assert_eq!(editor.validate(), Err(ValidationError::EmptyDescription));
        editor.set_description("Buy milk");
        assert_eq!(editor.validate(), Err(ValidationError::NoCategory));
        editor.select_category(CategoryId::from("home"));
        assert_eq!(editor.validate(), Err(ValidationError::NoPriority));
        editor.select_priority(Priority::Low);
        assert_eq!(editor.validate(), Err(ValidationError::NoDate));
        editor.follow_date(NaiveDate::from_ymd_opt(2024, 3, 15));
        assert!(editor.validate().is_ok());
    }

    #[test]
    fn errors_show_after_the_first_attempt() {
        let mut editor = filled();
        editor.set_description("");
        assert_eq!(editor.error(), None);

        assert_eq!(editor.submit(), Err(ValidationError::EmptyDescription));
        assert_eq!(editor.error(), Some(&ValidationError::EmptyDescription));
        assert_eq!(editor.error().map(|e| e.to_string()), Some("Veuillez entrer une description pour la tâche".to_string()));

        editor.set_description("Buy milk");
        assert_eq!(editor.error(), None);
        editor.set_title("");
        assert_eq!(editor.error(), Some(&ValidationError::EmptyTitle));
    }

    #[test]
    fn submit_trims_values() {
        let mut editor = filled();
        editor.set_description("  Buy milk \n");
        let draft = editor.submit().unwrap();
        assert_eq!(draft.description, "Buy milk");
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.category, CategoryId::from("home"));
    }

    #[test]
    fn dropdowns_close_without_losing_values() {
        let mut editor = filled();
        editor.toggle_category_list();
        editor.toggle_priority_list();
        editor.open_new_category_form();
        editor.set_new_category_name("Sport");
        assert!(editor.is_open(Dropdowns::CATEGORY_LIST | Dropdowns::PRIORITY_LIST | Dropdowns::NEW_CATEGORY));

        editor.click_outside();
        assert!(editor.is_open(Dropdowns::CATEGORY_LIST) == false);
        assert!(editor.is_open(Dropdowns::NEW_CATEGORY) == false);
        assert_eq!(editor.title(), "Groceries");
        assert_eq!(editor.new_category_name(), "Sport");
        assert!(editor.validate().is_ok());

        editor.toggle_priority_list();
        editor.select_priority(Priority::Medium);
        assert!(editor.is_open(Dropdowns::PRIORITY_LIST) == false);
    }

    #[test]
    fn edition_keeps_its_own_date() {
        let json = r#"{"_id": "t1", "title": "Run", "description": "5k",
            "date": "2024-03-10", "category": {"_id": "c1", "name": "Sport"}, "priority": 2}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        let mut editor = TaskEditor::for_edition(&task);
        assert_eq!(editor.mode(), &EditorMode::Edit(TaskId::from("t1")));
        editor.follow_date(NaiveDate::from_ymd_opt(2024, 3, 15));
        let draft = editor.validate().unwrap();
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(Some(draft), task.to_draft());
    }

    #[test]
    fn forgetting_categories() {
        let mut editor = filled();
        editor.forget_category(&CategoryId::from("work"));
        assert_eq!(editor.category(), Some(&CategoryId::from("home")));
        editor.forget_category(&CategoryId::from("home"));
        assert_eq!(editor.category(), None);
    }
}
