//! The daily board: the calendar, the tasks of the selected day, and the detail panel
//!
//! A [`Board`] wires user actions to the registries. It owns all the client-side state, and every
//! view is built from it with [`Board::view`].

use chrono::NaiveDate;

use crate::calendar::DateSelector;
use crate::category::{Category, CategoryId};
use crate::editor::{EditorMode, TaskEditor};
use crate::error::{Error, Result};
use crate::registry::{CategoryRegistry, TaskRegistry};
use crate::session::AuthToken;
use crate::task::{Task, TaskId};
use crate::traits::{SessionStore, TaskServer};
use crate::view::{BoardView, CalendarView, CardView, DetailView, EditorView, DELETE_CONFIRMATION, NO_TASK_MESSAGE};

pub struct Board<S: TaskServer> {
    server: S,
    token: AuthToken,

    calendar: DateSelector,
    categories: CategoryRegistry,
    tasks: TaskRegistry,

    editor: Option<TaskEditor>,
    /// The task the user has asked to delete, waiting for a confirmation
    pending_deletion: Option<TaskId>,
    /// The last error of a user action, until it is dismissed
    alert: Option<String>,
}

impl<S: TaskServer> Board<S> {
    /// Create a board that displays the month of `today`. Nothing is fetched until [`Self::mount`] is called
    pub fn new(server: S, token: AuthToken, today: NaiveDate) -> Self {
        Self {
            server,
            token,
            calendar: DateSelector::containing(today),
            categories: CategoryRegistry::new(),
            tasks: TaskRegistry::new(),
            editor: None,
            pending_deletion: None,
            alert: None,
        }
    }

    /// Create a board for the user of a session. Fails if the session holds no token
    pub fn from_session<T: SessionStore>(server: S, session: &T, today: NaiveDate) -> Result<Self> {
        let token = session.token().ok_or(Error::Unauthenticated)?;
        Ok(Self::new(server, token, today))
    }

    pub fn server(&self) -> &S                          { &self.server     }
    pub fn token(&self) -> &AuthToken                   { &self.token      }
    pub fn calendar(&self) -> &DateSelector             { &self.calendar   }
    pub fn categories(&self) -> &CategoryRegistry       { &self.categories }
    pub fn tasks(&self) -> &TaskRegistry                { &self.tasks      }
    pub fn editor(&self) -> Option<&TaskEditor>         { self.editor.as_ref() }
    pub fn editor_mut(&mut self) -> Option<&mut TaskEditor> { self.editor.as_mut() }

    /// Direct access to the task registry, to interleave fetches with [`TaskRegistry::begin_fetch`] and [`TaskRegistry::finish_fetch`]
    pub fn tasks_mut(&mut self) -> &mut TaskRegistry {
        &mut self.tasks
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.tasks.date()
    }

    /// First display: fetch the categories, and select today if it is in the displayed month
    pub async fn mount(&mut self, today: NaiveDate) {
        self.categories.fetch_all(&self.server, &self.token).await;
        if let Some(date) = self.calendar.mount(today) {
            log::info!("Selecting today ({})", date);
            self.select_date(date).await;
        }
    }

    /// Display the tasks of another day
    pub async fn select_date(&mut self, date: NaiveDate) {
        self.pending_deletion = None;
        // The edited task is not displayed anymore, while a new task follows the calendar
        if self.is_editing(|_| true) {
            self.editor = None;
        }
        if let Some(editor) = &mut self.editor {
            editor.follow_date(Some(date));
        }
        self.tasks.fetch_for_date(&self.server, &self.token, date).await;
    }

    /// Click on a day of the calendar. Days that do not exist are ignored
    pub async fn click_day(&mut self, day: u32) {
        if let Some(date) = self.calendar.click_day(day) {
            self.select_date(date).await;
        }
    }

    pub fn previous_month(&mut self) {
        self.calendar.previous_month();
    }

    pub fn next_month(&mut self) {
        self.calendar.next_month();
    }

    /// Show a task in the detail panel
    pub fn click_task(&mut self, id: &TaskId) -> bool {
        if self.tasks.select(id) == false {
            return false;
        }
        self.editor = None;
        self.pending_deletion = None;
        true
    }

    pub fn open_create_editor(&mut self) {
        self.editor = Some(TaskEditor::for_creation(self.selected_date()));
    }

    /// Edit the task of the detail panel. Returns `false` if no task is selected
    pub fn open_edit_editor(&mut self) -> bool {
        match self.tasks.selected() {
            Some(task) => {
                self.editor = Some(TaskEditor::for_edition(task));
                true
            },
            None => false,
        }
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Submit the open editor.
    ///
    /// Validation errors are displayed by the editor itself, other errors become the alert. The editor is only
    /// closed once the server has accepted the task. Returns `None` if no editor is open
    pub async fn submit_editor(&mut self) -> Result<Option<Task>> {
        let editor = match &mut self.editor {
            Some(e) => e,
            None => {
                log::warn!("No editor to submit");
                return Ok(None);
            }
        };
        if let Some(id) = editor.category().cloned() {
            if self.categories.contains(&id) == false {
                log::warn!("Category {} is not in the list, clearing it", id);
                editor.forget_category(&id);
            }
        }
        let draft = editor.submit()?;
        let mode = editor.mode().clone();

        let result = match &mode {
            EditorMode::Create => self.tasks.create(&self.server, &self.token, &draft).await,
            EditorMode::Edit(id) => self.tasks.update(&self.server, &self.token, id, &draft).await,
        };
        let task = self.report(result)?;
        self.editor = None;
        Ok(Some(task))
    }

    /// Ask to delete the task of the detail panel. It is only deleted once [`Self::confirm_deletion`] is called
    pub fn request_deletion(&mut self) -> bool {
        match self.tasks.selected() {
            Some(task) => {
                self.pending_deletion = Some(task.id().clone());
                true
            },
            None => false,
        }
    }

    pub fn cancel_deletion(&mut self) {
        self.pending_deletion = None;
    }

    pub async fn confirm_deletion(&mut self) -> Result<()> {
        let id = match self.pending_deletion.take() {
            Some(id) => id,
            None => return Ok(()),
        };
        let result = self.tasks.delete(&self.server, &self.token, &id).await;
        self.report(result)?;
        if self.is_editing(|edited| edited == &id) {
            self.editor = None;
        }
        Ok(())
    }

    /// Mark a task as done (or not done anymore). There is no confirmation
    pub async fn toggle_complete(&mut self, id: &TaskId) -> Result<bool> {
        let result = self.tasks.toggle_complete(&self.server, &self.token, id).await;
        self.report(result)
    }

    /// Submit the inline category form of the open editor
    pub async fn add_category_from_editor(&mut self) -> Result<Option<Category>> {
        let editor = match &mut self.editor {
            Some(e) => e,
            None => return Ok(None),
        };
        let result = editor.add_category(&mut self.categories, &self.server, &self.token).await;
        self.report(result).map(Some)
    }

    /// Delete a category. Tasks that use it are kept, and display a fallback label
    pub async fn delete_category(&mut self, id: &CategoryId) -> Result<()> {
        let result = match &mut self.editor {
            Some(editor) => editor.delete_category(&mut self.categories, &self.server, &self.token, id).await,
            None => self.categories.remove(&self.server, &self.token, id).await,
        };
        self.report(result)
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Whether the open editor edits an existing task that matches `filter`
    fn is_editing<F: Fn(&TaskId) -> bool>(&self, filter: F) -> bool {
        match self.editor.as_ref().map(|e| e.mode()) {
            Some(EditorMode::Edit(id)) => filter(id),
            _ => false,
        }
    }

    /// Keep the message of a failed request as the current alert. Local errors are displayed where they happen
    fn report<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_local() == false {
                self.alert = Some(err.to_string());
            }
        }
        result
    }

    pub fn view(&self) -> BoardView {
        let selected_id = self.tasks.selected().map(|t| t.id());
        let cards: Vec<CardView> = self.tasks.tasks().iter()
            .map(|t| CardView::summary(t, &self.categories, Some(t.id()) == selected_id))
            .collect();

        let detail = match (&self.editor, self.tasks.selected()) {
            (Some(editor), _) => DetailView::Editor(EditorView::new(editor, &self.categories)),
            (None, Some(task)) => DetailView::Task(CardView::detailed(task, &self.categories)),
            (None, None) => DetailView::Empty,
        };

        BoardView {
            heading: BoardView::heading_for(self.selected_date()),
            empty_message: if cards.is_empty() { Some(NO_TASK_MESSAGE) } else { None },
            cards,
            calendar: CalendarView::new(&self.calendar),
            detail,
            alert: self.alert.clone(),
            confirmation: self.pending_deletion.as_ref().map(|_| DELETE_CONFIRMATION),
        }
    }
}
