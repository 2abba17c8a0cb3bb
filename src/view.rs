//! Plain-data renderings of the board
//!
//! Views are snapshots: they own their data, and are rebuilt after every change of the board.
//! Their `Display` implementations give a textual rendering, used by the `today` binary.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;

use crate::calendar::{DateSelector, DayCell, WEEKDAYS};
use crate::editor::{Dropdowns, EditorMode, TaskEditor};
use crate::registry::CategoryRegistry;
use crate::task::{Task, TaskId};

/// Cards only show the beginning of long descriptions
pub const SUMMARY_LENGTH: usize = 50;
pub const NO_TASK_MESSAGE: &str = "Aucune tâche aujourd'hui.";
pub const NO_SELECTION_MESSAGE: &str = "Sélectionnez une tâche pour voir les détails";
pub const DELETE_CONFIRMATION: &str = "Êtes-vous sûr de vouloir supprimer cette tâche ?";
pub const UNKNOWN_CATEGORY: &str = "Catégorie inconnue";

/// Shorten a description to [`SUMMARY_LENGTH`] characters
pub fn summarize(description: &str) -> String {
    if description.chars().count() <= SUMMARY_LENGTH {
        return description.to_string();
    }
    let mut summary: String = description.chars().take(SUMMARY_LENGTH).collect();
    summary.push_str("...");
    summary
}

/// The label of the category of a task.
///
/// The registry is authoritative. A name embedded in the server reply is used for categories the registry does not know (yet)
pub fn category_label(task: &Task, categories: &CategoryRegistry) -> String {
    let category = match task.category() {
        None => return UNKNOWN_CATEGORY.to_string(),
        Some(c) => c,
    };
    match categories.get(category.id()) {
        Some(known) => known.name().to_string(),
        None => category.name().unwrap_or(UNKNOWN_CATEGORY).to_string(),
    }
}


/// A task, either as a card of the grid or in the detail panel
#[derive(Clone, Debug, PartialEq)]
pub struct CardView {
    pub id: TaskId,
    pub title: String,
    /// Truncated for cards of the grid, complete in the detail panel
    pub description: String,
    pub date: NaiveDate,
    pub category: String,
    pub priority: String,
    pub completed: bool,
    pub selected: bool,
}

impl CardView {
    pub fn summary(task: &Task, categories: &CategoryRegistry, selected: bool) -> Self {
        let mut card = Self::detailed(task, categories);
        card.description = summarize(task.description());
        card.selected = selected;
        card
    }

    pub fn detailed(task: &Task, categories: &CategoryRegistry) -> Self {
        Self {
            id: task.id().clone(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            date: task.date(),
            category: category_label(task, categories),
            priority: task.priority().label().to_string(),
            completed: task.completed(),
            selected: true,
        }
    }
}

impl Display for CardView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let check = if self.completed { "[x]" } else { "[ ]" };
        let marker = if self.selected { ">" } else { " " };
        writeln!(f, "{} {} {} ({}, {})", marker, check, self.title, self.category, self.priority)?;
        write!(f, "      {}", self.description)
    }
}


#[derive(Clone, Debug, PartialEq)]
pub struct CalendarView {
    pub title: String,
    pub cells: Vec<DayCell>,
    pub selected_day: Option<u32>,
}

impl CalendarView {
    pub fn new(selector: &DateSelector) -> Self {
        Self {
            title: selector.title(),
            cells: selector.cells(),
            selected_day: selector.selected_day(),
        }
    }
}

impl Display for CalendarView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:^27}", self.title)?;
        writeln!(f, "{}", WEEKDAYS.iter().map(|d| format!("{:>3}", d)).collect::<Vec<_>>().join(" "))?;
        for week in self.cells.chunks(7) {
            let row: Vec<String> = week.iter().map(|cell| match cell {
                DayCell::Blank => "   ".to_string(),
                DayCell::Day(d) if Some(*d) == self.selected_day => format!("[{:>2}", d),
                DayCell::Day(d) => format!("{:>3}", d),
            }).collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}


/// The task form, as displayed
#[derive(Clone, Debug, PartialEq)]
pub struct EditorView {
    pub heading: &'static str,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    /// `(name, is_selected)`, in registry order
    pub categories: Vec<(String, bool)>,
    pub priority: Option<String>,
    pub open: Dropdowns,
    pub new_category_name: String,
    pub new_category_error: Option<String>,
    pub error: Option<String>,
}

impl EditorView {
    pub fn new(editor: &TaskEditor, categories: &CategoryRegistry) -> Self {
        let heading = match editor.mode() {
            EditorMode::Create => "Nouvelle tâche",
            EditorMode::Edit(_) => "Modifier la tâche",
        };
        Self {
            heading,
            title: editor.title().to_string(),
            description: editor.description().to_string(),
            date: editor.date(),
            categories: categories.list().iter()
                .map(|c| (c.name().to_string(), Some(c.id()) == editor.category()))
                .collect(),
            priority: editor.priority().map(|p| p.label().to_string()),
            open: editor.open_dropdowns(),
            new_category_name: editor.new_category_name().to_string(),
            new_category_error: editor.new_category_error().map(|e| e.to_string()),
            error: editor.error().map(|e| e.to_string()),
        }
    }

    fn selected_category(&self) -> Option<&str> {
        self.categories.iter().find(|(_, selected)| *selected).map(|(name, _)| name.as_str())
    }
}

impl Display for EditorView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.heading)?;
        writeln!(f, "  Titre : {}", self.title)?;
        writeln!(f, "  Description : {}", self.description)?;
        writeln!(f, "  Catégorie : {}", self.selected_category().unwrap_or("-"))?;
        writeln!(f, "  Priorité : {}", self.priority.as_deref().unwrap_or("-"))?;
        if let Some(date) = self.date {
            writeln!(f, "  Jour : {}", date.format("%d/%m/%Y"))?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "  ! {}", error)?;
        }
        if let Some(error) = &self.new_category_error {
            writeln!(f, "  ! {}", error)?;
        }
        Ok(())
    }
}


/// The right-hand panel
#[derive(Clone, Debug, PartialEq)]
pub enum DetailView {
    Empty,
    Task(CardView),
    Editor(EditorView),
}

impl Display for DetailView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DetailView::Empty => writeln!(f, "{}", NO_SELECTION_MESSAGE),
            DetailView::Task(card) => {
                writeln!(f, "{}", card.title)?;
                writeln!(f, "  {}", card.description)?;
                writeln!(f, "  Catégorie : {}", card.category)?;
                writeln!(f, "  Priorité : {}", card.priority)?;
                writeln!(f, "  Jour : {}", card.date.format("%d/%m/%Y"))?;
                writeln!(f, "  {}", if card.completed { "Terminée" } else { "À faire" })
            },
            DetailView::Editor(editor) => write!(f, "{}", editor),
        }
    }
}


/// Everything the board displays
#[derive(Clone, Debug, PartialEq)]
pub struct BoardView {
    pub heading: String,
    pub cards: Vec<CardView>,
    /// Shown instead of the cards when there are none
    pub empty_message: Option<&'static str>,
    pub calendar: CalendarView,
    pub detail: DetailView,
    pub alert: Option<String>,
    /// Set while a deletion waits for the user to confirm it
    pub confirmation: Option<&'static str>,
}

impl BoardView {
    pub fn heading_for(date: Option<NaiveDate>) -> String {
        match date {
            Some(d) => format!("Tâches du jour ({})", d.format("%d/%m/%Y")),
            None => "Tâches du jour".to_string(),
        }
    }
}

impl Display for BoardView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "My ToDoList Every Day")?;
        if let Some(alert) = &self.alert {
            writeln!(f, "/!\\ {}", alert)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.heading)?;
        if let Some(message) = self.empty_message {
            writeln!(f, "  {}", message)?;
        }
        for card in &self.cards {
            writeln!(f, "{}", card)?;
        }
        writeln!(f)?;
        write!(f, "{}", self.calendar)?;
        writeln!(f)?;
        write!(f, "{}", self.detail)?;
        if let Some(question) = self.confirmation {
            writeln!(f, "{}", question)?;
        }
        Ok(())
    }
}
