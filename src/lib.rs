//! This crate is a client for "My ToDoList Every Day", a daily task manager.
//!
//! Tasks are stored on a remote server, that is reached through the HTTP [`client`]. Any [`TaskServer`](traits::TaskServer)
//! can be used instead, e.g. the in-process [`MemoryServer`](memory_server::MemoryServer).
//!
//! The client-side state lives in a [`Board`]: the calendar used to pick a day, the categories and the tasks of that day
//! (mirrored in the [`registry`] module), and the [`TaskEditor`] used to create or edit a task. \
//! Every change round-trips through the server before it is applied locally. \
//! A board is rendered into plain data with [`Board::view`].

pub mod traits;
pub mod error;
pub use error::{Error, Result};

mod category;
pub use category::{Category, CategoryId};
mod task;
pub use task::{Priority, Task, TaskCategory, TaskDraft, TaskId};
pub use task::calendar_day;

pub mod calendar;
pub mod registry;
pub mod editor;
pub use editor::TaskEditor;
pub mod view;
pub mod board;
pub use board::Board;
pub mod auth;

pub mod session;
pub mod resource;
pub mod client;
pub mod memory_server;
pub mod mock_behaviour;

pub mod config;
