//! Support for library configuration options

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// Used when `TODO_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:1234";
/// Used when `TODO_SESSION_FILE` is not set
pub const DEFAULT_SESSION_FILE: &str = "todo-session.json";

/// Base URL of the task board API (e.g. `http://localhost:1234`).
/// It is read from the `TODO_API_URL` environment variable the first time it is used. Feel free to override it when initing this library.
pub static API_URL: Lazy<Arc<Mutex<String>>> = Lazy::new(|| {
    let url = std::env::var("TODO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    Arc::new(Mutex::new(url))
});

/// Where the authentication token is persisted.
/// It is read from the `TODO_SESSION_FILE` environment variable the first time it is used. Feel free to override it when initing this library.
pub static SESSION_FILE: Lazy<Arc<Mutex<PathBuf>>> = Lazy::new(|| {
    let path = std::env::var("TODO_SESSION_FILE").unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
    Arc::new(Mutex::new(PathBuf::from(path)))
});

/// Returns the current value of [`API_URL`]
pub fn api_url() -> String {
    match API_URL.lock() {
        Ok(url) => url.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Returns the current value of [`SESSION_FILE`]
pub fn session_file() -> PathBuf {
    match SESSION_FILE.lock() {
        Ok(path) => path.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Override [`API_URL`]
pub fn set_api_url<S: ToString>(url: S) {
    match API_URL.lock() {
        Ok(mut current) => *current = url.to_string(),
        Err(poisoned) => *poisoned.into_inner() = url.to_string(),
    }
}
