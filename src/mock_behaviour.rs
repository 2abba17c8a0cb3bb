//! This module provides ways to tweak the [`MemoryServer`](crate::memory_server::MemoryServer), so that it can return errors on some tests

use crate::error::{Error, Result};

/// This stores some behaviour tweaks, that describe how a mocked server will behave during a given test
///
/// So that a functions fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every action will be allowed
    pub is_suspended: bool,

    // Account routes
    pub login_behaviour: (u32, u32),

    // Category routes
    pub get_categories_behaviour: (u32, u32),
    pub add_category_behaviour: (u32, u32),
    pub delete_category_behaviour: (u32, u32),

    // Card routes
    pub get_tasks_behaviour: (u32, u32),
    pub create_task_behaviour: (u32, u32),
    pub update_task_behaviour: (u32, u32),
    pub delete_task_behaviour: (u32, u32),
    pub set_completion_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All routes will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            login_behaviour: (0, n_fails),
            get_categories_behaviour: (0, n_fails),
            add_category_behaviour: (0, n_fails),
            delete_category_behaviour: (0, n_fails),
            get_tasks_behaviour: (0, n_fails),
            create_task_behaviour: (0, n_fails),
            update_task_behaviour: (0, n_fails),
            delete_task_behaviour: (0, n_fails),
            set_completion_behaviour: (0, n_fails),
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_login(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.login_behaviour, "login")
    }
    pub fn can_get_categories(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.get_categories_behaviour, "get_categories")
    }
    pub fn can_add_category(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.add_category_behaviour, "add_category")
    }
    pub fn can_delete_category(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.delete_category_behaviour, "delete_category")
    }
    pub fn can_get_tasks(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.get_tasks_behaviour, "get_tasks")
    }
    pub fn can_create_task(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.create_task_behaviour, "create_task")
    }
    pub fn can_update_task(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.update_task_behaviour, "update_task")
    }
    pub fn can_delete_task(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.delete_task_behaviour, "delete_task")
    }
    pub fn can_set_completion(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.set_completion_behaviour, "set_completion")
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<()> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(Error::Network(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value)))
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}
