//! In-process adapters: bundled seed data and synthetic mock data.

mod mock;
mod seed;

pub use mock::{MOCK_USER_ID, MockMinigameSource, MockUserSource};
pub use seed::{SEED_USER_ID, SeedMinigameSource, SeedUserSource};

use std::sync::{Mutex, MutexGuard};

use crate::repository::StorageError;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}
