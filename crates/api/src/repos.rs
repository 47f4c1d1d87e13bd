//! Database repositories.
//!
//! Each repository is a trait over its Postgres implementation so handlers
//! can be tested against mocks.

mod users;

pub use users::{PgUserRepo, UserRepo};

#[cfg(test)]
pub use users::MockUserRepo;

use std::sync::Arc;

/// Collection of all database repositories.
#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn UserRepo>,
}
