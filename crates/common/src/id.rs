//! Identifier generation for users, contents, reviews and sessions.

use std::sync::{LazyLock, Mutex};

use ulid::{Generator, Ulid};
use uuid::Uuid;

/// Process-wide monotonic source, so ids made within one millisecond
/// still sort in creation order.
static MONOTONIC: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::new()));

/// Generates identifiers for stored records and login sessions.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a record id.
    ///
    /// Ids are lowercase ULIDs, so newer records sort after older ones
    /// when compared as strings. Listings that order by id descending
    /// therefore show the newest review first.
    #[must_use]
    pub fn generate(&self) -> String {
        MONOTONIC
            .lock()
            .ok()
            .and_then(|mut generator| generator.generate().ok())
            .unwrap_or_else(Ulid::new)
            .to_string()
            .to_lowercase()
    }

    /// Generate an opaque session id for the session cookie.
    #[must_use]
    pub fn generate_session_id(&self) -> String {
        // No time component, unlike record ids
        Uuid::new_v4().simple().to_string()
    }
}
