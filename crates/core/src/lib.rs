//! Core business logic for reviewboard.
//!
//! Services here depend on storage, session and hashing capabilities
//! expressed as traits in [`services::store`], [`services::session`] and
//! [`services::password`]; the sea-orm repositories and in-process session
//! store are the production implementations.

pub mod services;

pub use services::*;
