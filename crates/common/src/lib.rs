//! Common utilities and shared types for reviewboard.
//!
//! This crate provides foundational components used across all reviewboard crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Retry**: Exponential backoff policy via [`RetryConfig`]
//! - **Page metadata**: Title/image scraping for arbitrary URLs via [`PageMetaFetcher`]
//!
//! # Example
//!
//! ```no_run
//! use reviewboard_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {} (port {})", id, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod page_meta;
pub mod retry;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use page_meta::{PageMeta, PageMetaConfig, PageMetaFetcher, sanitize_image_url, sanitize_title};
pub use retry::RetryConfig;
