//! Sweeper Domain Layer
//!
//! This crate holds the vocabulary shared by every other Sweeper crate.
//! It has no external dependencies and defines the value objects and trait
//! interfaces that the run loop and the storage backends agree on.
//!
//! ## Key Concepts
//!
//! - **Delete statement**: A parameterized delete plus its positional arguments
//! - **SQL value**: A single positional argument bound into a statement
//! - **Database**: The handle a sweeper executes statements against
//! - **Exec result**: The outcome of one execution, queried for its row count
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Deletion policy lives with the caller, expressed as a statement factory
//! - Infrastructure implementations (SQLite, test doubles) live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod statement;
pub mod traits;

// Re-exports for convenience
pub use statement::{DeleteStatement, SqlValue};
pub use traits::{Database, ExecResult};
