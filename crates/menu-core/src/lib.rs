//! # Menu Core
//! 
//! Domain entities, store ports, and the tree services (build, move/reorder,
//! recursive delete) for the menu tree application.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{ErrorKind, MenuError};
pub use repositories::{InMemoryMenuStore, MenuStore, MenuTransaction};
pub use services::{build_tree, DeleteOutcome, MenuService, MoveOutcome};
