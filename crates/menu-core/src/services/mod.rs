//! Domain services (business logic)

pub mod menu_service;
pub mod move_engine;
pub mod tree_builder;
mod subtree;

pub use menu_service::{DeleteOutcome, MenuService};
pub use move_engine::{insertion_index, MoveOutcome};
pub use tree_builder::{build_tree, flatten_depth_first};
