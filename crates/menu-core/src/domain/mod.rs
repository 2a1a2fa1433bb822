//! # Menu Core - Domain Module
//! 
//! Domain entities for the menu tree application.

pub mod menu_item;
pub mod menu_node;

// Re-export all entities
pub use menu_item::{FieldPatch, MenuId, MenuItem, MenuItemPatch, NewMenuItem};
pub use menu_node::MenuNode;
