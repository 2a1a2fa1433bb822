//! Store traits (ports) and the in-memory reference adapter

pub mod menu_store;
pub mod memory_store;

pub use menu_store::{MenuStore, MenuTransaction};
pub use memory_store::InMemoryMenuStore;

#[cfg(test)]
pub use menu_store::MockMenuStore;
