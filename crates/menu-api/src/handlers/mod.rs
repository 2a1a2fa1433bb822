pub mod health;
pub mod menus;
