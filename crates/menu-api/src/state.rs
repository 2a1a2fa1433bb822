use std::sync::Arc;

use menu_core::{MenuService, MenuStore};
use menu_shared::config::AppConfig;

pub type SharedMenuService = Arc<MenuService<dyn MenuStore>>;

#[derive(Clone)]
pub struct AppState {
    pub menus: SharedMenuService,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn MenuStore>, config: AppConfig) -> Self {
        let service = MenuService::new(store, config.menu.operation_timeout());
        Self {
            menus: Arc::new(service),
            config,
        }
    }
}
