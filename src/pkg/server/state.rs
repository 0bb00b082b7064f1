use std::sync::Arc;

use crate::pkg::internal::gateway::Gateway;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new() -> AppState {
        AppState {
            gateway: Arc::new(Gateway::from_settings()),
        }
    }

    pub fn with_gateway(gateway: Gateway) -> AppState {
        AppState {
            gateway: Arc::new(gateway),
        }
    }
}
