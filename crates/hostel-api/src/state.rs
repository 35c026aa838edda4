use std::sync::Arc;

use hostel_core::services::Services;
use hostel_security::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(services: Services, jwt: Arc<JwtService>) -> Self {
        Self { services, jwt }
    }
}
