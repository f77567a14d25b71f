use campus_application::{AuthService, EntityService, TestRunService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub entity_service: EntityService,
    pub auth_service: AuthService,
    pub test_run_service: TestRunService,
}
