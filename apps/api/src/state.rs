use rolegate_application::RoleLookupService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_lookup_service: RoleLookupService,
}
