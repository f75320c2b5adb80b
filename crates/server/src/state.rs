use std::sync::Arc;

use db::DBService;
use secrecy::SecretString;
use services::services::{
    access::AccessService, auth::AuthProvider, config::Config, login::LoginOrchestrator,
    streak::CivilCalendar,
};

/// Everything a handler needs, built once in `main` and cloned per request.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    auth: Arc<dyn AuthProvider>,
    access: AccessService,
    login: LoginOrchestrator,
    calendar: CivilCalendar,
    service_role_key: Arc<SecretString>,
}

impl AppState {
    pub fn new(db: DBService, auth: Arc<dyn AuthProvider>, config: &Config) -> Self {
        let access = AccessService::new(db.pool.clone(), config.access_cache_ttl);
        let login = LoginOrchestrator::new(
            db.clone(),
            auth.clone(),
            access.clone(),
            config.profile_sync_timeout,
        );

        Self {
            db,
            auth,
            access,
            login,
            calendar: CivilCalendar::new(config.calendar_offset),
            service_role_key: Arc::new(config.supabase_service_role_key.clone()),
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    pub fn access(&self) -> &AccessService {
        &self.access
    }

    pub fn login(&self) -> &LoginOrchestrator {
        &self.login
    }

    pub fn calendar(&self) -> &CivilCalendar {
        &self.calendar
    }

    pub fn service_role_key(&self) -> &SecretString {
        &self.service_role_key
    }
}
