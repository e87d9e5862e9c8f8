use crate::identity::LocalIdentityProvider;
use crate::session::SessionController;
use crate::store::JsonFileStore;
use crate::toasts::Toasts;
use std::sync::Arc;

pub type Controller = SessionController<LocalIdentityProvider, JsonFileStore>;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
}

impl AppState {
    pub fn new(provider: LocalIdentityProvider, store: JsonFileStore) -> Self {
        Self {
            controller: Arc::new(SessionController::new(
                Arc::new(provider),
                Arc::new(store),
                Arc::new(Toasts::new()),
            )),
        }
    }
}
