//! Sign-in, registration and profile screens.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::contract::model::{NewAccount, Principal, ProfilePatch, UserProfile};
use crate::domain::service::Service;
use crate::state::cell::{Observable, Producer};
use crate::state::scope::Scope;

struct LoginCells {
    user: Producer<Option<Principal>>,
    is_loading: Producer<bool>,
    error: Producer<Option<String>>,
}

pub struct LoginScreen {
    service: Arc<Service>,
    cells: Arc<LoginCells>,
    scope: Scope,
}

impl LoginScreen {
    pub fn new(service: Arc<Service>) -> Self {
        let current = service.current_user();
        Self {
            service,
            cells: Arc::new(LoginCells {
                user: Producer::new(current),
                is_loading: Producer::new(false),
                error: Producer::new(None),
            }),
            scope: Scope::new(),
        }
    }

    pub fn user(&self) -> Observable<Option<Principal>> {
        self.cells.user.observe()
    }

    pub fn is_loading(&self) -> Observable<bool> {
        self.cells.is_loading.observe()
    }

    pub fn error(&self) -> Observable<Option<String>> {
        self.cells.error.observe()
    }

    pub fn login(&self, email: &str, password: &str) -> JoinHandle<()> {
        self.cells.is_loading.set(true);
        self.cells.error.set(None);
        let service = self.service.clone();
        let cells = self.cells.clone();
        let (email, password) = (email.to_string(), password.to_string());
        self.scope.spawn(async move {
            match service.login(&email, &password).await {
                Ok(principal) => cells.user.set(Some(principal)),
                Err(e) => cells.error.set(Some(e.to_string())),
            }
            cells.is_loading.set(false);
        })
    }

    pub fn logout(&self) -> JoinHandle<()> {
        let service = self.service.clone();
        let cells = self.cells.clone();
        self.scope.spawn(async move {
            service.logout().await;
            cells.user.set(None);
        })
    }
}

struct RegisterCells {
    registered: Producer<bool>,
    is_loading: Producer<bool>,
    error: Producer<Option<String>>,
}

pub struct RegisterScreen {
    service: Arc<Service>,
    cells: Arc<RegisterCells>,
    scope: Scope,
}

impl RegisterScreen {
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            service,
            cells: Arc::new(RegisterCells {
                registered: Producer::new(false),
                is_loading: Producer::new(false),
                error: Producer::new(None),
            }),
            scope: Scope::new(),
        }
    }

    pub fn registered(&self) -> Observable<bool> {
        self.cells.registered.observe()
    }

    pub fn is_loading(&self) -> Observable<bool> {
        self.cells.is_loading.observe()
    }

    pub fn error(&self) -> Observable<Option<String>> {
        self.cells.error.observe()
    }

    /// Creates the account and its profile document; `registered` flips only when both succeed.
    pub fn register(&self, account: NewAccount) -> JoinHandle<()> {
        self.cells.is_loading.set(true);
        self.cells.error.set(None);
        let service = self.service.clone();
        let cells = self.cells.clone();
        self.scope.spawn(async move {
            match service.register(account).await {
                Ok(_) => cells.registered.set(true),
                Err(e) => cells.error.set(Some(e.to_string())),
            }
            cells.is_loading.set(false);
        })
    }
}

struct ProfileCells {
    profile: Producer<Option<UserProfile>>,
    is_loading: Producer<bool>,
    error: Producer<Option<String>>,
    notice: Producer<Option<String>>,
}

pub struct ProfileScreen {
    service: Arc<Service>,
    cells: Arc<ProfileCells>,
    scope: Scope,
}

impl ProfileScreen {
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            service,
            cells: Arc::new(ProfileCells {
                profile: Producer::new(None),
                is_loading: Producer::new(false),
                error: Producer::new(None),
                notice: Producer::new(None),
            }),
            scope: Scope::new(),
        }
    }

    pub fn profile(&self) -> Observable<Option<UserProfile>> {
        self.cells.profile.observe()
    }

    pub fn is_loading(&self) -> Observable<bool> {
        self.cells.is_loading.observe()
    }

    pub fn error(&self) -> Observable<Option<String>> {
        self.cells.error.observe()
    }

    /// Confirmation of the last successful edit.
    pub fn notice(&self) -> Observable<Option<String>> {
        self.cells.notice.observe()
    }

    pub fn load(&self) -> JoinHandle<()> {
        self.begin();
        let service = self.service.clone();
        let cells = self.cells.clone();
        self.scope.spawn(async move {
            match service.load_profile().await {
                Ok(profile) => cells.profile.set(Some(profile)),
                Err(e) => cells.error.set(Some(e.to_string())),
            }
            cells.is_loading.set(false);
        })
    }

    pub fn update_profile(&self, patch: ProfilePatch) -> JoinHandle<()> {
        self.begin();
        let service = self.service.clone();
        let cells = self.cells.clone();
        self.scope.spawn(async move {
            match service.update_profile(patch).await {
                Ok(profile) => {
                    cells.profile.set(Some(profile));
                    cells.notice.set(Some("Profile updated successfully".to_string()));
                }
                Err(e) => cells.error.set(Some(e.to_string())),
            }
            cells.is_loading.set(false);
        })
    }

    pub fn change_password(&self, current: &str, new: &str) -> JoinHandle<()> {
        self.begin();
        let service = self.service.clone();
        let cells = self.cells.clone();
        let (current, new) = (current.to_string(), new.to_string());
        self.scope.spawn(async move {
            match service.change_password(&current, &new).await {
                Ok(()) => cells.notice.set(Some("Password updated successfully".to_string())),
                Err(e) => cells.error.set(Some(e.to_string())),
            }
            cells.is_loading.set(false);
        })
    }

    fn begin(&self) {
        self.cells.is_loading.set(true);
        self.cells.error.set(None);
        self.cells.notice.set(None);
    }
}
