use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use crate::config::RecipesConfig;
use crate::contract::client::RecipesApi;
use crate::domain::ports::{IdentityProvider, RemoteStore};
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::RecipesLocalClient;
use crate::infra::memory::{MemoryIdentity, MemoryStore};
use crate::infra::seed;
use crate::state::{
    DashboardScreen, DetailScreen, FavoritesScreen, LoginScreen, ProfileScreen, RandomScreen,
    RegisterScreen,
};

/// The recipes module wired to a concrete store and identity provider.
///
/// Holds the domain service, the in-process `RecipesApi` client and builds
/// screens that share them.
#[derive(Clone)]
pub struct Recipes {
    service: Arc<Service>,
    api: Arc<dyn RecipesApi>,
}

/// Handles to the in-memory backends, for fault injection and inspection.
#[derive(Clone)]
pub struct MemoryBackends {
    pub store: MemoryStore,
    pub identity: Arc<MemoryIdentity>,
}

impl Recipes {
    pub fn new(
        cfg: &RecipesConfig,
        store: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> anyhow::Result<Self> {
        debug!(
            recipes = %cfg.recipes_path,
            favorites = %cfg.favorites_path,
            users = %cfg.users_path,
            "Loaded recipes config"
        );
        let service_config =
            ServiceConfig::from_module_config(cfg).context("invalid recipes store layout")?;
        let service = Arc::new(Service::new(store, identity, service_config));
        let api: Arc<dyn RecipesApi> = Arc::new(RecipesLocalClient::new(service.clone()));
        info!("Recipes module initialized");
        Ok(Self { service, api })
    }

    /// Wire the module to fresh in-memory backends, loading `cfg.seed_file` when set.
    /// A relative seed path is resolved against `base_dir`.
    pub async fn in_memory(
        cfg: &RecipesConfig,
        base_dir: Option<&Path>,
    ) -> anyhow::Result<(Self, MemoryBackends)> {
        let store = MemoryStore::new();
        if let Some(seed_file) = &cfg.seed_file {
            let path = match base_dir {
                Some(dir) if Path::new(seed_file).is_relative() => dir.join(seed_file),
                _ => Path::new(seed_file).to_path_buf(),
            };
            seed::load_seed_file(&store, &path).await?;
        }
        let identity = Arc::new(MemoryIdentity::new());
        let module = Self::new(cfg, Arc::new(store.clone()), identity.clone())?;
        Ok((module, MemoryBackends { store, identity }))
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn client(&self) -> Arc<dyn RecipesApi> {
        self.api.clone()
    }

    pub fn dashboard(&self) -> DashboardScreen {
        DashboardScreen::new(self.service.clone())
    }

    pub fn detail(&self) -> DetailScreen {
        DetailScreen::new(self.service.clone())
    }

    pub fn random(&self) -> RandomScreen {
        RandomScreen::new(self.service.clone())
    }

    pub fn favorites(&self) -> FavoritesScreen {
        FavoritesScreen::new(self.service.clone())
    }

    pub fn login(&self) -> LoginScreen {
        LoginScreen::new(self.service.clone())
    }

    pub fn register(&self) -> RegisterScreen {
        RegisterScreen::new(self.service.clone())
    }

    pub fn profile(&self) -> ProfileScreen {
        ProfileScreen::new(self.service.clone())
    }
}
