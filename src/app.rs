//! Application context for the field-operations client
//!
//! This module builds the request cache once, injects it into every service,
//! and dispatches parsed commands to them.

use std::sync::Arc;

use futures::future::try_join_all;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::cache::RequestCache;
use crate::cli::{
    BoCommand, CliError, Command, ConcentrateursCommand, LaboCommand, MagasinCommand,
    PostesCommand, Settings, TransfertsCommand,
};
use crate::render::Report;
use crate::services::bo::MovementDetails;
use crate::services::concentrateurs::ConcentrateurFilter;
use crate::services::magasin::Reception;
use crate::services::postes::PosteFilter;
use crate::services::{
    ActionsService, AuthService, BoService, ConcentrateursService, DashboardService, LaboService,
    MagasinService, PostesService, TransfertsService,
};
use crate::session::CredentialStore;

/// Errors surfaced to the user by a command
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Cli(#[from] CliError),

    #[error("Failed to render result: {0}")]
    Render(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `shell` was typed inside the shell
    #[error("Already in an interactive shell")]
    NestedShell,
}

/// Main application struct owning the shared cache and the services
pub struct App {
    cache: Arc<RequestCache>,
    pub auth: AuthService,
    pub bo: BoService,
    pub concentrateurs: ConcentrateursService,
    pub postes: PostesService,
    pub magasin: MagasinService,
    pub transferts: TransfertsService,
    pub labo: LaboService,
    pub dashboard: DashboardService,
    pub actions: ActionsService,
}

impl App {
    /// Creates an App from startup settings
    pub fn new(settings: &Settings) -> Self {
        let credentials = match &settings.session_dir {
            Some(dir) => Some(CredentialStore::with_dir(dir.clone())),
            None => CredentialStore::new(),
        };
        let api = ApiClient::new(settings.api_url.clone(), credentials);
        let cache = Arc::new(RequestCache::new(settings.cache.clone()));
        Self::with_parts(api, cache)
    }

    /// Creates an App around an existing client and cache
    pub fn with_parts(api: ApiClient, cache: Arc<RequestCache>) -> Self {
        Self {
            auth: AuthService::new(api.clone(), cache.clone()),
            bo: BoService::new(api.clone(), cache.clone()),
            concentrateurs: ConcentrateursService::new(api.clone(), cache.clone()),
            postes: PostesService::new(api.clone()),
            magasin: MagasinService::new(api.clone(), cache.clone()),
            transferts: TransfertsService::new(api.clone(), cache.clone()),
            labo: LaboService::new(api.clone(), cache.clone()),
            dashboard: DashboardService::new(api.clone(), cache.clone()),
            actions: ActionsService::new(api, cache.clone()),
            cache,
        }
    }

    /// The cache shared by every service
    pub fn cache(&self) -> &Arc<RequestCache> {
        &self.cache
    }

    /// Runs one command
    pub async fn execute(&self, command: &Command) -> Result<Report, AppError> {
        match command {
            Command::Login { email, password } => {
                let response = self.auth.login(email, password).await?;
                Ok(Report::message(format!(
                    "Logged in as {} ({})",
                    response.user.email, response.user.role
                )))
            }
            Command::Logout => {
                self.auth.logout()?;
                Ok(Report::message("Logged out"))
            }
            Command::Me => Ok(Report::data(&self.auth.me().await?)?),
            Command::Bo(command) => self.execute_bo(command).await,
            Command::Concentrateurs(command) => self.execute_concentrateurs(command).await,
            Command::Postes(command) => self.execute_postes(command).await,
            Command::Magasin(command) => self.execute_magasin(command).await,
            Command::Transferts(command) => self.execute_transferts(command).await,
            Command::Labo(LaboCommand::Test {
                numero_serie,
                resultat,
                commentaire,
            }) => {
                let result = self
                    .labo
                    .test(numero_serie, *resultat, commentaire.as_deref())
                    .await?;
                Ok(Report::data(&result)?)
            }
            Command::Dashboard => Ok(Report::data(&self.dashboard.stats().await?)?),
            Command::Actions {
                page,
                page_size,
                search,
            } => {
                let mut history = self.actions.mine(*page, *page_size).await?;
                if let Some(search) = search {
                    history = history.filter(search);
                }
                Ok(Report::data(&history)?)
            }
            Command::Shell => Err(AppError::NestedShell),
        }
    }

    async fn execute_bo(&self, command: &BoCommand) -> Result<Report, AppError> {
        let report = match command {
            BoCommand::Liste => Report::data(&self.bo.liste().await?)?,
            BoCommand::Stats { bo_name } => Report::data(&self.bo.stats(bo_name).await?)?,
            BoCommand::Overview => {
                let names = self.bo.liste().await?;
                let stats = try_join_all(names.iter().map(|name| self.bo.stats(name))).await?;
                Report::data(&stats)?
            }
            BoCommand::Info => Report::data(&self.bo.info().await?)?,
            BoCommand::Demandes => Report::data(&self.bo.demandes().await?)?,
            BoCommand::Concentrateurs { etat } => {
                Report::data(&self.bo.concentrateurs(etat.as_deref()).await?)?
            }
            BoCommand::Pose(args) => {
                let details = MovementDetails {
                    commentaire: args.commentaire.clone(),
                    photo: args.photo.clone(),
                };
                Report::action(&self.bo.pose(&args.numero_serie, &details).await?)?
            }
            BoCommand::Depose(args) => {
                let details = MovementDetails {
                    commentaire: args.commentaire.clone(),
                    photo: args.photo.clone(),
                };
                Report::action(&self.bo.depose(&args.numero_serie, &details).await?)?
            }
            BoCommand::Reception { numero_serie } => {
                Report::action(&self.bo.reception(numero_serie).await?)?
            }
            BoCommand::Demande {
                quantite,
                operateur,
            } => Report::data(&self.bo.creer_demande(*quantite, operateur.as_deref()).await?)?,
        };
        Ok(report)
    }

    async fn execute_concentrateurs(
        &self,
        command: &ConcentrateursCommand,
    ) -> Result<Report, AppError> {
        let report = match command {
            ConcentrateursCommand::List {
                affectation,
                search,
                operateur,
                etat,
                skip,
                limit,
            } => {
                let filter = ConcentrateurFilter {
                    affectation: affectation.clone(),
                    search: search.clone(),
                    operateur: operateur.clone(),
                    etat: etat.clone(),
                    skip: *skip,
                    limit: *limit,
                };
                Report::data(&self.concentrateurs.list(&filter).await?)?
            }
            ConcentrateursCommand::Show { numero_serie } => {
                Report::data(&self.concentrateurs.get(numero_serie).await?)?
            }
            ConcentrateursCommand::Verify { numero_serie } => {
                Report::data(&self.concentrateurs.verify(numero_serie).await?)?
            }
        };
        Ok(report)
    }

    async fn execute_postes(&self, command: &PostesCommand) -> Result<Report, AppError> {
        let report = match command {
            PostesCommand::List {
                bo_affectee,
                with_coords,
            } => {
                let filter = PosteFilter {
                    bo_affectee: bo_affectee.clone(),
                    with_coords_only: *with_coords,
                };
                Report::data(&self.postes.list(&filter).await?)?
            }
            PostesCommand::Show { id_poste } => Report::data(&self.postes.get(*id_poste).await?)?,
            PostesCommand::Concentrateurs { id_poste } => {
                Report::data(&self.postes.concentrateurs(*id_poste).await?)?
            }
        };
        Ok(report)
    }

    async fn execute_magasin(&self, command: &MagasinCommand) -> Result<Report, AppError> {
        let report = match command {
            MagasinCommand::Stats => Report::data(&self.magasin.stats().await?)?,
            MagasinCommand::Operateurs => Report::data(&self.magasin.operateurs().await?)?,
            MagasinCommand::Reception {
                carton,
                operateur,
                modele,
                numeros_serie,
            } => {
                let reception =
                    Reception::new(carton.as_str(), operateur.as_str(), numeros_serie, modele.as_deref());
                Report::data(&self.magasin.reception(&reception).await?)?
            }
        };
        Ok(report)
    }

    async fn execute_transferts(&self, command: &TransfertsCommand) -> Result<Report, AppError> {
        let report = match command {
            TransfertsCommand::Commandes { statut } => {
                Report::data(&self.transferts.commandes(statut.as_deref()).await?)?
            }
            TransfertsCommand::Cartons => {
                Report::data(&self.transferts.cartons_disponibles().await?)?
            }
            TransfertsCommand::Valider {
                id_commande,
                numero_carton,
            } => Report::data(&self.transferts.valider(*id_commande, numero_carton).await?)?,
        };
        Ok(report)
    }
}
