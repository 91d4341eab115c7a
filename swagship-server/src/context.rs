//! swagship-server/src/context.rs
//!
//! The global server context: the chosen store backend plus the services
//! wired over it. Configuration is read once here and handed to each
//! collaborator by value.

use std::sync::Arc;

use tracing::{info, warn};

use swagship_common::error::Error;
use swagship_common::traits::CodeRepository;
use swagship_core::auth::{IdentityClient, OidcConfig};
use swagship_core::db::{PostgresDatabase, SqliteDatabase};
use swagship_core::mailer::{HttpMailer, Mailer, MailerConfig, NullMailer};
use swagship_core::repositories::{PostgresCodeRepository, SqliteCodeRepository};
use swagship_core::services::{ExportService, IngestService, RedemptionService};

use crate::Args;

pub struct ServerContext {
    pub repo: Arc<dyn CodeRepository>,
    pub redemption: Arc<RedemptionService>,
    pub ingest: Arc<IngestService>,
    pub export: Arc<ExportService>,
    pub identity: Arc<IdentityClient>,
}

impl ServerContext {
    pub async fn build(args: &Args) -> Result<Self, Error> {
        let repo = open_store(&args.database_url).await?;

        let identity = Arc::new(IdentityClient::new(oidc_from_env()?));

        let (mailer, tracking_template): (Arc<dyn Mailer>, String) = match mailer_from_env() {
            Some(cfg) => {
                let template = cfg.tracking_template.clone();
                (Arc::new(HttpMailer::new(cfg)), template)
            }
            None => {
                warn!("mail provider not configured; tracking notifications are discarded");
                (Arc::new(NullMailer), "tracking-update".to_string())
            }
        };

        let redemption = Arc::new(RedemptionService::new(
            repo.clone(),
            mailer,
            tracking_template,
        ));
        let ingest = Arc::new(IngestService::new(repo.clone(), redemption.clone()));
        let export = Arc::new(ExportService::new(repo.clone()));

        Ok(Self {
            repo,
            redemption,
            ingest,
            export,
            identity,
        })
    }
}

/// The URL scheme picks the backing engine; both land behind the same
/// repository trait.
async fn open_store(database_url: &str) -> Result<Arc<dyn CodeRepository>, Error> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        let db = PostgresDatabase::new(database_url).await?;
        db.migrate().await?;
        info!("using Postgres store");
        Ok(Arc::new(PostgresCodeRepository::new(db.pool().clone())))
    } else {
        let db = SqliteDatabase::new(database_url).await?;
        db.migrate().await?;
        info!("using SQLite store");
        Ok(Arc::new(SqliteCodeRepository::new(db.pool().clone())))
    }
}

fn require_env(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::Config(format!("{name} is not set")))
}

fn oidc_from_env() -> Result<OidcConfig, Error> {
    Ok(OidcConfig {
        org_url: require_env("OKTA_ORG_URL")?,
        client_id: require_env("OKTA_APP_CLIENT_ID")?,
        client_secret: require_env("OKTA_APP_CLIENT_SECRET")?,
        redirect_uri: require_env("OKTA_OIDC_REDIRECT_URL")?,
        auth_server_id: std::env::var("OKTA_AUTHSERVER_ID").ok(),
    })
}

fn mailer_from_env() -> Option<MailerConfig> {
    let api_base = std::env::var("MAIL_API_BASE").ok()?;
    let api_key = std::env::var("MAIL_API_KEY").ok()?;
    let tracking_template = std::env::var("MAIL_TRACKING_TEMPLATE")
        .unwrap_or_else(|_| "tracking-update".to_string());
    Some(MailerConfig {
        api_base,
        api_key,
        tracking_template,
    })
}
