// File: swagship-core/src/mailer.rs
//
// Outbound transactional mail sits behind a trait so services can fire
// notifications without knowing the provider, and tests can observe the
// side effect without network access.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use swagship_common::error::Error;

#[mockall::automock]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        template_id: &str,
        recipients: &[String],
        substitutions: &HashMap<String, String>,
    ) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub api_base: String,
    pub api_key: String,
    pub tracking_template: String,
}

pub struct HttpMailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl HttpMailer {
    pub fn new(config: MailerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(
        &self,
        template_id: &str,
        recipients: &[String],
        substitutions: &HashMap<String, String>,
    ) -> Result<(), Error> {
        let body = serde_json::json!({
            "templateId": template_id,
            "recipients": recipients,
            "substitutions": substitutions,
        });
        let resp = self
            .client
            .post(format!("{}/v1/send", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Upstream(format!(
                "mail provider returned {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

/// Stands in when no mail provider is configured; sends go nowhere.
pub struct NullMailer;

#[async_trait]
impl Mailer for NullMailer {
    async fn send(
        &self,
        template_id: &str,
        recipients: &[String],
        _substitutions: &HashMap<String, String>,
    ) -> Result<(), Error> {
        debug!(template_id, count = recipients.len(), "mail discarded; no provider configured");
        Ok(())
    }
}
