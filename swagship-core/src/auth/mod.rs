// File: swagship-core/src/auth/mod.rs
//
// Thin client for the OIDC provider. The admin gate only ever consumes
// `introspect`; the authorize-URL builder and code exchange exist so the
// sign-in redirect and callback can be served without a session layer.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use swagship_common::error::Error;

/// Provider connection settings, passed in explicitly at construction.
#[derive(Debug, Clone)]
pub struct OidcConfig {
    pub org_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_server_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

pub struct IdentityClient {
    http: reqwest::Client,
    config: OidcConfig,
}

impl IdentityClient {
    pub fn new(config: OidcConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Custom authorization servers mount under `/oauth2/<id>`; the org
    /// default server under `/oauth2`.
    fn auth_server_segment(&self) -> String {
        match &self.config.auth_server_id {
            Some(id) => format!("/{id}"),
            None => String::new(),
        }
    }

    /// Authorization-code URL the admin sign-in redirects to.
    pub fn authorize_url(&self, state: &str, nonce: &str) -> Result<String, Error> {
        let mut url = Url::parse(&format!(
            "{}/oauth2{}/v1/authorize",
            self.config.org_url,
            self.auth_server_segment()
        ))
        .map_err(|e| Error::Config(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("state", state)
            .append_pair("nonce", nonce)
            .append_pair("response_mode", "form_post")
            .append_pair("scope", "openid");
        Ok(url.into())
    }

    /// Swaps an authorization code for tokens at the token endpoint.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Error> {
        let url = format!(
            "{}/oauth2{}/v1/token",
            self.config.org_url,
            self.auth_server_segment()
        );
        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Upstream(format!(
                "token exchange returned {}",
                resp.status()
            )));
        }
        Ok(resp.json::<TokenResponse>().await?)
    }

    /// Token introspection. The boolean `active` flag is all the caller
    /// gets; claims never cross into the core.
    pub async fn introspect(&self, token: &str) -> Result<bool, Error> {
        let url = format!(
            "{}/oauth2{}/v1/introspect",
            self.config.org_url,
            self.auth_server_segment()
        );
        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("token", token)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Upstream(format!(
                "introspection returned {}",
                resp.status()
            )));
        }
        let body: serde_json::Value = resp.json().await?;
        let active = body
            .get("active")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        debug!(active, "token introspected");
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(auth_server_id: Option<&str>) -> OidcConfig {
        OidcConfig {
            org_url: "https://example.okta.com".to_string(),
            client_id: "client123".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://promo.example.com/authorization-code/callback".to_string(),
            auth_server_id: auth_server_id.map(String::from),
        }
    }

    #[test]
    fn authorize_url_uses_org_server_by_default() {
        let client = IdentityClient::new(test_config(None));
        let url = client.authorize_url("st4te", "n0nce").unwrap();
        assert!(url.starts_with("https://example.okta.com/oauth2/v1/authorize?"));
        assert!(url.contains("client_id=client123"));
        assert!(url.contains("nonce=n0nce"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn authorize_url_mounts_custom_auth_server() {
        let client = IdentityClient::new(test_config(Some("aus1234")));
        let url = client.authorize_url("s", "n").unwrap();
        assert!(url.starts_with("https://example.okta.com/oauth2/aus1234/v1/authorize?"));
    }
}
