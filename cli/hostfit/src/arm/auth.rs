//! Service principal sign-in (OAuth2 client credentials).

use serde::Deserialize;
use tracing::debug;

use crate::config::{Credentials, Endpoints};
use crate::error::CliError;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange service principal credentials for an ARM access token.
pub async fn acquire_token(
    endpoints: &Endpoints,
    credentials: &Credentials,
) -> Result<String, CliError> {
    let url = format!(
        "{}/{}/oauth2/token",
        endpoints.auth.trim_end_matches('/'),
        credentials.tenant_id
    );

    let response = reqwest::Client::new()
        .post(&url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", credentials.app_id.as_str()),
            ("client_secret", credentials.app_secret.as_str()),
            ("resource", endpoints.resource.as_str()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = match response.json::<TokenErrorResponse>().await {
            Ok(body) => body.error_description.unwrap_or(body.error),
            Err(_) => format!("HTTP {status}"),
        };
        return Err(CliError::Auth(message));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| CliError::Auth(format!("malformed token response: {e}")))?;

    debug!(tenant_id = %credentials.tenant_id, "Acquired access token");
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            tenant_id: "tenant-1".to_string(),
            app_id: "app-1".to_string(),
            app_secret: "secret".to_string(),
            subscription_id: "sub-1".to_string(),
        }
    }

    fn endpoints(server: &MockServer) -> Endpoints {
        Endpoints {
            auth: format!("{}/", server.uri()),
            ..Endpoints::default()
        }
    }

    #[tokio::test]
    async fn test_client_credentials_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=app-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "expires_in": "3599",
                "access_token": "eyJ0"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = acquire_token(&endpoints(&server), &credentials()).await.unwrap();
        assert_eq!(token, "eyJ0");
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&server)
            .await;

        let err = acquire_token(&endpoints(&server), &credentials()).await.unwrap_err();
        assert!(matches!(err, CliError::Auth(ref m) if m.contains("Invalid client secret")));
    }
}
