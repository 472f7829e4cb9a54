// src/services/profile_api.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::common::safe_email_log;

pub const GET_USER_QUERY: &str = r#"
query getUser($email: String!){
  user(by:{email:$email}){
    id
    name
    email
    avatarUrl
    description
    gitHubUrl
    linkedInUrl
  }
}
"#;

pub const CREATE_USER_MUTATION: &str = r#"
mutation CreateUser($input: CreateUserInput!){
  userCreate(input: $input){
    user{
      name
      email
      avatarUrl
      description
      gitHubUrl
      linkedInUrl
      id
    }
  }
}
"#;

/// Failure of a call to the remote profile service.
///
/// Callers treat every variant the same way; the split only exists so the
/// log line says what went wrong.
#[derive(Debug, Error)]
pub enum ProfileApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("profile service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("profile service returned errors: {0}")]
    Graphql(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// User record owned by the remote profile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub description: Option<String>,
    pub git_hub_url: Option<String>,
    pub linked_in_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub avatar_url: &'a str,
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GetUserData {
    user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserData {
    user_create: UserCreatePayload,
}

#[derive(Debug, Deserialize)]
struct UserCreatePayload {
    user: UserProfile,
}

/// Lookup and creation of profiles, keyed by email.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns `Ok(None)` when no profile exists for `email`.
    async fn fetch_profile(&self, email: &str) -> Result<Option<UserProfile>, ProfileApiError>;

    async fn create_profile(
        &self,
        name: &str,
        email: &str,
        avatar_url: &str,
    ) -> Result<UserProfile, ProfileApiError>;
}

/// [`ProfileStore`] backed by the GraphQL profile service.
///
/// Every call is a single POST; there is no retry and no caching.
#[derive(Debug, Clone)]
pub struct GraphqlProfileClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GraphqlProfileClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    async fn execute<V, T>(&self, query: &str, variables: V) -> Result<T, ProfileApiError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| ProfileApiError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Profile service request failed");
            return Err(ProfileApiError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body = response
            .json::<GraphqlResponse<T>>()
            .await
            .map_err(|e| ProfileApiError::InvalidResponse(e.to_string()))?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(ProfileApiError::Graphql(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| ProfileApiError::InvalidResponse("response missing data".to_string()))
    }
}

#[async_trait]
impl ProfileStore for GraphqlProfileClient {
    async fn fetch_profile(&self, email: &str) -> Result<Option<UserProfile>, ProfileApiError> {
        debug!(email = %safe_email_log(email), "Fetching profile");
        let data: GetUserData = self
            .execute(GET_USER_QUERY, json!({ "email": email }))
            .await?;
        Ok(data.user)
    }

    async fn create_profile(
        &self,
        name: &str,
        email: &str,
        avatar_url: &str,
    ) -> Result<UserProfile, ProfileApiError> {
        debug!(email = %safe_email_log(email), "Creating profile");
        let input = CreateUserInput {
            name,
            email,
            avatar_url,
        };
        let data: CreateUserData = self
            .execute(CREATE_USER_MUTATION, json!({ "input": input }))
            .await?;
        Ok(data.user_create.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ada_json() -> serde_json::Value {
        json!({
            "id": "user_01",
            "name": "Ada",
            "email": "ada@example.com",
            "avatarUrl": "http://x/a.png",
            "description": null,
            "gitHubUrl": "https://github.com/ada",
            "linkedInUrl": null
        })
    }

    fn client_for(server: &MockServer) -> GraphqlProfileClient {
        GraphqlProfileClient::new(
            format!("{}/graphql", server.uri()),
            "test-key",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_documents_keep_contract_shape() {
        assert!(GET_USER_QUERY.contains("query getUser($email: String!)"));
        assert!(GET_USER_QUERY.contains("user(by:{email:$email})"));
        assert!(CREATE_USER_MUTATION.contains("mutation CreateUser($input: CreateUserInput!)"));
        assert!(CREATE_USER_MUTATION.contains("userCreate(input: $input)"));
    }

    #[test]
    fn test_create_input_serializes_camel_case() {
        let input = CreateUserInput {
            name: "Ada",
            email: "ada@example.com",
            avatar_url: "http://x/a.png",
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value,
            json!({ "name": "Ada", "email": "ada@example.com", "avatarUrl": "http://x/a.png" })
        );
    }

    #[tokio::test]
    async fn test_fetch_profile_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(json!({ "variables": { "email": "ada@example.com" } })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "user": ada_json() } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server)
            .fetch_profile("ada@example.com")
            .await
            .unwrap()
            .expect("profile should be present");

        assert_eq!(profile.id, "user_01");
        assert_eq!(profile.git_hub_url.as_deref(), Some("https://github.com/ada"));
        assert_eq!(profile.description, None);
    }

    #[tokio::test]
    async fn test_fetch_profile_absent_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "user": null } })),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_profile("nobody@example.com").await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_create_profile_sends_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "variables": { "input": { "name": "Ada", "email": "ada@example.com", "avatarUrl": "http://x/a.png" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({ "data": { "userCreate": { "user": ada_json() } } }),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server)
            .create_profile("Ada", "ada@example.com", "http://x/a.png")
            .await
            .unwrap();

        assert_eq!(profile.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_graphql_errors_map_to_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "email already taken" }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_profile("Ada", "ada@example.com", "http://x/a.png")
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileApiError::Graphql(ref m) if m.contains("already taken")));
    }

    #[tokio::test]
    async fn test_http_status_maps_to_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_profile("ada@example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileApiError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_profile("ada@example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileApiError::InvalidResponse(_)));
    }
}
