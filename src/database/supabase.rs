use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use url::Url;

use super::gateway::{AuthProvider, AuthSession, Gateway, GatewayError, Identity};
use super::query_builder::Query;

/// Supabase project client: PostgREST for tables, GoTrue for identities
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base: Url,
    key: String,
}

impl SupabaseClient {
    pub fn new(url: &str, key: &str) -> Result<Self, GatewayError> {
        let mut base = Url::parse(url)
            .map_err(|e| GatewayError::Transport(format!("invalid Supabase URL {}: {}", url, e)))?;
        // join() replaces the last segment unless the path ends with a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder().build()?;

        Ok(Self {
            http,
            base,
            key: key.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|e| GatewayError::Transport(format!("invalid endpoint {}: {}", path, e)))
    }

    /// Request authorised with the project key
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.key))
    }

    fn table(&self, method: Method, table: &str, query: &Query) -> Result<RequestBuilder, GatewayError> {
        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        Ok(self.request(method, url).query(&query.to_params()))
    }

    async fn send_rows(&self, request: RequestBuilder) -> Result<Vec<Value>, GatewayError> {
        let response = request.send().await?;
        let body = success_body(response).await?;
        rows_from_body(&body)
    }
}

#[async_trait]
impl Gateway for SupabaseClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError> {
        tracing::debug!("select {} {:?}", table, query.to_params());
        let request = self.table(Method::GET, table, query)?;
        self.send_rows(request).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        let request = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&rows);
        self.send_rows(request).await
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>, GatewayError> {
        if query.is_unfiltered() {
            return Err(GatewayError::Unfiltered("update"));
        }
        let request = self
            .table(Method::PATCH, table, query)?
            .header("Prefer", "return=representation")
            .json(&patch);
        self.send_rows(request).await
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError> {
        if query.is_unfiltered() {
            return Err(GatewayError::Unfiltered("delete"));
        }
        let request = self
            .table(Method::DELETE, table, query)?
            .header("Prefer", "return=representation");
        self.send_rows(request).await
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .request(Method::POST, url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body = success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Identity, GatewayError> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self
            .request(Method::POST, url)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await?;
        let body = success_body(response).await?;
        let value: Value = serde_json::from_str(&body)?;

        // Projects with auto-confirm answer with a session wrapping the user
        let user = match value.get("user") {
            Some(user) if user.is_object() => user.clone(),
            _ => value,
        };
        Ok(serde_json::from_value(user)?)
    }

    async fn get_user(&self, token: &str) -> Result<Option<Identity>, GatewayError> {
        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .http
            .get(url)
            .header("apikey", &self.key)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            return Ok(None);
        }

        let body = success_body(response).await?;
        let value: Value = serde_json::from_str(&body)?;
        if value.get("id").map_or(true, Value::is_null) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

/// Body text of a successful response, or the service's error message
async fn success_body(response: Response) -> Result<String, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(GatewayError::Rejected {
        status: status.as_u16(),
        message,
    })
}

// PostgREST uses `message`; GoTrue uses `msg`, `error_description` or `error`.
// Bodies that are not JSON (proxies, gateways) surface as plain text.
fn error_message(body: &str) -> Option<String> {
    let structured = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    });
    structured.or_else(|| Some(body.trim().to_string()).filter(|s| !s.is_empty()))
}

fn rows_from_body(body: &str) -> Result<Vec<Value>, GatewayError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(body)? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        row @ Value::Object(_) => Ok(vec![row]),
        other => Err(GatewayError::Decode(format!("expected rows, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::query_builder::Direction;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> SupabaseClient {
        SupabaseClient::new(&server.url(), "anon-key").unwrap()
    }

    #[tokio::test]
    async fn select_sends_filters_and_project_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/routines")
            .match_header("apikey", "anon-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("user_id".into(), "eq.u-1".into()),
                Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"id": 1, "name": "Fuerza"}]"#)
            .create_async()
            .await;

        let rows = client(&server)
            .select(
                "routines",
                &Query::new().eq("user_id", "u-1").order("created_at", Direction::Desc),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Fuerza");
    }

    #[tokio::test]
    async fn postgrest_errors_surface_their_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/exercises")
            .with_status(409)
            .with_body(r#"{"code":"23505","message":"duplicate key value","details":null,"hint":null}"#)
            .create_async()
            .await;

        let err = client(&server)
            .insert("exercises", vec![json!({"name": "Sentadilla"})])
            .await
            .unwrap_err();

        match err {
            GatewayError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate key value");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_without_filter_is_refused_locally() {
        let server = mockito::Server::new_async().await;
        let err = client(&server).delete("routines", &Query::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unfiltered("delete")));
    }

    #[tokio::test]
    async fn get_user_maps_unauthorized_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .with_body(r#"{"msg":"invalid JWT"}"#)
            .create_async()
            .await;

        assert_eq!(client(&server).get_user("stale").await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_user_returns_identity() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/auth/v1/user")
            .with_status(200)
            .with_body(r#"{"id":"6f1c1f2e-8c36-4b7a-9a55-0a0b8f7c2d11","email":"ana@example.com","role":"authenticated"}"#)
            .create_async()
            .await;

        let identity = client(&server).get_user("good").await.unwrap().unwrap();
        assert_eq!(identity.email.as_deref(), Some("ana@example.com"));
        assert_eq!(identity.extra["role"], "authenticated");
    }

    #[tokio::test]
    async fn sign_up_unwraps_auto_confirmed_sessions() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/signup")
            .with_status(200)
            .with_body(r#"{"access_token":"t","user":{"id":"6f1c1f2e-8c36-4b7a-9a55-0a0b8f7c2d11","email":"ana@example.com"}}"#)
            .create_async()
            .await;

        let user = client(&server).sign_up("ana@example.com", "secret", Some("Ana")).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn error_message_prefers_structured_fields() {
        assert_eq!(error_message(r#"{"error_description":"Invalid login credentials"}"#).as_deref(), Some("Invalid login credentials"));
        assert_eq!(error_message("plain failure").as_deref(), Some("plain failure"));
        assert_eq!(error_message("  ").as_deref(), None);
        assert_eq!(rows_from_body("").unwrap().len(), 0);
    }
}
