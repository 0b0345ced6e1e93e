//! Authentication layer for A2A protocol

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    protocol::error::A2AError,
    service::{A2ARequest, A2AResponse},
};

/// Authentication credentials
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Bearer token authentication
    Bearer(String),

    /// API key authentication via a custom header
    ApiKey { key: String, header: String },

    /// OAuth2 access token (sent as a bearer)
    OAuth2 { access_token: String },

    /// Basic HTTP authentication
    Basic { username: String, password: String },
}

impl AuthCredentials {
    /// Create bearer token credentials
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Create API key credentials
    pub fn api_key(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::ApiKey {
            key: key.into(),
            header: header.into(),
        }
    }

    /// Create OAuth2 credentials
    pub fn oauth2(access_token: impl Into<String>) -> Self {
        Self::OAuth2 {
            access_token: access_token.into(),
        }
    }

    /// Create basic auth credentials
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build credentials from an authentication scheme value.
    ///
    /// A plain string is a bearer token. A structured map selects the scheme
    /// by its `type` field; an unrecognized type falls back to bearer using
    /// the map's `token` field.
    pub fn from_scheme(scheme: &Value) -> Option<Self> {
        match scheme {
            Value::String(token) => Some(Self::bearer(token.clone())),
            Value::Object(map) => {
                let get = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
                match get("type").as_deref() {
                    Some("api_key") => Some(Self::ApiKey {
                        key: get("key")?,
                        header: get("header").unwrap_or_else(|| "X-API-Key".to_string()),
                    }),
                    Some("oauth2") => Some(Self::OAuth2 {
                        access_token: get("access_token")?,
                    }),
                    Some("basic") => Some(Self::Basic {
                        username: get("username")?,
                        password: get("password").unwrap_or_default(),
                    }),
                    _ => get("token").map(Self::Bearer),
                }
            }
            _ => None,
        }
    }

    /// Get the header name and value for this credential
    pub fn to_header(&self) -> (String, String) {
        match self {
            AuthCredentials::Bearer(token) => {
                ("Authorization".to_string(), format!("Bearer {}", token))
            }
            AuthCredentials::ApiKey { key, header } => (header.clone(), key.clone()),
            AuthCredentials::OAuth2 { access_token } => (
                "Authorization".to_string(),
                format!("Bearer {}", access_token),
            ),
            AuthCredentials::Basic { username, password } => {
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                ("Authorization".to_string(), format!("Basic {}", encoded))
            }
        }
    }
}

/// Authentication layer
#[derive(Clone)]
pub struct AuthLayer {
    credentials: AuthCredentials,
}

impl AuthLayer {
    /// Create a new authentication layer
    pub fn new(credentials: AuthCredentials) -> Self {
        Self { credentials }
    }

    /// Create a bearer authentication layer
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(AuthCredentials::bearer(token))
    }

    /// Create an API key authentication layer
    pub fn api_key(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(AuthCredentials::api_key(key, header))
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            credentials: self.credentials.clone(),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    credentials: AuthCredentials,
}

impl<S> Service<A2ARequest> for AuthService<S>
where
    S: Service<A2ARequest, Response = A2AResponse, Error = A2AError> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = A2AResponse;
    type Error = A2AError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: A2ARequest) -> Self::Future {
        // Inject credentials into request context
        req.context.auth = Some(self.credentials.clone());

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bearer_credentials() {
        let creds = AuthCredentials::bearer("test-token");
        let (header, value) = creds.to_header();

        assert_eq!(header, "Authorization");
        assert_eq!(value, "Bearer test-token");
    }

    #[test]
    fn test_api_key_credentials() {
        let creds = AuthCredentials::api_key("secret-key", "X-API-Key");
        let (header, value) = creds.to_header();

        assert_eq!(header, "X-API-Key");
        assert_eq!(value, "secret-key");
    }

    #[test]
    fn test_basic_credentials() {
        let creds = AuthCredentials::basic("user", "pass");
        let (header, value) = creds.to_header();

        assert_eq!(header, "Authorization");
        assert!(value.starts_with("Basic "));
    }

    #[test]
    fn test_oauth2_credentials() {
        let creds = AuthCredentials::oauth2("at-123");
        let (header, value) = creds.to_header();

        assert_eq!(header, "Authorization");
        assert_eq!(value, "Bearer at-123");
    }

    #[test]
    fn test_scheme_plain_string_is_bearer() {
        let creds = AuthCredentials::from_scheme(&json!("tok")).unwrap();
        assert!(matches!(creds, AuthCredentials::Bearer(t) if t == "tok"));
    }

    #[test]
    fn test_scheme_structured_types() {
        let api_key = AuthCredentials::from_scheme(&json!({
            "type": "api_key", "key": "k", "header": "X-Custom-Key"
        }))
        .unwrap();
        assert!(matches!(api_key, AuthCredentials::ApiKey { header, .. } if header == "X-Custom-Key"));

        let oauth = AuthCredentials::from_scheme(&json!({
            "type": "oauth2", "access_token": "at"
        }))
        .unwrap();
        assert!(matches!(oauth, AuthCredentials::OAuth2 { .. }));

        let basic = AuthCredentials::from_scheme(&json!({
            "type": "basic", "username": "u", "password": "p"
        }))
        .unwrap();
        assert!(matches!(basic, AuthCredentials::Basic { .. }));
    }

    #[test]
    fn test_scheme_unknown_type_falls_back_to_bearer() {
        let creds = AuthCredentials::from_scheme(&json!({
            "type": "quantum", "token": "tok"
        }))
        .unwrap();
        assert!(matches!(creds, AuthCredentials::Bearer(t) if t == "tok"));
    }
}
