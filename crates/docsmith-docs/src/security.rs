//! Security schemes and their use by endpoints.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DocsError, DocsResult};

/// Where an API key is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    /// Query string.
    Query,
    /// HTTP header.
    Header,
    /// Cookie.
    Cookie,
}

/// A security scheme definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    /// API key authentication.
    #[serde(rename = "apiKey")]
    ApiKey {
        /// Name of the header, query parameter or cookie.
        name: String,
        /// Where the key is carried.
        #[serde(rename = "in")]
        location: ApiKeyLocation,
        /// Description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// HTTP authentication (basic, bearer, ...).
    #[serde(rename = "http")]
    Http {
        /// Authorization scheme name.
        scheme: String,
        /// Bearer token format hint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        #[serde(rename = "bearerFormat")]
        bearer_format: Option<String>,
        /// Description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// OAuth 2.0.
    #[serde(rename = "oauth2")]
    OAuth2 {
        /// Supported flows.
        flows: OAuthFlows,
        /// Description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// OpenID Connect discovery.
    #[serde(rename = "openIdConnect")]
    OpenIdConnect {
        /// Discovery URL.
        #[serde(rename = "openIdConnectUrl")]
        open_id_connect_url: String,
        /// Description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl SecurityScheme {
    /// JWT bearer authentication.
    pub fn bearer() -> Self {
        Self::Http {
            scheme: "bearer".to_string(),
            bearer_format: Some("JWT".to_string()),
            description: Some("JWT Bearer token authentication".to_string()),
        }
    }

    /// HTTP basic authentication.
    pub fn basic() -> Self {
        Self::Http {
            scheme: "basic".to_string(),
            bearer_format: None,
            description: None,
        }
    }

    /// API key authentication.
    pub fn api_key(name: impl Into<String>, location: ApiKeyLocation) -> Self {
        let name = name.into();
        Self::ApiKey {
            description: Some(format!("API key authentication via {name}")),
            name,
            location,
        }
    }

    /// OAuth 2.0 authentication. The flows are validated.
    pub fn oauth2(flows: OAuthFlows) -> DocsResult<Self> {
        flows.validate()?;
        Ok(Self::OAuth2 {
            flows,
            description: None,
        })
    }

    /// OpenID Connect authentication.
    pub fn open_id_connect(url: impl Into<String>) -> Self {
        Self::OpenIdConnect {
            open_id_connect_url: url.into(),
            description: None,
        }
    }

    /// Every scope offered by the scheme. Only OAuth 2.0 offers scopes.
    pub fn scopes(&self) -> Vec<String> {
        match self {
            Self::OAuth2 { flows, .. } => flows.scopes(),
            _ => Vec::new(),
        }
    }

    /// Checks the definition.
    pub fn validate(&self) -> DocsResult<()> {
        match self {
            Self::OAuth2 { flows, .. } => flows.validate(),
            Self::Http { scheme, .. } if scheme.is_empty() => {
                Err(DocsError::InvalidSecurityScheme {
                    reason: "http schemes need a scheme name".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// A single OAuth 2.0 flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthFlow {
    /// Authorization URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "authorizationUrl")]
    pub authorization_url: Option<String>,
    /// Token URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "tokenUrl")]
    pub token_url: Option<String>,
    /// Refresh URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "refreshUrl")]
    pub refresh_url: Option<String>,
    /// Available scopes and their descriptions.
    #[serde(default)]
    pub scopes: IndexMap<String, String>,
}

impl OAuthFlow {
    /// Adds a scope.
    pub fn scope(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.scopes.insert(name.into(), description.into());
        self
    }
}

/// The OAuth 2.0 flows supported by a scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthFlows {
    /// Implicit flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    /// Resource owner password flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    /// Client credentials flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "clientCredentials")]
    pub client_credentials: Option<OAuthFlow>,
    /// Authorization code flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "authorizationCode")]
    pub authorization_code: Option<OAuthFlow>,
}

impl OAuthFlows {
    fn named(&self) -> [(&'static str, Option<&OAuthFlow>); 4] {
        [
            ("authorizationCode", self.authorization_code.as_ref()),
            ("clientCredentials", self.client_credentials.as_ref()),
            ("implicit", self.implicit.as_ref()),
            ("password", self.password.as_ref()),
        ]
    }

    /// Checks the URLs every flow requires.
    ///
    /// `implicit` and `authorizationCode` need an authorization URL;
    /// `authorizationCode`, `password` and `clientCredentials` need a token URL.
    pub fn validate(&self) -> DocsResult<()> {
        for (name, flow) in self.named() {
            let Some(flow) = flow else { continue };
            if matches!(name, "implicit" | "authorizationCode") && flow.authorization_url.is_none()
            {
                return Err(DocsError::InvalidSecurityScheme {
                    reason: format!("the {name} flow needs an authorizationUrl"),
                });
            }
            if matches!(name, "authorizationCode" | "password" | "clientCredentials")
                && flow.token_url.is_none()
            {
                return Err(DocsError::InvalidSecurityScheme {
                    reason: format!("the {name} flow needs a tokenUrl"),
                });
            }
        }
        Ok(())
    }

    /// Every scope of every flow, in flow order.
    pub fn scopes(&self) -> Vec<String> {
        self.named()
            .into_iter()
            .filter_map(|(_, flow)| flow)
            .flat_map(|flow| flow.scopes.keys().cloned())
            .collect()
    }
}

/// A security scheme as used by one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityUse {
    scheme: SecurityScheme,
    scopes: Vec<String>,
}

impl SecurityUse {
    /// Uses every scope of `scheme`.
    pub fn new(scheme: SecurityScheme) -> Self {
        Self {
            scheme,
            scopes: Vec::new(),
        }
    }

    /// Narrows `scheme` to a subset of its scopes.
    pub fn with_scopes<I, S>(scheme: SecurityScheme, scopes: I) -> DocsResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let offered = scheme.scopes();
        let scopes: Vec<String> = scopes.into_iter().map(Into::into).collect();
        if let Some(scope) = scopes.iter().find(|scope| !offered.contains(scope)) {
            return Err(DocsError::UnknownScope {
                scope: scope.clone(),
            });
        }
        Ok(Self { scheme, scopes })
    }

    /// The scheme definition.
    pub fn scheme(&self) -> &SecurityScheme {
        &self.scheme
    }

    /// Scopes listed in the operation's security requirement.
    pub fn requirement_scopes(&self) -> Vec<String> {
        if self.scopes.is_empty() {
            self.scheme.scopes()
        } else {
            self.scopes.clone()
        }
    }
}

/// Security schemes registered on a document, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SchemeRegistry {
    schemes: IndexMap<String, SecurityScheme>,
}

impl SchemeRegistry {
    /// Registers a scheme. Redeclaring an identical scheme is a no-op.
    pub fn register(&mut self, name: &str, scheme: &SecurityScheme) -> DocsResult<()> {
        match self.schemes.get(name) {
            Some(existing) if existing == scheme => Ok(()),
            Some(_) => Err(DocsError::SecuritySchemeConflict {
                name: name.to_string(),
            }),
            None => {
                scheme.validate()?;
                self.schemes.insert(name.to_string(), scheme.clone());
                Ok(())
            }
        }
    }

    /// The registered schemes.
    pub fn schemes(&self) -> &IndexMap<String, SecurityScheme> {
        &self.schemes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn code_flow() -> OAuthFlow {
        OAuthFlow {
            authorization_url: Some("https://auth.example.com/authorize".to_string()),
            token_url: Some("https://auth.example.com/token".to_string()),
            ..OAuthFlow::default()
        }
        .scope("read:pets", "read your pets")
        .scope("write:pets", "modify pets")
    }

    #[test]
    fn test_bearer_serialization() {
        assert_eq!(
            serde_json::to_value(SecurityScheme::bearer()).unwrap(),
            json!({
                "type": "http",
                "scheme": "bearer",
                "bearerFormat": "JWT",
                "description": "JWT Bearer token authentication"
            })
        );
    }

    #[test]
    fn test_api_key_serialization() {
        let value = serde_json::to_value(SecurityScheme::api_key("X-API-Key", ApiKeyLocation::Header))
            .unwrap();
        assert_eq!(value["type"], "apiKey");
        assert_eq!(value["in"], "header");
        assert_eq!(value["name"], "X-API-Key");
    }

    #[test]
    fn test_oauth2_requires_urls() {
        let flows = OAuthFlows {
            implicit: Some(OAuthFlow::default()),
            ..OAuthFlows::default()
        };
        let err = SecurityScheme::oauth2(flows).unwrap_err();
        assert!(err.to_string().contains("authorizationUrl"));

        let flows = OAuthFlows {
            password: Some(OAuthFlow::default()),
            ..OAuthFlows::default()
        };
        let err = SecurityScheme::oauth2(flows).unwrap_err();
        assert!(err.to_string().contains("tokenUrl"));
    }

    #[test]
    fn test_scopes_are_narrowed() {
        let scheme = SecurityScheme::oauth2(OAuthFlows {
            authorization_code: Some(code_flow()),
            ..OAuthFlows::default()
        })
        .unwrap();

        assert_eq!(
            SecurityUse::new(scheme.clone()).requirement_scopes(),
            vec!["read:pets", "write:pets"]
        );
        assert_eq!(
            SecurityUse::with_scopes(scheme.clone(), ["read:pets"])
                .unwrap()
                .requirement_scopes(),
            vec!["read:pets"]
        );
        assert!(matches!(
            SecurityUse::with_scopes(scheme, ["admin"]),
            Err(DocsError::UnknownScope { .. })
        ));
    }

    #[test]
    fn test_scheme_registry_conflicts() {
        let mut registry = SchemeRegistry::default();
        registry.register("auth", &SecurityScheme::bearer()).unwrap();
        registry.register("auth", &SecurityScheme::bearer()).unwrap();
        let err = registry
            .register("auth", &SecurityScheme::basic())
            .unwrap_err();
        assert!(matches!(err, DocsError::SecuritySchemeConflict { .. }));
        assert_eq!(registry.schemes().len(), 1);
    }
}
