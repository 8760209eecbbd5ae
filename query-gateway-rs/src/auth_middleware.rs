// query-gateway-rs/src/auth_middleware.rs
//
// Capability-based permission checks for the API namespace.
//
// The gateway does not resolve privileges itself. The host's auth layer
// attaches a `CapabilitySet` to the request extensions; this module only
// decides whether that set is sufficient.

use std::collections::HashSet;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

/// Administrative privilege.
pub const ADMIN_CAPABILITY: &str = "admin:full";
/// Content-editing privilege.
pub const CONTENT_EDIT_CAPABILITY: &str = "content:edit";

/// A caller whose privileges can be queried by name.
pub trait Requester {
    fn has_capability(&self, name: &str) -> bool;
}

/// Concrete capability bag the host auth layer attaches to each request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    names: HashSet<String>,
}

impl CapabilitySet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn grant(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }
}

impl Requester for CapabilitySet {
    fn has_capability(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Whether the requester may use the query API: administrative privilege
/// OR content-editing privilege. Pure predicate, no side effects.
pub fn check_permission(requester: &dyn Requester) -> bool {
    requester.has_capability(ADMIN_CAPABILITY) || requester.has_capability(CONTENT_EDIT_CAPABILITY)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Permission middleware for the API namespace.
///
/// Root and health endpoints are public; everything else requires a
/// sufficient capability set in the request extensions.
pub async fn permission_middleware(
    req: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<AuthErrorResponse>)> {
    let path = req.uri().path();
    if path == "/" || path == "/health" {
        return Ok(next.run(req).await);
    }

    match req.extensions().get::<CapabilitySet>() {
        Some(capabilities) if check_permission(capabilities) => Ok(next.run(req).await),
        Some(_) => Err((
            StatusCode::FORBIDDEN,
            Json(AuthErrorResponse {
                error: format!(
                    "Permission denied: {} or {} required",
                    ADMIN_CAPABILITY, CONTENT_EDIT_CAPABILITY
                ),
                code: 403,
            }),
        )),
        None => Err((
            StatusCode::FORBIDDEN,
            Json(AuthErrorResponse {
                error: "No requester capabilities attached to request".to_string(),
                code: 403,
            }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_capability_grants_access() {
        let requester = CapabilitySet::new([ADMIN_CAPABILITY]);
        assert!(check_permission(&requester));
    }

    #[test]
    fn test_content_edit_capability_grants_access() {
        let requester = CapabilitySet::new([CONTENT_EDIT_CAPABILITY]);
        assert!(check_permission(&requester));
    }

    #[test]
    fn test_either_capability_is_sufficient() {
        let requester = CapabilitySet::new([ADMIN_CAPABILITY, CONTENT_EDIT_CAPABILITY]);
        assert!(check_permission(&requester));
    }

    #[test]
    fn test_unrelated_capabilities_denied() {
        let requester = CapabilitySet::new(["tokens:generate", "reports:read"]);
        assert!(!check_permission(&requester));
    }

    #[test]
    fn test_empty_set_denied() {
        let requester = CapabilitySet::default();
        assert!(!check_permission(&requester));
    }

    #[test]
    fn test_grant_adds_capability() {
        let mut requester = CapabilitySet::default();
        assert!(!check_permission(&requester));
        requester.grant(CONTENT_EDIT_CAPABILITY);
        assert!(check_permission(&requester));
    }
}
