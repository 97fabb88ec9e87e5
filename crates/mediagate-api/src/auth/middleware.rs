//! Access gate
//!
//! Runs before routing. Resolves the caller, classifies the path and either
//! lets the request through or redirects it. It never fails a request: an
//! identity that cannot be verified is treated as absent.

use crate::auth::identity::IdentityProvider;
use crate::auth::models::Identity;
use crate::auth::route_matcher::{is_gated, RouteTable};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use mediagate_core::AccessConfig;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(String),
}

#[derive(Clone)]
pub struct GateState {
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub routes: RouteTable,
    pub access: AccessConfig,
}

impl GateState {
    pub fn new(identity_provider: Arc<dyn IdentityProvider>, access: AccessConfig) -> Self {
        Self {
            identity_provider,
            routes: RouteTable::from_access_config(&access),
            access,
        }
    }
}

/// Decide what happens to a request. First matching rule wins.
pub fn decide(
    identity: Option<&Identity>,
    path: &str,
    routes: &RouteTable,
    access: &AccessConfig,
) -> GateDecision {
    let is_public_page = routes.is_public_page(path);
    let is_public_api = routes.is_public_api(path);

    match identity {
        Some(_) => {
            if is_public_page && path != access.landing_path {
                return GateDecision::Redirect(access.landing_path.clone());
            }
        }
        None => {
            if !is_public_page && !is_public_api {
                return GateDecision::Redirect(access.sign_in_path.clone());
            }
            // Redundant with the rule above for the default tables. Still
            // applies when a page pattern also covers API paths.
            if is_api_path(path, &access.api_prefix) && !is_public_api {
                return GateDecision::Redirect(access.sign_in_path.clone());
            }
        }
    }

    GateDecision::Allow
}

fn is_api_path(path: &str, api_prefix: &str) -> bool {
    path == api_prefix
        || path
            .strip_prefix(api_prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub async fn access_gate_middleware(
    State(gate): State<Arc<GateState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !is_gated(&path) {
        return next.run(request).await;
    }

    let identity = match gate.identity_provider.resolve(request.headers()).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(error = %e, path = %path, "Identity resolution failed, treating caller as anonymous");
            None
        }
    };

    match decide(identity.as_ref(), &path, &gate.routes, &gate.access) {
        GateDecision::Allow => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        GateDecision::Redirect(target) => {
            tracing::debug!(
                path = %path,
                target = %target,
                authenticated = identity.is_some(),
                "Access gate redirect"
            );
            Redirect::temporary(&target).into_response()
        }
    }
}
