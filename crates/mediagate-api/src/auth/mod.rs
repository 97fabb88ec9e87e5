//! Session identity and the access gate
//!
//! - `identity`: resolves the caller from a session token
//! - `jwks`: signing key retrieval with caching
//! - `route_matcher`: classifies request paths
//! - `middleware`: the access gate itself

pub mod identity;
pub mod jwks;
pub mod middleware;
pub mod models;
pub mod route_matcher;

pub use identity::{IdentityProvider, JwtIdentityProvider};
pub use middleware::{access_gate_middleware, decide, GateDecision, GateState};
pub use models::{Identity, SessionClaims};
pub use route_matcher::{is_gated, RouteClass, RoutePattern, RouteTable};
