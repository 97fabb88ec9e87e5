//! JWKS retrieval with a per-key cache
//!
//! Keys are fetched from the authentication provider's JWKS endpoint and kept
//! for a configurable TTL. An unknown `kid` triggers a refetch, so rotated
//! keys are picked up without a restart. Refetches are spaced at least
//! `JWKS_MIN_REFETCH_SECS` apart, so a stream of tokens with made-up key IDs
//! cannot hammer the provider.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey};
use mediagate_core::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const JWKS_FETCH_TIMEOUT_SECS: u64 = 10;
pub const JWKS_MIN_REFETCH_SECS: i64 = 30;
const DEFAULT_KEY: &str = "default";

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// JSON Web Key structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "kid")]
    pub key_id: Option<String>,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    #[serde(rename = "alg")]
    pub algorithm: Option<String>,
    #[serde(rename = "n")]
    pub modulus: Option<String>, // RSA
    #[serde(rename = "e")]
    pub exponent: Option<String>, // RSA
    #[serde(rename = "x")]
    pub x_coordinate: Option<String>, // EC
    #[serde(rename = "y")]
    pub y_coordinate: Option<String>, // EC
    #[serde(rename = "crv")]
    pub curve: Option<String>, // EC
}

/// A verification key together with the one algorithm it may be used with.
#[derive(Clone)]
pub struct VerificationKey {
    pub key: DecodingKey,
    pub algorithm: Algorithm,
}

#[derive(Clone)]
struct CachedKey {
    key: VerificationKey,
    expires_at: DateTime<Utc>,
}

pub struct JwksKeyCache {
    jwks_url: String,
    http_client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CachedKey>>>,
    last_fetch: Arc<RwLock<Option<DateTime<Utc>>>>,
    cache_ttl_seconds: i64,
}

impl JwksKeyCache {
    pub fn new(jwks_url: String, cache_ttl_seconds: i64) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(JWKS_FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build JWKS client: {}", e)))?;

        Ok(Self {
            jwks_url,
            http_client,
            cache: Arc::new(RwLock::new(HashMap::new())),
            last_fetch: Arc::new(RwLock::new(None)),
            cache_ttl_seconds,
        })
    }

    async fn fetch_jwks(&self) -> Result<Jwks, AppError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(format!(
                "JWKS endpoint returned error: {}",
                response.status()
            )));
        }

        response
            .json::<Jwks>()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to parse JWKS: {}", e)))
    }

    /// Get the verification key for a key ID, fetching the key set on a miss.
    pub async fn decoding_key(&self, kid: Option<&str>) -> Result<VerificationKey, AppError> {
        let cache_key = kid.unwrap_or(DEFAULT_KEY);

        if let Some(key) = self.cached(cache_key).await {
            return Ok(key);
        }

        {
            // Held across the fetch: concurrent misses share one request
            let mut last_fetch = self.last_fetch.write().await;

            // Another task may have refreshed the set while we waited
            if let Some(key) = self.cached(cache_key).await {
                return Ok(key);
            }

            let now = Utc::now();
            let throttled = (*last_fetch)
                .is_some_and(|at| now - at < chrono::Duration::seconds(JWKS_MIN_REFETCH_SECS));
            if throttled {
                return Err(AppError::Unauthorized(format!(
                    "Key ID {} not found in JWKS",
                    cache_key
                )));
            }

            tracing::debug!(kid = ?kid, "JWKS cache miss, fetching key set");
            // Failed fetches count against the interval too
            *last_fetch = Some(now);
            let jwks = self.fetch_jwks().await?;
            self.store(&jwks).await;
        }

        self.cached(cache_key).await.ok_or_else(|| match kid {
            Some(kid) => AppError::Unauthorized(format!("Key ID {} not found in JWKS", kid)),
            None => AppError::Unauthorized("No usable keys found in JWKS".to_string()),
        })
    }

    async fn cached(&self, cache_key: &str) -> Option<VerificationKey> {
        let cache = self.cache.read().await;
        cache
            .get(cache_key)
            .filter(|cached| cached.expires_at > Utc::now())
            .map(|cached| cached.key.clone())
    }

    /// Replace the cache with every usable key of a freshly fetched set.
    async fn store(&self, jwks: &Jwks) {
        let expires_at = Utc::now() + chrono::Duration::seconds(self.cache_ttl_seconds);
        let mut fresh = HashMap::new();

        for (index, jwk) in jwks.keys.iter().enumerate() {
            let key = match jwk_to_verification_key(jwk) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(kid = ?jwk.key_id, error = %e, "Skipping unusable JWKS key");
                    continue;
                }
            };
            if index == 0 {
                fresh.insert(
                    DEFAULT_KEY.to_string(),
                    CachedKey {
                        key: key.clone(),
                        expires_at,
                    },
                );
            }
            if let Some(kid) = &jwk.key_id {
                fresh.insert(kid.clone(), CachedKey { key, expires_at });
            }
        }

        *self.cache.write().await = fresh;
    }
}

/// The algorithm a JWK is used with: its `alg` when present, otherwise the
/// family default (RS256 for RSA, ES256 for P-256).
pub fn jwk_algorithm(jwk: &Jwk) -> Result<Algorithm, AppError> {
    let algorithm = match (jwk.key_type.as_str(), jwk.algorithm.as_deref()) {
        ("RSA", None) => Algorithm::RS256,
        ("RSA", Some("RS256")) => Algorithm::RS256,
        ("RSA", Some("RS384")) => Algorithm::RS384,
        ("RSA", Some("RS512")) => Algorithm::RS512,
        ("EC", None | Some("ES256")) => Algorithm::ES256,
        (key_type, alg) => {
            return Err(AppError::Unauthorized(format!(
                "Unsupported key algorithm {:?} for key type {}",
                alg, key_type
            )))
        }
    };
    Ok(algorithm)
}

pub fn jwk_to_verification_key(jwk: &Jwk) -> Result<VerificationKey, AppError> {
    Ok(VerificationKey {
        key: jwk_to_decoding_key(jwk)?,
        algorithm: jwk_algorithm(jwk)?,
    })
}

fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AppError> {
    match jwk.key_type.as_str() {
        "RSA" => {
            let n = jwk
                .modulus
                .as_ref()
                .ok_or_else(|| AppError::Unauthorized("RSA key missing modulus".to_string()))?;
            let e = jwk
                .exponent
                .as_ref()
                .ok_or_else(|| AppError::Unauthorized("RSA key missing exponent".to_string()))?;

            DecodingKey::from_rsa_components(n, e)
                .map_err(|e| AppError::Unauthorized(format!("Failed to create RSA key: {}", e)))
        }
        "EC" => {
            let x = jwk
                .x_coordinate
                .as_ref()
                .ok_or_else(|| AppError::Unauthorized("EC key missing x coordinate".to_string()))?;
            let y = jwk
                .y_coordinate
                .as_ref()
                .ok_or_else(|| AppError::Unauthorized("EC key missing y coordinate".to_string()))?;
            let curve = jwk
                .curve
                .as_ref()
                .ok_or_else(|| AppError::Unauthorized("EC key missing curve".to_string()))?;

            if curve != "P-256" {
                return Err(AppError::Unauthorized(format!(
                    "Unsupported EC curve: {} (only P-256 is supported)",
                    curve
                )));
            }

            DecodingKey::from_ec_components(x, y)
                .map_err(|e| AppError::Unauthorized(format!("Failed to create EC key: {}", e)))
        }
        _ => Err(AppError::Unauthorized(format!(
            "Unsupported key type: {}",
            jwk.key_type
        ))),
    }
}
