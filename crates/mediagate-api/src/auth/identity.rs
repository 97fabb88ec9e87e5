//! Caller identity resolution
//!
//! A session token is read from `Authorization: Bearer <jwt>` or, failing
//! that, from the `__session` cookie. Verification is either against the
//! provider's JWKS (each key verifies only its own algorithm, RS256 or
//! ES256) or a static public key.

use crate::auth::jwks::JwksKeyCache;
use crate::auth::models::{Identity, SessionClaims};
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use mediagate_core::constants::SESSION_COOKIE;
use mediagate_core::{AppError, IdentityConfig};

/// Resolves the caller of a request.
///
/// `Ok(None)` means no credentials were presented. An `Err` means credentials
/// were presented but could not be verified.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Identity>, AppError>;
}

enum KeySource {
    Jwks(JwksKeyCache),
    Static {
        key: DecodingKey,
        algorithms: Vec<Algorithm>,
    },
}

pub struct JwtIdentityProvider {
    keys: KeySource,
    authorized_parties: Vec<String>,
}

impl JwtIdentityProvider {
    /// Build from configuration. A static key takes precedence over JWKS.
    pub fn from_config(config: &IdentityConfig) -> Result<Option<Self>, AppError> {
        if let Some(pem) = &config.jwt_public_key {
            // Keys pasted into env files often carry literal "\n"
            let pem = pem.replace("\\n", "\n");
            let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                AppError::Configuration(format!("Invalid CLERK_JWT_KEY: {}", e))
            })?;
            return Ok(Some(Self::from_decoding_key(
                key,
                vec![Algorithm::RS256],
                config.authorized_parties.clone(),
            )));
        }

        if let Some(url) = &config.jwks_url {
            let cache = JwksKeyCache::new(url.clone(), config.jwks_cache_ttl_secs)?;
            return Ok(Some(Self {
                keys: KeySource::Jwks(cache),
                authorized_parties: config.authorized_parties.clone(),
            }));
        }

        Ok(None)
    }

    pub fn from_decoding_key(
        key: DecodingKey,
        algorithms: Vec<Algorithm>,
        authorized_parties: Vec<String>,
    ) -> Self {
        Self {
            keys: KeySource::Static { key, algorithms },
            authorized_parties,
        }
    }

    async fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let header = decode_header(token)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token header: {}", e)))?;

        // Pin validation to the header's algorithm, and only once it is known
        // to belong to the key's family.
        let key = match &self.keys {
            KeySource::Jwks(cache) => {
                let verification = cache.decoding_key(header.kid.as_deref()).await?;
                if header.alg != verification.algorithm {
                    return Err(AppError::Unauthorized(format!(
                        "Token algorithm {:?} does not match key algorithm {:?}",
                        header.alg, verification.algorithm
                    )));
                }
                verification.key
            }
            KeySource::Static { key, algorithms } => {
                if !algorithms.contains(&header.alg) {
                    return Err(AppError::Unauthorized(format!(
                        "Unsupported algorithm: {:?}",
                        header.alg
                    )));
                }
                key.clone()
            }
        };

        let mut validation = Validation::new(header.alg);
        validation.algorithms = vec![header.alg];
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(token, &key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                    AppError::Unauthorized("Token is not yet valid (nbf)".to_string())
                }
                _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
            })?
            .claims;

        if let Some(azp) = &claims.azp {
            if !self.authorized_parties.is_empty() && !self.authorized_parties.contains(azp) {
                return Err(AppError::Unauthorized(format!(
                    "Unauthorized party: {}",
                    azp
                )));
            }
        }

        Ok(claims)
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Identity>, AppError> {
        let Some(token) = session_token(headers) else {
            return Ok(None);
        };

        let claims = self.verify(&token).await?;
        Ok(Some(Identity::from(claims)))
    }
}

/// Identity provider used when none is configured: every caller is anonymous.
pub struct AnonymousIdentityProvider;

#[async_trait]
impl IdentityProvider for AnonymousIdentityProvider {
    async fn resolve(&self, _headers: &HeaderMap) -> Result<Option<Identity>, AppError> {
        Ok(None)
    }
}

/// Bearer token first, then the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-signing-secret";
    const RSA_PRIVATE_KEY: &str = include_str!("../../tests/fixtures/rsa_private.pem");
    const RSA_PUBLIC_KEY: &str = include_str!("../../tests/fixtures/rsa_public.pem");
    const EC_PRIVATE_KEY: &str = include_str!("../../tests/fixtures/ec_private.pem");

    fn claims(sub: &str, azp: Option<&str>, exp_offset: i64) -> SessionClaims {
        let now = chrono::Utc::now().timestamp();
        SessionClaims {
            sub: sub.to_string(),
            sid: Some("sess_1".to_string()),
            azp: azp.map(String::from),
            exp: now + exp_offset,
            iat: Some(now),
            nbf: None,
        }
    }

    fn hs256_token(claims: &SessionClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn hs256_provider(parties: Vec<String>) -> JwtIdentityProvider {
        JwtIdentityProvider::from_decoding_key(
            DecodingKey::from_secret(SECRET),
            vec![Algorithm::HS256],
            parties,
        )
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_session_token_prefers_bearer() {
        let mut headers = bearer("from-header");
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; __session=from-cookie"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_session_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; __session=abc.def.ghi"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_session_token_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("__session="));
        assert_eq!(session_token(&headers), None);
    }

    #[tokio::test]
    async fn test_resolves_subject_as_identity() {
        let provider = hs256_provider(vec![]);
        let token = hs256_token(&claims("user_2abc", None, 60));

        let identity = provider.resolve(&bearer(&token)).await.unwrap().unwrap();
        assert_eq!(identity.user_id, "user_2abc");
        assert_eq!(identity.session_id.as_deref(), Some("sess_1"));
    }

    #[tokio::test]
    async fn test_no_token_is_anonymous() {
        let provider = hs256_provider(vec![]);
        assert_eq!(provider.resolve(&HeaderMap::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let provider = hs256_provider(vec![]);
        let token = hs256_token(&claims("user_2abc", None, -120));

        let err = provider.resolve(&bearer(&token)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_wrong_signature_is_rejected() {
        let provider = hs256_provider(vec![]);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims("user_2abc", None, 60),
            &EncodingKey::from_secret(b"another-secret"),
        )
        .unwrap();

        assert!(provider.resolve(&bearer(&token)).await.is_err());
    }

    #[tokio::test]
    async fn test_authorized_parties() {
        let provider = hs256_provider(vec!["https://app.example.com".to_string()]);

        let allowed = hs256_token(&claims("u1", Some("https://app.example.com"), 60));
        assert!(provider.resolve(&bearer(&allowed)).await.unwrap().is_some());

        let foreign = hs256_token(&claims("u1", Some("https://evil.example.com"), 60));
        assert!(provider.resolve(&bearer(&foreign)).await.is_err());
    }

    #[tokio::test]
    async fn test_static_rsa_key_from_config() {
        let config = IdentityConfig {
            jwks_url: None,
            jwt_public_key: Some(RSA_PUBLIC_KEY.to_string()),
            jwks_cache_ttl_secs: 3600,
            authorized_parties: vec![],
        };
        let provider = JwtIdentityProvider::from_config(&config).unwrap().unwrap();

        let token = encode(
            &Header::new(Algorithm::RS256),
            &claims("user_rsa", None, 60),
            &EncodingKey::from_rsa_pem(RSA_PRIVATE_KEY.as_bytes()).unwrap(),
        )
        .unwrap();

        let identity = provider.resolve(&bearer(&token)).await.unwrap().unwrap();
        assert_eq!(identity.user_id, "user_rsa");
    }

    fn jwks_provider(server: &mockito::ServerGuard) -> JwtIdentityProvider {
        let config = IdentityConfig {
            jwks_url: Some(format!("{}/.well-known/jwks.json", server.url())),
            jwt_public_key: None,
            jwks_cache_ttl_secs: 3600,
            authorized_parties: vec![],
        };
        JwtIdentityProvider::from_config(&config).unwrap().unwrap()
    }

    async fn jwks_server() -> (mockito::ServerGuard, mockito::Mock) {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/.well-known/jwks.json")
            .with_status(200)
            .with_body(include_str!("../../tests/fixtures/jwks.json"))
            .create_async()
            .await;
        (server, mock)
    }

    fn signed(alg: Algorithm, kid: &str, sub: &str, key: &EncodingKey) -> String {
        let mut header = Header::new(alg);
        header.kid = Some(kid.to_string());
        encode(&header, &claims(sub, None, 60), key).unwrap()
    }

    #[tokio::test]
    async fn test_jwks_verification() {
        let (server, _mock) = jwks_server().await;
        let provider = jwks_provider(&server);

        let key = EncodingKey::from_rsa_pem(RSA_PRIVATE_KEY.as_bytes()).unwrap();
        let token = signed(Algorithm::RS256, "ins_test_key", "user_jwks", &key);

        let identity = provider.resolve(&bearer(&token)).await.unwrap().unwrap();
        assert_eq!(identity.user_id, "user_jwks");
    }

    #[tokio::test]
    async fn test_jwks_verification_es256() {
        let (server, _mock) = jwks_server().await;
        let provider = jwks_provider(&server);

        let key = EncodingKey::from_ec_pem(EC_PRIVATE_KEY.as_bytes()).unwrap();
        let token = signed(Algorithm::ES256, "ins_test_ec_key", "user_ec", &key);

        let identity = provider.resolve(&bearer(&token)).await.unwrap().unwrap();
        assert_eq!(identity.user_id, "user_ec");
    }

    #[tokio::test]
    async fn test_jwks_rejects_algorithm_outside_key_family() {
        let (server, _mock) = jwks_server().await;
        let provider = jwks_provider(&server);

        // RS512 over the RS256 key
        let key = EncodingKey::from_rsa_pem(RSA_PRIVATE_KEY.as_bytes()).unwrap();
        let token = signed(Algorithm::RS512, "ins_test_key", "user_jwks", &key);

        let err = provider.resolve(&bearer(&token)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_unconfigured_provider() {
        let config = IdentityConfig {
            jwks_url: None,
            jwt_public_key: None,
            jwks_cache_ttl_secs: 3600,
            authorized_parties: vec![],
        };
        assert!(JwtIdentityProvider::from_config(&config).unwrap().is_none());
    }
}
