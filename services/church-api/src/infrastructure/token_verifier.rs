/// IDトークン検証
///
/// 本番はJWKS（公開鍵セット）でJWTの署名と iss / aud / exp / sub を検証する。
/// ローカル開発用に、トークン文字列をそのまま利用者IDとして扱う検証器も提供する。
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{JwkSet, KeyAlgorithm};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use super::config::ConfigError;
use crate::domain::AuthenticatedUser;

/// 発行者URLの環境変数
pub const ENV_AUTH_ISSUER: &str = "AUTH_ISSUER";
/// 期待するaudienceの環境変数
pub const ENV_AUTH_AUDIENCE: &str = "AUTH_AUDIENCE";
/// JWKS URLの環境変数（未設定時は発行者URLから導出）
pub const ENV_AUTH_JWKS_URL: &str = "AUTH_JWKS_URL";

/// JWKSのキャッシュ期間
const JWKS_CACHE_DURATION: Duration = Duration::from_secs(3600);

/// JWKS取得のタイムアウト
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// 認証エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// トークンが付与されていない
    #[error("Missing authentication token")]
    MissingToken,
    /// 署名・発行者・audienceなどの検証に失敗
    #[error("Invalid authentication token")]
    InvalidToken,
    /// 有効期限切れ
    #[error("Authentication token expired")]
    TokenExpired,
    /// 鍵の取得に失敗（検証を行えない）
    #[error("Token verification unavailable: {0}")]
    Unavailable(String),
}

/// トークン検証用トレイト
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// JWKS検証の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
}

impl AuthConfig {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let jwks_url = default_jwks_url(&issuer);
        Self {
            issuer,
            audience: audience.into(),
            jwks_url,
        }
    }

    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let mut config = Self::new(require(ENV_AUTH_ISSUER)?, require(ENV_AUTH_AUDIENCE)?);
        if let Some(url) = get(ENV_AUTH_JWKS_URL) {
            config.jwks_url = url;
        }
        Ok(config)
    }
}

fn default_jwks_url(issuer: &str) -> String {
    format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'))
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
}

/// 取得済みJWKSと取得時刻
struct CachedJwks {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// JWKSによるJWT検証器
pub struct JwksTokenVerifier {
    config: AuthConfig,
    http_client: reqwest::Client,
    cache: Arc<RwLock<Option<CachedJwks>>>,
}

impl JwksTokenVerifier {
    /// 検証器を作成する（鍵は初回検証時に取得する）
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            cache: Arc::new(RwLock::new(None)),
        })
    }

    /// 取得済みのJWKSを指定して検証器を作成する
    pub fn with_jwks(config: AuthConfig, jwks: JwkSet) -> Result<Self, AuthError> {
        let verifier = Self::new(config)?;
        let cache = Arc::new(RwLock::new(Some(CachedJwks {
            jwks,
            fetched_at: Instant::now(),
        })));
        Ok(Self { cache, ..verifier })
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        tracing::debug!(url = %self.config.jwks_url, "JWKS取得");

        let response = self
            .http_client
            .get(&self.config.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "JWKS取得失敗");
                AuthError::Unavailable(format!("Failed to fetch JWKS: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(status = %status, "JWKSエンドポイントがエラーを返した");
            return Err(AuthError::Unavailable(format!(
                "JWKS endpoint returned {}",
                status
            )));
        }

        response.json::<JwkSet>().await.map_err(|e| {
            tracing::error!(error = %e, "JWKSのパース失敗");
            AuthError::Unavailable(format!("Failed to parse JWKS: {}", e))
        })
    }

    /// キャッシュが有効ならそれを、期限切れなら再取得したJWKSを返す
    async fn jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < JWKS_CACHE_DURATION {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;
        *self.cache.write().await = Some(CachedJwks {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });
        Ok(jwks)
    }

    fn decoding_key(kid: &str, jwks: &JwkSet) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwk = jwks.find(kid).ok_or_else(|| {
            tracing::warn!(kid = kid, "一致する鍵が無い");
            AuthError::InvalidToken
        })?;

        let algorithm = match jwk.common.key_algorithm {
            Some(KeyAlgorithm::RS256) | None => Algorithm::RS256,
            Some(KeyAlgorithm::RS384) => Algorithm::RS384,
            Some(KeyAlgorithm::RS512) => Algorithm::RS512,
            Some(KeyAlgorithm::ES256) => Algorithm::ES256,
            Some(KeyAlgorithm::ES384) => Algorithm::ES384,
            Some(KeyAlgorithm::HS256) => Algorithm::HS256,
            Some(other) => {
                tracing::warn!(algorithm = ?other, "未対応のアルゴリズム");
                return Err(AuthError::InvalidToken);
            }
        };

        let key = DecodingKey::from_jwk(jwk).map_err(|e| {
            tracing::warn!(error = %e, "復号鍵の作成失敗");
            AuthError::InvalidToken
        })?;

        Ok((key, algorithm))
    }
}

#[async_trait]
impl TokenVerifier for JwksTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
        let kid = header.kid.ok_or(AuthError::InvalidToken)?;

        let jwks = self.jwks().await?;
        let (key, algorithm) = Self::decoding_key(&kid, &jwks)?;

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let claims = decode::<Claims>(token, &key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!(error = %e, "トークン検証失敗");
                    AuthError::InvalidToken
                }
            })?
            .claims;

        if claims.iss != self.config.issuer || claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(AuthenticatedUser::new(claims.sub))
    }
}

/// ローカル開発用の検証器
///
/// トークン文字列をそのまま利用者IDとして受け入れる。本番では使用しないこと。
#[derive(Debug, Clone, Default)]
pub struct DevTokenVerifier;

#[async_trait]
impl TokenVerifier for DevTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let user_id = token.trim();
        if user_id.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(AuthenticatedUser::new(user_id))
    }
}
