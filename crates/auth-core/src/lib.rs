//! portal-auth-core - 会话令牌
//!
//! 登录成功后签发的 HS256 JWT，`jti` 同时作为服务端会话 ID

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use portal_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 令牌用途，拒绝其他用途的同密钥令牌
const SESSION_TOKEN_KIND: &str = "session";

/// 会话令牌 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// 账号 ID
    pub sub: String,
    /// 会话 ID
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub kind: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl SessionClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// 已签发的令牌
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// 令牌服务
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    issuer: String,
    audience: String,
}

impl TokenService {
    /// `lifetime_secs` 超出可表示的时间范围时返回 Validation 错误
    pub fn new(
        secret: &str,
        lifetime_secs: i64,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> AppResult<Self> {
        let lifetime = Duration::try_seconds(lifetime_secs)
            .filter(|d| Utc::now().checked_add_signed(*d).is_some())
            .ok_or_else(|| {
                AppError::validation(format!("Token lifetime out of range: {}s", lifetime_secs))
            })?;

        let issuer = issuer.into();
        let audience = audience.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);
        validation.set_audience(&[&audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
            issuer,
            audience,
        })
    }

    /// 签发会话令牌
    pub fn issue(&self, subject: &str, roles: Vec<String>) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AppError::internal("Session expiry out of range"))?;
        let claims = SessionClaims {
            sub: subject.to_string(),
            jti: Uuid::now_v7().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind: SESSION_TOKEN_KIND.to_string(),
            roles,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {}", e)))?;

        Ok(IssuedToken { token, claims })
    }

    /// 校验签名、签发方、受众、过期时间与用途
    pub fn verify(&self, token: &str) -> AppResult<SessionClaims> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::unauthenticated(format!("Invalid session token: {}", e)))?
            .claims;

        if claims.kind != SESSION_TOKEN_KIND {
            return Err(AppError::unauthenticated("Not a session token"));
        }
        if claims.jti.is_empty() {
            return Err(AppError::unauthenticated("Session token has no ID"));
        }

        Ok(claims)
    }

    /// 令牌有效期（秒）
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }
}
