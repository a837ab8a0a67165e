//! OTP 记录与验证码生成

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

/// 已签发的验证码
///
/// 每个标识最多一条有效记录，新的请求覆盖旧记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn new(code: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            code: code.into(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// 精确匹配，不做任何规范化
    pub fn matches(&self, submitted: &str) -> bool {
        self.code == submitted
    }
}

/// 验证码生成器
pub trait CodeGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

/// 基于操作系统 CSPRNG 的数字验证码，每一位独立均匀取自 0-9
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureCodeGenerator;

impl CodeGenerator for SecureCodeGenerator {
    fn generate(&self, length: usize) -> String {
        let mut rng = OsRng;
        (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}
