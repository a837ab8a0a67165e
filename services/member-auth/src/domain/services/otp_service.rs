//! OTP 签发与验证服务

use std::sync::Arc;
use std::time::Duration;

use portal_config::OtpConfig;
use portal_errors::AppError;
use portal_ports::Clock;
use tracing::{debug, info, warn};

use crate::domain::account::Account;
use crate::domain::identifier::Identifier;
use crate::domain::otp::{CodeGenerator, OtpRecord};
use crate::domain::password::Password;
use crate::domain::services::account_service::AccountService;
use crate::domain::services::otp_dispatcher::{DeliveryStatus, OtpDispatcher};
use crate::domain::services::otp_store::OtpStore;
use crate::domain::session::{Session, SessionManager};
use crate::error::OtpError;

/// 签发结果
///
/// `Ok` 即表示验证码已保存，投递结果单独报告。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpIssued {
    pub expires_in_secs: u64,
    pub delivery: DeliveryStatus,
}

/// 验证通过后的登录结果
#[derive(Debug, Clone)]
pub struct OtpLogin {
    pub account: Account,
    pub session: Session,
    pub password_set: bool,
    /// 本次验证时新开通的账号
    pub provisioned: bool,
}

/// OTP 服务
pub struct OtpService {
    store: OtpStore,
    generator: Arc<dyn CodeGenerator>,
    dispatcher: OtpDispatcher,
    accounts: Arc<AccountService>,
    sessions: Arc<dyn SessionManager>,
    clock: Arc<dyn Clock>,
    config: OtpConfig,
}

impl OtpService {
    pub fn new(
        store: OtpStore,
        generator: Arc<dyn CodeGenerator>,
        dispatcher: OtpDispatcher,
        accounts: Arc<AccountService>,
        sessions: Arc<dyn SessionManager>,
        clock: Arc<dyn Clock>,
        config: OtpConfig,
    ) -> Self {
        Self {
            store,
            generator,
            dispatcher,
            accounts,
            sessions,
            clock,
            config,
        }
    }

    /// 签发验证码
    ///
    /// 计数达到上限时拒绝；否则生成新验证码覆盖旧记录、计数加一并投递。
    /// 计数与保存之间没有加锁，同一标识的并发请求可能同时通过检查。
    pub async fn request_code(&self, raw_identifier: &str) -> Result<OtpIssued, OtpError> {
        let identifier = Identifier::parse(raw_identifier)?;
        let key = identifier.as_str();
        let window = Duration::from_secs(self.config.rate_limit_window_secs);

        debug!(identifier = %identifier, channel = identifier.channel().as_str(), "OTP requested");

        let count = self.store.request_count(key).await?;
        if count >= self.config.max_requests {
            let retry_after_secs = self
                .store
                .quota_resets_in(key)
                .await?
                .map(|remaining| remaining.as_secs().max(1))
                .unwrap_or(self.config.rate_limit_window_secs);
            warn!(
                identifier = %identifier,
                count = count,
                retry_after_secs = retry_after_secs,
                "OTP request quota exceeded"
            );
            return Err(OtpError::QuotaExceeded { retry_after_secs });
        }

        let ttl_secs = self.config.code_ttl_secs;
        let code = self.generator.generate(self.config.code_length);
        let record = OtpRecord::new(code, self.clock.now(), chrono_seconds(ttl_secs)?);

        self.store
            .save_code(key, &record, Duration::from_secs(ttl_secs))
            .await?;
        self.store.record_request(key, count + 1, window).await?;

        let delivery = self.dispatcher.dispatch(&identifier, &record.code, ttl_secs).await;

        info!(
            identifier = %identifier,
            request_count = count + 1,
            delivery = delivery.as_str(),
            "OTP issued"
        );

        Ok(OtpIssued {
            expires_in_secs: ttl_secs,
            delivery,
        })
    }

    /// 验证验证码并登录
    pub async fn verify_code(
        &self,
        raw_identifier: &str,
        submitted_code: &str,
        new_password: Option<&str>,
    ) -> Result<OtpLogin, OtpError> {
        let result = self
            .verify_and_sign_in(raw_identifier, submitted_code, new_password)
            .await;

        if self.config.uniform_auth_errors {
            result.map_err(OtpError::into_uniform)
        } else {
            result
        }
    }

    async fn verify_and_sign_in(
        &self,
        identifier: &str,
        submitted_code: &str,
        new_password: Option<&str>,
    ) -> Result<OtpLogin, OtpError> {
        if identifier.trim().is_empty() || submitted_code.is_empty() {
            return Err(OtpError::MissingInput("Email/Mobile and OTP are required"));
        }

        // 先校验密码，避免验证码被消耗后才发现密码不合规
        let new_password = new_password
            .filter(|p| !p.is_empty())
            .map(Password::new)
            .transpose()
            .map_err(AppError::from)?;

        let Some(record) = self.store.load_code(identifier).await? else {
            warn!(identifier = %identifier, "OTP verification without a live code");
            return Err(OtpError::NotRequested);
        };

        if record.is_expired(self.clock.now()) {
            self.store.remove_code(identifier).await?;
            warn!(identifier = %identifier, "OTP verification with an expired code");
            return Err(OtpError::NotRequested);
        }

        if !record.matches(submitted_code) {
            self.count_failed_attempt(identifier, &record).await?;
            return Err(OtpError::InvalidCode);
        }

        // 单次有效
        self.store.remove_code(identifier).await?;

        let (account, provisioned) = self
            .accounts
            .sign_in_verified(identifier, new_password.as_ref())
            .await?;
        let session = self.sessions.establish(&account).await?;

        info!(
            identifier = %identifier,
            account_id = %account.id,
            provisioned = provisioned,
            password_set = new_password.is_some(),
            "OTP verified, session established"
        );

        Ok(OtpLogin {
            account,
            session,
            password_set: new_password.is_some(),
            provisioned,
        })
    }

    /// 累计错误次数，达到上限后作废验证码
    async fn count_failed_attempt(&self, identifier: &str, record: &OtpRecord) -> Result<(), OtpError> {
        let attempts = self.store.failed_attempts(identifier).await? + 1;
        let limit = self.config.max_verify_attempts;

        if limit > 0 && attempts >= limit {
            self.store.remove_code(identifier).await?;
            warn!(identifier = %identifier, attempts, "OTP discarded after too many wrong attempts");
            return Ok(());
        }

        let remaining = (record.expires_at - self.clock.now())
            .to_std()
            .unwrap_or_default()
            .max(Duration::from_secs(1));
        self.store
            .record_failed_attempt(identifier, attempts, remaining)
            .await?;
        warn!(identifier = %identifier, attempts, "OTP verification with a wrong code");
        Ok(())
    }
}

fn chrono_seconds(secs: u64) -> Result<chrono::Duration, OtpError> {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| OtpError::App(AppError::internal("OTP ttl out of range")))
}
