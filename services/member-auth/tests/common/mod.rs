#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use member_auth::api::http::AppState;
use member_auth::container::{ServiceContainer, ServiceDependencies};
use member_auth::domain::otp::{CodeGenerator, SecureCodeGenerator};
use member_auth::domain::services::OtpStore;
use member_auth::infrastructure::persistence::{
    InMemoryAccountRepository, InMemoryMemberProfileRepository,
};
use member_auth::infrastructure::session::TokenSessionManager;
use parking_lot::Mutex;
use portal_adapter_email::{EmailMessage, EmailSender};
use portal_adapter_memory::MemoryCache;
use portal_auth_core::TokenService;
use portal_config::{OtpConfig, PortalConfig};
use portal_errors::{AppError, AppResult};
use portal_ports::ManualClock;

/// 按顺序返回预设验证码，用尽后重复最后一个
pub struct SequenceCodeGenerator {
    codes: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl SequenceCodeGenerator {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            last: Mutex::new(codes.last().map(|c| c.to_string()).unwrap_or_default()),
        }
    }
}

impl CodeGenerator for SequenceCodeGenerator {
    fn generate(&self, _length: usize) -> String {
        match self.codes.lock().pop_front() {
            Some(code) => {
                *self.last.lock() = code.clone();
                code
            }
            None => self.last.lock().clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub context: serde_json::Value,
}

/// 记录发送内容的邮件发送器
#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<SentEmail>>,
    pub fail: AtomicBool,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, _message: EmailMessage) -> AppResult<()> {
        Ok(())
    }

    async fn send_template(
        &self,
        to: &str,
        subject: &str,
        template_name: &str,
        context: &serde_json::Value,
    ) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::external_service("SMTP connection refused"));
        }
        self.sent.lock().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            template: template_name.to_string(),
            context: context.clone(),
        });
        Ok(())
    }
}

/// 测试用服务实例
pub struct TestApp {
    pub services: Arc<ServiceContainer>,
    pub clock: ManualClock,
    pub cache: Arc<MemoryCache>,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub profiles: Arc<InMemoryMemberProfileRepository>,
    pub email: Arc<RecordingEmailSender>,
    pub sessions: Arc<TokenSessionManager>,
}

impl TestApp {
    /// 使用随机验证码
    pub fn new() -> Self {
        Self::build(Arc::new(SecureCodeGenerator), OtpConfig::default())
    }

    /// 使用预设验证码
    pub fn with_codes(codes: &[&str]) -> Self {
        Self::build(Arc::new(SequenceCodeGenerator::new(codes)), OtpConfig::default())
    }

    pub fn with_codes_and_config(codes: &[&str], otp: OtpConfig) -> Self {
        Self::build(Arc::new(SequenceCodeGenerator::new(codes)), otp)
    }

    fn build(code_generator: Arc<dyn CodeGenerator>, otp: OtpConfig) -> Self {
        let clock = ManualClock::default();
        let cache = Arc::new(MemoryCache::with_clock(Arc::new(clock.clone())));
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let profiles = Arc::new(InMemoryMemberProfileRepository::new());
        let email = Arc::new(RecordingEmailSender::default());
        let sessions = Arc::new(TokenSessionManager::new(
            Arc::new(TokenService::new("test-secret", 3600, "member-auth", "member-portal").unwrap()),
            cache.clone(),
        ));

        let services = ServiceContainer::new(ServiceDependencies {
            cache: cache.clone(),
            accounts: accounts.clone(),
            profiles: profiles.clone(),
            sessions: sessions.clone(),
            email_sender: Some(email.clone()),
            code_generator,
            clock: Arc::new(clock.clone()),
            otp,
            portal: PortalConfig::default(),
        });

        Self {
            services: Arc::new(services),
            clock,
            cache,
            accounts,
            profiles,
            email,
            sessions,
        }
    }

    pub fn store(&self) -> OtpStore {
        OtpStore::new(self.cache.clone())
    }

    pub fn state(&self) -> AppState {
        AppState {
            services: self.services.clone(),
            metrics: None,
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.clock.advance(chrono::Duration::seconds(secs));
    }
}
