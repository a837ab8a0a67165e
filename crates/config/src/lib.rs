//! portal-config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

/// Redis 配置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Secret<String>,
}

/// JWT 配置（会话令牌）
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    86400
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 未设置时生产环境输出 JSON
    #[serde(default)]
    pub json_logs: Option<bool>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: None,
        }
    }
}

/// 邮件配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 覆盖内置模板的目录（`otp_code.html` / `otp_code.txt`）
    #[serde(default)]
    pub template_dir: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

/// 一次性验证码配置
#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    /// 验证码位数
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    /// 验证码有效期（秒）
    #[serde(default = "default_code_ttl_secs")]
    pub code_ttl_secs: u64,
    /// 窗口内最多请求次数
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// 限流窗口（秒）
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    /// 不区分“未请求”和“验证码错误”
    #[serde(default)]
    pub uniform_auth_errors: bool,
    /// 邮件发送失败时把验证码写入日志（仅开发环境）
    #[serde(default)]
    pub log_code_on_delivery_failure: bool,
    /// 同一验证码允许的错误次数，达到后作废；0 表示不限
    #[serde(default = "default_max_verify_attempts")]
    pub max_verify_attempts: u32,
}

fn default_max_verify_attempts() -> u32 {
    5
}

fn default_code_length() -> usize {
    6
}

fn default_code_ttl_secs() -> u64 {
    300
}

fn default_max_requests() -> u32 {
    3
}

fn default_rate_limit_window_secs() -> u64 {
    3600
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            code_ttl_secs: default_code_ttl_secs(),
            max_requests: default_max_requests(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            uniform_auth_errors: false,
            log_code_on_delivery_failure: false,
            max_verify_attempts: default_max_verify_attempts(),
        }
    }
}

/// 门户（账号开通、跳转）配置
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// 登录成功后跳转的页面
    #[serde(default = "default_home_page")]
    pub home_page: String,
    /// 新开通账号的占位名
    #[serde(default = "default_placeholder_first_name")]
    pub placeholder_first_name: String,
    /// 手机号开通账号时使用的邮箱域名
    #[serde(default = "default_fallback_email_domain")]
    pub fallback_email_domain: String,
    /// 新开通账号的默认角色
    #[serde(default = "default_role")]
    pub default_role: String,
}

fn default_home_page() -> String {
    "/member_profile".to_string()
}

fn default_placeholder_first_name() -> String {
    "Visitor".to_string()
}

fn default_fallback_email_domain() -> String {
    "example.com".to_string()
}

fn default_role() -> String {
    "Website User".to_string()
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            home_page: default_home_page(),
            placeholder_first_name: default_placeholder_first_name(),
            fallback_email_domain: default_fallback_email_domain(),
            default_role: default_role(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    pub jwt: JwtConfig,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub portal: PortalConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        Self::from_figment(Self::figment(config_dir, &env))
    }

    /// 配置来源：默认文件 → 环境文件 → `PORTAL_` 前缀环境变量
    pub fn figment(config_dir: &str, env: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("PORTAL_").split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
