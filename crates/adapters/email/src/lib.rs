//! Email 适配器：SMTP 发送与 tera 模板

mod client;
mod template;

pub use client::EmailClient;
pub use portal_config::EmailConfig;
pub use template::{EmailTemplate, OTP_CODE_HTML, OTP_CODE_TEXT};

use portal_errors::AppResult;

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
}

impl EmailMessage {
    pub fn text(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text_body: body.into(),
            html_body: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }
}

/// 邮件发送接口
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    /// 发送一封已组装好的邮件
    async fn send(&self, message: EmailMessage) -> AppResult<()>;

    /// 渲染 `{template}.html`（以及可选的 `{template}.txt`）后发送
    async fn send_template(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        context: &serde_json::Value,
    ) -> AppResult<()>;
}
