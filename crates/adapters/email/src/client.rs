//! SMTP 客户端

use crate::{EmailConfig, EmailMessage, EmailSender, EmailTemplate};
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use portal_errors::{AppError, AppResult};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, info};

/// 基于 lettre 异步传输的邮件客户端，传输层在创建时构建一次
pub struct EmailClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    templates: EmailTemplate,
}

impl EmailClient {
    pub fn new(config: &EmailConfig, templates: EmailTemplate) -> AppResult<Self> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid sender address: {}", e)))?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| AppError::internal(format!("Invalid SMTP relay: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self {
            transport,
            from,
            templates,
        })
    }

    fn compose(&self, message: &EmailMessage) -> AppResult<Message> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| AppError::validation(format!("Invalid recipient address: {}", e)))?;

        let text = SinglePart::builder()
            .header(header::ContentType::TEXT_PLAIN)
            .body(message.text_body.clone());

        let body = match &message.html_body {
            Some(html) => MultiPart::alternative().singlepart(text).singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_HTML)
                    .body(html.clone()),
            ),
            None => MultiPart::mixed().singlepart(text),
        };

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .multipart(body)
            .map_err(|e| AppError::internal(format!("Failed to compose email: {}", e)))
    }
}

#[async_trait::async_trait]
impl EmailSender for EmailClient {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        let email = self.compose(&message)?;
        debug!(to = %message.to, subject = %message.subject, "Sending email");

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::external_service(format!("SMTP delivery failed: {}", e)))?;

        info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }

    async fn send_template(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        context: &serde_json::Value,
    ) -> AppResult<()> {
        let (html, text) = self.templates.render_pair(template, context)?;
        let text = text.unwrap_or_else(|| html.clone());

        self.send(EmailMessage::text(to, subject, text).with_html(html))
            .await
    }
}
