//! 邮件模板系统

use portal_errors::{AppError, AppResult};
use std::collections::HashMap;
use tera::Tera;
use tracing::debug;

/// 验证码邮件（HTML）
pub const OTP_CODE_HTML: &str = r#"<div style="font-family: sans-serif; padding: 20px;">
  <h2>Verification Code</h2>
  <p>Your one-time password (OTP) is: <strong style="font-size: 24px; color: #1a73e8;">{{ code }}</strong></p>
  <p>This code is valid for {{ expires_in_minutes }} minutes. Do not share it with anyone.</p>
  <hr>
  <p style="font-size: 12px; color: #777;">If you did not request this code, please ignore this email.</p>
</div>
"#;

/// 验证码邮件（纯文本）
pub const OTP_CODE_TEXT: &str = "Your one-time password (OTP) is: {{ code }}

This code is valid for {{ expires_in_minutes }} minutes. Do not share it with anyone.

If you did not request this code, please ignore this email.
";

/// 邮件模板管理器
pub struct EmailTemplate {
    tera: Tera,
}

impl EmailTemplate {
    /// 从目录加载模板
    pub fn new(template_dir: &str) -> AppResult<Self> {
        let pattern = format!("{}/**/*", template_dir);
        let mut tera = Tera::new(&pattern)
            .map_err(|e| AppError::internal(format!("Failed to load email templates: {}", e)))?;
        Self::register_builtin(&mut tera)?;

        debug!(template_dir = %template_dir, "Email templates loaded");

        Ok(Self { tera })
    }

    /// 仅包含内置模板
    pub fn builtin() -> AppResult<Self> {
        let mut tera = Tera::default();
        Self::register_builtin(&mut tera)?;
        Ok(Self { tera })
    }

    /// 从内存中的模板字符串创建（用于测试）
    pub fn from_strings(templates: HashMap<String, String>) -> AppResult<Self> {
        let mut tera = Tera::default();

        for (name, content) in templates {
            tera.add_raw_template(&name, &content).map_err(|e| {
                AppError::internal(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        Ok(Self { tera })
    }

    /// 目录中同名模板优先于内置模板
    fn register_builtin(tera: &mut Tera) -> AppResult<()> {
        let names: Vec<String> = tera.get_template_names().map(str::to_string).collect();
        for (name, content) in [("otp_code.html", OTP_CODE_HTML), ("otp_code.txt", OTP_CODE_TEXT)] {
            if names.iter().any(|n| n == name) {
                continue;
            }
            tera.add_raw_template(name, content).map_err(|e| {
                AppError::internal(format!("Failed to add template {}: {}", name, e))
            })?;
        }
        Ok(())
    }

    /// 是否存在指定模板
    pub fn has_template(&self, template_name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == template_name)
    }

    /// 渲染模板
    pub fn render(&self, template_name: &str, context: &serde_json::Value) -> AppResult<String> {
        let context = tera::Context::from_serialize(context)
            .map_err(|e| AppError::internal(format!("Failed to create template context: {}", e)))?;

        self.tera.render(template_name, &context).map_err(|e| {
            AppError::internal(format!(
                "Failed to render template {}: {}",
                template_name, e
            ))
        })
    }

    /// 渲染 `{name}.html`，存在 `{name}.txt` 时一并渲染纯文本版本
    pub fn render_pair(
        &self,
        name: &str,
        context: &serde_json::Value,
    ) -> AppResult<(String, Option<String>)> {
        let html = self.render(&format!("{}.html", name), context)?;
        let text_name = format!("{}.txt", name);
        let text = if self.has_template(&text_name) {
            Some(self.render(&text_name, context)?)
        } else {
            None
        };
        Ok((html, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_from_strings() {
        let mut templates = HashMap::new();
        templates.insert(
            "test.html".to_string(),
            "<h1>Hello {{ name }}!</h1>".to_string(),
        );

        let template = EmailTemplate::from_strings(templates).unwrap();

        let context = serde_json::json!({
            "name": "World"
        });

        let result = template.render("test.html", &context).unwrap();
        assert_eq!(result, "<h1>Hello World!</h1>");
    }

    #[test]
    fn test_builtin_otp_template() {
        let template = EmailTemplate::builtin().unwrap();
        let context = serde_json::json!({ "code": "042917", "expires_in_minutes": 5 });

        let (html, text) = template.render_pair("otp_code", &context).unwrap();

        assert!(html.contains("042917"));
        assert!(html.contains("valid for 5 minutes"));
        let text = text.unwrap();
        assert!(text.contains("042917"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_render_pair_without_text_variant() {
        let mut templates = HashMap::new();
        templates.insert("notice.html".to_string(), "<p>{{ msg }}</p>".to_string());
        let template = EmailTemplate::from_strings(templates).unwrap();

        let (html, text) = template
            .render_pair("notice", &serde_json::json!({ "msg": "hi" }))
            .unwrap();
        assert_eq!(html, "<p>hi</p>");
        assert!(text.is_none());
    }

    #[test]
    fn test_missing_template_is_error() {
        let template = EmailTemplate::builtin().unwrap();
        assert!(template.render("nope.html", &serde_json::json!({})).is_err());
    }
}
