//! 账号实体

use chrono::{DateTime, NaiveDate, Utc};
use portal_config::PortalConfig;

use crate::domain::member_profile::ProfileChanges;
use crate::domain::password::HashedPassword;

/// 自助开通账号的用户类型
pub const WEBSITE_USER: &str = "Website User";

/// 门户账号，ID 即解析后的标识
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub mobile_no: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub enabled: bool,
    pub user_type: String,
    pub roles: Vec<String>,
    pub password_hash: Option<HashedPassword>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新账号默认值
#[derive(Debug, Clone)]
pub struct AccountDefaults {
    pub first_name: String,
    pub fallback_email_domain: String,
    pub role: String,
}

impl From<&PortalConfig> for AccountDefaults {
    fn from(config: &PortalConfig) -> Self {
        Self {
            first_name: config.placeholder_first_name.clone(),
            fallback_email_domain: config.fallback_email_domain.clone(),
            role: config.default_role.clone(),
        }
    }
}

impl Default for AccountDefaults {
    fn default() -> Self {
        Self::from(&PortalConfig::default())
    }
}

impl Account {
    /// 首次验证通过时开通账号
    ///
    /// 标识不是邮箱时使用 `{id}@{fallback_email_domain}` 作为邮箱。
    pub fn provision(id: &str, defaults: &AccountDefaults, now: DateTime<Utc>) -> Self {
        let email = if id.contains('@') {
            id.to_string()
        } else {
            format!("{}@{}", id, defaults.fallback_email_domain)
        };

        Self {
            id: id.to_string(),
            email,
            first_name: defaults.first_name.clone(),
            last_name: None,
            gender: None,
            mobile_no: None,
            birth_date: None,
            enabled: true,
            user_type: WEBSITE_USER.to_string(),
            roles: vec![defaults.role.clone()],
            password_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_password(&mut self, hash: HashedPassword, now: DateTime<Utc>) {
        self.password_hash = Some(hash);
        self.updated_at = now;
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// 把档案中提交的姓名、性别、手机号、生日同步到账号，返回是否有变化
    ///
    /// 名字为必填，提交空名字时保留原值。
    pub fn sync_from_profile(&mut self, changes: &ProfileChanges, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        if let Some(first_name) = changes.first_name.as_deref().filter(|n| !n.is_empty()) {
            if self.first_name != first_name {
                self.first_name = first_name.to_string();
                changed = true;
            }
        }

        let optional_fields = [
            (&mut self.last_name, &changes.last_name),
            (&mut self.gender, &changes.gender),
            (&mut self.mobile_no, &changes.mobile_no),
        ];
        for (field, change) in optional_fields {
            let Some(value) = change else { continue };
            let value = (!value.is_empty()).then(|| value.clone());
            if *field != value {
                *field = value;
                changed = true;
            }
        }

        if changes.date_of_birth.is_some() && self.birth_date != changes.date_of_birth {
            self.birth_date = changes.date_of_birth;
            changed = true;
        }

        if changed {
            self.updated_at = now;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provision_email_identifier() {
        let now = Utc::now();
        let account = Account::provision("user@example.com", &AccountDefaults::default(), now);

        assert_eq!(account.id, "user@example.com");
        assert_eq!(account.email, "user@example.com");
        assert_eq!(account.first_name, "Visitor");
        assert!(account.enabled);
        assert_eq!(account.user_type, WEBSITE_USER);
        assert_eq!(account.roles, vec!["Website User".to_string()]);
        assert!(!account.has_password());
    }

    #[test]
    fn test_provision_phone_identifier_gets_fallback_email() {
        let defaults = AccountDefaults {
            first_name: "Guest".to_string(),
            fallback_email_domain: "members.local".to_string(),
            role: "Member".to_string(),
        };
        let account = Account::provision("9998887777", &defaults, Utc::now());

        assert_eq!(account.email, "9998887777@members.local");
        assert_eq!(account.first_name, "Guest");
        assert_eq!(account.roles, vec!["Member".to_string()]);
    }

    #[test]
    fn test_sync_from_profile_maps_fields() {
        let created = Utc::now();
        let mut account = Account::provision("9998887777", &AccountDefaults::default(), created);
        let later = created + chrono::Duration::seconds(10);

        let changed = account.sync_from_profile(
            &ProfileChanges {
                first_name: Some("Meera".to_string()),
                last_name: Some("Iyer".to_string()),
                mobile_no: Some("9998887777".to_string()),
                date_of_birth: NaiveDate::from_ymd_opt(1985, 12, 31),
                middle_name: Some("K".to_string()),
                ..Default::default()
            },
            later,
        );

        assert!(changed);
        assert_eq!(account.first_name, "Meera");
        assert_eq!(account.last_name.as_deref(), Some("Iyer"));
        assert_eq!(account.mobile_no.as_deref(), Some("9998887777"));
        assert_eq!(account.birth_date, NaiveDate::from_ymd_opt(1985, 12, 31));
        assert_eq!(account.updated_at, later);
    }

    #[test]
    fn test_sync_without_differences_is_noop() {
        let now = Utc::now();
        let mut account = Account::provision("user@example.com", &AccountDefaults::default(), now);

        let changed = account.sync_from_profile(
            &ProfileChanges {
                first_name: Some(String::new()),
                email_id: Some("other@example.com".to_string()),
                ..Default::default()
            },
            now + chrono::Duration::seconds(5),
        );

        assert!(!changed);
        assert_eq!(account.first_name, "Visitor");
        assert_eq!(account.updated_at, now);
    }
}
