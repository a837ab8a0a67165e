//! 会员档案
//!
//! 每个账号至多一份档案；档案中的邮箱、手机号用于把其他标识解析到该账号。

use chrono::NaiveDate;

/// 会员档案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub id: String,
    /// 关联账号 ID
    pub user: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub email_id: Option<String>,
    pub mobile_no: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// 档案修改：`None` 表示未提交该字段，提交空字符串表示清空
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub email_id: Option<String>,
    pub mobile_no: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl ProfileChanges {
    /// 提交了非空手机号时返回该号码
    pub fn mobile(&self) -> Option<&str> {
        self.mobile_no.as_deref().filter(|m| !m.is_empty())
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl MemberProfile {
    pub fn new(id: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user: user.into(),
            first_name: None,
            middle_name: None,
            last_name: None,
            gender: None,
            email_id: None,
            mobile_no: None,
            date_of_birth: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email_id = Some(email.into());
        self
    }

    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile_no = Some(mobile.into());
        self
    }

    /// 合并提交的字段，`id` 与 `user` 不可修改
    pub fn apply(&mut self, changes: &ProfileChanges) {
        let text_fields = [
            (&mut self.first_name, &changes.first_name),
            (&mut self.middle_name, &changes.middle_name),
            (&mut self.last_name, &changes.last_name),
            (&mut self.gender, &changes.gender),
            (&mut self.email_id, &changes.email_id),
            (&mut self.mobile_no, &changes.mobile_no),
        ];
        for (field, change) in text_fields {
            if let Some(value) = change {
                *field = non_empty(value);
            }
        }
        if changes.date_of_birth.is_some() {
            self.date_of_birth = changes.date_of_birth;
        }
    }
}
