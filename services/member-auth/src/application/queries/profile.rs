//! 会员档案查询

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::Query;
use crate::domain::member_profile::MemberProfile;

/// 读取当前账号的档案
#[derive(Debug, Clone)]
pub struct GetMemberProfileQuery {
    pub access_token: String,
}

impl Query for GetMemberProfileQuery {
    type Result = MemberProfileView;
}

/// 档案视图，尚未保存过档案时各文本字段为空字符串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfileView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub user: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub gender: String,
    pub email_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl MemberProfileView {
    pub fn blank(user: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: None,
            user: user.into(),
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            gender: String::new(),
            email_id: email.into(),
            mobile_no: None,
            date_of_birth: None,
        }
    }
}

impl From<MemberProfile> for MemberProfileView {
    fn from(profile: MemberProfile) -> Self {
        Self {
            name: Some(profile.id),
            user: profile.user,
            first_name: profile.first_name.unwrap_or_default(),
            middle_name: profile.middle_name.unwrap_or_default(),
            last_name: profile.last_name.unwrap_or_default(),
            gender: profile.gender.unwrap_or_default(),
            email_id: profile.email_id.unwrap_or_default(),
            mobile_no: profile.mobile_no,
            date_of_birth: profile.date_of_birth,
        }
    }
}
