//! 仓储接口

use async_trait::async_trait;
use portal_errors::AppResult;

use crate::domain::account::Account;
use crate::domain::member_profile::MemberProfile;

/// 账号仓储
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Account>>;

    async fn exists(&self, id: &str) -> AppResult<bool>;

    /// 创建账号，ID 已存在时返回 Conflict
    async fn create(&self, account: &Account) -> AppResult<()>;

    /// 更新账号，不存在时返回 NotFound
    async fn update(&self, account: &Account) -> AppResult<()>;
}

/// 会员档案仓储
#[async_trait]
pub trait MemberProfileRepository: Send + Sync {
    /// 按档案邮箱查找关联账号 ID
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<String>>;

    /// 按档案手机号查找关联账号 ID
    async fn find_user_by_mobile(&self, mobile: &str) -> AppResult<Option<String>>;

    /// 查找账号自己的档案
    async fn find_by_user(&self, user: &str) -> AppResult<Option<MemberProfile>>;

    /// 保存档案，手机号已被其他档案占用时返回 Conflict
    async fn save(&self, profile: &MemberProfile) -> AppResult<()>;
}
