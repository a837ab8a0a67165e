//! 账号服务
//!
//! 身份解析之后的账号开通、密码设置与密码登录

use std::sync::Arc;

use portal_errors::{AppError, AppResult};
use portal_ports::Clock;
use tracing::{debug, info, warn};

use crate::domain::account::{Account, AccountDefaults};
use crate::domain::password::{HashedPassword, Password};
use crate::domain::repositories::{AccountRepository, MemberProfileRepository};
use crate::domain::services::identity_resolver::{IdentityResolver, ResolvedIdentity};

/// 密码登录失败时的统一提示
pub const INVALID_CREDENTIALS: &str = "Invalid email/mobile or password";

/// 账号服务
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    resolver: IdentityResolver,
    defaults: AccountDefaults,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        profiles: Arc<dyn MemberProfileRepository>,
        defaults: AccountDefaults,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(accounts.clone(), profiles),
            accounts,
            defaults,
            clock,
        }
    }

    /// 替换身份解析器（自定义解析顺序）
    pub fn with_resolver(mut self, resolver: IdentityResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub async fn resolve(&self, identifier: &str) -> AppResult<ResolvedIdentity> {
        self.resolver.resolve(identifier).await
    }

    /// 验证码通过后的登录准备
    ///
    /// 解析账号；账号不存在时开通新账号；提供了新密码时写入密码哈希。
    /// 返回账号以及是否新开通。
    pub async fn sign_in_verified(
        &self,
        identifier: &str,
        new_password: Option<&Password>,
    ) -> AppResult<(Account, bool)> {
        let resolved = self.resolver.resolve(identifier).await?;
        let now = self.clock.now();

        let password_hash = new_password.map(HashedPassword::from_password).transpose()?;

        match self.accounts.find_by_id(&resolved.account_id).await? {
            Some(mut account) => {
                if !account.enabled {
                    warn!(account_id = %account.id, "Disabled account attempted OTP login");
                    return Err(AppError::unauthenticated("Account is disabled"));
                }
                if let Some(hash) = password_hash {
                    account.set_password(hash, now);
                    self.accounts.update(&account).await?;
                    info!(account_id = %account.id, "Password updated during OTP login");
                }
                Ok((account, false))
            }
            None => {
                let mut account = Account::provision(&resolved.account_id, &self.defaults, now);
                if let Some(hash) = password_hash {
                    account.set_password(hash, now);
                }

                match self.accounts.create(&account).await {
                    Ok(()) => {
                        info!(
                            account_id = %account.id,
                            password_set = account.has_password(),
                            "Account provisioned"
                        );
                        Ok((account, true))
                    }
                    // 并发请求已先一步开通
                    Err(AppError::Conflict(_)) => {
                        debug!(account_id = %account.id, "Account created concurrently, reloading");
                        let mut existing = self
                            .accounts
                            .find_by_id(&account.id)
                            .await?
                            .ok_or_else(|| AppError::internal("Account vanished after conflict"))?;
                        if let Some(hash) = account.password_hash {
                            existing.set_password(hash, now);
                            self.accounts.update(&existing).await?;
                        }
                        Ok((existing, false))
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// 密码登录
    ///
    /// 账号不存在、被禁用、未设置密码或密码错误都返回同一错误。
    pub async fn authenticate_with_password(
        &self,
        identifier: &str,
        password: &str,
    ) -> AppResult<Account> {
        let resolved = self.resolver.resolve(identifier).await?;

        let Some(account) = self.accounts.find_by_id(&resolved.account_id).await? else {
            debug!(identifier = %identifier, "Password login for unknown account");
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
        };

        if !account.enabled {
            debug!(account_id = %account.id, "Password login for disabled account");
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
        }

        let Some(hash) = &account.password_hash else {
            debug!(account_id = %account.id, "Password login for account without password");
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
        };

        match hash.verify(password) {
            Ok(true) => Ok(account),
            Ok(false) => Err(AppError::unauthenticated(INVALID_CREDENTIALS)),
            Err(e) => {
                warn!(account_id = %account.id, error = %e, "Stored password hash is unreadable");
                Err(AppError::unauthenticated(INVALID_CREDENTIALS))
            }
        }
    }

    /// 修改密码
    pub async fn change_password(&self, account_id: &str, new_password: &Password) -> AppResult<()> {
        let mut account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account not found"))?;

        account.set_password(HashedPassword::from_password(new_password)?, self.clock.now());
        self.accounts.update(&account).await?;

        info!(account_id = %account_id, "Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member_profile::MemberProfile;
    use crate::infrastructure::persistence::{InMemoryAccountRepository, InMemoryMemberProfileRepository};
    use portal_ports::ManualClock;

    fn service() -> (AccountService, Arc<InMemoryAccountRepository>, Arc<InMemoryMemberProfileRepository>) {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let profiles = Arc::new(InMemoryMemberProfileRepository::new());
        let service = AccountService::new(
            accounts.clone(),
            profiles.clone(),
            AccountDefaults::default(),
            Arc::new(ManualClock::default()),
        );
        (service, accounts, profiles)
    }

    #[tokio::test]
    async fn test_provisions_missing_account() {
        let (service, accounts, _) = service();

        let (account, created) = service.sign_in_verified("new@example.com", None).await.unwrap();

        assert!(created);
        assert_eq!(account.first_name, "Visitor");
        assert!(accounts.exists("new@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_sets_password_on_existing_account() {
        let (service, accounts, _) = service();
        service.sign_in_verified("member@example.com", None).await.unwrap();

        let password = Password::new("new-password-1").unwrap();
        let (account, created) = service
            .sign_in_verified("member@example.com", Some(&password))
            .await
            .unwrap();

        assert!(!created);
        assert!(account.has_password());
        let stored = accounts.find_by_id("member@example.com").await.unwrap().unwrap();
        assert!(stored.password_hash.unwrap().verify("new-password-1").unwrap());
    }

    #[tokio::test]
    async fn test_linked_profile_signs_into_owner() {
        let (service, _, profiles) = service();
        service.sign_in_verified("owner@example.com", None).await.unwrap();
        profiles
            .save(&MemberProfile::new("MP-1", "owner@example.com").with_mobile("5551234567"))
            .await
            .unwrap();

        let (account, created) = service.sign_in_verified("5551234567", None).await.unwrap();
        assert!(!created);
        assert_eq!(account.id, "owner@example.com");
    }

    #[tokio::test]
    async fn test_disabled_account_rejected() {
        let (service, accounts, _) = service();
        let (mut account, _) = service.sign_in_verified("off@example.com", None).await.unwrap();
        account.enabled = false;
        accounts.update(&account).await.unwrap();

        let err = service.sign_in_verified("off@example.com", None).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_password_login_failures_are_indistinguishable() {
        let (service, accounts, _) = service();
        let password = Password::new("hunter2hunter2").unwrap();
        service.sign_in_verified("pw@example.com", Some(&password)).await.unwrap();
        service.sign_in_verified("nopw@example.com", None).await.unwrap();
        let (mut disabled, _) = service
            .sign_in_verified("off@example.com", Some(&password))
            .await
            .unwrap();
        disabled.enabled = false;
        accounts.update(&disabled).await.unwrap();

        for (identifier, attempt) in [
            ("missing@example.com", "hunter2hunter2"),
            ("nopw@example.com", "hunter2hunter2"),
            ("off@example.com", "hunter2hunter2"),
            ("pw@example.com", "wrong-password"),
        ] {
            let err = service
                .authenticate_with_password(identifier, attempt)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), format!("Unauthenticated: {INVALID_CREDENTIALS}"));
        }

        let account = service
            .authenticate_with_password("pw@example.com", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(account.id, "pw@example.com");
    }

    #[tokio::test]
    async fn test_change_password_unknown_account() {
        let (service, _, _) = service();
        let password = Password::new("whatever-123").unwrap();
        let err = service.change_password("ghost", &password).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
