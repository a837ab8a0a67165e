//! 内存会员档案仓储

use async_trait::async_trait;
use portal_errors::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::domain::member_profile::MemberProfile;
use crate::domain::repositories::MemberProfileRepository;

/// 内存会员档案仓储，按保存顺序匹配
#[derive(Default)]
pub struct InMemoryMemberProfileRepository {
    profiles: RwLock<Vec<MemberProfile>>,
}

impl InMemoryMemberProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberProfileRepository for InMemoryMemberProfileRepository {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<String>> {
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.email_id.as_deref() == Some(email))
            .map(|p| p.user.clone()))
    }

    async fn find_user_by_mobile(&self, mobile: &str) -> AppResult<Option<String>> {
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.mobile_no.as_deref() == Some(mobile))
            .map(|p| p.user.clone()))
    }

    async fn find_by_user(&self, user: &str) -> AppResult<Option<MemberProfile>> {
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.user == user)
            .cloned())
    }

    async fn save(&self, profile: &MemberProfile) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;

        if let Some(mobile) = profile.mobile_no.as_deref() {
            if profiles
                .iter()
                .any(|p| p.id != profile.id && p.mobile_no.as_deref() == Some(mobile))
            {
                return Err(AppError::conflict(format!(
                    "Mobile number {} belongs to another profile",
                    mobile
                )));
            }
        }

        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => profiles.push(profile.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_replaces_by_id() {
        let repo = InMemoryMemberProfileRepository::new();
        repo.save(&MemberProfile::new("MP-1", "u1").with_mobile("111"))
            .await
            .unwrap();
        repo.save(&MemberProfile::new("MP-1", "u1").with_mobile("222"))
            .await
            .unwrap();

        assert_eq!(repo.find_user_by_mobile("111").await.unwrap(), None);
        assert_eq!(repo.find_user_by_mobile("222").await.unwrap().as_deref(), Some("u1"));
        assert_eq!(repo.find_user_by_email("222").await.unwrap(), None);
        assert_eq!(repo.find_by_user("u1").await.unwrap().unwrap().id, "MP-1");
        assert!(repo.find_by_user("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mobile_taken_by_other_profile_conflicts() {
        let repo = InMemoryMemberProfileRepository::new();
        repo.save(&MemberProfile::new("MP-1", "u1").with_mobile("111"))
            .await
            .unwrap();

        let err = repo
            .save(&MemberProfile::new("MP-2", "u2").with_mobile("111"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 409);
        assert!(repo.find_by_user("u2").await.unwrap().is_none());
    }
}
