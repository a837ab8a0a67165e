//! PostgreSQL 会员档案仓储实现

use async_trait::async_trait;
use chrono::NaiveDate;
use portal_errors::{AppError, AppResult};
use sqlx::PgPool;
use tracing::warn;

use crate::domain::member_profile::MemberProfile;
use crate::domain::repositories::MemberProfileRepository;

/// 数据库行模型
#[derive(sqlx::FromRow)]
struct MemberProfileRow {
    id: String,
    user_id: String,
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    gender: Option<String>,
    email_id: Option<String>,
    mobile_no: Option<String>,
    date_of_birth: Option<NaiveDate>,
}

impl From<MemberProfileRow> for MemberProfile {
    fn from(row: MemberProfileRow) -> Self {
        MemberProfile {
            id: row.id,
            user: row.user_id,
            first_name: row.first_name,
            middle_name: row.middle_name,
            last_name: row.last_name,
            gender: row.gender,
            email_id: row.email_id,
            mobile_no: row.mobile_no,
            date_of_birth: row.date_of_birth,
        }
    }
}

/// PostgreSQL 会员档案仓储
pub struct PostgresMemberProfileRepository {
    pool: PgPool,
}

impl PostgresMemberProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_user_by(&self, column_query: &str, value: &str) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, String>(column_query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to look up member profile");
                AppError::database(format!("Failed to look up member profile: {}", e))
            })
    }
}

#[async_trait]
impl MemberProfileRepository for PostgresMemberProfileRepository {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<String>> {
        self.find_user_by(
            "SELECT user_id FROM member_profiles WHERE email_id = $1 ORDER BY created_at LIMIT 1",
            email,
        )
        .await
    }

    async fn find_user_by_mobile(&self, mobile: &str) -> AppResult<Option<String>> {
        self.find_user_by(
            "SELECT user_id FROM member_profiles WHERE mobile_no = $1 ORDER BY created_at LIMIT 1",
            mobile,
        )
        .await
    }

    async fn find_by_user(&self, user: &str) -> AppResult<Option<MemberProfile>> {
        let row = sqlx::query_as::<_, MemberProfileRow>(
            r#"
            SELECT id, user_id, first_name, middle_name, last_name, gender,
                   email_id, mobile_no, date_of_birth
            FROM member_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to find member profile");
            AppError::database(format!("Failed to find member profile: {}", e))
        })?;

        Ok(row.map(MemberProfile::from))
    }

    async fn save(&self, profile: &MemberProfile) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO member_profiles (
                id, user_id, first_name, middle_name, last_name, gender,
                email_id, mobile_no, date_of_birth
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE
            SET user_id = EXCLUDED.user_id,
                first_name = EXCLUDED.first_name,
                middle_name = EXCLUDED.middle_name,
                last_name = EXCLUDED.last_name,
                gender = EXCLUDED.gender,
                email_id = EXCLUDED.email_id,
                mobile_no = EXCLUDED.mobile_no,
                date_of_birth = EXCLUDED.date_of_birth,
                updated_at = NOW()
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.user)
        .bind(&profile.first_name)
        .bind(&profile.middle_name)
        .bind(&profile.last_name)
        .bind(&profile.gender)
        .bind(&profile.email_id)
        .bind(&profile.mobile_no)
        .bind(profile.date_of_birth)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::conflict(
                format!("Member profile {} conflicts with an existing profile", profile.id),
            )),
            Err(e) => {
                warn!(error = %e, "Failed to save member profile");
                Err(AppError::database(format!("Failed to save member profile: {}", e)))
            }
        }
    }
}
