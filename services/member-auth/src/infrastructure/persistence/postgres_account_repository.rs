//! PostgreSQL 账号仓储实现

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use portal_errors::{AppError, AppResult};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::domain::account::Account;
use crate::domain::password::HashedPassword;
use crate::domain::repositories::AccountRepository;

/// PostgreSQL 账号仓储
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 数据库行模型
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    email: String,
    first_name: String,
    last_name: Option<String>,
    gender: Option<String>,
    mobile_no: Option<String>,
    birth_date: Option<NaiveDate>,
    enabled: bool,
    user_type: String,
    roles: Vec<String>,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            gender: row.gender,
            mobile_no: row.mobile_no,
            birth_date: row.birth_date,
            enabled: row.enabled,
            user_type: row.user_type,
            roles: row.roles,
            password_hash: row.password_hash.map(HashedPassword::from_hash),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Account>> {
        debug!(account_id = %id, "Finding account by ID");

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, first_name, last_name, gender, mobile_no, birth_date,
                   enabled, user_type, roles, password_hash, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to find account");
            AppError::database(format!("Failed to find account: {}", e))
        })?;

        Ok(row.map(Account::from))
    }

    async fn exists(&self, id: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check account existence: {}", e)))
    }

    async fn create(&self, account: &Account) -> AppResult<()> {
        debug!(account_id = %account.id, "Creating account");

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (
                id, email, first_name, last_name, gender, mobile_no, birth_date,
                enabled, user_type, roles, password_hash, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.gender)
        .bind(&account.mobile_no)
        .bind(account.birth_date)
        .bind(account.enabled)
        .bind(&account.user_type)
        .bind(&account.roles)
        .bind(account.password_hash.as_ref().map(HashedPassword::as_str))
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::conflict(
                format!("Account {} already exists", account.id),
            )),
            Err(e) => {
                warn!(error = %e, "Failed to create account");
                Err(AppError::database(format!("Failed to create account: {}", e)))
            }
        }
    }

    async fn update(&self, account: &Account) -> AppResult<()> {
        debug!(account_id = %account.id, "Updating account");

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET email = $2, first_name = $3, last_name = $4, gender = $5,
                mobile_no = $6, birth_date = $7, enabled = $8, user_type = $9,
                roles = $10, password_hash = $11, updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.gender)
        .bind(&account.mobile_no)
        .bind(account.birth_date)
        .bind(account.enabled)
        .bind(&account.user_type)
        .bind(&account.roles)
        .bind(account.password_hash.as_ref().map(HashedPassword::as_str))
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to update account");
            AppError::database(format!("Failed to update account: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Account {} not found", account.id)));
        }

        Ok(())
    }
}
