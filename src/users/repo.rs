use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::model::User;

const USER_COLUMNS: &str = r#"
    id, first_name, last_name, email, password_hash, profile_image, role,
    is_email_verified, email_verification_token, email_verification_expires,
    password_reset_token, password_reset_expires, refresh_token, google_id,
    last_login, is_active, created_at, updated_at
"#;

/// Fields needed to insert a fresh (unverified) user.
pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub profile_image: Option<&'a str>,
    pub verification_token: &'a str,
    pub verification_expires: OffsetDateTime,
}

impl User {
    pub async fn create(db: &PgPool, new: NewUser<'_>) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (first_name, last_name, email, password_hash, profile_image,
                 email_verification_token, email_verification_expires)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.profile_image)
        .bind(new.verification_token)
        .bind(new.verification_expires)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Token lookups compare expiry against the database clock, strictly:
    /// a token presented exactly at its expiry instant is already expired.
    pub async fn find_by_valid_verification_token(
        db: &PgPool,
        token: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE email_verification_token = $1 AND email_verification_expires > now()
            "#
        ))
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_valid_reset_token(
        db: &PgPool,
        token: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE password_reset_token = $1 AND password_reset_expires > now()
            "#
        ))
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Consumes the verification token: sets the flag and clears both token
    /// fields in one statement (single-use).
    pub async fn mark_email_verified(db: &PgPool, id: Uuid) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET is_email_verified = TRUE,
                email_verification_token = NULL,
                email_verification_expires = NULL,
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Overwrites the single refresh-token slot and stamps the login time.
    pub async fn store_login(db: &PgPool, id: Uuid, refresh_token: &str) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET refresh_token = $2, last_login = now(), updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(refresh_token)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Compare-and-swap rotation: the update only lands if the stored token
    /// is still the one the client presented, so two concurrent refresh
    /// calls cannot both succeed.
    pub async fn rotate_refresh_token(
        db: &PgPool,
        old_token: &str,
        new_token: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET refresh_token = $2, updated_at = now()
            WHERE refresh_token = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(old_token)
        .bind(new_token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn clear_refresh_token(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET refresh_token = NULL, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_reset_token(
        db: &PgPool,
        id: Uuid,
        token: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_reset_token = $2, password_reset_expires = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Stores the new hash, consumes the reset token, and clears the refresh
    /// token so every existing session has to log in again.
    pub async fn reset_password(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                password_reset_token = NULL,
                password_reset_expires = NULL,
                refresh_token = NULL,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        password_hash: Option<&str>,
        profile_image: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                password_hash = COALESCE($4, password_hash),
                profile_image = COALESCE($5, profile_image),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(password_hash)
        .bind(profile_image)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Paginated listing with an optional case-insensitive search over
    /// names and email. Returns the page plus the total match count.
    pub async fn list(
        db: &PgPool,
        limit: i64,
        offset: i64,
        search: &str,
    ) -> anyhow::Result<(Vec<User>, i64)> {
        let pattern = format!("%{search}%");
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE first_name ILIKE $1 OR last_name ILIKE $1 OR email ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE first_name ILIKE $1 OR last_name ILIKE $1 OR email ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(db)
        .await?;

        Ok((users, total))
    }

    pub async fn deactivate(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(db)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
