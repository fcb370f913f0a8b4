//! Staff repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserQuery, UserStats},
};

fn email_taken(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict("A staff member with this email already exists".to_string())
        }
        other => AppError::Database(other),
    }
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List staff, newest first
    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR role = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(query.role)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))
    }

    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, full_name, role, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.email.trim().to_lowercase())
        .bind(data.full_name.trim())
        .bind(data.role)
        .bind(data.phone.as_deref().map(str::trim))
        .fetch_one(&self.pool)
        .await
        .map_err(email_taken)
    }

    /// Partially update a staff member
    pub async fn update(&self, id: i32, data: &UpdateUser) -> AppResult<User> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.email, "email");
        add_field!(data.full_name, "full_name");
        add_field!(data.phone, "phone");
        add_field!(data.role, "role");

        let query = format!(
            "UPDATE users SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, User>(&query).bind(now);
        if let Some(ref email) = data.email {
            builder = builder.bind(email.trim().to_lowercase());
        }
        if let Some(ref full_name) = data.full_name {
            builder = builder.bind(full_name.trim().to_string());
        }
        if let Some(ref phone) = data.phone {
            builder = builder.bind(phone.trim().to_string());
        }
        if let Some(role) = data.role {
            builder = builder.bind(role);
        }

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(email_taken)?
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))
    }

    /// Delete a staff member who has no recorded activity
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => AppError::Conflict(
                    format!("Staff member {} has recorded scans or patrols", id),
                ),
                other => AppError::Database(other),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Staff member {} not found", id)));
        }
        Ok(())
    }

    /// Activity counters of one staff member
    pub async fn stats(&self, id: i32) -> AppResult<UserStats> {
        sqlx::query_as::<_, UserStats>(
            r#"
            SELECT u.id AS user_id,
                   (SELECT COUNT(*) FROM scans s WHERE s.user_id = u.id) AS total_scans,
                   (SELECT COUNT(*) FROM patrol_sessions ps WHERE ps.user_id = u.id) AS total_sessions,
                   (SELECT MAX(s.scan_time) FROM scans s WHERE s.user_id = u.id) AS last_scan,
                   (SELECT COUNT(*) FROM scans s
                    WHERE s.user_id = u.id AND s.scan_time >= NOW() - INTERVAL '30 days') AS scans_last_30_days
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))
    }
}
