use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// User row as stored. The hash is excluded from serialization so it stays
/// out of JSON even if a raw row ever reaches a response body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub employee_code: Option<String>,
    pub leave_approver: Option<String>,
    pub request_date: Option<OffsetDateTime>,
    pub approver_name: Option<String>,
}

/// Column values for an insert.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub employee_code: Option<String>,
    pub leave_approver: Option<String>,
    pub request_date: Option<OffsetDateTime>,
    pub approver_name: Option<String>,
}

/// Per-column changes for a partial update. `None` leaves the column as is.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
    pub employee_code: Option<String>,
    pub leave_approver: Option<String>,
    pub request_date: Option<OffsetDateTime>,
    pub approver_name: Option<String>,
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, employee_code,
                   leave_approver, request_date, approver_name
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Case-sensitive lookup, used as the uniqueness pre-check.
    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, employee_code,
                   leave_approver, request_date, approver_name
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
    }

    pub async fn list(db: &PgPool, skip: i64, take: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, employee_code,
                   leave_approver, request_date, approver_name
            FROM users
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(take)
        .bind(skip)
        .fetch_all(db)
        .await
    }

    pub async fn insert(db: &PgPool, new: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role, employee_code,
                               leave_approver, request_date, approver_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, password_hash, role, employee_code,
                      leave_approver, request_date, approver_name
            "#,
        )
        .bind(new.username)
        .bind(new.password_hash)
        .bind(new.role)
        .bind(new.employee_code)
        .bind(new.leave_approver)
        .bind(new.request_date)
        .bind(new.approver_name)
        .fetch_one(db)
        .await
    }

    pub async fn update(db: &PgPool, id: i64, changes: UserChanges) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username       = COALESCE($2, username),
                password_hash  = COALESCE($3, password_hash),
                role           = COALESCE($4, role),
                employee_code  = COALESCE($5, employee_code),
                leave_approver = COALESCE($6, leave_approver),
                request_date   = COALESCE($7, request_date),
                approver_name  = COALESCE($8, approver_name)
            WHERE id = $1
            RETURNING id, username, password_hash, role, employee_code,
                      leave_approver, request_date, approver_name
            "#,
        )
        .bind(id)
        .bind(changes.username)
        .bind(changes.password_hash)
        .bind(changes.role)
        .bind(changes.employee_code)
        .bind(changes.leave_approver)
        .bind(changes.request_date)
        .bind(changes.approver_name)
        .fetch_one(db)
        .await
    }

    /// Returns whether a row was actually deleted, so the caller can tell
    /// "removed" apart from "was never there".
    pub async fn delete(db: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let deleted = sqlx::query(r#"DELETE FROM users WHERE id = $1 RETURNING id"#)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(deleted.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "alice".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
            role: "admin".into(),
            employee_code: Some("E-100".into()),
            leave_approver: None,
            request_date: Some(datetime!(2024-01-05 00:00 UTC)),
            approver_name: None,
        }
    }

    #[test]
    fn password_hash_never_serialized() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("alice"));
    }
}
