//! The user lifecycle: validation, uniqueness pre-checks, credential
//! hashing and date normalization around single store calls.

use sqlx::PgPool;
use time::{format_description::well_known::Rfc3339, Date, OffsetDateTime};
use tracing::{info, warn};

use super::dto::{ListQuery, UserPayload};
use super::password::hash_password;
use super::repo::{NewUser, User, UserChanges};
use crate::error::ApiError;

/// Parses a path identifier. Anything that is not a plain integer is a
/// client fault, surfaced as 400 at the boundary.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::validation("invalid id"))
}

/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date, the latter
/// taken as midnight UTC.
pub fn parse_request_date(raw: &str) -> Result<OffsetDateTime, ApiError> {
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts);
    }
    let date_only = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(raw, date_only)
        .map(|d| d.midnight().assume_utc())
        .map_err(|_| ApiError::validation("invalid request_date"))
}

pub async fn create_user(db: &PgPool, payload: UserPayload) -> Result<User, ApiError> {
    let (Some(username), Some(password), Some(role)) =
        (payload.username, payload.password, payload.role)
    else {
        return Err(ApiError::validation(
            "username, password and role are required",
        ));
    };

    if User::find_by_username(db, &username).await?.is_some() {
        warn!(%username, "create rejected, username taken");
        return Err(ApiError::conflict("username already exists"));
    }

    let request_date = payload
        .request_date
        .as_deref()
        .map(parse_request_date)
        .transpose()?;

    let password_hash = hash_password(&password)?;
    let user = User::insert(
        db,
        NewUser {
            username,
            password_hash,
            role,
            employee_code: payload.employee_code,
            leave_approver: payload.leave_approver,
            request_date,
            approver_name: payload.approver_name,
        },
    )
    .await?;

    info!(user_id = user.id, username = %user.username, "user created");
    Ok(user)
}

pub async fn list_users(db: &PgPool, query: &ListQuery) -> Result<Vec<User>, ApiError> {
    Ok(User::list(db, query.skip(), query.take()).await?)
}

pub async fn get_user(db: &PgPool, id: i64) -> Result<User, ApiError> {
    User::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("not found"))
}

pub async fn update_user(db: &PgPool, id: i64, payload: UserPayload) -> Result<User, ApiError> {
    let existing = get_user(db, id).await?;

    // A rename needs its own uniqueness pre-check; the store constraint
    // still backstops the race window.
    if let Some(username) = payload.username.as_deref() {
        if username != existing.username && User::find_by_username(db, username).await?.is_some() {
            warn!(user_id = id, %username, "rename rejected, username taken");
            return Err(ApiError::conflict("username already exists"));
        }
    }

    let request_date = payload
        .request_date
        .as_deref()
        .map(parse_request_date)
        .transpose()?;

    // A supplied password is re-hashed; an absent one keeps the stored hash.
    let password_hash = payload.password.as_deref().map(hash_password).transpose()?;

    let user = User::update(
        db,
        id,
        UserChanges {
            username: payload.username,
            password_hash,
            role: payload.role,
            employee_code: payload.employee_code,
            leave_approver: payload.leave_approver,
            request_date,
            approver_name: payload.approver_name,
        },
    )
    .await?;

    info!(user_id = user.id, "user updated");
    Ok(user)
}

pub async fn delete_user(db: &PgPool, id: i64) -> Result<(), ApiError> {
    if !User::delete(db, id).await? {
        return Err(ApiError::not_found("not found"));
    }
    info!(user_id = id, "user deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parse_id_accepts_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("-1").unwrap(), -1);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(matches!(parse_id("abc"), Err(ApiError::Validation(_))));
        assert!(matches!(parse_id("1.5"), Err(ApiError::Validation(_))));
        assert!(matches!(parse_id(""), Err(ApiError::Validation(_))));
    }

    #[test]
    fn parse_request_date_accepts_rfc3339() {
        let ts = parse_request_date("2024-01-05T10:30:00Z").unwrap();
        assert_eq!(ts, datetime!(2024-01-05 10:30 UTC));
    }

    #[test]
    fn parse_request_date_accepts_plain_date() {
        let ts = parse_request_date("2024-01-05").unwrap();
        assert_eq!(ts, datetime!(2024-01-05 00:00 UTC));
    }

    #[test]
    fn parse_request_date_rejects_nonsense() {
        assert!(matches!(
            parse_request_date("not-a-date"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            parse_request_date("2024-13-40"),
            Err(ApiError::Validation(_))
        ));
    }
}
