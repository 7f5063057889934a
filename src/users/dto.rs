use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo::User;

/// Incoming user fields. One shape serves both create and update: every
/// field is optional on the wire and requiredness is enforced by the
/// service. JSON, multipart and urlencoded bodies all collapse into this.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserPayload {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub employee_code: Option<String>,
    pub leave_approver: Option<String>,
    pub request_date: Option<String>,
    pub approver_name: Option<String>,
}

impl UserPayload {
    /// Folds empty strings into absence. Omitted, null and `""` all mean
    /// "not provided", which on update reads as "unchanged".
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value.filter(|s| !s.is_empty())
        }
        Self {
            username: clean(self.username),
            password: clean(self.password),
            role: clean(self.role),
            employee_code: clean(self.employee_code),
            leave_approver: clean(self.leave_approver),
            request_date: clean(self.request_date),
            approver_name: clean(self.approver_name),
        }
    }
}

pub const DEFAULT_TAKE: i64 = 100;
pub const MAX_TAKE: i64 = 1000;

/// Query parameters for the list endpoint. Raw strings, so unparsable
/// values fall back to the defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<String>,
    pub take: Option<String>,
}

impl ListQuery {
    pub fn skip(&self) -> i64 {
        self.skip
            .as_deref()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0)
            .max(0)
    }

    pub fn take(&self) -> i64 {
        let take = self
            .take
            .as_deref()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TAKE);
        if take <= 0 {
            DEFAULT_TAKE
        } else {
            take.min(MAX_TAKE)
        }
    }
}

/// Public shape of a user. There is no credential field here at all.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub employee_code: Option<String>,
    pub leave_approver: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub request_date: Option<OffsetDateTime>,
    pub approver_name: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            employee_code: user.employee_code,
            leave_approver: user.leave_approver,
            request_date: user.request_date,
            approver_name: user.approver_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn normalize_folds_empty_to_absent() {
        let payload = UserPayload {
            username: Some("alice".into()),
            password: Some(String::new()),
            role: None,
            employee_code: Some(String::new()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(payload.username.as_deref(), Some("alice"));
        assert!(payload.password.is_none());
        assert!(payload.role.is_none());
        assert!(payload.employee_code.is_none());
    }

    #[test]
    fn list_query_defaults() {
        let q = ListQuery::default();
        assert_eq!(q.skip(), 0);
        assert_eq!(q.take(), 100);
    }

    #[test]
    fn list_query_clamps_take() {
        let q = ListQuery {
            skip: None,
            take: Some("5000".into()),
        };
        assert_eq!(q.take(), 1000);
    }

    #[test]
    fn list_query_falls_back_on_garbage() {
        let q = ListQuery {
            skip: Some("abc".into()),
            take: Some("xyz".into()),
        };
        assert_eq!(q.skip(), 0);
        assert_eq!(q.take(), 100);
    }

    #[test]
    fn list_query_rejects_negative_and_zero() {
        let q = ListQuery {
            skip: Some("-3".into()),
            take: Some("0".into()),
        };
        assert_eq!(q.skip(), 0);
        assert_eq!(q.take(), 100);
    }

    #[test]
    fn response_carries_rfc3339_date_and_no_credential() {
        let response = UserResponse {
            id: 1,
            username: "alice".into(),
            role: "admin".into(),
            employee_code: None,
            leave_approver: None,
            request_date: Some(datetime!(2024-01-05 00:00 UTC)),
            approver_name: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["request_date"], "2024-01-05T00:00:00Z");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
