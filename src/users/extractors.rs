use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};

use super::dto::UserPayload;
use crate::error::ApiError;

/// Body extractor that folds JSON, multipart form-data and urlencoded forms
/// into a single normalized [`UserPayload`]. Requests without a recognized
/// content type carry no fields, which matters for partial updates.
pub struct UserForm(pub UserPayload);

#[async_trait]
impl<S> FromRequest<S> for UserForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(payload) = Json::<UserPayload>::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            return Ok(Self(payload.normalized()));
        }

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            let mut payload = UserPayload::default();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| ApiError::validation(e.to_string()))?
            {
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(e.to_string()))?;
                match name.as_str() {
                    "username" => payload.username = Some(value),
                    "password" => payload.password = Some(value),
                    "role" => payload.role = Some(value),
                    "employee_code" => payload.employee_code = Some(value),
                    "leave_approver" => payload.leave_approver = Some(value),
                    "request_date" => payload.request_date = Some(value),
                    "approver_name" => payload.approver_name = Some(value),
                    _ => {}
                }
            }
            return Ok(Self(payload.normalized()));
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(payload) = Form::<UserPayload>::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            return Ok(Self(payload.normalized()));
        }

        // Anything else is treated as an empty field set.
        Ok(Self(UserPayload::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn extract(req: Request) -> Result<UserPayload, ApiError> {
        UserForm::from_request(req, &()).await.map(|form| form.0)
    }

    #[tokio::test]
    async fn json_body_is_parsed() {
        let req = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"username":"alice","password":"pw1","role":"admin"}"#,
            ))
            .unwrap();
        let payload = extract(req).await.unwrap();
        assert_eq!(payload.username.as_deref(), Some("alice"));
        assert_eq!(payload.password.as_deref(), Some("pw1"));
        assert_eq!(payload.role.as_deref(), Some("admin"));
        assert!(payload.employee_code.is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let req = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        assert!(matches!(extract(req).await, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn multipart_fields_are_collected() {
        let body = concat!(
            "--BOUND\r\n",
            "Content-Disposition: form-data; name=\"username\"\r\n\r\n",
            "bob\r\n",
            "--BOUND\r\n",
            "Content-Disposition: form-data; name=\"role\"\r\n\r\n",
            "staff\r\n",
            "--BOUND\r\n",
            "Content-Disposition: form-data; name=\"unknown\"\r\n\r\n",
            "ignored\r\n",
            "--BOUND--\r\n",
        );
        let req = Request::builder()
            .header(CONTENT_TYPE, "multipart/form-data; boundary=BOUND")
            .body(Body::from(body))
            .unwrap();
        let payload = extract(req).await.unwrap();
        assert_eq!(payload.username.as_deref(), Some("bob"));
        assert_eq!(payload.role.as_deref(), Some("staff"));
        assert!(payload.password.is_none());
    }

    #[tokio::test]
    async fn urlencoded_body_is_parsed() {
        let req = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=carol&password=pw2&role=manager"))
            .unwrap();
        let payload = extract(req).await.unwrap();
        assert_eq!(payload.username.as_deref(), Some("carol"));
        assert_eq!(payload.role.as_deref(), Some("manager"));
    }

    #[tokio::test]
    async fn unrecognized_content_type_yields_empty_payload() {
        let req = Request::builder()
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from("whatever"))
            .unwrap();
        let payload = extract(req).await.unwrap();
        assert!(payload.username.is_none());
        assert!(payload.password.is_none());
    }

    #[tokio::test]
    async fn empty_fields_fold_to_absent() {
        let req = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"alice","password":""}"#))
            .unwrap();
        let payload = extract(req).await.unwrap();
        assert_eq!(payload.username.as_deref(), Some("alice"));
        assert!(payload.password.is_none());
    }
}
