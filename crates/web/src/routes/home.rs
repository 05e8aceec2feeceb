//! Home page: the sign-in prompt or the profile form and list.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use profile_hub_core::{ProfileDraft, ProfileRecord};
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::{OptionalSignIn, save_form};

/// Signed-out page template.
#[derive(Template, WebTemplate)]
#[template(path = "signed_out.html")]
pub struct SignedOutTemplate;

/// Signed-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "profiles.html")]
pub struct ProfilesTemplate {
    pub greeting: String,
    pub notice: Option<String>,
    pub draft: ProfileDraft,
    pub editing: bool,
    pub records: Vec<ProfileRecord>,
}

/// Render the current view.
///
/// A pending notice is shown once and then cleared from the session.
///
/// # Route
///
/// `GET /`
pub async fn index(
    session: Session,
    OptionalSignIn(form): OptionalSignIn,
) -> Result<Response> {
    let Some(mut form) = form else {
        return Ok(SignedOutTemplate.into_response());
    };

    let notice = form.take_notice();
    if notice.is_some() {
        save_form(&session, &form).await?;
    }

    Ok(ProfilesTemplate {
        greeting: form.greeting().to_string(),
        notice,
        draft: form.draft,
        editing: form.editing.is_some(),
        records: form.records,
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::test_app;

    async fn get_body(uri: &str) -> (StatusCode, String) {
        let response = test_app(Arc::new(MemoryStore::new()))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_signed_out_shows_login_prompt() {
        let (status, body) = get_body("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Login with Google"));
        assert!(!body.contains("Welcome"));
    }

    #[tokio::test]
    async fn test_signed_out_ignores_error_query() {
        let (status, body) = get_body("/?error=sign_in_cancelled").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Login with Google"));
        assert!(!body.contains("class=\"error\""));
        assert!(!body.contains("cancelled"));
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_body("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
