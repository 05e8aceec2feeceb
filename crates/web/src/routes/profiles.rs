//! Profile form actions.
//!
//! Each action loads the signed-in state, applies one controller operation,
//! writes the state back and redirects to `/`. Record store failures are
//! logged and the page re-renders with the state unchanged.

use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use profile_hub_core::{ProfileDraft, ProfileId};
use tower_sessions::Session;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequireSignIn, save_form};
use crate::services::records::RecordError;
use crate::state::AppState;

fn log_failure(action: &str, error: &RecordError) {
    match error {
        RecordError::Validation(e) => tracing::info!(action, error = %e, "profile form rejected"),
        _ => tracing::warn!(action, error = %error, "profile action failed"),
    }
}

/// Submit the draft: update when editing, create otherwise.
///
/// # Route
///
/// `POST /profiles`
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireSignIn(mut form): RequireSignIn,
    Form(draft): Form<ProfileDraft>,
) -> Result<Redirect> {
    let action = if form.editing.is_some() { "update" } else { "create" };
    add_breadcrumb("profiles", action);

    form.set_draft(draft);
    if let Err(e) = form.submit(state.records()).await {
        log_failure(action, &e);
    }

    save_form(&session, &form).await?;
    Ok(Redirect::to("/"))
}

/// Re-fetch the record list.
///
/// # Route
///
/// `POST /profiles/refresh`
pub async fn refresh(
    State(state): State<AppState>,
    session: Session,
    RequireSignIn(mut form): RequireSignIn,
) -> Result<Redirect> {
    if let Err(e) = form.refresh(state.records()).await {
        log_failure("refresh", &e);
    }

    save_form(&session, &form).await?;
    Ok(Redirect::to("/"))
}

/// Load a record into the form for editing.
///
/// # Route
///
/// `POST /profiles/{id}/edit`
pub async fn edit(
    session: Session,
    RequireSignIn(mut form): RequireSignIn,
    Path(id): Path<ProfileId>,
) -> Result<Redirect> {
    if let Err(e) = form.begin_edit(&id) {
        log_failure("edit", &e);
    }

    save_form(&session, &form).await?;
    Ok(Redirect::to("/"))
}

/// Leave edit mode.
///
/// # Route
///
/// `POST /profiles/cancel`
pub async fn cancel(session: Session, RequireSignIn(mut form): RequireSignIn) -> Result<Redirect> {
    form.cancel_edit();
    save_form(&session, &form).await?;
    Ok(Redirect::to("/"))
}

/// Delete a record.
///
/// # Route
///
/// `POST /profiles/{id}/delete`
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireSignIn(mut form): RequireSignIn,
    Path(id): Path<ProfileId>,
) -> Result<Redirect> {
    add_breadcrumb("profiles", "delete");

    if let Err(e) = form.delete(state.records(), &id).await {
        log_failure("delete", &e);
    }

    save_form(&session, &form).await?;
    Ok(Redirect::to("/"))
}
