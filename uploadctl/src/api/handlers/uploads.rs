use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    AppState,
    api::models::{
        uploads::{GenerateUploadUrlRequest, GenerateUploadUrlResponse},
        users::CurrentUser,
    },
    errors::{Error, Result},
    uploads,
};

/// Generate a presigned upload URL
#[utoipa::path(
    post,
    path = "/uploads/presigned-url",
    tag = "uploads",
    summary = "Generate upload URL",
    description = "Authorize an upload to a user, workspace, typebot or block location and return a presigned PUT URL \
                   together with the public URL the file will have. Denied workspace or typebot access is reported as 404.",
    request_body = GenerateUploadUrlRequest,
    responses(
        (status = 200, description = "Presigned upload URL generated", body = GenerateUploadUrlResponse),
        (status = 400, description = "Bad request - malformed body, or upload target matches no known shape"),
        (status = 401, description = "Unauthorized - not authenticated, or not the target user"),
        (status = 404, description = "Workspace or typebot not found, or not writable by the caller"),
        (status = 500, description = "Storage not configured, or internal server error"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = []),
        ()
    )
)]
pub async fn generate_upload_url(
    State(state): State<AppState>,
    current_user: Result<Option<CurrentUser>>,
    payload: std::result::Result<Json<GenerateUploadUrlRequest>, JsonRejection>,
) -> Result<Json<GenerateUploadUrlResponse>> {
    // Missing storage settings win over any credential or body error
    state.config.s3.ensure_configured()?;
    let current_user = current_user?;

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) if current_user.is_some() => {
            return Err(Error::BadRequest {
                message: rejection.body_text(),
            });
        }
        Err(_) => {
            return Err(Error::Unauthenticated {
                message: Some("You must be authenticated to upload a file".to_string()),
            });
        }
    };

    let upload = uploads::generate_upload_url(
        &state.config.s3,
        state.store.as_ref(),
        state.signer.as_deref(),
        current_user.as_ref(),
        &request,
    )
    .await?;

    Ok(Json(upload.into()))
}
