//! OpenAPI documentation for the `/api/v1/*` endpoints.
//!
//! Served as JSON at `/api-docs/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Bearer API tokens and the browser session cookie.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("API Token")
                        .description(Some("API token authentication: `Authorization: Bearer YOUR_API_TOKEN`"))
                        .build(),
                ),
            );
            components.security_schemes.insert(
                "CookieAuth".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "uploadctl_session",
                    "Session JWT set by the dashboard. `uploadctl_session` is the default name, see `auth.session.cookie_name`",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "uploadctl API",
        description = "Authorizes uploads into user, workspace and typebot storage and returns presigned URLs."
    ),
    servers(
        (url = "/api/v1", description = "Upload API")
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::uploads::generate_upload_url,
    ),
    components(
        schemas(
            api::models::uploads::FilePathProps,
            api::models::uploads::GenerateUploadUrlRequest,
            api::models::uploads::GenerateUploadUrlResponse,
        )
    ),
    tags(
        (name = "uploads", description = "Presigned upload URLs"),
    )
)]
pub struct ApiDoc;
