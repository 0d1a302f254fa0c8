//! OpenAPI schema aggregation for the portal API.
use crate::api::{
    access, forms, system,
    types::{
        AccessDecisionResponse, ErrorResponse, FormAcceptedResponse, HealthStatus,
        LandingResponse, NavigationResponse,
    },
};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "portal",
        version = "v1",
        description = "Portal access decisions, navigation and form intake"
    ),
    paths(
        system::system_health,
        access::landing,
        access::navigation,
        access::area_decision,
        forms::submit_form
    ),
    components(schemas(
        HealthStatus,
        ErrorResponse,
        LandingResponse,
        NavigationResponse,
        AccessDecisionResponse,
        FormAcceptedResponse
    )),
    tags(
        (name = "system", description = "System and health endpoints"),
        (name = "portal", description = "Portal access decisions")
    )
)]
pub struct ApiDoc;

pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
