//! OpenAPI document for the HTTP API.
//!
//! Request schemas come straight from the types the extractors validate
//! with ([`UserInput`]), and response bodies are the generic
//! [`crate::envelope::Envelope`] instantiated per payload, collected from
//! the path annotations.

use utoipa::OpenApi;

use crate::users::{dto::EmptyData, dto::UserInput, repo_types::User};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "userdesk API",
        description = "CRUD over the user resource. Every /users response uses the success/data/message envelope."
    ),
    paths(
        crate::users::handlers::list_users,
        crate::users::handlers::create_user,
        crate::users::handlers::get_user,
        crate::users::handlers::update_user,
        crate::users::handlers::delete_user,
    ),
    components(schemas(User, UserInput, EmptyData)),
    tags((name = "users", description = "User resource"))
)]
pub struct ApiDoc;
