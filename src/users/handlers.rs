use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    envelope::{ApiError, Envelope},
    state::AppState,
    users::{
        dto::{EmptyData, UserInput},
        extractors::{UserIdPath, ValidatedJson},
        repo_types::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_users).post(create_user).fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .fallback(method_not_allowed),
        )
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// List every user in store order.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = Envelope<Vec<User>>),
        (status = 500, description = "Store failure", body = Envelope<EmptyData>)
    ),
    tag = "users"
)]
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Response, ApiError> {
    let users = state.users.find_all().await?;
    Ok(Envelope::ok(users, "Users found successfully").with_status(StatusCode::OK))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = UserInput,
    responses(
        (status = 201, description = "User created", body = Envelope<User>),
        (status = 400, description = "Email already used or invalid body", body = Envelope<EmptyData>),
        (status = 500, description = "Store failure", body = Envelope<EmptyData>)
    ),
    tag = "users"
)]
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserInput>,
) -> Result<Response, ApiError> {
    if state.users.find_by_email(&payload.email, None).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict);
    }

    // The store enforces uniqueness too; a concurrent writer surfaces as Conflict here.
    let user = state.users.create(&payload.into_new_user()).await.map_err(|e| {
        let e = ApiError::from(e);
        if matches!(e, ApiError::Conflict) {
            warn!("email taken by a concurrent request");
        }
        e
    })?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(Envelope::ok(user, "User created successfully").with_status(StatusCode::CREATED))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = Envelope<User>),
        (status = 400, description = "Malformed id", body = Envelope<EmptyData>),
        (status = 404, description = "No such user", body = Envelope<EmptyData>)
    ),
    tag = "users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Response, ApiError> {
    let Some(user) = state.users.find_by_id(id).await? else {
        warn!(%id, "user not found");
        return Err(ApiError::NotFound);
    };
    Ok(Envelope::ok(user, "User found successfully").with_status(StatusCode::OK))
}

/// Replace name and email of an existing user.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserInput,
    responses(
        (status = 200, description = "User updated", body = Envelope<User>),
        (status = 400, description = "Email used by another user or invalid input", body = Envelope<EmptyData>),
        (status = 404, description = "No such user", body = Envelope<EmptyData>)
    ),
    tag = "users"
)]
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    ValidatedJson(payload): ValidatedJson<UserInput>,
) -> Result<Response, ApiError> {
    if state.users.find_by_id(id).await?.is_none() {
        warn!(%id, "user not found");
        return Err(ApiError::NotFound);
    }

    if state
        .users
        .find_by_email(&payload.email, Some(id))
        .await?
        .is_some()
    {
        warn!(%id, email = %payload.email, "email used by another user");
        return Err(ApiError::Conflict);
    }

    let Some(user) = state.users.update(id, &payload.into_new_user()).await? else {
        warn!(%id, "user removed before update");
        return Err(ApiError::NotFound);
    };

    info!(user_id = %user.id, "user updated");
    Ok(Envelope::ok(user, "User updated successfully").with_status(StatusCode::OK))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = Envelope<EmptyData>),
        (status = 400, description = "Malformed id", body = Envelope<EmptyData>),
        (status = 404, description = "No such user", body = Envelope<EmptyData>)
    ),
    tag = "users"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Response, ApiError> {
    if !state.users.delete(id).await? {
        warn!(%id, "user not found");
        return Err(ApiError::NotFound);
    }
    info!(user_id = %id, "user deleted");
    Ok(Envelope::ok(EmptyData::default(), "User deleted successfully").with_status(StatusCode::OK))
}
