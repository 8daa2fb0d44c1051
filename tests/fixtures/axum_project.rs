//! @title User Service
//! @version 1.4.0
//! @description Manages the users of the platform.
//! @contact.name Platform Team
//! @contact.email platform@example.com
//! @license.name MIT
//! @BasePath /
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Member,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

/// List users page by page.
/// @tags users
pub async fn get_users(Query(query): Query<ListQuery>) -> Json<Vec<User>> {
    Json(vec![])
}

/// Fetch one user.
/// @tags users
pub async fn get_user(Path(id): Path<u32>) -> Result<Json<User>, StatusCode> {
    Err(StatusCode::NOT_FOUND)
}

/// Create a user.
/// @tags users
/// @description.markdown
pub async fn create_user(Json(payload): Json<CreateUserRequest>) -> (StatusCode, Json<User>) {
    todo!()
}

/// @tags users
pub async fn update_user(
    Path(id): Path<u32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Json<User> {
    todo!()
}

/// Remove a user.
/// @tags users
/// @deprecated
pub async fn delete_user(Path(id): Path<u32>) -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn health_check() -> &'static str {
    "OK"
}

fn user_routes() -> Router {
    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

#[tokio::main]
async fn main() {
    let app = Router::new()
        .nest("/api/v1/users", user_routes())
        .route("/health", get(health_check))
        .route("/ready", get(|| async { "ready" }));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
