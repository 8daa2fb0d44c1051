//! @title Actix Users
//! @version 0.9.0
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

/// List users.
#[actix_web::get("/users")]
pub async fn get_users(query: web::Query<ListQuery>) -> web::Json<Vec<User>> {
    web::Json(Vec::new())
}

/// Fetch one user.
#[actix_web::get("/users/{id}")]
pub async fn get_user(path: web::Path<u32>) -> impl Responder {
    HttpResponse::Ok().finish()
}

/// Create a user.
#[actix_web::post("/users")]
pub async fn create_user(payload: web::Json<CreateUserRequest>) -> impl Responder {
    HttpResponse::Created().finish()
}

#[actix_web::delete("/users/{id}")]
pub async fn delete_user(path: web::Path<u32>) -> impl Responder {
    HttpResponse::NoContent()
}

#[actix_web::get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(get_users)
            .service(get_user)
            .service(create_user)
            .service(delete_user)
            .service(health_check),
    );
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    HttpServer::new(|| {
        App::new()
            .configure(configure_routes)
            .route("/ping", web::get().to(|| async { "pong" }))
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
