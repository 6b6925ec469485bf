use crate::{
    config::AdminCredentials,
    error::ApiError,
    models::auth::{TokenRequest, TokenResponse},
};
use actix_web::{web, HttpResponse};

/// Password-flow login. The issued token is the admin username itself.
pub async fn login(
    admin: web::Data<AdminCredentials>,
    form: web::Form<TokenRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    if !admin.matches(&form.username, &form.password) {
        log::warn!("failed login attempt for {:?}", form.username);
        return Err(ApiError::BadRequest("Incorrect username or password".to_string()).into());
    }

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: form.username.clone(),
        token_type: "bearer".to_string(),
    }))
}
