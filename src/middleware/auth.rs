use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures_util::future::LocalBoxFuture;

use crate::{config::AdminCredentials, error::ApiError};

/// Proof that the request carried the admin bearer token. Add it as a handler
/// argument to restrict the route.
#[derive(Debug, Clone, Copy)]
pub struct AdminToken;

pub fn validate_token(token: &str, admin: &AdminCredentials) -> Result<AdminToken, ApiError> {
    if admin.accepts_token(token) {
        Ok(AdminToken)
    } else {
        Err(ApiError::Unauthorized("Invalid token"))
    }
}

async fn authenticate(req: HttpRequest) -> Result<AdminToken, ApiError> {
    let credentials = BearerAuth::extract(&req)
        .await
        .map_err(|_| ApiError::Unauthorized("Not authenticated"))?;

    let admin = req
        .app_data::<web::Data<AdminCredentials>>()
        .ok_or(ApiError::Unauthorized("Authentication is not configured"))?;

    validate_token(credentials.token(), admin).inspect_err(|_| {
        log::warn!("rejected bearer token on {}", req.path());
    })
}

impl FromRequest for AdminToken {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { authenticate(req).await.map_err(actix_web::Error::from) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_admin_username_is_a_valid_token() {
        let admin = AdminCredentials {
            username: Some("admin".to_string()),
            password: Some("secret".to_string()),
        };
        assert!(validate_token("admin", &admin).is_ok());
        assert!(validate_token("secret", &admin).is_err());
        assert!(validate_token("", &AdminCredentials::default()).is_err());
    }
}
