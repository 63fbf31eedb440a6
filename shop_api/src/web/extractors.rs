// shop_api/src/web/extractors.rs

use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use checkout_core::Principal;
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// The caller behind a request.
///
/// No `Authorization` header means an anonymous shopper who is identified only by the
/// cart token. A bearer token must belong to a live session, otherwise the request is
/// rejected with 401.
#[derive(Debug, Clone)]
pub struct Shopper(pub Principal);

impl Shopper {
  pub fn principal(&self) -> &Principal {
    &self.0
  }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<String>, AppError> {
  let Some(value) = req.headers().get(AUTHORIZATION) else {
    return Ok(None);
  };
  let value = value
    .to_str()
    .map_err(|_| AppError::Auth("Malformed Authorization header.".to_string()))?;
  match value.strip_prefix("Bearer ") {
    Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
    _ => Err(AppError::Auth("Expected a Bearer token.".to_string())),
  }
}

impl FromRequest for Shopper {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let token = match bearer_token(req) {
      Ok(Some(token)) => token,
      Ok(None) => return ready(Ok(Shopper(Principal::Anonymous))),
      Err(e) => return ready(Err(e)),
    };

    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      return ready(Err(AppError::Internal("Application state is not configured.".to_string())));
    };
    match state.sessions.resolve(&token) {
      Some(principal) => ready(Ok(Shopper(principal))),
      None => {
        warn!("Request carried an unknown session token.");
        ready(Err(AppError::Auth("Session token is not valid.".to_string())))
      }
    }
  }
}
