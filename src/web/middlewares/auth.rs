use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    auth,
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    web::{
        AppState, RequestContext,
        context::AuthenticatedUser,
        error::{TokenCarrier, WebError},
    },
};

pub static AUTH_TOKEN: &str = "SID";

/// `Authorization: Bearer <jwt>` wins over the `SID` cookie.
fn find_token(req: &Request, cookies: &Cookies) -> Option<(String, TokenCarrier)> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some((token, TokenCarrier::Bearer));
    }
    cookies
        .get(AUTH_TOKEN)
        .map(|c| (c.value().to_string(), TokenCarrier::Cookie))
}

pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let Some((token, carrier)) = find_token(&req, &cookies) else {
        req.extensions_mut().insert(RequestContext::anonymous());
        return Ok(next.run(req).await);
    };

    let claims = auth::process_token(&token, state.config().app().jwt())
        .map_err(|e| WebError::auth_token_rejected(carrier, e))?;
    let id = claims.sub;

    let user = UserEntity::find_by_id(state.pool(), &AuthenticatedUser::admin(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let ctx = match user {
        Some(user) => RequestContext::new(Some(AuthenticatedUser::new(id, user.role()))),
        None => {
            tracing::debug!("token subject {id} no longer exists");
            RequestContext::anonymous()
        }
    };
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}
