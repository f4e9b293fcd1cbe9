use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};

use crate::{
    auth::{self, UserClaims, hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped,
        entity::{GoogleProfile, UserEntity, UserEntityCreateUpdate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::auth::{AuthResponse, GoogleAuthBody, SigninBody, SignupBody},
        error::ErrorResponse,
        middlewares::{self, AUTH_TOKEN},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/me", get(auth_me_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/signup", post(auth_signup_handler))
        .route("/signin", post(auth_signin_handler))
        .route("/google", post(auth_google_handler))
        .merge(protected)
        .with_state(state)
}

/// Signs a token for `user`, drops it into the `SID` cookie and echoes it
/// back for clients that send `Authorization: Bearer`.
fn issue_session(state: &AppState, cookies: &Cookies, user: UserEntity) -> WebResult<AuthResponse> {
    let app = state.config().app();
    let claims = UserClaims::for_user(user.id(), app.token_ttl_hours());
    let token = auth::generate_token(&claims, app.jwt())
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token.clone());
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);

    Ok(AuthResponse {
        access_token: token,
        user,
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupBody,
    description = "Registers a user with email and password",
    responses(
        (status = 200, description = "User created and signed in", body = AuthResponse),
        (status = 400, description = "Missing email, name or password", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
async fn auth_signup_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SignupBody>,
) -> WebResult<impl IntoResponse> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.name.trim().is_empty() || payload.password.is_empty() {
        return Err(WebError::bad_request("Email, name and password are required"));
    }

    let found = UserEntity::find_by_email(state.pool(), &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let data = UserEntityCreateUpdate {
        email,
        name: payload.name.trim().to_string(),
        image_url: None,
        google_id: None,
        password_hash: Some(hash),
    };

    let created = UserEntity::create(state.pool(), &AuthenticatedUser::admin(), data)
        .await
        .map_err(|e| {
            // lost a race with a concurrent signup for the same email
            if e.is_unique_violation() {
                return WebError::registration_conflict();
            }
            WebError::resource_fetch_error(UserEntity::get_resource_type(), e)
        })?;
    tracing::info!("registered user {}", created.id());

    let response = issue_session(&state, &cookies, created)?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SigninBody,
    description = "Signs a user in with email and password",
    responses(
        (status = 200, description = "User signed in", body = AuthResponse),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
async fn auth_signin_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SigninBody>,
) -> WebResult<impl IntoResponse> {
    let email = normalize_email(&payload.email);
    let Some(found) = UserEntity::find_by_email(state.pool(), &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
    else {
        return Err(WebError::auth_invalid_credentials());
    };

    // OAuth-only accounts have no password to check against
    let Some(hash) = found.hash() else {
        return Err(WebError::auth_invalid_credentials());
    };
    let is_verified =
        verify_password(hash, &payload.password).map_err(WebError::server_crypt_error)?;
    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    let response = issue_session(&state, &cookies, found)?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/google",
    request_body = GoogleAuthBody,
    description = "Verifies a Google access token and creates or refreshes the linked account",
    responses(
        (status = 200, description = "User signed in", body = AuthResponse),
        (status = 400, description = "Access token missing", body = ErrorResponse),
        (status = 401, description = "Token rejected by Google or email unverified", body = ErrorResponse),
        (status = 409, description = "Email belongs to an account with another sign-in method", body = ErrorResponse),
        (status = 502, description = "Google userinfo unreachable", body = ErrorResponse),
    ),
    tag = "auth"
)]
async fn auth_google_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<GoogleAuthBody>,
) -> WebResult<impl IntoResponse> {
    let access_token = payload
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| WebError::bad_request("access_token is required"))?;

    let google = state.google().userinfo(access_token.trim()).await?;
    if !google.verified_email {
        return Err(WebError::google_rejected("email not verified"));
    }

    let email = normalize_email(&google.email);
    let name = match google.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => email.split('@').next().unwrap_or_default().to_string(),
    };
    let profile = GoogleProfile {
        email,
        name,
        image: google.picture,
        google_id: google.id,
    };

    let user = UserEntity::upsert_google(state.pool(), profile)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(WebError::provider_mismatch)?;

    tracing::debug!("google sign-in for user {}", user.id());
    let response = issue_session(&state, &cookies, user)?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    description = "Returns the signed in user",
    responses(
        (status = 200, description = "Current user", body = UserEntity),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "auth"
)]
async fn auth_me_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;

    Ok((StatusCode::OK, Json(found)))
}
