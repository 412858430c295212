use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{
        AuthResponse, LoginRequest, MeResponse, PublicUser, RefreshRequest, RegisterRequest,
        UpdateMeRequest,
    },
    IdentityError, IdentityUser, JwtKeys,
};
use crate::{
    errors::AppError,
    identity::AuthUser,
    profiles::ProfilePatch,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).patch(update_me))
}

fn issue_tokens(state: &AppState, user: IdentityUser) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(&user.id)?;
    let refresh_token = keys.sign_refresh(&user.id)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

/// Creates the account and its default profile.
///
/// Once the account exists the caller always gets tokens. A failed profile
/// write is only logged: reads fall back to defaults and the first profile
/// update creates the document.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let user = state
        .identity
        .register(&payload.email, &payload.password)
        .await
        .map_err(|e| {
            warn!(error = %e, "registration rejected");
            e
        })?;
    if let Err(e) = state.profiles.create(&user, &ProfilePatch::default()).await {
        warn!(user_id = %user.id, error = %e, "default profile not written");
    }

    info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .identity
        .login(&payload.email, &payload.password)
        .await
        .map_err(|e| {
            warn!(error = %e, "login rejected");
            e
        })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        AppError::Unauthorized("Invalid refresh token".into())
    })?;

    let user = state
        .identity
        .find(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

    info!(user_id = %user.id, "tokens refreshed");
    Ok(Json(issue_tokens(&state, user)?))
}

/// Tokens are stateless, so signing out is the client discarding them.
#[instrument]
pub async fn logout(AuthUser(user_id): AuthUser) -> StatusCode {
    info!(user_id = %user_id, "user logged out");
    StatusCode::NO_CONTENT
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = state
        .identity
        .find(&user_id)
        .await?
        .ok_or(IdentityError::UserNotFound)?;
    let profile = state.profiles.get(&user_id).await?;
    Ok(Json(MeResponse {
        user: PublicUser::from(user),
        profile,
    }))
}

/// Renames the user in the identity backend and mirrors it onto the profile.
#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateMeRequest>,
) -> Result<Json<PublicUser>, AppError> {
    let name = payload.display_name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("displayName must not be empty".into()));
    }

    let user = state.identity.update_display_name(&user_id, name).await?;
    let patch = ProfilePatch {
        display_name: Some(name.to_string()),
        ..Default::default()
    };
    state.profiles.update(&user_id, &patch).await?;

    info!(user_id = %user_id, "display name updated");
    Ok(Json(PublicUser::from(user)))
}

#[cfg(test)]
mod tests {
    use crate::testing::{
        body_json, call, signed_up, test_app, test_app_with_store, FlakyStore, PASSWORD,
    };
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn register_creates_default_profile() {
        let app = test_app();
        let res = call(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "email": " New@Example.com ", "password": PASSWORD })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = body_json(res).await;
        assert_eq!(body["user"]["email"], "new@example.com");
        let token = body["access_token"].as_str().unwrap().to_string();

        let res = call(&app, "GET", "/api/v1/me", Some(&token), None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = body_json(res).await;
        assert_eq!(body["profile"]["setupCompleted"], false);
        assert_eq!(body["profile"]["caloriesGoal"], 2000);
        assert_eq!(body["profile"]["email"], "new@example.com");
    }

    #[tokio::test]
    async fn register_rejects_bad_input_and_duplicates() {
        let (app, _) = signed_up("taken@example.com").await;

        let res = call(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "email": "taken@example.com", "password": PASSWORD })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = call(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "email": "fresh@example.com", "password": "short" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = call(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "email": "not-an-email", "password": PASSWORD })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_checks_password() {
        let (app, _) = signed_up("login@example.com").await;

        let res = call(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "login@example.com", "password": "wrong-password" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = call(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "LOGIN@example.com", "password": PASSWORD })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn refresh_requires_a_refresh_token() {
        let app = test_app();
        let res = call(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "email": "refresh@example.com", "password": PASSWORD })),
        )
        .await;
        let body: Value = body_json(res).await;
        let access = body["access_token"].as_str().unwrap().to_string();
        let refresh = body["refresh_token"].as_str().unwrap().to_string();

        let res = call(
            &app,
            "POST",
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": access })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = call(
            &app,
            "POST",
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = body_json(res).await;
        assert_eq!(body["user"]["email"], "refresh@example.com");
    }

    #[tokio::test]
    async fn logout_acknowledges() {
        let (app, token) = signed_up("bye@example.com").await;
        let res = call(&app, "POST", "/api/v1/auth/logout", Some(&token), None).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn patch_me_renames_user_and_profile() {
        let (app, token) = signed_up("rename@example.com").await;

        let res = call(
            &app,
            "PATCH",
            "/api/v1/me",
            Some(&token),
            Some(json!({ "displayName": "  Ada  " })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = body_json(res).await;
        assert_eq!(body["displayName"], "Ada");

        let res = call(&app, "GET", "/api/v1/me", Some(&token), None).await;
        let body: Value = body_json(res).await;
        assert_eq!(body["user"]["displayName"], "Ada");
        assert_eq!(body["profile"]["displayName"], "Ada");

        let res = call(
            &app,
            "PATCH",
            "/api/v1/me",
            Some(&token),
            Some(json!({ "displayName": "   " })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_survives_a_failed_profile_write() {
        let app = test_app_with_store(FlakyStore::failing_sets(1));
        let body = json!({ "email": "flaky@example.com", "password": PASSWORD });

        let res = call(&app, "POST", "/api/v1/auth/register", None, Some(body.clone())).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = body_json(res).await;
        let token = created["access_token"].as_str().unwrap().to_string();

        // the account is usable and routes to setup
        let res = call(&app, "GET", "/api/v1/session/route?path=/", Some(&token), None).await;
        let route: Value = body_json(res).await;
        assert_eq!(route["state"], "authenticated-incomplete");

        let res = call(
            &app,
            "POST",
            "/api/v1/profile/setup",
            Some(&token),
            Some(json!({
                "fitnessGoal": "cutting",
                "caloriesGoal": 1800,
                "macros": { "protein": 150, "carbs": 150, "fat": 50 }
            })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        // signing up again is a conflict, signing in works
        let res = call(&app, "POST", "/api/v1/auth/register", None, Some(body)).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = call(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "flaky@example.com", "password": PASSWORD })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
