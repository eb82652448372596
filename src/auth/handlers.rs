use axum::{
    extract::{FromRef, Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, AvatarResponse, LoginRequest, PublicUser, SignupRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/upload-avatar", post(upload_avatar))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.name = payload.name.trim().to_string();
    payload.email = payload.email.trim().to_string();

    if payload.name.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("All fields are required".into()));
    }

    // Best-effort pre-check; the unique constraint on users.email is the
    // real guard against concurrent signups with the same address
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "signup with existing email");
        return Err(ApiError::Conflict(
            "Email already exists. Please use another one.".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(&state.db, &payload.name, &payload.email, &hash).await {
        Ok(u) => u,
        Err(e) => {
            let unique_violation = e
                .downcast_ref::<sqlx::Error>()
                .and_then(|e| e.as_database_error())
                .map_or(false, |d| d.is_unique_violation());
            if unique_violation {
                warn!(email = %payload.email, "signup lost unique-email race");
                return Err(ApiError::Conflict(
                    "Email already exists. Please use another one.".into(),
                ));
            }
            return Err(e.into());
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok(Json(AuthResponse {
        user: PublicUser::from(user),
        token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_string();

    // Unknown email and wrong password produce the same response so the
    // endpoint cannot be used to enumerate accounts
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        user: PublicUser::from(user),
        token,
    }))
}

#[instrument(skip(state, multipart))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, ApiError> {
    let mut file: Option<(Bytes, String)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        if field.name() == Some("avatar") {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            file = Some((data, content_type));
        }
    }

    let Some((data, content_type)) = file else {
        return Err(ApiError::Validation("No file uploaded".into()));
    };

    let ext = ext_from_mime(&content_type).unwrap_or("bin");
    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    state.storage.save(&filename, data).await?;

    let user = User::set_avatar(&state.db, user_id, &filename)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    let avatar_url = format!("{}/uploads/{}", state.config.public_base_url, filename);
    info!(user_id = %user.id, filename = %filename, "avatar updated");
    Ok(Json(AvatarResponse {
        message: "Avatar updated".into(),
        avatar_url,
        user: PublicUser::from(user),
    }))
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use axum::response::IntoResponse;

    async fn multipart_from(boundary: &str, body: String) -> Multipart {
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/upload-avatar")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("request");
        Multipart::from_request(req, &()).await.expect("multipart")
    }

    #[tokio::test]
    async fn upload_avatar_without_file_field_is_rejected() {
        let state = AppState::fake();
        let boundary = "avatar-test-boundary";
        // A multipart body whose only field is not named "avatar"
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"note\"\r\n\r\n\
             hello\r\n\
             --{boundary}--\r\n"
        );
        let multipart = multipart_from(boundary, body).await;

        let err = upload_avatar(State(state), AuthUser(Uuid::new_v4()), multipart)
            .await
            .expect_err("handler should reject");
        match &err {
            ApiError::Validation(m) => assert_eq!(m, "No file uploaded"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_avatar_with_empty_body_is_rejected() {
        let state = AppState::fake();
        let boundary = "avatar-test-boundary";
        let body = format!("--{boundary}--\r\n");
        let multipart = multipart_from(boundary, body).await;

        let err = upload_avatar(State(state), AuthUser(Uuid::new_v4()), multipart)
            .await
            .expect_err("handler should reject");
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn ext_from_mime_covers_common_image_types() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/gif"), Some("gif"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn auth_response_contains_user_and_token() {
        let resp = AuthResponse {
            user: PublicUser {
                id: Uuid::new_v4(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                avatar: None,
            },
            token: "header.payload.signature".into(),
        };
        let json = serde_json::to_string(&resp).expect("serialize");
        assert!(json.contains("\"token\""));
        assert!(json.contains("ada@example.com"));
    }
}
