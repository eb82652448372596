use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public projection of a user; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            avatar: u.avatar,
        }
    }
}

/// Response returned by signup and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Response returned after an avatar upload.
#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub message: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            avatar: None,
            created_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).expect("serialize");
        assert!(json.contains("ada@example.com"));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn avatar_response_uses_camel_case_url_key() {
        let resp = AvatarResponse {
            message: "Avatar updated".into(),
            avatar_url: "http://localhost:8080/uploads/x.png".into(),
            user: PublicUser {
                id: Uuid::new_v4(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                avatar: Some("x.png".into()),
            },
        };
        let json = serde_json::to_string(&resp).expect("serialize");
        assert!(json.contains("\"avatarUrl\""));
        assert!(!json.contains("avatar_url"));
    }

    #[test]
    fn signup_request_defaults_missing_fields_to_empty() {
        let req: SignupRequest = serde_json::from_str(r#"{"email":"a@b.c"}"#).expect("parse");
        assert!(req.name.is_empty());
        assert_eq!(req.email, "a@b.c");
        assert!(req.password.is_empty());
    }
}
