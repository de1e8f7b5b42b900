use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Form body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Form body for login.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Outward-facing part of the user, safe to hand to templates.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_omits_password_hash() {
        let public = PublicUser {
            id: Uuid::new_v4(),
            username: "bob".into(),
            email: "bob@x.com".into(),
            name: "Bob".into(),
        };
        let json = serde_json::to_string(&public).unwrap();
        assert!(json.contains("bob@x.com"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn register_form_deserializes() {
        let form: RegisterForm = serde_json::from_str(
            r#"{"username":"bob","email":"bob@x.com","name":"Bob","password":"pw123"}"#,
        )
        .unwrap();
        assert_eq!(form.username, "bob");
        assert_eq!(form.name, "Bob");
    }
}
