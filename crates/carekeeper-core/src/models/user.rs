use serde::{Deserialize, Serialize};

/// Account role. Immutable for the lifetime of a session; changing role
/// requires a new login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Caretaker,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Caretaker => "caretaker",
            Role::Patient => "patient",
        }
    }
}

/// User profile as returned by the sign-in/sign-up endpoints and persisted
/// alongside the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "inviteCode", skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
}

/// Payload returned by the sign-in and sign-up endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_wire_format() {
        let json = r#"{"_id":"64fa","name":"Alice","email":"a@x.com","role":"patient","inviteCode":"CARE123"}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse user JSON");
        assert_eq!(user.id, "64fa");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.role, Role::Patient);
        assert_eq!(user.invite_code.as_deref(), Some("CARE123"));
    }

    #[test]
    fn test_user_invite_code_optional() {
        let json = r#"{"_id":"64fb","name":"Bob","email":"b@x.com","role":"caretaker"}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse user JSON");
        assert_eq!(user.role, Role::Caretaker);
        assert!(user.invite_code.is_none());

        // Absent invite code must not appear when serialized back
        let out = serde_json::to_string(&user).expect("Failed to serialize user");
        assert!(!out.contains("inviteCode"));
        assert!(out.contains(r#""_id":"64fb""#));
        assert!(out.contains(r#""role":"caretaker""#));
    }

    #[test]
    fn test_auth_response_parses() {
        let json = r#"{"token":"eyJhbGciOi.abc.def","user":{"_id":"u1","name":"Alice","email":"a@x.com","role":"patient"}}"#;
        let resp: AuthResponse = serde_json::from_str(json).expect("Failed to parse auth response");
        assert_eq!(resp.token, "eyJhbGciOi.abc.def");
        assert_eq!(resp.user.name, "Alice");
    }
}
