use crate::domain::user::models::UserId;

/// Command to log in with email and password.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
    /// Requested access token lifetime. Out-of-range values fall back to the default.
    pub expires_in_seconds: Option<i64>,
}

/// Token pair issued by a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    pub access_token: String,
    pub refresh_token: String,
}
