//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::session::PasswordChangeRequest;

const SUCCESS: &str = "success";

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SuccessResponse {
    pub result: String,
}

impl SuccessResponse {
    #[must_use]
    pub fn success() -> Self {
        Self {
            result: SUCCESS.to_string(),
        }
    }
}

// No Debug: the fields are passwords.
#[derive(ToSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeBody {
    pub current_password: String,
    pub new_password: String,
}

impl From<PasswordChangeBody> for PasswordChangeRequest {
    fn from(body: PasswordChangeBody) -> Self {
        Self::new(body.current_password, body.new_password)
    }
}
