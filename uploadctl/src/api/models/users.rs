use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::UserId;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Option<String>,
}
