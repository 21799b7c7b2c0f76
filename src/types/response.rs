use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Acknowledgement body for operations with nothing else to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    #[schema(example = true)]
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
