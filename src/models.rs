use serde::{Deserialize, Serialize};

// Message API response format (also what we relay to callers)
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub message: String,
    pub subtitle: String,
}

// Body of every non-200 response
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
