//! Custom request extractors.

mod client_info;
mod request_context;
mod validated_json;

pub use validated_json::ValidatedJson;
