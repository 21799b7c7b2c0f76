//! API middleware.

mod origin;

pub use origin::origin_check_middleware;
