mod auth_middleware;

pub use auth_middleware::{auth, require_admin, AuthenticatedUser};
