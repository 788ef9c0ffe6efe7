pub mod middleware;
pub mod pagination;
pub mod permissions;
pub mod serde_helpers;
pub mod validation;
