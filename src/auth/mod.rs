pub mod basic;
mod claims;
pub(crate) mod extractors;
pub mod jwt;
pub mod password;
pub mod services;

pub use claims::Claims;
pub use extractors::{BasicCredentials, CurrentUser};
