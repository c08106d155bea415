mod claims;
pub(crate) mod extractors;
pub mod identity;
pub mod jwt;

pub use extractors::AuthUser;
pub use identity::UserId;
