pub mod lease;
pub mod request;
pub mod role;
pub mod secret;

pub use lease::LeaseConfig;
pub use request::IssuanceRequest;
pub use role::{Role, RoleName};
pub use secret::Secret;
