pub mod creds;
pub mod lease;
pub mod roles;
