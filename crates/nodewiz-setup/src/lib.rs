//! Provisioning helpers behind the `nodewiz-setup` and `generate-secret-key`
//! binaries.

pub mod env_file;
pub mod prompt;
pub mod secret;
pub mod steps;
