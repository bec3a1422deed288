pub mod provider;

pub use provider::{AuthStep, Authenticator, FileAuthenticator, PasswdEntry};
