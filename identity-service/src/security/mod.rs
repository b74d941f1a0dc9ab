pub mod credentials;

pub use credentials::{CredentialStore, SeededCredentialStore, VerifiedUser};
