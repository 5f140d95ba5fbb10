//! Auth-domain identifiers, scopes, nonces, and identity-token models.

pub mod claims;
pub mod id;
pub mod nonce;
pub mod scope;
pub mod token;

pub use claims::*;
pub use id::*;
pub use nonce::*;
pub use scope::*;
pub use token::*;
