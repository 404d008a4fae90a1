//! Gateway authentication
//!
//! The gateway sits behind OAuth2 client credentials. `TokenManager` owns the
//! single cached token for a credential and refreshes it 300 seconds before
//! the server-declared expiry.

mod token;

pub use token::{TokenManager, DEFAULT_EXPIRES_IN, EXPIRY_MARGIN};
