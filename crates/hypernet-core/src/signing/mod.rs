//! Request signing and the sign-token cache.

pub mod canonical;
pub mod signer;
pub mod token_cache;
pub mod token_client;

pub use canonical::{body_or_query, encode_query, request_path, QueryParams};
pub use signer::{generate_signature, sign_at, signing_timestamp, SignedHeaders, SIGN_HEADER};
pub use token_cache::SignTokenCache;
pub use token_client::SignTokenClient;
