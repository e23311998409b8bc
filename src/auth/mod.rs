//! Session verification
//!
//! Sessions are issued by the CMS after wallet sign-in; this service only
//! verifies them. [`jwt`] decodes tokens, [`session`] applies the
//! per-request checks used by the routes.

pub mod jwt;
pub mod session;

pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenInput};
pub use session::{authenticate, require_admin};
