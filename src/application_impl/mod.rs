mod auth_service_impl;
mod password_hasher_impl;
mod session_store_fake;
mod session_store_noop;
mod token_codec_impl;
mod user_repo_fake;

pub use auth_service_impl::*;
pub use password_hasher_impl::*;
pub use session_store_fake::*;
pub use session_store_noop::*;
pub use token_codec_impl::*;
pub use user_repo_fake::*;
