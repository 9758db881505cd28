mod session_store;
mod user_repo;

pub use session_store::*;
pub use user_repo::*;
