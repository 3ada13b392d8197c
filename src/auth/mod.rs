//! Authentication and session management

pub mod guard;
pub mod jwt;
pub mod models;
pub mod session;
pub mod store;

pub use guard::{guard, Access, LOGIN_PATH};
pub use jwt::{decode_claims, Claims};
pub use models::{can_access, has_role, Theme, User, UserRole};
pub use session::{Session, SessionManager, SessionState};
pub use store::{FileStore, MemoryStore, StorageKeys, TokenStore};
