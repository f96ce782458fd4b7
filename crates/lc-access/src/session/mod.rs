//! Session Aggregate
//!
//! The signed-in user, the storage it is persisted in, and the manager
//! that creates and reads sessions.

pub mod entity;
pub mod manager;
pub mod storage;

pub use entity::{decode_user, Session, User};
pub use manager::{SessionKeys, SessionManager};
pub use storage::{ClientStorage, FileStorage, MemoryStorage};
