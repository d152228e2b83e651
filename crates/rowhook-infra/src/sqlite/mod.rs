//! SQLite storage for trigger state.

pub mod kv;
pub mod pool;
