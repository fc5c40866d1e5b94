mod push_subscription;
mod session;
mod types;

pub use self::types::{PoolOption, PoolType, QueryResult, Transaction};
