use std::marker::PhantomData;

use crate::dao::PoolType;

/// Pool handle typed by the entity it serves. Queries live in
/// `dao::postgre`, one `impl Table<Entity>` block per table.
#[derive(Debug)]
pub struct Table<T> {
    pub pool: PoolType,
    entity: PhantomData<fn() -> T>,
}

impl<T> Table<T> {
    pub fn new(pool: PoolType) -> Self {
        Table {
            pool,
            entity: PhantomData,
        }
    }
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Table::new(self.pool.clone())
    }
}
