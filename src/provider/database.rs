use crate::{
    configuration::Config,
    dao::{PoolOption, PoolType},
    error::Error,
    model::{PushSubscription, Session, Table},
};

#[derive(Debug)]
pub struct DatabasePool {
    pub push_subscription: Table<PushSubscription>,
    pub session: Table<Session>,
    pub pool: PoolType,
}

impl DatabasePool {
    pub async fn new(config: &Config) -> Result<DatabasePool, Error> {
        let pool = PoolOption::new()
            .max_connections(config.database_max_connections)
            .connect(config.database_url.as_str())
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// Pool that only connects on first use.
    pub fn lazy(config: &Config) -> Result<DatabasePool, Error> {
        let pool = PoolOption::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.timeout))
            .connect_lazy(config.database_url.as_str())?;

        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: PoolType) -> DatabasePool {
        DatabasePool {
            push_subscription: Table::new(pool.clone()),
            session: Table::new(pool.clone()),
            pool,
        }
    }

    pub fn get_pool(&self) -> &PoolType {
        &self.pool
    }
}
