//! Pool options application shared by every backend.

use sea_orm::sqlx::pool::PoolOptions;

use crate::config::PoolCfg;

/// Applies [`PoolCfg`] to a driver pool builder.
pub(crate) trait ApplyPoolOpts {
    fn apply(self, cfg: &PoolCfg) -> Self;
}

impl<DB: sea_orm::sqlx::Database> ApplyPoolOpts for PoolOptions<DB> {
    fn apply(mut self, cfg: &PoolCfg) -> Self {
        if let Some(n) = cfg.max_conns {
            self = self.max_connections(n);
        }
        if let Some(n) = cfg.min_conns {
            self = self.min_connections(n);
        }
        if let Some(t) = cfg.acquire_timeout {
            self = self.acquire_timeout(t);
        }
        if let Some(t) = cfg.idle_timeout {
            self = self.idle_timeout(t);
        }
        if let Some(t) = cfg.max_lifetime {
            self = self.max_lifetime(t);
        }
        if cfg.test_before_acquire {
            self = self.test_before_acquire(true);
        }
        self
    }
}
