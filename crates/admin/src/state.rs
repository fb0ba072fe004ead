//! Application state shared across handlers.

use std::sync::Arc;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::{AdminConfig, MarketplaceConfig};
use crate::models::DashboardStats;

/// Cache key for the single dashboard stats entry.
const DASHBOARD_STATS_KEY: &str = "dashboard";

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    stats_cache: Cache<&'static str, Arc<DashboardStats>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let stats_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.stats_cache_ttl)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stats_cache,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Shortcut to the marketplace business rules.
    #[must_use]
    pub fn marketplace(&self) -> &MarketplaceConfig {
        &self.inner.config.marketplace
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Cached dashboard stats, if still fresh.
    pub async fn cached_dashboard_stats(&self) -> Option<Arc<DashboardStats>> {
        self.inner.stats_cache.get(DASHBOARD_STATS_KEY).await
    }

    /// Store freshly computed dashboard stats.
    pub async fn cache_dashboard_stats(&self, stats: Arc<DashboardStats>) {
        self.inner
            .stats_cache
            .insert(DASHBOARD_STATS_KEY, stats)
            .await;
    }

    /// Drop cached dashboard stats after a mutation that changes them.
    pub async fn invalidate_dashboard_stats(&self) {
        self.inner.stats_cache.invalidate(DASHBOARD_STATS_KEY).await;
    }
}
