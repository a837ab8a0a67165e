//! 进程内 Cache（moka）
//!
//! moka 按每个条目的 TTL 在后台淘汰；读取时再用注入的 [`Clock`] 复核，
//! 并按时钟周期性清扫，使 `ManualClock` 驱动的测试与真实时间一致。

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::future::Cache;
use parking_lot::Mutex;
use portal_errors::{AppError, AppResult};
use portal_ports::{CachePort, Clock, SystemClock};
use tracing::debug;

/// 按时钟清扫过期条目的最小间隔
const SWEEP_INTERVAL: chrono::Duration = chrono::Duration::seconds(60);

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Option<Duration>,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// 每个条目使用写入时给定的 TTL，覆盖写入时重新计时
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// 内存 Cache
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, Entry>,
    clock: Arc<dyn Clock>,
    last_sweep: Arc<Mutex<DateTime<Utc>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder().expire_after(EntryTtl).build();
        let last_sweep = Arc::new(Mutex::new(clock.now()));
        Self {
            entries,
            clock,
            last_sweep,
        }
    }

    /// 当前未过期的键数量
    pub async fn len(&self) -> u64 {
        self.purge_expired(self.clock.now()).await;
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 移除按时钟已过期的条目，返回移除数量
    async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key)
            .collect();

        for key in &expired {
            self.entries.invalidate(key.as_str()).await;
        }
        expired.len()
    }

    async fn sweep_if_due(&self) {
        let now = self.clock.now();
        {
            let mut last = self.last_sweep.lock();
            if now - *last < SWEEP_INTERVAL {
                return;
            }
            *last = now;
        }

        let removed = self.purge_expired(now).await;
        if removed > 0 {
            debug!(removed, "Swept expired cache entries");
        }
    }

    async fn live_entry(&self, key: &str) -> Option<Entry> {
        let entry = self.entries.get(key).await?;
        if entry.is_expired(self.clock.now()) {
            self.entries.invalidate(key).await;
            return None;
        }
        Some(entry)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CachePort for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.live_entry(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let expires_at = match ttl {
            Some(ttl) => {
                let ttl = chrono::Duration::from_std(ttl)
                    .map_err(|e| AppError::internal(format!("Invalid cache ttl: {}", e)))?;
                Some(self.clock.now() + ttl)
            }
            None => None,
        };

        self.entries
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    ttl,
                    expires_at,
                },
            )
            .await;
        self.sweep_if_due().await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.invalidate(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.live_entry(key).await.is_some())
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let now = self.clock.now();
        Ok(self
            .live_entry(key)
            .await
            .and_then(|entry| entry.expires_at)
            .and_then(|at| (at - now).to_std().ok()))
    }
}
