//! 基于缓存的 OTP 存储与请求计数

use std::sync::Arc;
use std::time::Duration;

use portal_errors::{AppError, AppResult};
use portal_ports::CachePort;
use tracing::warn;

use crate::domain::otp::OtpRecord;

const CODE_KEY_PREFIX: &str = "otp:verify:";
const LIMIT_KEY_PREFIX: &str = "otp:limit:";
const ATTEMPTS_KEY_PREFIX: &str = "otp:attempts:";

/// OTP 存储
///
/// 验证码与请求计数都保存在带过期时间的缓存里，过期即视为不存在。
#[derive(Clone)]
pub struct OtpStore {
    cache: Arc<dyn CachePort>,
}

impl OtpStore {
    pub fn new(cache: Arc<dyn CachePort>) -> Self {
        Self { cache }
    }

    fn code_key(identifier: &str) -> String {
        format!("{}{}", CODE_KEY_PREFIX, identifier)
    }

    fn limit_key(identifier: &str) -> String {
        format!("{}{}", LIMIT_KEY_PREFIX, identifier)
    }

    fn attempts_key(identifier: &str) -> String {
        format!("{}{}", ATTEMPTS_KEY_PREFIX, identifier)
    }

    async fn read_counter(&self, key: &str) -> AppResult<u32> {
        let Some(raw) = self.cache.get(key).await? else {
            return Ok(0);
        };

        match raw.parse() {
            Ok(count) => Ok(count),
            Err(_) => {
                warn!(key = %key, value = %raw, "Unreadable OTP counter, treating as zero");
                Ok(0)
            }
        }
    }

    /// 读取有效验证码
    pub async fn load_code(&self, identifier: &str) -> AppResult<Option<OtpRecord>> {
        let Some(raw) = self.cache.get(&Self::code_key(identifier)).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AppError::internal(format!("Corrupt OTP record: {}", e)))
    }

    /// 保存验证码，覆盖同一标识下的旧记录并清零错误次数
    pub async fn save_code(&self, identifier: &str, record: &OtpRecord, ttl: Duration) -> AppResult<()> {
        let raw = serde_json::to_string(record)
            .map_err(|e| AppError::internal(format!("Failed to serialize OTP record: {}", e)))?;
        self.cache
            .set(&Self::code_key(identifier), &raw, Some(ttl))
            .await?;
        self.cache.delete(&Self::attempts_key(identifier)).await
    }

    /// 作废验证码及其错误计数
    pub async fn remove_code(&self, identifier: &str) -> AppResult<()> {
        self.cache.delete(&Self::code_key(identifier)).await?;
        self.cache.delete(&Self::attempts_key(identifier)).await
    }

    /// 当前窗口内的请求次数
    pub async fn request_count(&self, identifier: &str) -> AppResult<u32> {
        self.read_counter(&Self::limit_key(identifier)).await
    }

    /// 当前验证码已累计的错误次数
    pub async fn failed_attempts(&self, identifier: &str) -> AppResult<u32> {
        self.read_counter(&Self::attempts_key(identifier)).await
    }

    /// 写入错误次数，与验证码同时过期
    pub async fn record_failed_attempt(&self, identifier: &str, count: u32, ttl: Duration) -> AppResult<()> {
        self.cache
            .set(&Self::attempts_key(identifier), &count.to_string(), Some(ttl))
            .await
    }

    /// 写入计数，每次都以新的窗口时长作为过期时间
    pub async fn record_request(&self, identifier: &str, count: u32, window: Duration) -> AppResult<()> {
        self.cache
            .set(&Self::limit_key(identifier), &count.to_string(), Some(window))
            .await
    }

    /// 距离计数窗口结束的时间
    pub async fn quota_resets_in(&self, identifier: &str) -> AppResult<Option<Duration>> {
        self.cache.ttl(&Self::limit_key(identifier)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use portal_adapter_memory::MemoryCache;
    use portal_ports::ManualClock;

    fn store() -> (OtpStore, ManualClock, Arc<MemoryCache>) {
        let clock = ManualClock::default();
        let cache = Arc::new(MemoryCache::with_clock(Arc::new(clock.clone())));
        (OtpStore::new(cache.clone()), clock, cache)
    }

    #[tokio::test]
    async fn test_code_round_trip_and_overwrite() {
        let (store, _, _) = store();
        let first = OtpRecord::new("111111", Utc::now(), chrono::Duration::seconds(300));
        let second = OtpRecord::new("222222", Utc::now(), chrono::Duration::seconds(300));

        store.save_code("a@example.com", &first, Duration::from_secs(300)).await.unwrap();
        store.save_code("a@example.com", &second, Duration::from_secs(300)).await.unwrap();

        let loaded = store.load_code("a@example.com").await.unwrap().unwrap();
        assert_eq!(loaded.code, "222222");
    }

    #[tokio::test]
    async fn test_code_expires_with_ttl() {
        let (store, clock, _) = store();
        let record = OtpRecord::new("123456", Utc::now(), chrono::Duration::seconds(300));
        store.save_code("9998887777", &record, Duration::from_secs(300)).await.unwrap();

        clock.advance(chrono::Duration::seconds(300));
        assert!(store.load_code("9998887777").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_counter_defaults_to_zero_and_expires() {
        let (store, clock, _) = store();
        assert_eq!(store.request_count("x").await.unwrap(), 0);

        store.record_request("x", 2, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(store.request_count("x").await.unwrap(), 2);
        assert_eq!(
            store.quota_resets_in("x").await.unwrap(),
            Some(Duration::from_secs(3600))
        );

        clock.advance(chrono::Duration::seconds(3600));
        assert_eq!(store.request_count("x").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_garbage_counter_treated_as_zero() {
        let (store, _, cache) = store();
        cache.set("otp:limit:x", "many", None).await.unwrap();
        assert_eq!(store.request_count("x").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_new_code_clears_failed_attempts() {
        let (store, _, _) = store();
        let record = OtpRecord::new("123456", Utc::now(), chrono::Duration::seconds(300));

        store.save_code("x", &record, Duration::from_secs(300)).await.unwrap();
        store.record_failed_attempt("x", 3, Duration::from_secs(300)).await.unwrap();
        assert_eq!(store.failed_attempts("x").await.unwrap(), 3);

        store.save_code("x", &record, Duration::from_secs(300)).await.unwrap();
        assert_eq!(store.failed_attempts("x").await.unwrap(), 0);

        store.record_failed_attempt("x", 1, Duration::from_secs(300)).await.unwrap();
        store.remove_code("x").await.unwrap();
        assert_eq!(store.failed_attempts("x").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_error() {
        let (store, _, cache) = store();
        cache.set("otp:verify:x", "{not json", None).await.unwrap();
        assert!(store.load_code("x").await.is_err());
    }
}
