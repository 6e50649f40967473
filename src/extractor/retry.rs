//! レート制限リトライ
//!
//! 外部サービス呼び出しを包むバックオフ。レート制限系のエラーだけを
//! 有限回リトライし、それ以外のエラーは即座に返す。
//! 待機はブロッキングで、エラーメッセージに待機秒数のヒントが
//! あればそれを使う（ただし下限は守る）。

use crate::error::{Result, SommelierError};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    /// "retry in N seconds" 形式の待機ヒント
    static ref RETRY_HINT: Regex = Regex::new(r"(?i)retry in\s+(\d+(?:\.\d+)?)\s*s").unwrap();
}

/// リトライ方針
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 初回を含む総試行回数
    pub max_attempts: u32,
    /// ヒントが無いときの待機時間
    pub default_wait: Duration,
    /// 待機時間の下限
    pub min_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_wait: Duration::from_secs(30),
            min_wait: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// エラーメッセージから待機時間を決める
    pub fn wait_for(&self, detail: &str) -> Duration {
        suggested_wait(detail)
            .unwrap_or(self.default_wait)
            .max(self.min_wait)
    }
}

/// レート制限エラーなら有限回リトライして呼び出す
///
/// 上限に達したら最後のエラー詳細を載せた RateLimit を返す。
/// レート制限以外のエラーはリトライせずそのまま返す。
pub fn call_with_retry<T, F>(policy: &RetryPolicy, mut call: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut last_detail = String::new();

    for attempt in 1..=policy.max_attempts {
        match call() {
            Ok(value) => return Ok(value),
            Err(e) if is_rate_limit(&e) => {
                last_detail = e.to_string();
                if attempt == policy.max_attempts {
                    break;
                }
                let wait = policy.wait_for(&last_detail);
                println!(
                    "  ⚠ レート制限を検出。{}秒待機してリトライします ({}/{})",
                    wait.as_secs(),
                    attempt,
                    policy.max_attempts
                );
                std::thread::sleep(wait);
            }
            Err(e) => return Err(e),
        }
    }

    Err(SommelierError::RateLimit(last_detail))
}

/// レート制限/クォータ系のエラーかどうか
pub fn is_rate_limit(error: &SommelierError) -> bool {
    match error {
        SommelierError::ApiCall(detail) => {
            let lower = detail.to_lowercase();
            lower.contains("429")
                || lower.contains("quota")
                || lower.contains("rate limit")
                || lower.contains("rate-limit")
                || lower.contains("resource_exhausted")
        }
        _ => false,
    }
}

/// エラーメッセージ中の待機ヒントを取り出す
pub fn suggested_wait(detail: &str) -> Option<Duration> {
    let captures = RETRY_HINT.captures(detail)?;
    let seconds: f64 = captures.get(1)?.as_str().parse().ok()?;
    Some(Duration::from_secs_f64(seconds))
}
