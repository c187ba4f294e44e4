use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::utils::telegram_auth::TelegramIdentity;

const WINDOW: Duration = Duration::from_secs(1);
/// Buckets idle for longer than this are dropped on the next sweep.
const IDLE_AFTER: Duration = Duration::from_secs(60);
const SWEEP_AT: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caller {
    Telegram(i64),
    Anonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Throttled { retry_after: Duration },
}

#[derive(Debug)]
struct Bucket {
    opened: Instant,
    used: u32,
}

/// Per-caller fixed one-second windows. Mount it behind the identity guard so
/// each mini-app user gets their own budget.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    buckets: Arc<Mutex<HashMap<Caller, Bucket>>>,
}

impl RateLimiter {
    pub fn per_second(rps: u32) -> Self {
        Self {
            rps: rps.max(1),
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn admit(&self, caller: Caller) -> Admission {
        self.admit_at(caller, Instant::now())
    }

    fn admit_at(&self, caller: Caller, now: Instant) -> Admission {
        let mut buckets = match self.buckets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if buckets.len() >= SWEEP_AT {
            buckets.retain(|_, b| now.saturating_duration_since(b.opened) < IDLE_AFTER);
        }

        let bucket = buckets.entry(caller).or_insert(Bucket {
            opened: now,
            used: 0,
        });
        let elapsed = now.saturating_duration_since(bucket.opened);
        if elapsed >= WINDOW {
            bucket.opened = now;
            bucket.used = 0;
        }
        if bucket.used < self.rps {
            bucket.used += 1;
            Admission::Allowed
        } else {
            Admission::Throttled {
                retry_after: WINDOW.saturating_sub(elapsed),
            }
        }
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let caller = req
        .extensions()
        .get::<TelegramIdentity>()
        .map(|identity| Caller::Telegram(identity.id))
        .unwrap_or(Caller::Anonymous);

    match limiter.admit(caller) {
        Admission::Allowed => next.run(req).await,
        Admission::Throttled { retry_after } => {
            tracing::warn!(?caller, path = %req.uri().path(), "rate limit exceeded");
            let seconds = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            let mut resp = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": "Too many requests, please slow down", "code": "rate_limited"})),
            )
                .into_response();
            resp.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
            resp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_user_has_an_own_budget() {
        let limiter = RateLimiter::per_second(2);
        let now = Instant::now();
        assert_eq!(limiter.admit_at(Caller::Telegram(1), now), Admission::Allowed);
        assert_eq!(limiter.admit_at(Caller::Telegram(1), now), Admission::Allowed);
        assert!(matches!(
            limiter.admit_at(Caller::Telegram(1), now),
            Admission::Throttled { .. }
        ));
        assert_eq!(limiter.admit_at(Caller::Telegram(2), now), Admission::Allowed);
    }

    #[test]
    fn window_reopens_after_a_second() {
        let limiter = RateLimiter::per_second(1);
        let start = Instant::now();
        assert_eq!(limiter.admit_at(Caller::Anonymous, start), Admission::Allowed);

        let later = start + Duration::from_millis(400);
        assert_eq!(
            limiter.admit_at(Caller::Anonymous, later),
            Admission::Throttled {
                retry_after: Duration::from_millis(600)
            }
        );
        assert_eq!(
            limiter.admit_at(Caller::Anonymous, start + WINDOW),
            Admission::Allowed
        );
    }

    #[test]
    fn zero_rps_still_admits_one() {
        let limiter = RateLimiter::per_second(0);
        let now = Instant::now();
        assert_eq!(limiter.admit_at(Caller::Anonymous, now), Admission::Allowed);
        assert!(matches!(
            limiter.admit_at(Caller::Anonymous, now),
            Admission::Throttled { .. }
        ));
    }
}
