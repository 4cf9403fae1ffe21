use std::net::{IpAddr, SocketAddr};

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use hyper::header::HeaderMap;

use crate::config::RateLimit;
use crate::error::{GatewayError, GatewayResult};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Keeps one token bucket per client address.
pub struct ClientLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    clock: DefaultClock,
    trust_forwarded: bool,
}

impl ClientLimiter {
    pub fn new(limit: RateLimit) -> Self {
        let quota = Quota::per_second(limit.per_second).allow_burst(limit.burst);
        Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
            trust_forwarded: limit.trust_forwarded,
        }
    }

    pub fn client(&self, peer: SocketAddr, headers: &HeaderMap) -> IpAddr {
        if !self.trust_forwarded {
            return peer.ip();
        }
        headers
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse().ok())
            .unwrap_or_else(|| peer.ip())
    }

    pub fn check(&self, client: IpAddr) -> GatewayResult<()> {
        self.limiter.check_key(&client).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            let err = format!("too many requests from {client}, retry in {} ms", wait.as_millis());
            GatewayError::RateLimited(err)
        })?;
        if self.limiter.len() > 4096 {
            self.limiter.retain_recent();
        }
        Ok(())
    }
}
