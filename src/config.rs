use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::GatewayResult;
use crate::relabel::{DanglingPolicy, Relabeler};
use crate::solver::HttpSolver;

pub const DEFAULT_APP_NAME: &str = "r-dynamic-coloring-service";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SOLVER_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);
pub const DEFAULT_RATE_LIMIT: u32 = 10;
pub const DEFAULT_RATE_BURST: u32 = 20;

/// Coloring requests each client may send: a sustained rate plus a burst allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub per_second: NonZeroU32,
    pub burst: NonZeroU32,
    /// Identify clients by the first `X-Forwarded-For` address instead of the peer address.
    pub trust_forwarded: bool,
}

impl RateLimit {
    pub fn new(per_second: NonZeroU32, burst: NonZeroU32) -> Self {
        Self {
            per_second,
            burst,
            trust_forwarded: false,
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        let per_second = NonZeroU32::new(DEFAULT_RATE_LIMIT).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(DEFAULT_RATE_BURST).unwrap_or(per_second);
        Self::new(per_second, burst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub app_name: String,
    pub bind_addr: SocketAddr,
    /// Base url of the solver; requests go to `<solver_endpoint>/color/graph`.
    pub solver_endpoint: String,
    pub api_key: String,
    pub solver_timeout: Duration,
    pub max_body_bytes: usize,
    pub dangling: DanglingPolicy,
    /// `None` lets every coloring request through.
    pub rate_limit: Option<RateLimit>,
    /// How long in-flight requests may run once shutdown begins.
    pub shutdown_grace: Duration,
}

impl GatewayConfig {
    pub fn new<S: Into<String>>(solver_endpoint: S) -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_owned(),
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            solver_endpoint: solver_endpoint.into(),
            api_key: String::new(),
            solver_timeout: DEFAULT_SOLVER_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            dangling: DanglingPolicy::default(),
            rate_limit: Some(RateLimit::default()),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    pub fn solver(&self) -> GatewayResult<HttpSolver> {
        HttpSolver::new(&self.solver_endpoint, &self.api_key, self.solver_timeout)
    }

    pub fn relabeler(&self) -> Relabeler {
        Relabeler::new(self.dangling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::new("http://solver:8000");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.relabeler().policy(), DanglingPolicy::Reject);
        let solver = config.solver().unwrap();
        assert_eq!(solver.url().path(), "/color/graph");
        assert_eq!(solver.timeout(), DEFAULT_SOLVER_TIMEOUT);
        let limit = config.rate_limit.unwrap();
        assert_eq!((limit.per_second.get(), limit.burst.get()), (10, 20));
        assert!(!limit.trust_forwarded);
        assert_eq!(config.shutdown_grace, Duration::from_secs(10));
    }

    #[test]
    fn test_bad_endpoint() {
        let err = GatewayConfig::new("").solver().unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }
}
