use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use coloring_gateway::config::{GatewayConfig, RateLimit, DEFAULT_APP_NAME};
use coloring_gateway::server::{bind, shutdown_signal, AppState};
use coloring_gateway::{GatewayError, GatewayResult};
use log::{info, warn};

use super::{runtime, RelabelOptions, SolverArgs};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Specify the address to listen on.
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    /// Specify the port to listen on.
    #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
    port: u16,
    /// Specify the application name reported by the info endpoint.
    #[arg(long, env = "APP_NAME", default_value = DEFAULT_APP_NAME)]
    app_name: String,
    /// Specify the largest accepted request body, in bytes.
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "8388608")]
    max_body_bytes: usize,
    /// Specify how long in-flight requests may run after a shutdown signal, in seconds.
    #[arg(long, env = "SHUTDOWN_GRACE_SECS", value_name = "SECS", default_value = "10")]
    shutdown_grace: u64,
    #[command(flatten)]
    limit: RateLimitArgs,
    #[command(flatten)]
    solver: SolverArgs,
    #[command(flatten)]
    options: RelabelOptions,
}

#[derive(Debug, Args)]
struct RateLimitArgs {
    /// Specify the sustained coloring requests per second allowed for each client, 0 to disable.
    #[arg(long, env = "RATE_LIMIT_PER_SECOND", value_name = "N", default_value = "10")]
    rate_limit: u32,
    /// Specify how many coloring requests a client may send at once.
    #[arg(long, env = "RATE_LIMIT_BURST", value_name = "N", default_value = "20")]
    rate_limit_burst: u32,
    /// Identify clients by the X-Forwarded-For header, for use behind a proxy.
    #[arg(long, env = "RATE_LIMIT_TRUST_FORWARDED")]
    trust_forwarded: bool,
}

impl RateLimitArgs {
    fn limit(&self) -> Option<RateLimit> {
        let per_second = NonZeroU32::new(self.rate_limit)?;
        let burst = NonZeroU32::new(self.rate_limit_burst).unwrap_or(per_second);
        let mut limit = RateLimit::new(per_second, burst);
        limit.trust_forwarded = self.trust_forwarded;
        Some(limit)
    }
}

impl From<&ServeArgs> for GatewayConfig {
    fn from(args: &ServeArgs) -> Self {
        let mut config = GatewayConfig::new(args.solver.solver_url.clone());
        config.app_name = args.app_name.clone();
        config.bind_addr = SocketAddr::new(args.host, args.port);
        config.api_key = args.solver.api_key.clone();
        config.solver_timeout = args.solver.timeout();
        config.max_body_bytes = args.max_body_bytes;
        config.dangling = args.options.dangling;
        config.rate_limit = args.limit.limit();
        config.shutdown_grace = Duration::from_secs(args.shutdown_grace);
        config
    }
}

pub fn serve(args: ServeArgs) -> GatewayResult<ExitCode> {
    let config = GatewayConfig::from(&args);
    let solver = config.solver()?;
    if config.api_key.is_empty() {
        warn!("no solver api key configured");
    }
    info!(
        "solver at {} (timeout {:?}), dangling neighbors: {}",
        solver.url(),
        config.solver_timeout,
        config.dangling
    );
    match config.rate_limit {
        Some(limit) => info!(
            "coloring requests limited to {}/s per client (burst {})",
            limit.per_second, limit.burst
        ),
        None => warn!("coloring requests are not rate limited"),
    }
    let state = Arc::new(AppState::new(&config, Box::new(solver)));
    runtime()?.block_on(async {
        let (addr, running) = bind(
            config.bind_addr,
            state,
            shutdown_signal(),
            config.shutdown_grace,
        )?;
        info!("{} listening on {addr}", config.app_name);
        running.await?;
        info!("server exited properly");
        Ok::<_, GatewayError>(ExitCode::SUCCESS)
    })
}
