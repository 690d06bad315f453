use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use fizzbuzz::Limits;
use tokio::sync::Semaphore;

/// Largest number of integers a single request may ask for.
pub const MAX_RANGE: usize = 100;

/// Number of evaluation tasks that may hold a permit at once, process-wide.
pub const MAX_CONCURRENCY: usize = 1000;

/// Time budget of one request, in milliseconds.
pub const REQUEST_TIMEOUT_MS: u64 = 1_000;

/// How long shutdown waits for in-flight requests, in seconds.
pub const SHUTDOWN_GRACE_SECS: u64 = 5;

/// Runtime configuration for the `fizzbuzz-server` binary.
///
/// Defaults match the constants above. Every value can also be provided
/// through its environment variable (or a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fizzbuzz-server",
    version,
    about = "An HTTP service for bounded, parallel FizzBuzz ranges"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Maximum number of integers in a single `from..=to` request.
    ///
    /// Larger ranges are rejected with `400 Bad Request` before any work is
    /// scheduled.
    ///
    /// Environment variable: `MAX_RANGE`
    #[arg(long, env = "MAX_RANGE", default_value_t = MAX_RANGE)]
    pub max_range: usize,

    /// Capacity of the shared permit pool.
    ///
    /// Bounds how many per-number tasks may be runnable at the same time
    /// across all requests. Tasks beyond the cap wait for a permit, and that
    /// wait counts against their request's deadline.
    ///
    /// Environment variable: `MAX_CONCURRENCY`
    #[arg(long, env = "MAX_CONCURRENCY", default_value_t = MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Per-request deadline in milliseconds.
    ///
    /// Numbers whose task has not started by then are left empty in the
    /// response.
    ///
    /// Environment variable: `REQUEST_TIMEOUT_MS`
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,

    /// Grace period, in seconds, for in-flight requests during shutdown.
    ///
    /// Environment variable: `SHUTDOWN_GRACE_SECS`
    #[arg(long, env = "SHUTDOWN_GRACE_SECS", default_value_t = SHUTDOWN_GRACE_SECS)]
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub max_range: usize,
    pub max_concurrency: usize,
    pub request_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    pub const fn limits(&self) -> Limits {
        Limits::new(self.max_range, self.request_timeout)
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_range == 0 {
            bail!("MAX_RANGE must be greater than 0");
        }

        if args.max_concurrency == 0 {
            bail!("MAX_CONCURRENCY must be greater than 0");
        }

        if args.max_concurrency > Semaphore::MAX_PERMITS {
            bail!(
                "MAX_CONCURRENCY ({}) exceeds the permit limit (max = {})",
                args.max_concurrency,
                Semaphore::MAX_PERMITS
            );
        }

        Ok(Self {
            server_addr: args.server_addr,
            max_range: args.max_range,
            max_concurrency: args.max_concurrency,
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            shutdown_grace: Duration::from_secs(args.shutdown_grace_secs),
        })
    }
}
