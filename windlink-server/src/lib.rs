//! windlink-server: live device map dashboard
//!
//! Polls a backend for device positions and the current shortest path,
//! keeps the resulting map scene in memory and serves it, together with a
//! Leaflet page that draws it, over HTTP.
//!
//! - **feed**: [`FeedSource`](feed::FeedSource) and its reqwest implementation
//! - **dashboard**: the per-session map state and its JSON snapshot
//! - **poller**: the interval timer driving both refreshes
//! - **web**: axum router for the scene API and the embedded page

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod dashboard;
pub mod error;
pub mod feed;
pub mod poller;
pub mod web;

pub use error::RefreshError;

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Base URL of the backend serving /get_positions and /get_shortest_path
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub backend: String,

    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Per-request timeout in milliseconds; requests never time out if unset
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Port for the dashboard web server
    #[arg(short, long, default_value_t = 6510)]
    pub port: u16,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub listen: IpAddr,
}

impl Cli {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_millis)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = Cli::parse_from(["windlink-server"]);

        assert_eq!(args.backend, "http://127.0.0.1:5000");
        assert_eq!(args.poll_interval(), Duration::from_millis(500));
        assert_eq!(args.request_timeout(), None);
        assert_eq!(args.listen_addr(), "0.0.0.0:6510".parse::<SocketAddr>().unwrap());
        assert_eq!(args.verbose.log_level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_cli_overrides() {
        let args = Cli::parse_from([
            "windlink-server",
            "--backend",
            "http://10.0.0.2:8080/feeds",
            "--interval",
            "250",
            "--timeout",
            "2000",
            "-p",
            "8000",
            "--listen",
            "127.0.0.1",
            "-vv",
        ]);

        assert_eq!(args.poll_interval(), Duration::from_millis(250));
        assert_eq!(args.request_timeout(), Some(Duration::from_secs(2)));
        assert_eq!(args.listen_addr(), "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(args.verbose.log_level_filter(), log::LevelFilter::Trace);
    }

    #[test]
    fn test_cli_rejects_zero_interval() {
        assert!(Cli::try_parse_from(["windlink-server", "--interval", "0"]).is_err());
    }
}
