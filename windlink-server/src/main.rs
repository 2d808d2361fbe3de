use std::time::Duration;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle, Toplevel};

use windlink_server::dashboard::Dashboard;
use windlink_server::feed::HttpFeed;
use windlink_server::poller::Poller;
use windlink_server::{web, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let feed = HttpFeed::new(&args.backend, args.request_timeout()).into_diagnostic()?;
    log::info!(
        "windlink {}: backend {}, poll interval {:?}",
        env!("CARGO_PKG_VERSION"),
        args.backend,
        args.poll_interval()
    );

    let dashboard = Dashboard::shared(args.poll_interval());
    let poller = Poller::new(feed, dashboard.clone(), args.poll_interval());
    let addr = args.listen_addr();

    Toplevel::new(move |s: SubsystemHandle| async move {
        s.start(SubsystemBuilder::new("poller", move |subsys| poller.run(subsys)));
        s.start(SubsystemBuilder::new("web", move |subsys| {
            web::serve(subsys, addr, dashboard)
        }));
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_millis(1000))
    .await
    .into_diagnostic()
}
