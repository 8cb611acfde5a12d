//! `hl7-mllp` listener binary.
//!
//! Accepts MLLP connections, logs every inbound message and answers it with
//! the synthesised acknowledgment.

mod cli;

use std::time::Duration;

use clap::Parser;
use hl7_mllp::{RequestOutcome, Response, TextEncoding, server::MllpServer};
use log::{info, warn};

async fn log_and_acknowledge(outcome: RequestOutcome, response: Option<Response>) {
    match &outcome {
        RequestOutcome::Ok(request) => info!(
            "message received: type={}^{}, sender={}, facility={}, bytes={}",
            request.message_type(),
            request.event(),
            request.sender(),
            request.facility(),
            request.raw().len()
        ),
        RequestOutcome::ParseFailure(failed) | RequestOutcome::SocketFailure(failed) => warn!(
            "message rejected: kind={}, error={}, bytes={}",
            failed.err_type(),
            failed.err(),
            failed.raw().len()
        ),
        RequestOutcome::BenignClose => {}
    }

    if let Some(response) = response
        && let Err(e) = response.send().await
    {
        warn!("failed to send acknowledgment: error={e}");
    }
}

#[cfg(feature = "metrics")]
fn install_metrics_exporter(
    addr: Option<std::net::SocketAddr>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(addr) = addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!("metrics exporter listening: addr={addr}");
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics_exporter(
    addr: Option<std::net::SocketAddr>,
) -> Result<(), Box<dyn std::error::Error>> {
    if addr.is_some() {
        warn!("--metrics-listen ignored: built without the `metrics` feature");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let encoding: TextEncoding = cli.encoding.parse()?;
    install_metrics_exporter(cli.metrics_listen)?;

    let mut server = MllpServer::new(log_and_acknowledge)
        .encoding(encoding)
        .append_cr(cli.append_cr)
        .read_timeout(cli.read_timeout.map(Duration::from_secs));
    if let Some(workers) = cli.workers {
        server = server.workers(workers);
    }

    let server = server.bind(cli.listen_addr())?;
    info!(
        "hl7-mllp listening: addr={:?}, encoding={encoding}",
        server.local_addr()
    );
    server.run().await?;
    Ok(())
}
