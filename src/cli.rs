//! Command line interface for the `hl7-mllp` listener binary.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

/// Command line arguments for the `hl7-mllp` binary.
#[derive(Debug, Parser)]
#[command(
    name = "hl7-mllp",
    version,
    about = "Accept HL7 v2 messages over MLLP and acknowledge each one"
)]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// TCP port to listen on.
    #[arg(short, long, default_value_t = 2575)]
    pub port: u16,

    /// Text encoding of frames: utf-8, latin1 or ascii.
    #[arg(short, long, default_value = "utf-8")]
    pub encoding: String,

    /// Insert a carriage return before the trailer of each acknowledgment.
    #[arg(long)]
    pub append_cr: bool,

    /// Number of accept tasks sharing the listener.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Seconds a connection may stay silent; idle connections are closed.
    #[arg(long, value_name = "SECS")]
    pub read_timeout: Option<u64>,

    /// Expose Prometheus metrics on this address.
    #[arg(long, value_name = "ADDR")]
    pub metrics_listen: Option<SocketAddr>,
}

impl Cli {
    /// Socket address assembled from `--bind` and `--port`.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr { SocketAddr::new(self.bind, self.port) }
}
