use std::net::SocketAddr;
use std::time::Duration;

use crate::core::ReachabilityProbe;
use async_trait::async_trait;
use tokio::net::TcpStream;

/// Google public DNS; reachable from nearly every network.
pub const DEFAULT_PROBE_ADDRESS: &str = "8.8.8.8:53";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Opens and immediately drops a TCP connection to a fixed address.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: SocketAddr,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(address: SocketAddr, timeout: Duration) -> Self {
        Self { address, timeout }
    }
}

#[async_trait]
impl ReachabilityProbe for TcpProbe {
    async fn probe(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(self.address)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                tracing::debug!("Probe to {} failed: {}", self.address, e);
                false
            }
            Err(_) => {
                tracing::debug!("Probe to {} timed out after {:?}", self.address, self.timeout);
                false
            }
        }
    }
}
