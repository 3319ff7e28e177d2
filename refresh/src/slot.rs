//! A single simulated joiner

use std::{io, net::SocketAddr, time::Duration};

use autorefresh_proto::{ResponseOutcome, HEADER_LEN};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connecting: {0}")]
    Connect(io::Error),
    #[error("timed out connecting")]
    ConnectTimeout,
    #[error("sending join request: {0}")]
    Send(io::Error),
    #[error("reading response: {0}")]
    Receive(io::Error),
    #[error("timed out waiting for a response")]
    ReadTimeout,
}

/// Opens slots against one host
#[derive(Debug, Clone)]
pub struct SlotConnector {
    address: SocketAddr,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl SlotConnector {
    pub fn new(address: SocketAddr, connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            address,
            connect_timeout,
            read_timeout,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Connect, send `packet`, and classify the host's reply.
    ///
    /// On success the connection is left open so the host keeps showing the pending joiner; the
    /// caller is responsible for [`Slot::close`]ing it. On failure the connection, if any, has
    /// already been closed.
    pub async fn refresh_slot(
        &self,
        index: usize,
        packet: &[u8],
    ) -> Result<(ResponseOutcome, Slot), TransportError> {
        let stream = timeout(self.connect_timeout, TcpStream::connect(self.address))
            .await
            .map_err(|_| TransportError::ConnectTimeout)?
            .map_err(TransportError::Connect)?;
        let mut slot = Slot { index, stream };
        // `slot` is dropped, and hence closed, if anything below fails
        slot.stream
            .write_all(packet)
            .await
            .map_err(TransportError::Send)?;
        let mut header = [0; HEADER_LEN];
        timeout(self.read_timeout, slot.stream.read_exact(&mut header))
            .await
            .map_err(|_| TransportError::ReadTimeout)?
            .map_err(TransportError::Receive)?;
        Ok((ResponseOutcome::classify(&header), slot))
    }
}

/// An open connection whose join request has been answered
#[derive(Debug)]
pub struct Slot {
    index: usize,
    stream: TcpStream,
}

impl Slot {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Shut down the connection gracefully
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(slot = self.index, "shutdown failed: {}", e);
        }
    }
}
