//! TCP connection establishment
//!
//! Each side owns exactly one blocking `std::net::TcpStream` for the whole
//! session. Which side binds and which side dials is explicit per endpoint
//! ([`ConnectionRole`]) rather than tied to emitter/receiver.

use std::net::{SocketAddr, TcpListener, TcpStream};

use gaze_config::{ConnectionRole, EmitterConfig, ReceiverConfig};
use tracing::{debug, info};

use crate::error::{Result, StreamError};

/// Where and how to obtain the session connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub role: ConnectionRole,
    pub address: String,
    pub nodelay: bool,
}

impl Endpoint {
    pub fn listen(address: impl Into<String>) -> Self {
        Self {
            role: ConnectionRole::Listen,
            address: address.into(),
            nodelay: true,
        }
    }

    pub fn connect(address: impl Into<String>) -> Self {
        Self {
            role: ConnectionRole::Connect,
            address: address.into(),
            nodelay: true,
        }
    }

    pub fn for_emitter(config: &EmitterConfig) -> Self {
        Self {
            role: config.role,
            address: config.address(),
            nodelay: config.tcp_nodelay,
        }
    }

    pub fn for_receiver(config: &ReceiverConfig) -> Self {
        Self {
            role: config.role,
            address: config.address(),
            nodelay: true,
        }
    }

    /// Bind without accepting yet. Only valid for `Listen` endpoints.
    pub fn bind(&self) -> Result<BoundEndpoint> {
        if self.role != ConnectionRole::Listen {
            return Err(StreamError::connection(
                format!("cannot bind {}", self.address),
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "endpoint role is 'connect'",
                ),
            ));
        }
        let listener = TcpListener::bind(&self.address)
            .map_err(|e| StreamError::connection(format!("cannot bind {}", self.address), e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| StreamError::connection("cannot read bound address", e))?;
        info!("Listening on {}", local_addr);
        Ok(BoundEndpoint {
            listener,
            local_addr,
            nodelay: self.nodelay,
        })
    }

    /// Establish the single session connection: accept one peer or dial out.
    pub fn open(&self) -> Result<TcpStream> {
        match self.role {
            ConnectionRole::Listen => self.bind()?.accept(),
            ConnectionRole::Connect => {
                let stream = TcpStream::connect(&self.address).map_err(|e| {
                    StreamError::connection(format!("cannot connect to {}", self.address), e)
                })?;
                info!("Connected to {}", self.address);
                configure(stream, self.nodelay)
            }
        }
    }
}

/// Listening socket waiting for its single peer
#[derive(Debug)]
pub struct BoundEndpoint {
    listener: TcpListener,
    local_addr: SocketAddr,
    nodelay: bool,
}

impl BoundEndpoint {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept one peer; the listener is closed afterwards.
    pub fn accept(self) -> Result<TcpStream> {
        let (stream, peer) = self
            .listener
            .accept()
            .map_err(|e| StreamError::connection(format!("accept on {} failed", self.local_addr), e))?;
        info!("Peer connected from {}", peer);
        configure(stream, self.nodelay)
    }
}

fn configure(stream: TcpStream, nodelay: bool) -> Result<TcpStream> {
    if nodelay {
        stream
            .set_nodelay(true)
            .map_err(|e| StreamError::connection("cannot set TCP_NODELAY", e))?;
    }
    debug!(nodelay, "Session socket ready");
    Ok(stream)
}
