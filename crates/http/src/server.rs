//! TCP transport: accept loop with one task per connection.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use crate::connection::{HttpConnection, DEFAULT_READ_BUFFER};
use crate::handler::Handler;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("address must be set")]
    MissingAddress,

    #[error("handler must be set")]
    MissingHandler,

    #[error("invalid address: {source}")]
    InvalidAddress { source: io::Error },

    #[error("bind server error: {source}")]
    Bind { source: io::Error },
}

#[derive(Debug)]
pub struct ServerBuilder<H> {
    address: Option<io::Result<Vec<SocketAddr>>>,
    handler: Option<H>,
    read_buffer_capacity: usize,
}

impl<H> ServerBuilder<H>
where
    H: Handler<OwnedWriteHalf> + 'static,
{
    fn new() -> Self {
        Self { address: None, handler: None, read_buffer_capacity: DEFAULT_READ_BUFFER }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Initial capacity of each connection's receive buffer.
    pub fn read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.read_buffer_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<Server<H>, ServerError> {
        let address = self.address.ok_or(ServerError::MissingAddress)?.map_err(|source| ServerError::InvalidAddress { source })?;
        let handler = self.handler.ok_or(ServerError::MissingHandler)?;
        Ok(Server { address, handler: Arc::new(handler), read_buffer_capacity: self.read_buffer_capacity })
    }
}

#[derive(Debug)]
pub struct Server<H> {
    address: Vec<SocketAddr>,
    handler: Arc<H>,
    read_buffer_capacity: usize,
}

impl<H> Server<H>
where
    H: Handler<OwnedWriteHalf> + 'static,
{
    pub fn builder() -> ServerBuilder<H> {
        ServerBuilder::new()
    }

    /// Binds the listener without accepting connections yet.
    pub async fn bind(self) -> Result<BoundServer<H>, ServerError> {
        let listener = TcpListener::bind(self.address.as_slice()).await.map_err(|source| ServerError::Bind { source })?;
        Ok(BoundServer { listener, handler: self.handler, read_buffer_capacity: self.read_buffer_capacity })
    }

    /// Serves until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Serves until `signal` resolves.
    pub async fn start_with_shutdown<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        self.bind().await?.serve_with_shutdown(signal).await
    }
}

#[derive(Debug)]
pub struct BoundServer<H> {
    listener: TcpListener,
    handler: Arc<H>,
    read_buffer_capacity: usize,
}

impl<H> BoundServer<H>
where
    H: Handler<OwnedWriteHalf> + 'static,
{
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `signal` resolves.
    ///
    /// Connections already being handled keep running on their own tasks.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        info!(address = ?self.listener.local_addr().ok(), "start listening");
        tokio::pin!(signal);

        loop {
            tokio::select! {
                () = &mut signal => {
                    info!("shutdown signal received, stop accepting");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (tcp_stream, remote_addr) = match accepted {
                        Ok(stream_and_addr) => stream_and_addr,
                        Err(e) => {
                            warn!(cause = %e, "failed to accept");
                            continue;
                        }
                    };
                    self.spawn_connection(tcp_stream, remote_addr);
                }
            }
        }
    }

    fn spawn_connection(&self, tcp_stream: TcpStream, remote_addr: SocketAddr) {
        let handler = Arc::clone(&self.handler);
        let read_buffer_capacity = self.read_buffer_capacity;

        tokio::spawn(async move {
            let (reader, writer) = tcp_stream.into_split();
            let connection = HttpConnection::with_capacity(reader, writer, read_buffer_capacity);
            match connection.process(handler).await {
                Ok(()) => {
                    info!(%remote_addr, "finished process, connection shutdown");
                }
                Err(e) => {
                    error!(%remote_addr, cause = %e, "service has error, connection shutdown");
                }
            }
        });
    }
}
