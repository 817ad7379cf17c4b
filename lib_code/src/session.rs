use std::time::Duration;

use log::debug;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};

use crate::{ClientConfig, Error, FrameRule, RECV_CHUNK};

/// One persistent connection: every request is followed by one framed response.
pub struct Session<S> {
    stream: S,
    buffer: Vec<u8>,
    rule: FrameRule,
    timeout: Option<Duration>,
}

pub async fn connect(config: &ClientConfig) -> Result<Session<TcpStream>, Error> {
    let stream = TcpStream::connect(config.address()).await?;
    debug!("connected to {}:{} (local {})", config.server, config.port, stream.local_addr()?);

    Ok(Session::new(stream, config.frame).with_timeout(config.timeout))
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, rule: FrameRule) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(RECV_CHUNK),
            rule,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rule(&self) -> FrameRule {
        self.rule
    }

    pub async fn send_request(&mut self, request: &[u8]) -> Result<(), Error> {
        self.stream.write_all(request).await?;
        self.stream.flush().await?;
        debug!("sent {} bytes", request.len());
        Ok(())
    }

    /// Reads until the frame rule is satisfied. Never returns `Ok` before that.
    pub async fn receive_response(&mut self) -> Result<String, Error> {
        self.buffer.clear();
        let mut chunk = [0u8; RECV_CHUNK];

        loop {
            let size = self.read_chunk(&mut chunk).await?;
            if size == 0 {
                return Err(Error::ConnectionClosed { received: self.buffer.len() });
            }

            self.buffer.extend_from_slice(&chunk[..size]);
            debug!("received {} bytes ({} buffered)", size, self.buffer.len());

            if self.rule.is_complete(&self.buffer) {
                break;
            }
        }

        Ok(String::from_utf8_lossy(&self.buffer).into_owned())
    }

    pub async fn exchange(&mut self, request: &[u8]) -> Result<String, Error> {
        self.send_request(request).await?;
        self.receive_response().await
    }

    async fn read_chunk(&mut self, chunk: &mut [u8]) -> Result<usize, Error> {
        let Some(limit) = self.timeout else {
            return Ok(self.stream.read(chunk).await?);
        };

        match timeout(limit, self.stream.read(chunk)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Timeout(limit)),
        }
    }
}
