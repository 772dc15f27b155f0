//! Framed connections to the daemon.
//!
//! Messages are sent back-to-back on a stream socket. The receiving side reads the fixed-size
//! header first, and then as many payload bytes as the header announces.

use std::io::{self, Read, Write};

use crate::{
    hex::Hex,
    message::{decoder::Reader, payload::Payload, AnyMessage, Header, Message, HEADER_LEN},
    MAX_PAYLOAD_LEN,
};

/// A bidirectional channel carrying framed messages.
pub trait Transport {
    /// Sends the encoded message in `buf`.
    fn send(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Receives exactly one message, header included.
    ///
    /// A message whose payload exceeds [`MAX_PAYLOAD_LEN`] is skipped and reported as an error of
    /// kind [`io::ErrorKind::InvalidData`]; the next call receives the message after it.
    fn receive(&mut self) -> io::Result<Vec<u8>>;
}

/// Returns the number of payload bytes announced by the given encoded header.
pub fn payload_len(header: &[u8; HEADER_LEN]) -> io::Result<usize> {
    let header = Header::decode(&mut Reader::new(header))?;
    Ok(header.payload_len() as usize)
}

/// Fails with [`io::ErrorKind::InvalidData`] if `len` exceeds [`MAX_PAYLOAD_LEN`].
///
/// The payload is still in the stream when this fails, and has to be skipped by the caller.
pub fn check_payload_len(len: usize) -> io::Result<()> {
    if len > MAX_PAYLOAD_LEN as usize {
        log::debug!("skipping oversized frame with {} payload bytes", len);
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("message payload of {len} bytes exceeds maximum of {MAX_PAYLOAD_LEN}"),
        ));
    }
    Ok(())
}

/// A blocking connection to the daemon.
///
/// Usually a [`UnixStream`][std::os::unix::net::UnixStream] created by
/// [`SyncConnection::connect`], but any byte stream works.
pub struct SyncConnection<S> {
    stream: S,
}

impl<S: Read + Write> SyncConnection<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Encodes and sends `msg`.
    pub fn send_message<P: Payload>(&mut self, msg: &Message<P>) -> io::Result<()> {
        self.send(&msg.encode())
    }

    /// Receives and decodes the next message.
    ///
    /// A message that fails to decode, or is too large, is still consumed from the stream. After
    /// an error of kind [`io::ErrorKind::InvalidData`] the caller may continue with the next one.
    pub fn receive_message(&mut self) -> io::Result<AnyMessage> {
        let buf = self.receive()?;
        Ok(AnyMessage::decode(&buf)?)
    }
}

impl<S: Read + Write> Transport for SyncConnection<S> {
    fn send(&mut self, buf: &[u8]) -> io::Result<()> {
        log::trace!("send: {} bytes {}", buf.len(), Hex(buf));
        self.stream.write_all(buf)?;
        self.stream.flush()
    }

    fn receive(&mut self) -> io::Result<Vec<u8>> {
        let mut header = [0; HEADER_LEN];
        self.stream.read_exact(&mut header)?;
        let len = payload_len(&header)?;
        if let Err(e) = check_payload_len(len) {
            io::copy(&mut (&mut self.stream).take(len as u64), &mut io::sink())?;
            return Err(e);
        }

        let mut buf = Vec::with_capacity(HEADER_LEN + len);
        buf.extend_from_slice(&header);
        buf.resize(HEADER_LEN + len, 0);
        self.stream.read_exact(&mut buf[HEADER_LEN..])?;
        log::trace!("recv: {} bytes {}", buf.len(), Hex(&buf));
        Ok(buf)
    }
}

#[cfg(unix)]
mod unix {
    use std::{
        os::{fd::OwnedFd, unix::net::UnixStream},
        path::Path,
        time::Duration,
    };

    use socket2::{Domain, SockAddr, Socket, Type};

    use super::*;
    use crate::DEFAULT_SOCKET_PATH;

    impl SyncConnection<UnixStream> {
        /// Connects to the daemon socket at `path`.
        pub fn connect(path: impl AsRef<Path>) -> io::Result<Self> {
            let path = path.as_ref();
            let sock = Socket::new(Domain::UNIX, Type::STREAM, None)?;
            sock.connect(&SockAddr::unix(path)?)?;
            log::debug!("connected to {}", path.display());
            Ok(Self::new(UnixStream::from(OwnedFd::from(sock))))
        }

        /// Connects to the daemon at [`DEFAULT_SOCKET_PATH`].
        pub fn connect_default() -> io::Result<Self> {
            Self::connect(DEFAULT_SOCKET_PATH)
        }

        /// Sets the timeout for receiving a message.
        ///
        /// By default, receiving blocks until a message arrives. When the timeout elapses, an
        /// error of kind [`io::ErrorKind::WouldBlock`] or [`io::ErrorKind::TimedOut`] is returned.
        pub fn set_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
            self.stream.set_read_timeout(timeout)
        }
    }
}
