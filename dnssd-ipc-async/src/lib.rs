//! Async connections to a DNS Service Discovery daemon.
//!
//! This is the async counterpart to [`dnssd_ipc::transport`], built on `async-io`. It works with
//! any executor.

use std::{io, time::Duration};

use async_io::Timer;
use dnssd_ipc::{
    message::{payload::Payload, AnyMessage, Message, HEADER_LEN},
    transport::{check_payload_len, payload_len},
    Hex,
};
use futures_lite::{future, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub use dnssd_ipc::*;

/// An async connection to the daemon.
pub struct AsyncConnection<S> {
    stream: S,
    timeout: Option<Duration>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> AsyncConnection<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            timeout: None,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Sets the timeout for receiving a message.
    ///
    /// By default, receiving waits until a message arrives. When the timeout elapses, an error of
    /// kind [`io::ErrorKind::TimedOut`] is returned. A message that was partially read at that
    /// point is lost.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Sends the encoded message in `buf`.
    pub async fn send(&mut self, buf: &[u8]) -> io::Result<()> {
        log::trace!("send: {} bytes {}", buf.len(), Hex(buf));
        self.stream.write_all(buf).await?;
        self.stream.flush().await
    }

    /// Receives exactly one message, header included.
    pub async fn receive(&mut self) -> io::Result<Vec<u8>> {
        match self.timeout {
            Some(timeout) => {
                let timeout = async {
                    Timer::after(timeout).await;
                    Err(io::ErrorKind::TimedOut.into())
                };
                future::or(read_frame(&mut self.stream), timeout).await
            }
            None => read_frame(&mut self.stream).await,
        }
    }

    /// Encodes and sends `msg`.
    pub async fn send_message<P: Payload>(&mut self, msg: &Message<P>) -> io::Result<()> {
        self.send(&msg.encode()).await
    }

    /// Receives and decodes the next message.
    ///
    /// A message that fails to decode, or is too large, is still consumed from the stream. After
    /// an error of kind [`io::ErrorKind::InvalidData`] the caller may continue with the next one.
    pub async fn receive_message(&mut self) -> io::Result<AnyMessage> {
        let buf = self.receive().await?;
        Ok(AnyMessage::decode(&buf)?)
    }
}

async fn read_frame<S: AsyncRead + Unpin>(stream: &mut S) -> io::Result<Vec<u8>> {
    let mut header = [0; HEADER_LEN];
    stream.read_exact(&mut header).await?;
    let len = payload_len(&header)?;
    if let Err(e) = check_payload_len(len) {
        futures_lite::io::copy((&mut *stream).take(len as u64), futures_lite::io::sink()).await?;
        return Err(e);
    }

    let mut buf = Vec::with_capacity(HEADER_LEN + len);
    buf.extend_from_slice(&header);
    buf.resize(HEADER_LEN + len, 0);
    stream.read_exact(&mut buf[HEADER_LEN..]).await?;
    log::trace!("recv: {} bytes {}", buf.len(), Hex(&buf));
    Ok(buf)
}

#[cfg(unix)]
mod unix {
    use std::{os::unix::net::UnixStream, path::Path};

    use async_io::Async;

    use super::*;

    impl AsyncConnection<Async<UnixStream>> {
        /// Connects to the daemon socket at `path`.
        pub async fn connect(path: impl AsRef<Path>) -> io::Result<Self> {
            let path = path.as_ref();
            let stream = Async::<UnixStream>::connect(path).await?;
            log::debug!("connected to {}", path.display());
            Ok(Self::new(stream))
        }

        /// Connects to the daemon at [`DEFAULT_SOCKET_PATH`].
        pub async fn connect_default() -> io::Result<Self> {
            Self::connect(DEFAULT_SOCKET_PATH).await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        pin::Pin,
        task::{Context, Poll},
    };

    use futures_lite::{future::block_on, io::Cursor};

    use super::*;
    use dnssd_ipc::message::{
        payload::ReplyBase,
        replies::ResolveReply,
        requests::ResolveRequest,
        txt::TxtRecord,
        ServiceFlags,
    };

    /// Reads from a fixed buffer (or never, if `input` is `None`), collects everything written.
    struct Pipe {
        input: Option<Cursor<Vec<u8>>>,
        output: Vec<u8>,
    }

    impl Pipe {
        fn new(input: Option<Vec<u8>>) -> Self {
            Self {
                input: input.map(Cursor::new),
                output: Vec::new(),
            }
        }
    }

    impl AsyncRead for Pipe {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut [u8],
        ) -> Poll<io::Result<usize>> {
            match &mut self.input {
                Some(input) => Pin::new(input).poll_read(cx, buf),
                None => Poll::Pending,
            }
        }
    }

    impl AsyncWrite for Pipe {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.output.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn resolve_reply() -> Message<ResolveReply> {
        let base = ReplyBase::new(ServiceFlags::empty(), 1, 0);
        let txt = TxtRecord::from_bytes(*b"\x09txtvers=1").unwrap();
        let reply = ResolveReply::new(
            base,
            "MyPrinter._ipp._tcp.local.",
            "printer.local.",
            631,
            txt,
        )
        .unwrap();
        Message::from_payload(reply)
    }

    #[test]
    fn send_and_receive() {
        block_on(async {
            let reply = resolve_reply();
            let mut conn = AsyncConnection::new(Pipe::new(Some(reply.encode())));

            let req = Message::from_payload(
                ResolveRequest::new("MyPrinter", "_ipp._tcp", "local.").unwrap(),
            );
            conn.send_message(&req).await.unwrap();
            assert_eq!(conn.get_ref().output, req.encode());

            assert_eq!(conn.receive_message().await.unwrap(), reply.into());
            let err = conn.receive().await.unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        });
    }

    #[test]
    fn receive_oversized() {
        block_on(async {
            let mut input = resolve_reply().encode();
            input[8..12].copy_from_slice(&(MAX_PAYLOAD_LEN + 1).to_be_bytes());
            let mut conn = AsyncConnection::new(Pipe::new(Some(input)));
            let err = conn.receive().await.unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        });
    }

    #[test]
    fn oversized_message_is_skipped() {
        block_on(async {
            let mut input = resolve_reply().encode()[..HEADER_LEN].to_vec();
            input[8..12].copy_from_slice(&(MAX_PAYLOAD_LEN + 1).to_be_bytes());
            input.resize(input.len() + MAX_PAYLOAD_LEN as usize + 1, 0xee);
            input.extend(resolve_reply().encode());

            let mut conn = AsyncConnection::new(Pipe::new(Some(input)));
            let err = conn.receive_message().await.unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData);
            assert_eq!(conn.receive_message().await.unwrap(), resolve_reply().into());
        });
    }

    #[test]
    fn frames_are_logged_as_hex() {
        assert_eq!(Hex(&[0x00, 0x00, 0x00, 0x06, 0xab]).to_string(), "00000006ab");
    }

    #[test]
    fn receive_timeout() {
        block_on(async {
            let mut conn = AsyncConnection::new(Pipe::new(None));
            conn.set_timeout(Some(Duration::from_millis(10)));
            let err = conn.receive().await.unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        });
    }
}
