//! Exact-length reads over a stream transport
//!
//! TCP may split one message across several reads or deliver several
//! messages in one. Messages here have no length prefix, so the reader asks
//! the transport for precisely the bytes still missing from the current
//! message and never buffers ahead into the next one.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::error::{TransportError, WireError};
use crate::packets::Message;

/// Fill `buf` completely from `reader`.
///
/// `limit` bounds the whole read, not each chunk. A zero-byte read means the
/// peer closed the connection and yields [`TransportError::ConnectionClosed`].
pub async fn read_exactly<R>(
    reader: &mut R,
    buf: &mut [u8],
    limit: Duration,
) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
{
    let fill = async {
        let mut filled = 0;
        while filled < buf.len() {
            match reader.read(&mut buf[filled..]).await? {
                0 => return Err(TransportError::ConnectionClosed),
                n => filled += n,
            }
        }
        Ok::<(), TransportError>(())
    };

    timeout(limit, fill)
        .await
        .map_err(|_| TransportError::Timeout(limit))?
}

/// A connection that exchanges whole protocol messages
pub struct MessageStream<S> {
    inner: S,
    io_timeout: Duration,
}

impl<S> MessageStream<S> {
    pub fn new(inner: S, io_timeout: Duration) -> Self {
        Self { inner, io_timeout }
    }

    pub fn io_timeout(&self) -> Duration {
        self.io_timeout
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> MessageStream<S>
where
    S: AsyncRead + Unpin,
{
    /// Read one message within the default I/O timeout
    pub async fn read_message<M: Message>(&mut self) -> Result<M, WireError> {
        self.read_message_within(self.io_timeout).await
    }

    /// Read one message within `limit`
    pub async fn read_message_within<M: Message>(&mut self, limit: Duration) -> Result<M, WireError> {
        let mut buf = vec![0u8; M::SIZE];
        read_exactly(&mut self.inner, &mut buf, limit).await?;
        Ok(M::from_bytes(&buf)?)
    }
}

impl<S> MessageStream<S>
where
    S: AsyncWrite + Unpin,
{
    pub async fn write_message<M: Message>(&mut self, message: &M) -> Result<(), TransportError> {
        let bytes = message.to_bytes();
        timeout(self.io_timeout, self.inner.write_all(&bytes))
            .await
            .map_err(|_| TransportError::Timeout(self.io_timeout))??;
        Ok(())
    }

    /// Flush and close the write half
    pub async fn shutdown(&mut self) -> Result<(), TransportError> {
        timeout(self.io_timeout, self.inner.shutdown())
            .await
            .map_err(|_| TransportError::Timeout(self.io_timeout))??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::game::{Card, RoundResult, Suit};
    use crate::packets::{Request, ServerPayload};
    use tokio_test::io::Builder;

    const LIMIT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_one_byte_chunks() {
        let bytes = Request::new(7, "chunky").to_bytes();
        let mut builder = Builder::new();
        for b in &bytes {
            builder.read(std::slice::from_ref(b));
        }
        let mut mock = builder.build();

        let mut buf = vec![0u8; bytes.len()];
        read_exactly(&mut mock, &mut buf, LIMIT).await.unwrap();
        assert_eq!(buf, bytes);
    }

    #[tokio::test]
    async fn test_uneven_chunks() {
        let bytes = Request::new(3, "uneven chunks").to_bytes();
        let mut mock = Builder::new()
            .read(&bytes[..3])
            .read(&bytes[3..20])
            .read(&bytes[20..21])
            .read(&bytes[21..])
            .build();

        let mut stream = MessageStream::new(&mut mock, LIMIT);
        let request: Request = stream.read_message().await.unwrap();
        assert_eq!(request, Request::new(3, "uneven chunks"));
    }

    #[tokio::test]
    async fn test_coalesced_messages_are_not_overread() {
        let first = ServerPayload::card(Card::new(1, Suit::Hearts).unwrap());
        let second = ServerPayload::outcome(RoundResult::Win);
        let mut both = first.to_bytes();
        both.extend_from_slice(&second.to_bytes());

        let mut mock = Builder::new().read(&both).build();
        let mut stream = MessageStream::new(&mut mock, LIMIT);

        let a: ServerPayload = stream.read_message().await.unwrap();
        let b: ServerPayload = stream.read_message().await.unwrap();
        assert_eq!(a, first);
        assert_eq!(b, second);
    }

    #[tokio::test]
    async fn test_close_mid_message() {
        let bytes = Request::new(1, "gone").to_bytes();
        let mut mock = Builder::new().read(&bytes[..10]).build();

        let mut buf = vec![0u8; bytes.len()];
        let err = read_exactly(&mut mock, &mut buf, LIMIT).await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        let (mut near, _far) = tokio::io::duplex(64);
        let mut buf = [0u8; 9];
        let err = read_exactly(&mut near, &mut buf, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_bad_magic_surfaces_as_protocol_error() {
        let mut bytes = ServerPayload::outcome(RoundResult::Lose).to_bytes();
        bytes[2] ^= 0x01;
        let mut mock = Builder::new().read(&bytes).build();
        let mut stream = MessageStream::new(&mut mock, LIMIT);

        let err = stream.read_message::<ServerPayload>().await.unwrap_err();
        assert!(matches!(
            err,
            WireError::Protocol(ProtocolError::BadMagic(_))
        ));
    }

    #[tokio::test]
    async fn test_write_then_read_over_duplex() {
        let (a, b) = tokio::io::duplex(64);
        let mut writer = MessageStream::new(a, LIMIT);
        let mut reader = MessageStream::new(b, LIMIT);

        writer.write_message(&Request::new(9, "duplex")).await.unwrap();
        writer.shutdown().await.unwrap();

        let request: Request = reader.read_message().await.unwrap();
        assert_eq!(request.rounds, 9);
        let err = reader.read_message::<Request>().await.unwrap_err();
        assert!(err.is_disconnect());
    }
}
