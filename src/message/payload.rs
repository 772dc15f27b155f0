//! The [`Payload`] trait and the leading fields shared by all requests and replies.

use super::{
    decoder::Reader,
    encoder::{check_len, Writer},
    OperationCode, ServiceFlags,
};
use crate::Error;

/// Trait implemented by all message payload types.
///
/// Each payload type belongs to exactly one [`OperationCode`]. Its fields are encoded in a fixed
/// order that is shared with the daemon, starting with a [`RequestBase`] or [`ReplyBase`].
pub trait Payload: Sized {
    /// The operation code carried in the header of messages with this payload.
    const OPERATION: OperationCode;

    /// Appends the encoded payload to `w`.
    fn encode(&self, w: &mut Writer);

    /// Decodes a payload, leaving `r` positioned right after it.
    fn decode(r: &mut Reader<'_>) -> Result<Self, Error>;

    /// Encodes this payload into a new buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.encode(&mut w);
        w.into_bytes()
    }

    /// Decodes a payload starting at `*cursor` in `buf`, and advances `*cursor` past it.
    ///
    /// Returns [`Error::InvalidArgument`] if `buf` is empty, and [`Error::OutOfBounds`] if
    /// `*cursor` lies beyond the end of `buf` or the payload is truncated. On error, `*cursor` is
    /// left unchanged.
    fn parse(buf: &[u8], cursor: &mut usize) -> Result<Self, Error> {
        if buf.is_empty() {
            return Err(Error::InvalidArgument);
        }
        let mut r = Reader::at(buf, *cursor)?;
        let payload = Self::decode(&mut r)?;
        *cursor = r.pos();
        Ok(payload)
    }
}

/// Fields at the start of every request payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestBase {
    error_socket: String,
}

impl RequestBase {
    /// Creates a base asking the daemon to report errors on the request connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a base asking the daemon to report the request's error code on a separate socket,
    /// identified by `path`.
    pub fn with_error_socket(path: &str) -> Result<Self, Error> {
        Ok(Self {
            error_socket: optional(path)?,
        })
    }

    /// Returns the path of the socket errors are reported on, or `""` for the request connection.
    #[inline]
    pub fn error_socket(&self) -> &str {
        &self.error_socket
    }

    pub fn encode(&self, w: &mut Writer) {
        w.write_string(&self.error_socket);
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            error_socket: r.read_string()?.to_owned(),
        })
    }
}

/// Fields at the start of every reply payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplyBase {
    flags: ServiceFlags,
    interface_index: u32,
    error: i32,
}

impl ReplyBase {
    pub fn new(flags: ServiceFlags, interface_index: u32, error: i32) -> Self {
        Self {
            flags,
            interface_index,
            error,
        }
    }

    #[inline]
    pub fn flags(&self) -> ServiceFlags {
        self.flags
    }

    #[inline]
    pub fn interface_index(&self) -> u32 {
        self.interface_index
    }

    /// Returns the daemon's error code; 0 means success.
    #[inline]
    pub fn error(&self) -> i32 {
        self.error
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.error != 0
    }

    pub fn encode(&self, w: &mut Writer) {
        w.write_u32(self.flags.bits());
        w.write_u32(self.interface_index);
        w.write_i32(self.error);
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            interface_index: r.read_u32()?,
            error: r.read_i32()?,
        })
    }
}

/// Validates a string field that must not be empty.
pub(crate) fn required(s: &str) -> Result<String, Error> {
    if s.is_empty() {
        return Err(Error::MissingRequiredField);
    }
    optional(s)
}

/// Validates a string field that may be empty; `None` becomes `""`.
pub(crate) fn optional<'a>(s: impl Into<Option<&'a str>>) -> Result<String, Error> {
    let s = s.into().unwrap_or_default();
    check_len(s.as_bytes())?;
    Ok(s.to_owned())
}

/// Validates an opaque byte field.
pub(crate) fn blob(data: &[u8]) -> Result<Vec<u8>, Error> {
    check_len(data)?;
    Ok(data.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_base() {
        let mut w = Writer::new();
        RequestBase::new().encode(&mut w);
        RequestBase::with_error_socket("/tmp/err")
            .unwrap()
            .encode(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..4], &[0, 0, 0, 8]);

        let mut r = Reader::new(&bytes);
        assert_eq!(RequestBase::decode(&mut r), Ok(RequestBase::new()));
        let base = RequestBase::decode(&mut r).unwrap();
        assert_eq!(base.error_socket(), "/tmp/err");
        assert!(r.is_empty());
    }

    #[test]
    fn reply_base() {
        let base = ReplyBase::new(ServiceFlags::ADD | ServiceFlags::MORE_COMING, 4, -65548);
        let mut w = Writer::new();
        base.encode(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes, [0, 0, 0, 3, 0, 0, 0, 4, 0xff, 0xfe, 0xff, 0xf4]);

        let decoded = ReplyBase::decode(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(decoded, base);
        assert!(decoded.is_error());
    }

    #[test]
    fn reply_base_keeps_unknown_flags() {
        let bytes = [0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let base = ReplyBase::decode(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(base.flags().bits(), 0x8000_0000);
        assert!(!base.is_error());
    }

    #[test]
    fn field_validation() {
        assert_eq!(required(""), Err(Error::MissingRequiredField));
        assert_eq!(required("_http._tcp").as_deref(), Ok("_http._tcp"));
        assert_eq!(optional(None).as_deref(), Ok(""));
        assert_eq!(optional("x".repeat(65536).as_str()), Err(Error::FieldTooLong));
        assert_eq!(blob(&[1, 2]), Ok(vec![1, 2]));
    }
}
