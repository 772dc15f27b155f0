//! Primitive encoding helpers.

use bytemuck::NoUninit;

use crate::{
    num::{U16, U32},
    Error,
};

/// Growable output buffer that all message fields are appended to, in network byte order.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Returns the number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_slice(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub(crate) fn write_obj<T: NoUninit>(&mut self, obj: T) {
        self.write_slice(bytemuck::bytes_of(&obj))
    }

    pub fn write_u16(&mut self, v: u16) {
        self.write_obj(U16::from(v));
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write_obj(U32::from(v));
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write_u32(v as u32);
    }

    /// Writes a 16-bit length followed by the bytes of `data`.
    ///
    /// # Panics
    ///
    /// Panics if `data` is longer than [`u16::MAX`]. Payload constructors reject such fields with
    /// [`Error::FieldTooLong`], so this cannot happen for payloads built through this library.
    pub fn write_blob(&mut self, data: &[u8]) {
        let len = u16::try_from(data.len()).expect("field length exceeds u16::MAX");
        self.write_u16(len);
        self.write_slice(data);
    }

    /// Writes a 16-bit length followed by the UTF-8 bytes of `s`.
    ///
    /// An empty string is written as just the length, `00 00`.
    pub fn write_string(&mut self, s: &str) {
        self.write_blob(s.as_bytes());
    }
}

/// Checks that a string or blob field can be written by [`Writer::write_blob`].
pub(crate) fn check_len(data: &[u8]) -> Result<(), Error> {
    if data.len() > usize::from(u16::MAX) {
        Err(Error::FieldTooLong)
    } else {
        Ok(())
    }
}
