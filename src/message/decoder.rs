//! Primitive decoding helpers.

use std::mem::size_of;

use bytemuck::AnyBitPattern;

use crate::{
    num::{U16, U32},
    Error,
};

/// A cursor over a byte buffer containing one or more IPC messages.
///
/// All reads are bounds-checked and fail with [`Error::OutOfBounds`] without advancing the cursor
/// when fewer bytes remain than are needed. After a failed read the rest of the message should be
/// considered garbage.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The whole buffer.
    full_buf: &'a [u8],
    /// The current reader position in the buffer.
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            full_buf: buf,
            pos: 0,
        }
    }

    /// Creates a reader positioned at `pos` in `buf`.
    ///
    /// `pos` may be equal to `buf.len()` (nothing left to read), but not larger.
    pub fn at(buf: &'a [u8], pos: usize) -> Result<Self, Error> {
        if pos > buf.len() {
            return Err(Error::OutOfBounds);
        }
        Ok(Self { full_buf: buf, pos })
    }

    /// Returns the current position in the buffer passed to the constructor.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the unread part of the buffer.
    #[inline]
    pub fn buf(&self) -> &'a [u8] {
        &self.full_buf[self.pos..]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf().is_empty()
    }

    pub(crate) fn read_obj<T: AnyBitPattern>(&mut self) -> Result<T, Error> {
        let bytes = self.read_slice(size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    pub(crate) fn peek_obj<T: AnyBitPattern>(&self) -> Result<T, Error> {
        self.clone().read_obj()
    }

    /// Reads `len` raw bytes.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let end = self.pos.checked_add(len).ok_or(Error::OutOfBounds)?;
        match self.full_buf.get(self.pos..end) {
            Some(slice) => {
                self.pos = end;
                Ok(slice)
            }
            None => Err(Error::OutOfBounds),
        }
    }

    /// Splits off another `Reader` covering the next `len` bytes, and skips them in `self`.
    ///
    /// The returned reader's positions are still relative to the full buffer.
    pub(crate) fn split_off(&mut self, len: usize) -> Result<Reader<'a>, Error> {
        let start = self.pos;
        self.read_slice(len)?;
        Ok(Reader {
            full_buf: &self.full_buf[..self.pos],
            pos: start,
        })
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        Ok(self.read_obj::<U16>()?.get())
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        Ok(self.read_obj::<U32>()?.get())
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        Ok(self.read_u32()? as i32)
    }

    /// Reads a 16-bit length followed by that many bytes.
    pub fn read_blob(&mut self) -> Result<&'a [u8], Error> {
        let len = self.read_u16()?;
        self.read_slice(len.into())
    }

    /// Reads a 16-bit length followed by that many bytes of UTF-8.
    pub fn read_string(&mut self) -> Result<&'a str, Error> {
        let bytes = self.read_blob()?;
        std::str::from_utf8(bytes).map_err(|e| {
            log::debug!("non-UTF-8 string field: {}", e);
            Error::InvalidValue
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_integers() {
        let mut r = Reader::new(&[0x1f, 0x90, 0xff, 0xff, 0xff, 0xfe, 0x00]);
        assert_eq!(r.read_u16(), Ok(8080));
        assert_eq!(r.read_i32(), Ok(-2));
        assert_eq!(r.pos(), 6);
        assert_eq!(r.read_u16(), Err(Error::OutOfBounds));
        assert_eq!(r.pos(), 6, "failed read must not advance");
    }

    #[test]
    fn read_string() {
        let mut r = Reader::new(&[0, 2, b'h', b'i', 0, 0]);
        assert_eq!(r.read_string(), Ok("hi"));
        assert_eq!(r.read_string(), Ok(""));
        assert!(r.is_empty());
    }

    #[test]
    fn read_string_overlong() {
        let mut r = Reader::new(&[0, 5, b'h', b'i']);
        assert_eq!(r.read_string(), Err(Error::OutOfBounds));

        let mut r = Reader::new(&[0]);
        assert_eq!(r.read_string(), Err(Error::OutOfBounds));
    }

    #[test]
    fn read_string_invalid_utf8() {
        let mut r = Reader::new(&[0, 2, 0xc3, 0x28]);
        assert_eq!(r.read_string(), Err(Error::InvalidValue));
    }

    #[test]
    fn read_slice() {
        let mut r = Reader::new(&[1, 2, 3]);
        assert_eq!(r.read_slice(0), Ok(&[][..]));
        assert_eq!(r.read_slice(2), Ok(&[1, 2][..]));
        assert_eq!(r.read_slice(2), Err(Error::OutOfBounds));
        assert_eq!(r.read_slice(usize::MAX), Err(Error::OutOfBounds));
        assert_eq!(r.read_slice(1), Ok(&[3][..]));
    }

    #[test]
    fn cursor_bounds() {
        let buf = [0; 4];
        assert_eq!(Reader::at(&buf, 4).unwrap().pos(), 4);
        assert_eq!(Reader::at(&buf, 5).unwrap_err(), Error::OutOfBounds);
    }

    #[test]
    fn split_off() {
        let mut r = Reader::new(&[9, 0, 1, 0, 7]);
        r.read_slice(1).unwrap();
        let mut sub = r.split_off(3).unwrap();
        assert_eq!(r.pos(), 4);
        assert_eq!(sub.pos(), 1);
        assert_eq!(sub.read_u16(), Ok(1));
        assert_eq!(sub.read_u16(), Err(Error::OutOfBounds));
        assert_eq!(sub.buf(), &[0]);
        assert_eq!(r.split_off(2).unwrap_err(), Error::OutOfBounds);
    }
}
