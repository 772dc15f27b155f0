//! DNS-SD TXT record data.
//!
//! From [RFC 6763 section 6.1]: an empty TXT record containing zero strings is not allowed, and
//! DNS-SD clients MUST treat the following as equivalent:
//!
//! - A TXT record containing a single zero byte (a single empty string).
//! - An empty (zero-length) TXT record.
//! - No TXT record.
//!
//! [`TxtRecord`] stores whatever bytes it was given, so that an outgoing message carries them
//! verbatim, but compares and reports all of the above as "no record". On the wire, a TXT length of
//! 0 or 1 is decoded as no record.
//!
//! [RFC 6763 section 6.1]: https://datatracker.ietf.org/doc/html/rfc6763#section-6.1

use std::fmt;

use super::{decoder::Reader, encoder::check_len, encoder::Writer};
use crate::Error;

/// Raw TXT record data attached to a service registration or resolve reply.
#[derive(Clone, Default)]
pub struct TxtRecord {
    data: Option<Vec<u8>>,
}

impl TxtRecord {
    /// Maximum length of a single `key=value` entry.
    pub const MAX_ENTRY_LEN: usize = 255;

    /// Returns a [`TxtRecord`] representing the absence of a record.
    pub const fn none() -> Self {
        Self { data: None }
    }

    /// Wraps raw TXT record data, as a sequence of length-prefixed strings.
    ///
    /// The data is not validated, but must fit a 16-bit length.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self, Error> {
        let data = data.into();
        check_len(&data)?;
        Ok(Self { data: Some(data) })
    }

    /// Builds TXT record data from `key` or `key=value` entries.
    ///
    /// Returns [`Error::FieldTooLong`] if any entry exceeds [`TxtRecord::MAX_ENTRY_LEN`] bytes or
    /// the whole record exceeds [`u16::MAX`] bytes, and [`Error::InvalidValue`] if a key is empty
    /// or contains `=`.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (&'a str, TxtValue<'a>)>,
    {
        let mut data = Vec::new();
        for (key, value) in entries {
            if key.is_empty() || key.contains('=') {
                return Err(Error::InvalidValue);
            }
            let len = match value {
                TxtValue::NoValue => key.len(),
                TxtValue::Value(v) => key.len() + 1 + v.len(),
            };
            if len > Self::MAX_ENTRY_LEN {
                return Err(Error::FieldTooLong);
            }
            data.push(len as u8);
            data.extend_from_slice(key.as_bytes());
            if let TxtValue::Value(v) = value {
                data.push(b'=');
                data.extend_from_slice(v);
            }
        }
        Self::from_bytes(data)
    }

    /// Returns the bytes exactly as they were given to the constructor, or [`None`] if no record
    /// was given.
    ///
    /// This is what gets encoded into outgoing messages.
    #[inline]
    pub fn raw(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Returns the record data, or [`None`] if the record is equivalent to no record at all.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self.raw() {
            // A lone byte can only be a single empty string (or garbage).
            Some(data) if data.len() > 1 => Some(data),
            _ => None,
        }
    }

    /// Returns whether this record is equivalent to no record.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_none()
    }

    /// Returns an iterator over the `key=value` entries of the record.
    ///
    /// Iteration stops early at a truncated entry. Empty entries are skipped.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            r: Reader::new(self.as_bytes().unwrap_or_default()),
        }
    }

    /// Looks up the first entry whose key matches `key`, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<TxtValue<'_>> {
        self.entries()
            .find(|(k, _)| k.eq_ignore_ascii_case(key.as_bytes()))
            .map(|(_, v)| v)
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        match self.raw() {
            Some(data) => w.write_blob(data),
            None => w.write_u16(0),
        }
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        let len = r.read_u16()?;
        // Length 0 isn't strictly legal, and length 1 is a single empty string. Both are consumed
        // but not stored.
        let bytes = r.read_slice(len.into())?;
        if len > 1 {
            Ok(Self {
                data: Some(bytes.to_vec()),
            })
        } else {
            Ok(Self::none())
        }
    }
}

impl PartialEq for TxtRecord {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for TxtRecord {}

impl fmt::Debug for TxtRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_bytes() {
            Some(data) => write!(f, "TxtRecord(\"{}\")", data.escape_ascii()),
            None => f.write_str("TxtRecord(-)"),
        }
    }
}

/// Value of a TXT record entry.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum TxtValue<'a> {
    /// The entry is a boolean flag without `=`.
    NoValue,
    /// The entry had a `=`; the value may be empty.
    Value(&'a [u8]),
}

impl<'a> fmt::Debug for TxtValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoValue => f.write_str("-"),
            Self::Value(v) => match std::str::from_utf8(v) {
                Ok(s) => fmt::Debug::fmt(s, f),
                Err(_) => write!(f, "{}", v.escape_ascii()),
            },
        }
    }
}

/// Iterator over the entries of a [`TxtRecord`], returned by [`TxtRecord::entries`].
pub struct Entries<'a> {
    r: Reader<'a>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a [u8], TxtValue<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let len = *self.r.buf().first()?;
            self.r.read_slice(1).ok()?;
            let entry = match self.r.read_slice(len.into()) {
                Ok(entry) => entry,
                Err(_) => {
                    log::debug!("truncated TXT record entry");
                    return None;
                }
            };
            if entry.is_empty() {
                continue;
            }

            let mut split = entry.splitn(2, |&b| b == b'=');
            let key = split.next().unwrap_or_default();
            return Some(match split.next() {
                Some(value) => (key, TxtValue::Value(value)),
                None => (key, TxtValue::NoValue),
            });
        }
    }
}
