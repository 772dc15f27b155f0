use std::{fmt, io};

/// Errors that may occur while building, encoding or decoding IPC messages.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum Error {
    /// A forbidden argument was passed, such as an empty buffer to decode from.
    InvalidArgument,
    /// A field that must be non-empty (for example the service type of a registration) was empty.
    MissingRequiredField,
    /// The operation code in a message header does not belong to the payload it was paired with.
    InvalidOperationCode,
    /// A read ran past the end of the buffer, or a cursor was placed outside of it.
    OutOfBounds,
    /// A field was set to an invalid value (for example, a string that isn't UTF-8).
    InvalidValue,
    /// A string or byte field is too long to have its length encoded in 16 bits.
    FieldTooLong,
    /// The message header carries a protocol version this library does not speak.
    UnsupportedVersion,
    /// The message header carries an operation code that has no known payload type.
    UnsupportedOperation,
}

impl Error {
    fn description(&self) -> &str {
        match self {
            Error::InvalidArgument => "invalid argument",
            Error::MissingRequiredField => "required field is empty",
            Error::InvalidOperationCode => "operation code does not match payload",
            Error::OutOfBounds => "unexpected end of data",
            Error::InvalidValue => "invalid value",
            Error::FieldTooLong => "field length exceeds 65535 bytes",
            Error::UnsupportedVersion => "unsupported protocol version",
            Error::UnsupportedOperation => "unsupported operation code",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl std::error::Error for Error {}

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        match e {
            Error::OutOfBounds => io::ErrorKind::UnexpectedEof.into(),
            Error::InvalidArgument | Error::MissingRequiredField | Error::FieldTooLong => {
                io::Error::new(io::ErrorKind::InvalidInput, e)
            }
            Error::InvalidOperationCode
            | Error::InvalidValue
            | Error::UnsupportedVersion
            | Error::UnsupportedOperation => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
