//! IPC message header, typed message wrapper and dispatcher.
//!
//! Every message starts with a fixed-size [`Header`], followed by `payload_len` bytes of
//! operation-specific payload. All integers are big-endian.
//!
//! ```text
//! +-----------+---------+-------------+-----------+-------------+-----------+---------+
//! | operation | version | payload_len | ipc_flags | context     | reg_index | payload |
//! | u32       | u32     | u32         | u32       | u64         | u32       | ...     |
//! +-----------+---------+-------------+-----------+-------------+-----------+---------+
//! ```

#[macro_use]
mod macros;
pub mod decoder;
pub mod encoder;
pub mod payload;
pub mod replies;
pub mod requests;
pub mod txt;

use core::fmt;
use std::mem::size_of;

use bitflags::bitflags;

use crate::{
    num::{U32, U64},
    Error,
};

use self::{decoder::Reader, encoder::Writer, payload::Payload, replies::*, requests::*};

/// The only protocol version this library speaks.
pub const VERSION: u32 = 1;

/// Size of the encoded [`Header`] in bytes.
pub const HEADER_LEN: usize = size_of::<Header>();

const _: () = assert!(HEADER_LEN == 28);

ffi_enum! {
    /// Identifies the kind of payload that follows a [`Header`].
    pub enum OperationCode: u32 {
        /// Sets up a shared connection that later requests can be multiplexed on.
        CONNECTION = 1,
        REGISTER_RECORD = 2,
        REMOVE_RECORD = 3,
        ENUMERATE_DOMAINS = 4,
        REGISTER_SERVICE = 5,
        BROWSE = 6,
        RESOLVE = 7,
        QUERY_RECORD = 8,
        RECONFIRM_RECORD = 9,
        ADD_RECORD = 10,
        UPDATE_RECORD = 11,
        GET_PROPERTY = 13,
        PORT_MAPPING = 14,
        ADDR_INFO = 15,
        /// Cancels an operation started on a shared connection.
        CANCEL = 63,

        // Replies sent by the daemon.
        ENUMERATE_DOMAINS_REPLY = 64,
        REGISTER_SERVICE_REPLY = 65,
        BROWSE_REPLY = 66,
        RESOLVE_REPLY = 67,
        QUERY_RECORD_REPLY = 68,
        REGISTER_RECORD_REPLY = 69,
        ADDR_INFO_REPLY = 72,
    }
}

impl OperationCode {
    /// Returns whether this code is used by messages sent from the daemon to the client.
    pub fn is_reply(self) -> bool {
        self.0 >= 64
    }
}

ffi_enum! {
    /// Resource Record types used by the record-level operations.
    pub enum RecordType: u16 {
        A = 1,
        NS = 2,
        CNAME = 5,
        SOA = 6,
        PTR = 12,
        HINFO = 13,
        MX = 15,
        TXT = 16,
        AAAA = 28,
        SRV = 33,
        NSEC = 47,
        /// Query is for all record types.
        ANY = 255,
    }
}

ffi_enum! {
    /// Resource Record classes.
    pub enum RecordClass: u16 {
        /// The Internet.
        IN = 1,
    }
}

bitflags! {
    /// Address families and transport protocols for address lookups and port mappings.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    pub struct Protocol: u32 {
        const IPV4 = 0x1;
        const IPV6 = 0x2;
        const UDP = 0x10;
        const TCP = 0x20;
    }
}

bitflags! {
    /// Flags passed with requests and returned in replies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    pub struct ServiceFlags: u32 {
        /// More replies are queued; the client may want to wait before updating its UI.
        const MORE_COMING = 0x1;
        /// In a browse or enumeration reply: the result was added (unset means removed).
        const ADD = 0x2;
        const DEFAULT = 0x4;
        /// Fail a registration on a name conflict instead of picking a new name.
        const NO_AUTO_RENAME = 0x8;
        const SHARED = 0x10;
        const UNIQUE = 0x20;
        const BROWSE_DOMAINS = 0x40;
        const REGISTRATION_DOMAINS = 0x80;
        const LONG_LIVED_QUERY = 0x100;
        const ALLOW_REMOTE_QUERY = 0x200;
        const FORCE_MULTICAST = 0x400;
        const RETURN_INTERMEDIATES = 0x1000;
        const NON_BROWSABLE = 0x2000;
        const SHARE_CONNECTION = 0x4000;
        const SUPPRESS_UNUSABLE = 0x8000;
        const TIMEOUT = 0x10000;
        const INCLUDE_P2P = 0x20000;
        const WAKE_ON_RESOLVE = 0x40000;
    }
}

bitflags! {
    /// Header flags controlling how the daemon treats the connection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    pub struct IpcFlags: u32 {
        /// The client does not expect a reply to this request.
        const NO_REPLY = 0x1;
        /// The payload is followed by TLV-encoded attributes.
        const TRAILING_TLVS = 0x2;
    }
}

/// Message header.
///
/// Headers are values: the `with_*` methods return a modified copy. The payload length is filled
/// in by [`Message::encode`] and is only meaningful on headers returned by a decoder.
#[derive(Clone, Copy, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C, packed)]
pub struct Header {
    operation: U32,
    version: U32,
    payload_len: U32,
    ipc_flags: U32,
    context: U64,
    reg_index: U32,
}

impl Header {
    /// Creates a header for an `operation` message, using the current protocol [`VERSION`].
    pub fn new(operation: OperationCode) -> Self {
        Self {
            operation: operation.get().into(),
            version: VERSION.into(),
            ..Self::default()
        }
    }

    /// Reads a header, starting with the operation code.
    ///
    /// Unknown operation codes and versions are preserved; it's up to the caller to reject them.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        r.read_obj::<Header>()
    }

    /// Appends the fixed-size encoding of this header to `w`.
    pub fn encode(&self, w: &mut Writer) {
        w.write_obj(*self);
    }

    #[inline]
    pub fn operation(&self) -> OperationCode {
        OperationCode(self.operation.get())
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version.get()
    }

    /// Returns the number of payload bytes following the header.
    #[inline]
    pub fn payload_len(&self) -> u32 {
        self.payload_len.get()
    }

    #[inline]
    pub fn ipc_flags(&self) -> IpcFlags {
        IpcFlags::from_bits_retain(self.ipc_flags.get())
    }

    /// Returns the opaque client context.
    ///
    /// The daemon copies the context of a request into all replies to it, so clients can use it
    /// to correlate replies with requests on a shared connection.
    #[inline]
    pub fn context(&self) -> u64 {
        self.context.get()
    }

    /// Returns the record index used by record-level operations on a shared connection.
    #[inline]
    pub fn reg_index(&self) -> u32 {
        self.reg_index.get()
    }

    pub fn with_ipc_flags(self, flags: IpcFlags) -> Self {
        Self {
            ipc_flags: flags.bits().into(),
            ..self
        }
    }

    pub fn with_context(self, context: u64) -> Self {
        Self {
            context: context.into(),
            ..self
        }
    }

    pub fn with_reg_index(self, reg_index: u32) -> Self {
        Self {
            reg_index: reg_index.into(),
            ..self
        }
    }

    pub(crate) fn with_payload_len(self, len: u32) -> Self {
        Self {
            payload_len: len.into(),
            ..self
        }
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("operation", &self.operation())
            .field("version", &self.version())
            .field("payload_len", &self.payload_len())
            .field("ipc_flags", &self.ipc_flags())
            .field("context", &self.context())
            .field("reg_index", &self.reg_index())
            .finish()
    }
}

/// Returns the operation code of the message at the start of `buf`, without decoding the rest.
pub fn operation_code_of(buf: &[u8]) -> Result<OperationCode, Error> {
    if buf.is_empty() {
        return Err(Error::InvalidArgument);
    }
    let code = Reader::new(buf).peek_obj::<U32>()?;
    Ok(OperationCode(code.get()))
}

/// Reads a header and returns a reader limited to the payload it announces.
///
/// `r` is advanced past the whole message.
fn read_frame<'a>(r: &mut Reader<'a>) -> Result<(Header, Reader<'a>), Error> {
    let header = Header::decode(r)?;
    if header.version() != VERSION {
        log::debug!("unsupported message version {}", header.version());
        return Err(Error::UnsupportedVersion);
    }
    let body = r.split_off(header.payload_len() as usize)?;
    Ok((header, body))
}

fn check_trailing(header: &Header, body: &Reader<'_>) {
    if !body.is_empty() {
        log::debug!(
            "ignoring {} trailing bytes in {} payload",
            body.buf().len(),
            header.operation()
        );
    }
}

fn reader_for(buf: &[u8]) -> Result<Reader<'_>, Error> {
    if buf.is_empty() {
        return Err(Error::InvalidArgument);
    }
    Ok(Reader::new(buf))
}

/// A [`Header`] together with the payload it describes.
///
/// Comparing two messages ignores the header's payload length, since it is derived from the
/// payload when encoding.
#[derive(Debug, Clone)]
pub struct Message<P> {
    header: Header,
    payload: P,
}

impl<P: PartialEq> PartialEq for Message<P> {
    fn eq(&self, other: &Self) -> bool {
        self.header.with_payload_len(0) == other.header.with_payload_len(0)
            && self.payload == other.payload
    }
}

impl<P: Eq> Eq for Message<P> {}

impl<P: Payload> Message<P> {
    /// Pairs a `header` with a `payload`.
    ///
    /// Returns [`Error::InvalidOperationCode`] if the header's operation code isn't the one
    /// belonging to `P`.
    pub fn new(header: Header, payload: P) -> Result<Self, Error> {
        if header.operation() != P::OPERATION {
            log::debug!(
                "header operation {} does not match payload operation {}",
                header.operation(),
                P::OPERATION
            );
            return Err(Error::InvalidOperationCode);
        }
        Ok(Self { header, payload })
    }

    /// Creates a message with a default header for `P`.
    pub fn from_payload(payload: P) -> Self {
        Self {
            header: Header::new(P::OPERATION),
            payload,
        }
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[inline]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Encodes the header and payload into a new buffer.
    ///
    /// The header's payload length is set to the length of the encoded payload.
    pub fn encode(&self) -> Vec<u8> {
        let payload = self.payload.to_bytes();
        let mut w = Writer::new();
        self.header
            .with_payload_len(payload.len() as u32)
            .encode(&mut w);
        w.write_slice(&payload);
        w.into_bytes()
    }

    /// Decodes a message of type `P` from the start of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        Self::decode_from(&mut reader_for(buf)?)
    }

    /// Decodes a message of type `P`, leaving `r` positioned after it.
    pub fn decode_from(r: &mut Reader<'_>) -> Result<Self, Error> {
        let (header, mut body) = read_frame(r)?;
        if header.operation() != P::OPERATION {
            return Err(Error::InvalidOperationCode);
        }
        let payload = P::decode(&mut body)?;
        check_trailing(&header, &body);
        Ok(Self { header, payload })
    }
}

macro_rules! messages {
    (
        $( $variant:ident($payload:ty) ),+ $(,)?
    ) => {
        /// Enumeration of all messages this library can decode.
        #[non_exhaustive]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum AnyMessage {
            $( $variant(Message<$payload>), )+
        }

        impl AnyMessage {
            fn decode_payload(header: Header, r: &mut Reader<'_>) -> Option<Result<Self, Error>> {
                $(
                    if header.operation() == <$payload as Payload>::OPERATION {
                        return Some(
                            <$payload as Payload>::decode(r)
                                .map(|payload| Self::$variant(Message { header, payload })),
                        );
                    }
                )+
                None
            }

            #[inline]
            pub fn header(&self) -> &Header {
                match self {
                    $( Self::$variant(m) => m.header(), )+
                }
            }

            /// Encodes the message into a new buffer.
            pub fn encode(&self) -> Vec<u8> {
                match self {
                    $( Self::$variant(m) => m.encode(), )+
                }
            }
        }

        $(
            impl From<Message<$payload>> for AnyMessage {
                fn from(msg: Message<$payload>) -> Self {
                    Self::$variant(msg)
                }
            }
        )+
    };
}

messages! {
    Connection(ConnectionRequest),
    Cancel(CancelRequest),
    EnumerateDomains(EnumerateDomainsRequest),
    Register(RegisterRequest),
    Browse(BrowseRequest),
    Resolve(ResolveRequest),
    QueryRecord(QueryRecordRequest),
    RegisterRecord(RegisterRecordRequest),
    ReconfirmRecord(ReconfirmRecordRequest),
    AddRecord(AddRecordRequest),
    UpdateRecord(UpdateRecordRequest),
    RemoveRecord(RemoveRecordRequest),
    GetProperty(GetPropertyRequest),
    PortMapping(PortMappingRequest),
    AddrInfo(AddrInfoRequest),
    EnumerateDomainsReply(EnumerateDomainsReply),
    RegisterReply(RegisterServiceReply),
    BrowseReply(BrowseReply),
    ResolveReply(ResolveReply),
    QueryRecordReply(QueryRecordReply),
    RegisterRecordReply(RegisterRecordReply),
    AddrInfoReply(AddrInfoReply),
}

impl AnyMessage {
    /// Decodes the message at the start of `buf`, choosing the payload type by operation code.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        Self::decode_from(&mut reader_for(buf)?)
    }

    /// Decodes the message at the reader's position, leaving `r` positioned after it.
    ///
    /// Returns [`Error::UnsupportedOperation`] if the header's operation code has no known payload
    /// type. In that case `r` has still been advanced past the message, so the caller may skip it
    /// and continue with the next one.
    pub fn decode_from(r: &mut Reader<'_>) -> Result<Self, Error> {
        let (header, mut body) = read_frame(r)?;
        match Self::decode_payload(header, &mut body) {
            Some(res) => {
                let msg = res?;
                check_trailing(&header, &body);
                Ok(msg)
            }
            None => {
                log::debug!("no payload type for operation {}", header.operation());
                Err(Error::UnsupportedOperation)
            }
        }
    }

    /// Returns the operation code in the message header.
    #[inline]
    pub fn operation(&self) -> OperationCode {
        self.header().operation()
    }
}
