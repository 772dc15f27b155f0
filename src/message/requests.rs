//! Request payloads, sent from the client to the daemon.
//!
//! All requests start with a [`RequestBase`], followed by the operation-specific fields in the
//! order they are declared in here. Constructors validate their inputs; decoding accepts whatever
//! the peer sent, as long as it is well-formed.

use super::{
    decoder::Reader,
    encoder::Writer,
    payload::{blob, optional, required, Payload, RequestBase},
    txt::TxtRecord,
    Message, OperationCode, Protocol, RecordClass, RecordType, ServiceFlags,
};
use crate::Error;

macro_rules! request_base {
    ( $($ty:ident),+ $(,)? ) => {
        $(
            impl $ty {
                /// Returns the fields shared by all requests.
                #[inline]
                pub fn base(&self) -> &RequestBase {
                    &self.base
                }

                pub fn with_base(self, base: RequestBase) -> Self {
                    Self { base, ..self }
                }
            }
        )+
    };
}

macro_rules! service_flags {
    ( $($ty:ident),+ $(,)? ) => {
        $(
            impl $ty {
                #[inline]
                pub fn flags(&self) -> ServiceFlags {
                    self.flags
                }

                pub fn with_flags(self, flags: ServiceFlags) -> Self {
                    Self { flags, ..self }
                }
            }
        )+
    };
}

macro_rules! interface_index {
    ( $($ty:ident),+ $(,)? ) => {
        $(
            impl $ty {
                /// Returns the index of the network interface the request is restricted to, or 0
                /// for all interfaces.
                #[inline]
                pub fn interface_index(&self) -> u32 {
                    self.interface_index
                }

                pub fn with_interface_index(self, interface_index: u32) -> Self {
                    Self {
                        interface_index,
                        ..self
                    }
                }
            }
        )+
    };
}

request_base!(
    ConnectionRequest,
    CancelRequest,
    EnumerateDomainsRequest,
    RegisterRequest,
    BrowseRequest,
    ResolveRequest,
    QueryRecordRequest,
    RegisterRecordRequest,
    ReconfirmRecordRequest,
    AddRecordRequest,
    UpdateRecordRequest,
    RemoveRecordRequest,
    GetPropertyRequest,
    PortMappingRequest,
    AddrInfoRequest,
);
service_flags!(
    EnumerateDomainsRequest,
    RegisterRequest,
    BrowseRequest,
    ResolveRequest,
    QueryRecordRequest,
    RegisterRecordRequest,
    ReconfirmRecordRequest,
    AddRecordRequest,
    UpdateRecordRequest,
    RemoveRecordRequest,
    PortMappingRequest,
    AddrInfoRequest,
);
interface_index!(
    EnumerateDomainsRequest,
    RegisterRequest,
    BrowseRequest,
    ResolveRequest,
    QueryRecordRequest,
    RegisterRecordRequest,
    ReconfirmRecordRequest,
    PortMappingRequest,
    AddrInfoRequest,
);

pub type ConnectionMessage = Message<ConnectionRequest>;
pub type CancelMessage = Message<CancelRequest>;
pub type EnumerateDomainsMessage = Message<EnumerateDomainsRequest>;
pub type RegisterMessage = Message<RegisterRequest>;
pub type BrowseMessage = Message<BrowseRequest>;
pub type ResolveMessage = Message<ResolveRequest>;
pub type QueryRecordMessage = Message<QueryRecordRequest>;
pub type RegisterRecordMessage = Message<RegisterRecordRequest>;
pub type ReconfirmRecordMessage = Message<ReconfirmRecordRequest>;
pub type AddRecordMessage = Message<AddRecordRequest>;
pub type UpdateRecordMessage = Message<UpdateRecordRequest>;
pub type RemoveRecordMessage = Message<RemoveRecordRequest>;
pub type GetPropertyMessage = Message<GetPropertyRequest>;
pub type PortMappingMessage = Message<PortMappingRequest>;
pub type AddrInfoMessage = Message<AddrInfoRequest>;

/// Turns the connection into a shared connection that further requests can be multiplexed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionRequest {
    base: RequestBase,
}

impl ConnectionRequest {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Payload for ConnectionRequest {
    const OPERATION: OperationCode = OperationCode::CONNECTION;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
        })
    }
}

/// Cancels the operation identified by the header's context on a shared connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelRequest {
    base: RequestBase,
}

impl CancelRequest {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Payload for CancelRequest {
    const OPERATION: OperationCode = OperationCode::CANCEL;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
        })
    }
}

/// Asks for the domains recommended for browsing or registration.
///
/// Pass [`ServiceFlags::BROWSE_DOMAINS`] or [`ServiceFlags::REGISTRATION_DOMAINS`] to select
/// which.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerateDomainsRequest {
    base: RequestBase,
    flags: ServiceFlags,
    interface_index: u32,
}

impl EnumerateDomainsRequest {
    pub fn new(flags: ServiceFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }
}

impl Payload for EnumerateDomainsRequest {
    const OPERATION: OperationCode = OperationCode::ENUMERATE_DOMAINS;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_u32(self.interface_index);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            interface_index: r.read_u32()?,
        })
    }
}

/// Registers a service instance with the daemon, which will advertise it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    base: RequestBase,
    flags: ServiceFlags,
    interface_index: u32,
    instance_name: String,
    service_type: String,
    domain: String,
    host_name: String,
    port: u16,
    txt_record: TxtRecord,
}

impl RegisterRequest {
    /// Creates a registration request.
    ///
    /// `service_type` (eg. `_http._tcp`) must not be empty, or [`Error::MissingRequiredField`] is
    /// returned. An empty or [`None`] `instance_name`, `domain` or `host_name` lets the daemon pick
    /// a default.
    ///
    /// The TXT record, flags and interface index default to none, empty and 0 (all interfaces),
    /// and can be changed with the `with_*` methods.
    pub fn new<'a>(
        instance_name: impl Into<Option<&'a str>>,
        service_type: &str,
        domain: impl Into<Option<&'a str>>,
        host_name: impl Into<Option<&'a str>>,
        port: u16,
    ) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::new(),
            flags: ServiceFlags::empty(),
            interface_index: 0,
            instance_name: optional(instance_name)?,
            service_type: required(service_type)?,
            domain: optional(domain)?,
            host_name: optional(host_name)?,
            port,
            txt_record: TxtRecord::none(),
        })
    }

    pub fn with_txt_record(self, txt_record: TxtRecord) -> Self {
        Self { txt_record, ..self }
    }

    #[inline]
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    #[inline]
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    #[inline]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[inline]
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn txt_record(&self) -> &TxtRecord {
        &self.txt_record
    }
}

impl Payload for RegisterRequest {
    const OPERATION: OperationCode = OperationCode::REGISTER_SERVICE;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_u32(self.interface_index);
        w.write_string(&self.instance_name);
        w.write_string(&self.service_type);
        w.write_string(&self.domain);
        w.write_string(&self.host_name);
        w.write_u16(self.port);
        self.txt_record.encode(w);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            interface_index: r.read_u32()?,
            instance_name: r.read_string()?.to_owned(),
            service_type: r.read_string()?.to_owned(),
            domain: r.read_string()?.to_owned(),
            host_name: r.read_string()?.to_owned(),
            port: r.read_u16()?,
            txt_record: TxtRecord::decode(r)?,
        })
    }
}

/// Browses for instances of a service type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    base: RequestBase,
    flags: ServiceFlags,
    interface_index: u32,
    service_type: String,
    domain: String,
}

impl BrowseRequest {
    /// Creates a browse request for `service_type`, which must not be empty.
    ///
    /// An empty or [`None`] `domain` browses the default domains.
    pub fn new<'a>(service_type: &str, domain: impl Into<Option<&'a str>>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::new(),
            flags: ServiceFlags::empty(),
            interface_index: 0,
            service_type: required(service_type)?,
            domain: optional(domain)?,
        })
    }

    #[inline]
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    #[inline]
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl Payload for BrowseRequest {
    const OPERATION: OperationCode = OperationCode::BROWSE;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_u32(self.interface_index);
        w.write_string(&self.service_type);
        w.write_string(&self.domain);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            interface_index: r.read_u32()?,
            service_type: r.read_string()?.to_owned(),
            domain: r.read_string()?.to_owned(),
        })
    }
}

/// Resolves a service instance to its host name, port and TXT record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    base: RequestBase,
    flags: ServiceFlags,
    interface_index: u32,
    instance_name: String,
    service_type: String,
    domain: String,
}

impl ResolveRequest {
    /// Creates a resolve request. `instance_name` and `service_type` must not be empty.
    pub fn new<'a>(
        instance_name: &str,
        service_type: &str,
        domain: impl Into<Option<&'a str>>,
    ) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::new(),
            flags: ServiceFlags::empty(),
            interface_index: 0,
            instance_name: required(instance_name)?,
            service_type: required(service_type)?,
            domain: optional(domain)?,
        })
    }

    #[inline]
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    #[inline]
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    #[inline]
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl Payload for ResolveRequest {
    const OPERATION: OperationCode = OperationCode::RESOLVE;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_u32(self.interface_index);
        w.write_string(&self.instance_name);
        w.write_string(&self.service_type);
        w.write_string(&self.domain);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            interface_index: r.read_u32()?,
            instance_name: r.read_string()?.to_owned(),
            service_type: r.read_string()?.to_owned(),
            domain: r.read_string()?.to_owned(),
        })
    }
}

/// Queries for resource records of a specific type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecordRequest {
    base: RequestBase,
    flags: ServiceFlags,
    interface_index: u32,
    full_name: String,
    rr_type: RecordType,
    rr_class: RecordClass,
}

impl QueryRecordRequest {
    /// Creates a query for `rr_type` records in the Internet class. `full_name` must not be empty.
    pub fn new(full_name: &str, rr_type: RecordType) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::new(),
            flags: ServiceFlags::empty(),
            interface_index: 0,
            full_name: required(full_name)?,
            rr_type,
            rr_class: RecordClass::IN,
        })
    }

    pub fn with_class(self, rr_class: RecordClass) -> Self {
        Self { rr_class, ..self }
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[inline]
    pub fn rr_type(&self) -> RecordType {
        self.rr_type
    }

    #[inline]
    pub fn rr_class(&self) -> RecordClass {
        self.rr_class
    }
}

impl Payload for QueryRecordRequest {
    const OPERATION: OperationCode = OperationCode::QUERY_RECORD;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_u32(self.interface_index);
        w.write_string(&self.full_name);
        w.write_u16(self.rr_type.get());
        w.write_u16(self.rr_class.get());
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            interface_index: r.read_u32()?,
            full_name: r.read_string()?.to_owned(),
            rr_type: RecordType(r.read_u16()?),
            rr_class: RecordClass(r.read_u16()?),
        })
    }
}

/// Registers an individual resource record on a shared connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRecordRequest {
    base: RequestBase,
    flags: ServiceFlags,
    interface_index: u32,
    full_name: String,
    rr_type: RecordType,
    rr_class: RecordClass,
    rdata: Vec<u8>,
    ttl: u32,
}

impl RegisterRecordRequest {
    /// Creates a record registration in the Internet class. `full_name` must not be empty.
    pub fn new(full_name: &str, rr_type: RecordType, rdata: &[u8], ttl: u32) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::new(),
            flags: ServiceFlags::empty(),
            interface_index: 0,
            full_name: required(full_name)?,
            rr_type,
            rr_class: RecordClass::IN,
            rdata: blob(rdata)?,
            ttl,
        })
    }

    pub fn with_class(self, rr_class: RecordClass) -> Self {
        Self { rr_class, ..self }
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[inline]
    pub fn rr_type(&self) -> RecordType {
        self.rr_type
    }

    #[inline]
    pub fn rr_class(&self) -> RecordClass {
        self.rr_class
    }

    #[inline]
    pub fn rdata(&self) -> &[u8] {
        &self.rdata
    }

    /// Returns the record's Time To Live, in seconds.
    #[inline]
    pub fn ttl(&self) -> u32 {
        self.ttl
    }
}

impl Payload for RegisterRecordRequest {
    const OPERATION: OperationCode = OperationCode::REGISTER_RECORD;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_u32(self.interface_index);
        w.write_string(&self.full_name);
        w.write_u16(self.rr_type.get());
        w.write_u16(self.rr_class.get());
        w.write_blob(&self.rdata);
        w.write_u32(self.ttl);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            interface_index: r.read_u32()?,
            full_name: r.read_string()?.to_owned(),
            rr_type: RecordType(r.read_u16()?),
            rr_class: RecordClass(r.read_u16()?),
            rdata: r.read_blob()?.to_vec(),
            ttl: r.read_u32()?,
        })
    }
}

/// Asks the daemon to verify that a cached record is still valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconfirmRecordRequest {
    base: RequestBase,
    flags: ServiceFlags,
    interface_index: u32,
    full_name: String,
    rr_type: RecordType,
    rr_class: RecordClass,
    rdata: Vec<u8>,
}

impl ReconfirmRecordRequest {
    /// Creates a reconfirmation request in the Internet class. `full_name` must not be empty.
    pub fn new(full_name: &str, rr_type: RecordType, rdata: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::new(),
            flags: ServiceFlags::empty(),
            interface_index: 0,
            full_name: required(full_name)?,
            rr_type,
            rr_class: RecordClass::IN,
            rdata: blob(rdata)?,
        })
    }

    pub fn with_class(self, rr_class: RecordClass) -> Self {
        Self { rr_class, ..self }
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[inline]
    pub fn rr_type(&self) -> RecordType {
        self.rr_type
    }

    #[inline]
    pub fn rr_class(&self) -> RecordClass {
        self.rr_class
    }

    #[inline]
    pub fn rdata(&self) -> &[u8] {
        &self.rdata
    }
}

impl Payload for ReconfirmRecordRequest {
    const OPERATION: OperationCode = OperationCode::RECONFIRM_RECORD;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_u32(self.interface_index);
        w.write_string(&self.full_name);
        w.write_u16(self.rr_type.get());
        w.write_u16(self.rr_class.get());
        w.write_blob(&self.rdata);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            interface_index: r.read_u32()?,
            full_name: r.read_string()?.to_owned(),
            rr_type: RecordType(r.read_u16()?),
            rr_class: RecordClass(r.read_u16()?),
            rdata: r.read_blob()?.to_vec(),
        })
    }
}

/// Adds a record to a registered service.
///
/// The service is identified by the header's context; the new record by the header's
/// `reg_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRecordRequest {
    base: RequestBase,
    flags: ServiceFlags,
    rr_type: RecordType,
    rdata: Vec<u8>,
    ttl: u32,
}

impl AddRecordRequest {
    pub fn new(rr_type: RecordType, rdata: &[u8], ttl: u32) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::new(),
            flags: ServiceFlags::empty(),
            rr_type,
            rdata: blob(rdata)?,
            ttl,
        })
    }

    #[inline]
    pub fn rr_type(&self) -> RecordType {
        self.rr_type
    }

    #[inline]
    pub fn rdata(&self) -> &[u8] {
        &self.rdata
    }

    #[inline]
    pub fn ttl(&self) -> u32 {
        self.ttl
    }
}

impl Payload for AddRecordRequest {
    const OPERATION: OperationCode = OperationCode::ADD_RECORD;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_u16(self.rr_type.get());
        w.write_blob(&self.rdata);
        w.write_u32(self.ttl);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            rr_type: RecordType(r.read_u16()?),
            rdata: r.read_blob()?.to_vec(),
            ttl: r.read_u32()?,
        })
    }
}

/// Replaces the data of a record previously added or registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecordRequest {
    base: RequestBase,
    flags: ServiceFlags,
    rdata: Vec<u8>,
    ttl: u32,
}

impl UpdateRecordRequest {
    pub fn new(rdata: &[u8], ttl: u32) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::new(),
            flags: ServiceFlags::empty(),
            rdata: blob(rdata)?,
            ttl,
        })
    }

    #[inline]
    pub fn rdata(&self) -> &[u8] {
        &self.rdata
    }

    #[inline]
    pub fn ttl(&self) -> u32 {
        self.ttl
    }
}

impl Payload for UpdateRecordRequest {
    const OPERATION: OperationCode = OperationCode::UPDATE_RECORD;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_blob(&self.rdata);
        w.write_u32(self.ttl);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            rdata: r.read_blob()?.to_vec(),
            ttl: r.read_u32()?,
        })
    }
}

/// Removes a record previously added or registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveRecordRequest {
    base: RequestBase,
    flags: ServiceFlags,
}

impl RemoveRecordRequest {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Payload for RemoveRecordRequest {
    const OPERATION: OperationCode = OperationCode::REMOVE_RECORD;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
        })
    }
}

/// Queries a daemon property, such as its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPropertyRequest {
    base: RequestBase,
    property: String,
}

impl GetPropertyRequest {
    /// Property holding the daemon version.
    pub const DAEMON_VERSION: &'static str = "DaemonVersion";

    /// Creates a property request. `property` must not be empty.
    pub fn new(property: &str) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::new(),
            property: required(property)?,
        })
    }

    #[inline]
    pub fn property(&self) -> &str {
        &self.property
    }
}

impl Payload for GetPropertyRequest {
    const OPERATION: OperationCode = OperationCode::GET_PROPERTY;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_string(&self.property);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            property: r.read_string()?.to_owned(),
        })
    }
}

/// Requests a NAT port mapping from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMappingRequest {
    base: RequestBase,
    flags: ServiceFlags,
    interface_index: u32,
    protocol: Protocol,
    internal_port: u16,
    external_port: u16,
    ttl: u32,
}

impl PortMappingRequest {
    /// Creates a mapping request. `protocol` should be [`Protocol::UDP`], [`Protocol::TCP`], or
    /// both.
    pub fn new(protocol: Protocol, internal_port: u16, external_port: u16, ttl: u32) -> Self {
        Self {
            base: RequestBase::new(),
            flags: ServiceFlags::empty(),
            interface_index: 0,
            protocol,
            internal_port,
            external_port,
            ttl,
        }
    }

    #[inline]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[inline]
    pub fn internal_port(&self) -> u16 {
        self.internal_port
    }

    #[inline]
    pub fn external_port(&self) -> u16 {
        self.external_port
    }

    #[inline]
    pub fn ttl(&self) -> u32 {
        self.ttl
    }
}

impl Payload for PortMappingRequest {
    const OPERATION: OperationCode = OperationCode::PORT_MAPPING;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_u32(self.interface_index);
        w.write_u32(self.protocol.bits());
        w.write_u16(self.internal_port);
        w.write_u16(self.external_port);
        w.write_u32(self.ttl);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            interface_index: r.read_u32()?,
            protocol: Protocol::from_bits_retain(r.read_u32()?),
            internal_port: r.read_u16()?,
            external_port: r.read_u16()?,
            ttl: r.read_u32()?,
        })
    }
}

/// Resolves a host name to IPv4 and/or IPv6 addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddrInfoRequest {
    base: RequestBase,
    flags: ServiceFlags,
    interface_index: u32,
    protocol: Protocol,
    host_name: String,
}

impl AddrInfoRequest {
    /// Creates an address lookup for `host_name`, which must not be empty.
    ///
    /// `protocol` selects the address families ([`Protocol::IPV4`], [`Protocol::IPV6`]); if empty,
    /// the daemon picks based on the configured addresses.
    pub fn new(host_name: &str, protocol: Protocol) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::new(),
            flags: ServiceFlags::empty(),
            interface_index: 0,
            protocol,
            host_name: required(host_name)?,
        })
    }

    #[inline]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[inline]
    pub fn host_name(&self) -> &str {
        &self.host_name
    }
}

impl Payload for AddrInfoRequest {
    const OPERATION: OperationCode = OperationCode::ADDR_INFO;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_u32(self.flags.bits());
        w.write_u32(self.interface_index);
        w.write_u32(self.protocol.bits());
        w.write_string(&self.host_name);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: RequestBase::decode(r)?,
            flags: ServiceFlags::from_bits_retain(r.read_u32()?),
            interface_index: r.read_u32()?,
            protocol: Protocol::from_bits_retain(r.read_u32()?),
            host_name: r.read_string()?.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;
    use crate::hex::{self, Hex};

    fn roundtrip<P: Payload + PartialEq + std::fmt::Debug>(payload: P) {
        let bytes = payload.to_bytes();
        let mut cursor = 0;
        let decoded = P::parse(&bytes, &mut cursor).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(cursor, bytes.len());
    }

    fn printer() -> RegisterRequest {
        RegisterRequest::new("MyPrinter", "_http._tcp", "local.", "host.local.", 8080).unwrap()
    }

    #[test]
    fn register_golden_payload() {
        let bytes = printer().to_bytes();
        assert_eq!(
            bytes,
            hex::parse(
                "0000
                 00000000
                 00000000
                 0009 4d795072696e746572
                 000a 5f687474702e5f746370
                 0006 6c6f63616c2e
                 000b 686f73742e6c6f63616c2e
                 1f90
                 0000"
            )
        );
    }

    #[test]
    fn register_requires_service_type() {
        assert_eq!(
            RegisterRequest::new("MyPrinter", "", "local.", "host.local.", 8080),
            Err(Error::MissingRequiredField)
        );
    }

    #[test]
    fn register_normalizes_missing_strings() {
        let req = RegisterRequest::new(None, "_http._tcp", None, None, 80).unwrap();
        assert_eq!(req.instance_name(), "");
        assert_eq!(req.domain(), "");
        assert_eq!(req.host_name(), "");
        assert!(req.txt_record().is_empty());
        assert_eq!(req.flags(), ServiceFlags::empty());
        assert_eq!(req.interface_index(), 0);
    }

    #[test]
    fn register_rejects_overlong_fields() {
        let long = "a".repeat(70000);
        assert_eq!(
            RegisterRequest::new(long.as_str(), "_http._tcp", None, None, 80),
            Err(Error::FieldTooLong)
        );
    }

    #[test]
    fn register_without_txt_record() {
        let bytes = printer().to_bytes();
        assert_eq!(&bytes[bytes.len() - 4..], &[0x1f, 0x90, 0x00, 0x00]);
        let decoded = RegisterRequest::parse(&bytes, &mut 0).unwrap();
        assert_eq!(decoded.txt_record().raw(), None);
    }

    #[test]
    fn register_with_single_zero_byte_txt_record() {
        let req = printer().with_txt_record(TxtRecord::from_bytes(vec![0]).unwrap());
        let bytes = req.to_bytes();
        assert_eq!(&bytes[bytes.len() - 3..], &[0x00, 0x01, 0x00]);

        let mut cursor = 0;
        let decoded = RegisterRequest::parse(&bytes, &mut cursor).unwrap();
        assert_eq!(cursor, bytes.len(), "placeholder byte must be consumed");
        assert_eq!(decoded.txt_record().raw(), None);
        assert_eq!(decoded, printer());
        assert_eq!(decoded, req);
    }

    #[test]
    fn register_with_txt_record() {
        let txt = TxtRecord::from_bytes(*b"\x03k=v").unwrap();
        let req = printer().with_txt_record(txt);
        let bytes = req.to_bytes();
        assert_eq!(&bytes[bytes.len() - 6..], b"\x00\x04\x03k=v");

        let decoded = RegisterRequest::parse(&bytes, &mut 0).unwrap();
        assert_eq!(decoded.txt_record().raw(), Some(&b"\x03k=v"[..]));
        assert_eq!(decoded, req);
    }

    #[test]
    fn register_all_fields() {
        let req = RegisterRequest::new("Büro", "_ipp._tcp", None, "printer.local.", 631)
            .unwrap()
            .with_flags(ServiceFlags::NO_AUTO_RENAME)
            .with_interface_index(3)
            .with_base(RequestBase::with_error_socket("/tmp/dnssd-err").unwrap())
            .with_txt_record(TxtRecord::from_bytes(*b"\x09txtvers=1").unwrap());
        expect![[r#"000e2f746d702f646e7373642d6572720000000800000003000542c3bc726f00095f6970702e5f7463700000000e7072696e7465722e6c6f63616c2e0277000a09747874766572733d31"#]]
        .assert_eq(&Hex(&req.to_bytes()).to_string());
        roundtrip(req);
    }

    #[test]
    fn parse_bad_buffers() {
        assert_eq!(
            RegisterRequest::parse(&[], &mut 0),
            Err(Error::InvalidArgument)
        );

        let bytes = printer().to_bytes();
        let mut cursor = bytes.len() + 1;
        assert_eq!(
            RegisterRequest::parse(&bytes, &mut cursor),
            Err(Error::OutOfBounds)
        );
        assert_eq!(cursor, bytes.len() + 1);

        let mut cursor = 0;
        assert_eq!(
            RegisterRequest::parse(&bytes[..bytes.len() - 1], &mut cursor),
            Err(Error::OutOfBounds)
        );
    }

    #[test]
    fn parse_at_offset() {
        let mut bytes = vec![0xaa, 0xbb];
        bytes.extend(printer().to_bytes());
        bytes.push(0xcc);

        let mut cursor = 2;
        let decoded = RegisterRequest::parse(&bytes, &mut cursor).unwrap();
        assert_eq!(decoded, printer());
        assert_eq!(cursor, bytes.len() - 1);
    }

    #[test]
    fn required_fields() {
        assert_eq!(BrowseRequest::new("", None), Err(Error::MissingRequiredField));
        assert_eq!(
            ResolveRequest::new("", "_http._tcp", None),
            Err(Error::MissingRequiredField)
        );
        assert_eq!(
            ResolveRequest::new("MyPrinter", "", None),
            Err(Error::MissingRequiredField)
        );
        assert_eq!(
            QueryRecordRequest::new("", RecordType::A),
            Err(Error::MissingRequiredField)
        );
        assert_eq!(
            RegisterRecordRequest::new("", RecordType::A, &[127, 0, 0, 1], 120),
            Err(Error::MissingRequiredField)
        );
        assert_eq!(
            ReconfirmRecordRequest::new("", RecordType::A, &[]),
            Err(Error::MissingRequiredField)
        );
        assert_eq!(GetPropertyRequest::new(""), Err(Error::MissingRequiredField));
        assert_eq!(
            AddrInfoRequest::new("", Protocol::IPV4),
            Err(Error::MissingRequiredField)
        );
        assert_eq!(
            AddRecordRequest::new(RecordType::TXT, &vec![0u8; 65536], 0),
            Err(Error::FieldTooLong)
        );
    }

    #[test]
    fn browse_layout() {
        let req = BrowseRequest::new("_ipp._tcp", "local.")
            .unwrap()
            .with_interface_index(2);
        assert_eq!(
            req.to_bytes(),
            hex::parse(
                "0000 00000000 00000002
                 0009 5f6970702e5f746370
                 0006 6c6f63616c2e"
            )
        );
    }

    #[test]
    fn query_record_layout() {
        let req = QueryRecordRequest::new("host.local.", RecordType::AAAA)
            .unwrap()
            .with_flags(ServiceFlags::LONG_LIVED_QUERY);
        assert_eq!(
            req.to_bytes(),
            hex::parse(
                "0000 00000100 00000000
                 000b 686f73742e6c6f63616c2e
                 001c 0001"
            )
        );
    }

    #[test]
    fn test_roundtrip() {
        roundtrip(ConnectionRequest::new());
        roundtrip(CancelRequest::new());
        roundtrip(EnumerateDomainsRequest::new(ServiceFlags::BROWSE_DOMAINS).with_interface_index(1));
        roundtrip(printer());
        roundtrip(BrowseRequest::new("_http._tcp", None).unwrap());
        roundtrip(ResolveRequest::new("MyPrinter", "_http._tcp", "local.").unwrap());
        roundtrip(
            QueryRecordRequest::new("_http._tcp.local.", RecordType::PTR)
                .unwrap()
                .with_class(RecordClass(255)),
        );
        roundtrip(
            RegisterRecordRequest::new("host.local.", RecordType::A, &[192, 168, 0, 2], 120)
                .unwrap()
                .with_flags(ServiceFlags::UNIQUE),
        );
        roundtrip(ReconfirmRecordRequest::new("host.local.", RecordType::A, &[10, 0, 0, 1]).unwrap());
        roundtrip(AddRecordRequest::new(RecordType::TXT, b"\x05a=b=c", 4500).unwrap());
        roundtrip(UpdateRecordRequest::new(b"", 0).unwrap());
        roundtrip(RemoveRecordRequest::new().with_flags(ServiceFlags::SHARED));
        roundtrip(GetPropertyRequest::new(GetPropertyRequest::DAEMON_VERSION).unwrap());
        roundtrip(PortMappingRequest::new(Protocol::TCP, 8080, 80, 7200));
        roundtrip(AddrInfoRequest::new("host.local.", Protocol::IPV4 | Protocol::IPV6).unwrap());
    }
}
