//! Reply payloads, sent from the daemon to the client.
//!
//! All replies start with a [`ReplyBase`] carrying the flags, interface index and error code of
//! the result. A reply with a non-zero error code usually has empty fields after the base.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::{
    decoder::Reader,
    encoder::Writer,
    payload::{blob, optional, Payload, ReplyBase},
    txt::TxtRecord,
    Message, OperationCode, RecordClass, RecordType,
};
use crate::Error;

macro_rules! reply_base {
    ( $($ty:ident),+ $(,)? ) => {
        $(
            impl $ty {
                /// Returns the flags, interface index and error code of the reply.
                #[inline]
                pub fn base(&self) -> &ReplyBase {
                    &self.base
                }
            }
        )+
    };
}

reply_base!(
    EnumerateDomainsReply,
    RegisterServiceReply,
    BrowseReply,
    ResolveReply,
    QueryRecordReply,
    RegisterRecordReply,
    AddrInfoReply,
);

pub type EnumerateDomainsReplyMessage = Message<EnumerateDomainsReply>;
pub type RegisterServiceReplyMessage = Message<RegisterServiceReply>;
pub type BrowseReplyMessage = Message<BrowseReply>;
pub type ResolveReplyMessage = Message<ResolveReply>;
pub type QueryRecordReplyMessage = Message<QueryRecordReply>;
pub type RegisterRecordReplyMessage = Message<RegisterRecordReply>;
pub type AddrInfoReplyMessage = Message<AddrInfoReply>;

/// A domain recommended for browsing or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerateDomainsReply {
    base: ReplyBase,
    domain: String,
}

impl EnumerateDomainsReply {
    pub fn new(base: ReplyBase, domain: &str) -> Result<Self, Error> {
        Ok(Self {
            base,
            domain: optional(domain)?,
        })
    }

    #[inline]
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl Payload for EnumerateDomainsReply {
    const OPERATION: OperationCode = OperationCode::ENUMERATE_DOMAINS_REPLY;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_string(&self.domain);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: ReplyBase::decode(r)?,
            domain: r.read_string()?.to_owned(),
        })
    }
}

/// Result of a service registration, carrying the name the service was actually registered
/// under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterServiceReply {
    base: ReplyBase,
    instance_name: String,
    service_type: String,
    domain: String,
}

impl RegisterServiceReply {
    pub fn new(
        base: ReplyBase,
        instance_name: &str,
        service_type: &str,
        domain: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            base,
            instance_name: optional(instance_name)?,
            service_type: optional(service_type)?,
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

impl Payload for RegisterServiceReply {
    const OPERATION: OperationCode = OperationCode::REGISTER_SERVICE_REPLY;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_string(&self.instance_name);
        w.write_string(&self.service_type);
        w.write_string(&self.domain);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: ReplyBase::decode(r)?,
            instance_name: r.read_string()?.to_owned(),
            service_type: r.read_string()?.to_owned(),
            domain: r.read_string()?.to_owned(),
        })
    }
}

/// A service instance that appeared or disappeared while browsing.
///
/// [`ServiceFlags::ADD`] in the base flags is set when the instance appeared.
///
/// [`ServiceFlags::ADD`]: super::ServiceFlags::ADD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseReply {
    base: ReplyBase,
    instance_name: String,
    service_type: String,
    domain: String,
}

impl BrowseReply {
    pub fn new(
        base: ReplyBase,
        instance_name: &str,
        service_type: &str,
        domain: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            base,
            instance_name: optional(instance_name)?,
            service_type: optional(service_type)?,
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

impl Payload for BrowseReply {
    const OPERATION: OperationCode = OperationCode::BROWSE_REPLY;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_string(&self.instance_name);
        w.write_string(&self.service_type);
        w.write_string(&self.domain);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: ReplyBase::decode(r)?,
            instance_name: r.read_string()?.to_owned(),
            service_type: r.read_string()?.to_owned(),
            domain: r.read_string()?.to_owned(),
        })
    }
}

/// Where a resolved service instance can be reached, and its TXT record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveReply {
    base: ReplyBase,
    full_name: String,
    host_target: String,
    port: u16,
    txt_record: TxtRecord,
}

impl ResolveReply {
    pub fn new(
        base: ReplyBase,
        full_name: &str,
        host_target: &str,
        port: u16,
        txt_record: TxtRecord,
    ) -> Result<Self, Error> {
        Ok(Self {
            base,
            full_name: optional(full_name)?,
            host_target: optional(host_target)?,
            port,
            txt_record,
        })
    }

    /// Returns the full domain name of the service instance.
    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns the host name the service runs on.
    #[inline]
    pub fn host_target(&self) -> &str {
        &self.host_target
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

impl Payload for ResolveReply {
    const OPERATION: OperationCode = OperationCode::RESOLVE_REPLY;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_string(&self.full_name);
        w.write_string(&self.host_target);
        w.write_u16(self.port);
        self.txt_record.encode(w);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: ReplyBase::decode(r)?,
            full_name: r.read_string()?.to_owned(),
            host_target: r.read_string()?.to_owned(),
            port: r.read_u16()?,
            txt_record: TxtRecord::decode(r)?,
        })
    }
}

/// A resource record answering a record query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecordReply {
    base: ReplyBase,
    full_name: String,
    rr_type: RecordType,
    rr_class: RecordClass,
    rdata: Vec<u8>,
    ttl: u32,
}

impl QueryRecordReply {
    pub fn new(
        base: ReplyBase,
        full_name: &str,
        rr_type: RecordType,
        rdata: &[u8],
        ttl: u32,
    ) -> Result<Self, Error> {
        Ok(Self {
            base,
            full_name: optional(full_name)?,
            rr_type,
            rr_class: RecordClass::IN,
            rdata: blob(rdata)?,
            ttl,
        })
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

impl Payload for QueryRecordReply {
    const OPERATION: OperationCode = OperationCode::QUERY_RECORD_REPLY;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_string(&self.full_name);
        w.write_u16(self.rr_type.get());
        w.write_u16(self.rr_class.get());
        w.write_blob(&self.rdata);
        w.write_u32(self.ttl);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: ReplyBase::decode(r)?,
            full_name: r.read_string()?.to_owned(),
            rr_type: RecordType(r.read_u16()?),
            rr_class: RecordClass(r.read_u16()?),
            rdata: r.read_blob()?.to_vec(),
            ttl: r.read_u32()?,
        })
    }
}

/// Result of a record registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterRecordReply {
    base: ReplyBase,
}

impl RegisterRecordReply {
    pub fn new(base: ReplyBase) -> Self {
        Self { base }
    }
}

impl Payload for RegisterRecordReply {
    const OPERATION: OperationCode = OperationCode::REGISTER_RECORD_REPLY;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: ReplyBase::decode(r)?,
        })
    }
}

/// An address of a host looked up with an address info request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddrInfoReply {
    base: ReplyBase,
    host_name: String,
    rr_type: RecordType,
    rr_class: RecordClass,
    rdata: Vec<u8>,
    ttl: u32,
}

impl AddrInfoReply {
    pub fn new(base: ReplyBase, host_name: &str, addr: IpAddr, ttl: u32) -> Result<Self, Error> {
        let (rr_type, rdata) = match addr {
            IpAddr::V4(ip) => (RecordType::A, ip.octets().to_vec()),
            IpAddr::V6(ip) => (RecordType::AAAA, ip.octets().to_vec()),
        };
        Ok(Self {
            base,
            host_name: optional(host_name)?,
            rr_type,
            rr_class: RecordClass::IN,
            rdata,
            ttl,
        })
    }

    #[inline]
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    #[inline]
    pub fn rr_type(&self) -> RecordType {
        self.rr_type
    }

    #[inline]
    pub fn rr_class(&self) -> RecordClass {
        self.rr_class
    }

    /// Returns the raw address record data.
    #[inline]
    pub fn rdata(&self) -> &[u8] {
        &self.rdata
    }

    #[inline]
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Decodes the record data as an IP address.
    ///
    /// Returns [`None`] if the record isn't an `A` or `AAAA` record of the right size (which is
    /// also the case for error replies).
    pub fn addr(&self) -> Option<IpAddr> {
        match self.rr_type {
            RecordType::A => {
                let octets: [u8; 4] = self.rdata.as_slice().try_into().ok()?;
                Some(Ipv4Addr::from(octets).into())
            }
            RecordType::AAAA => {
                let octets: [u8; 16] = self.rdata.as_slice().try_into().ok()?;
                Some(Ipv6Addr::from(octets).into())
            }
            _ => None,
        }
    }
}

impl Payload for AddrInfoReply {
    const OPERATION: OperationCode = OperationCode::ADDR_INFO_REPLY;

    fn encode(&self, w: &mut Writer) {
        self.base.encode(w);
        w.write_string(&self.host_name);
        w.write_u16(self.rr_type.get());
        w.write_u16(self.rr_class.get());
        w.write_blob(&self.rdata);
        w.write_u32(self.ttl);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: ReplyBase::decode(r)?,
            host_name: r.read_string()?.to_owned(),
            rr_type: RecordType(r.read_u16()?),
            rr_class: RecordClass(r.read_u16()?),
            rdata: r.read_blob()?.to_vec(),
            ttl: r.read_u32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hex, message::ServiceFlags};

    fn roundtrip<P: Payload + PartialEq + std::fmt::Debug>(payload: P) {
        let bytes = payload.to_bytes();
        let mut cursor = 0;
        assert_eq!(P::parse(&bytes, &mut cursor).unwrap(), payload);
        assert_eq!(cursor, bytes.len());
    }

    fn ok() -> ReplyBase {
        ReplyBase::new(ServiceFlags::ADD, 2, 0)
    }

    #[test]
    fn decode_browse_reply() {
        let bytes = hex::parse(
            "00000002 00000002 00000000
             0009 4d795072696e746572
             000a 5f687474702e5f746370
             0006 6c6f63616c2e",
        );
        let reply = BrowseReply::parse(&bytes, &mut 0).unwrap();
        assert_eq!(reply.base().flags(), ServiceFlags::ADD);
        assert_eq!(reply.base().interface_index(), 2);
        assert!(!reply.base().is_error());
        assert_eq!(reply.instance_name(), "MyPrinter");
        assert_eq!(reply.service_type(), "_http._tcp");
        assert_eq!(reply.domain(), "local.");
    }

    #[test]
    fn resolve_reply_txt_rule() {
        let bytes = hex::parse(
            "00000000 00000001 00000000
             0000
             000b 686f73742e6c6f63616c2e
             0050
             0001 00",
        );
        let mut cursor = 0;
        let reply = ResolveReply::parse(&bytes, &mut cursor).unwrap();
        assert_eq!(cursor, bytes.len());
        assert_eq!(reply.host_target(), "host.local.");
        assert_eq!(reply.port(), 80);
        assert_eq!(reply.txt_record().raw(), None);
    }

    #[test]
    fn resolve_reply_truncated_txt() {
        let bytes = hex::parse("00000000 00000001 00000000 0000 0000 0050 0004 0301");
        assert_eq!(
            ResolveReply::parse(&bytes, &mut 0),
            Err(Error::OutOfBounds)
        );
    }

    #[test]
    fn error_reply() {
        // kDNSServiceErr_NameConflict
        let base = ReplyBase::new(ServiceFlags::empty(), 0, -65548);
        let reply = RegisterServiceReply::new(base, "", "", "").unwrap();
        let decoded = RegisterServiceReply::parse(&reply.to_bytes(), &mut 0).unwrap();
        assert!(decoded.base().is_error());
        assert_eq!(decoded.base().error(), -65548);
    }

    #[test]
    fn addr_info_addresses() {
        let v4 = AddrInfoReply::new(ok(), "host.local.", Ipv4Addr::new(192, 168, 1, 7).into(), 120)
            .unwrap();
        assert_eq!(v4.rr_type(), RecordType::A);
        assert_eq!(v4.rdata(), &[192, 168, 1, 7]);
        assert_eq!(v4.addr(), Some(Ipv4Addr::new(192, 168, 1, 7).into()));

        let v6 = AddrInfoReply::new(ok(), "host.local.", Ipv6Addr::LOCALHOST.into(), 120).unwrap();
        assert_eq!(v6.rr_type(), RecordType::AAAA);
        assert_eq!(v6.addr(), Some(Ipv6Addr::LOCALHOST.into()));

        let bytes = hex::parse("00000000 00000000 00000000 0000 0001 0001 0002 0a00 00000000");
        let bad = AddrInfoReply::parse(&bytes, &mut 0).unwrap();
        assert_eq!(bad.addr(), None);
    }

    #[test]
    fn test_roundtrip() {
        roundtrip(EnumerateDomainsReply::new(ok(), "local.").unwrap());
        roundtrip(RegisterServiceReply::new(ok(), "MyPrinter (2)", "_http._tcp.", "local.").unwrap());
        roundtrip(BrowseReply::new(ok(), "MyPrinter", "_http._tcp.", "local.").unwrap());
        roundtrip(
            ResolveReply::new(
                ok(),
                "MyPrinter._http._tcp.local.",
                "host.local.",
                8080,
                TxtRecord::from_bytes(*b"\x06path=/").unwrap(),
            )
            .unwrap(),
        );
        roundtrip(ResolveReply::new(ok(), "", "", 0, TxtRecord::none()).unwrap());
        roundtrip(
            QueryRecordReply::new(ok(), "host.local.", RecordType::TXT, b"\x03a=b", 4500).unwrap(),
        );
        roundtrip(RegisterRecordReply::new(ok()));
        roundtrip(
            AddrInfoReply::new(ok(), "host.local.", Ipv4Addr::LOCALHOST.into(), 10).unwrap(),
        );
    }
}
