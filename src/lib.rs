//! Client side of the DNS Service Discovery daemon IPC protocol.
//!
//! Clients talk to a local discovery daemon (such as `mDNSResponder`) by exchanging framed binary
//! messages over a Unix domain socket. Every message consists of a fixed-size [`Header`] followed
//! by an operation-specific payload; see the [`message`] module for the wire format.
//!
//! The [`transport`] module contains a minimal blocking connection to the daemon. An async
//! version lives in the `dnssd-ipc-async` crate.
//!
//! [`Header`]: message::Header

#![forbid(unaligned_references)]

mod error;
mod hex;
mod num;

pub mod message;
pub mod transport;

pub use error::Error;
pub use hex::Hex;
pub use message::operation_code_of;

use message::{
    payload::Payload,
    requests::{RegisterMessage, RegisterRequest},
    txt::TxtRecord,
    AnyMessage, Message, ServiceFlags,
};

/// Path of the daemon's listening socket on macOS and on Linux systems running `mDNSResponder`.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/mDNSResponder";

/// Largest payload length accepted from the daemon.
///
/// Individual fields are limited to 64 KiB, and no message carries more than a handful of them.
pub const MAX_PAYLOAD_LEN: u32 = 256 * 1024;

/// Encodes `msg` into a new buffer, header first.
pub fn encode<P: Payload>(msg: &Message<P>) -> Vec<u8> {
    msg.encode()
}

/// Decodes a single message of any supported operation from the start of `buf`.
///
/// Use [`AnyMessage::decode_from`] to decode several consecutive messages from one buffer.
pub fn decode(buf: &[u8]) -> Result<AnyMessage, Error> {
    AnyMessage::decode(buf)
}

/// Builds a service registration request.
///
/// `service_type` is required; empty or [`None`] values for the other strings let the daemon pick
/// a default. [`None`] for `flags` and `interface_index` mean no flags and all interfaces.
#[allow(clippy::too_many_arguments)]
pub fn build_register_request<'a>(
    instance_name: impl Into<Option<&'a str>>,
    service_type: &str,
    domain: impl Into<Option<&'a str>>,
    host_name: impl Into<Option<&'a str>>,
    port: u16,
    txt_record: Option<TxtRecord>,
    flags: Option<ServiceFlags>,
    interface_index: Option<u32>,
) -> Result<RegisterMessage, Error> {
    let req = RegisterRequest::new(instance_name, service_type, domain, host_name, port)?
        .with_txt_record(txt_record.unwrap_or_default())
        .with_flags(flags.unwrap_or_default())
        .with_interface_index(interface_index.unwrap_or_default());
    Ok(Message::from_payload(req))
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;
    use crate::{
        hex::Hex,
        message::{requests::BrowseRequest, OperationCode},
    };

    #[test]
    fn build_and_decode_register_request() {
        let msg = build_register_request(
            "MyPrinter",
            "_http._tcp",
            "local.",
            "host.local.",
            8080,
            None,
            None,
            None,
        )
        .unwrap();
        let bytes = encode(&msg);
        expect![[r#"00000005000000010000003a000000000000000000000000000000000000000000000000000000094d795072696e746572000a5f687474702e5f74637000066c6f63616c2e000b686f73742e6c6f63616c2e1f900000"#]]
            .assert_eq(&Hex(&bytes).to_string());

        assert_eq!(operation_code_of(&bytes), Ok(OperationCode::REGISTER_SERVICE));
        match decode(&bytes).unwrap() {
            AnyMessage::Register(decoded) => assert_eq!(decoded, msg),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn build_register_request_options() {
        let txt = TxtRecord::from_bytes(*b"\x03a=b").unwrap();
        let msg = build_register_request(
            None,
            "_ipp._tcp",
            None,
            None,
            631,
            Some(txt.clone()),
            Some(ServiceFlags::NO_AUTO_RENAME),
            Some(3),
        )
        .unwrap();
        let req = msg.payload();
        assert_eq!(req.instance_name(), "");
        assert_eq!(req.txt_record(), &txt);
        assert_eq!(req.flags(), ServiceFlags::NO_AUTO_RENAME);
        assert_eq!(req.interface_index(), 3);

        assert_eq!(
            build_register_request("x", "", None, None, 1, None, None, None),
            Err(Error::MissingRequiredField)
        );
    }

    #[test]
    fn decode_errors() {
        assert_eq!(decode(&[]), Err(Error::InvalidArgument));
        assert_eq!(operation_code_of(&[]), Err(Error::InvalidArgument));
        assert_eq!(operation_code_of(&[0, 0, 0]), Err(Error::OutOfBounds));

        let bytes = encode(&Message::from_payload(
            BrowseRequest::new("_http._tcp", None).unwrap(),
        ));
        assert_eq!(decode(&bytes[..bytes.len() - 1]), Err(Error::OutOfBounds));
    }
}
