use std::{env, io, process};

use dnssd_ipc::{
    build_register_request,
    message::{
        txt::{TxtRecord, TxtValue},
        AnyMessage,
    },
    transport::SyncConnection,
};
use log::LevelFilter;

fn main() -> io::Result<()> {
    env_logger::Builder::new()
        .filter_module(env!("CARGO_PKG_NAME"), LevelFilter::Trace)
        .filter_module(env!("CARGO_CRATE_NAME"), LevelFilter::Trace)
        .init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let (name, service_type, port, txt) = match &*args {
        [name, service_type, port, txt @ ..] => match port.parse::<u16>() {
            Ok(port) => (name, service_type, port, txt),
            Err(e) => {
                eprintln!("invalid port '{port}': {e}");
                process::exit(1);
            }
        },
        _ => {
            eprintln!("usage: register <name> <service type> <port> [key=value...]");
            process::exit(1);
        }
    };

    let txt = if txt.is_empty() {
        None
    } else {
        let entries = txt.iter().map(|entry| match entry.split_once('=') {
            Some((key, value)) => (key, TxtValue::Value(value.as_bytes())),
            None => (entry.as_str(), TxtValue::NoValue),
        });
        Some(TxtRecord::from_entries(entries)?)
    };

    let msg = build_register_request(&**name, service_type, None, None, port, txt, None, None)?;

    let mut conn = SyncConnection::connect_default()?;
    conn.send_message(&msg)?;
    log::info!("registered '{name}', waiting for the daemon to confirm");

    // The registration lasts as long as the connection stays open.
    loop {
        match conn.receive_message() {
            Ok(AnyMessage::RegisterReply(reply)) => {
                let reply = reply.payload();
                if reply.base().is_error() {
                    log::error!("registration failed with error {}", reply.base().error());
                    process::exit(1);
                }
                log::info!(
                    "registered as '{}.{}{}'",
                    reply.instance_name(),
                    reply.service_type(),
                    reply.domain(),
                );
            }
            Ok(other) => log::debug!("ignoring {:?}", other),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            // The offending message was skipped; the stream is still in sync.
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                log::warn!("failed to receive message: {}", e)
            }
            Err(e) => return Err(e),
        }
    }
}
