//! Packet framing on top of a raw byte transport.
//!
//! Packet format: `$<payload>#<checksum>`, the checksum is two lowercase hex digits.
//! Every packet is acknowledged with `+` (checksum ok) or `-` (resend requested).

use crate::stub::codec::{checksum, decode_hex_byte, encode_byte_hex};
use crate::stub::error::Error;
use crate::stub::transport::Transport;
use crate::{tl_debug, tl_warn};

const PACKET_START: u8 = b'$';
const PACKET_END: u8 = b'#';
const ACK: u8 = b'+';
const NACK: u8 = b'-';

/// Send a packet and wait for acknowledgment, resend on anything but `+`.
///
/// At most `retry_budget` attempts are made. When the budget runs out the packet is
/// dropped silently, returns the number of bytes written by the last attempt.
/// Only transport failures are reported as errors.
pub fn send_packet<T: Transport + ?Sized>(
    io: &mut T,
    payload: &[u8],
    retry_budget: u32,
) -> Result<usize, Error> {
    let mut sent = 0;
    for attempt in 1..=retry_budget {
        io.write_byte(PACKET_START)?;
        io.write_all(payload)?;
        io.write_byte(PACKET_END)?;
        io.write_all(&encode_byte_hex(checksum(payload)))?;
        io.flush()?;
        sent = payload.len() + 4;

        let ack = io.read_byte()?;
        if ack == ACK {
            return Ok(sent);
        }
        tl_debug!(target: "stub", "packet not acknowledged ({ack:#04x}), attempt {attempt}");
    }

    tl_warn!(
        target: "stub",
        "give up sending packet after {retry_budget} attempts"
    );
    Ok(sent)
}

/// Receive a packet into `buf`, returns the payload length.
///
/// Garbage before `$` is skipped. A `$` in the middle of a packet restarts collection
/// (the last packet wins), a packet that doesn't fit into `buf` is dropped. Packets with
/// a bad checksum are answered with `-` and reception starts over.
/// The payload is NUL-terminated inside `buf`.
pub fn receive_packet<T: Transport + ?Sized>(io: &mut T, buf: &mut [u8]) -> Result<usize, Error> {
    debug_assert!(!buf.is_empty());
    let limit = buf.len() - 1;

    'packet: loop {
        while io.read_byte()? != PACKET_START {}

        let mut len = 0;
        loop {
            match io.read_byte()? {
                PACKET_START => {
                    len = 0;
                }
                PACKET_END => break,
                byte => {
                    if len == limit {
                        tl_debug!(target: "stub", "packet exceeds {limit} bytes, dropped");
                        continue 'packet;
                    }
                    buf[len] = byte;
                    len += 1;
                }
            }
        }

        let hi = io.read_byte()?;
        let lo = io.read_byte()?;
        let expected = decode_hex_byte(hi, lo).ok();
        if expected == Some(checksum(&buf[..len])) {
            io.write_byte(ACK)?;
            io.flush()?;
            buf[len] = 0;
            return Ok(len);
        }

        tl_debug!(target: "stub", "bad packet checksum, request resend");
        io.write_byte(NACK)?;
        io.flush()?;
    }
}
