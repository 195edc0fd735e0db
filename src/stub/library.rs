//! `qXfer:libraries:read` producer.
//!
//! The library list document is generated one piece per request: the header, one
//! `<library>` entry, or the footer. A [`LibraryCursor`] remembers where the previous
//! request stopped so that the transfer resumes across independent command loop calls.

use crate::stub::buffer::OutBuf;
use crate::stub::codec::{parse_hex_u64, split_once};
use crate::stub::command::{Flow, Request};
use crate::stub::error::Error;
use crate::stub::target::{Image, Target};
use crate::tl_warn;

/// Scratch capacity for one formatted library entry.
pub const ENTRY_CAPACITY: usize = 256;

const HEADER: &[u8] = b"<library-list>\n";
const FOOTER: &[u8] = b"</library-list>\n";

/// Position of an ongoing library list transfer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LibraryCursor {
    /// Document offset the next request must ask for, 0 if no transfer is active.
    pub next_offset: u64,
    /// Index of the next image to emit.
    pub index: usize,
}

impl LibraryCursor {
    pub fn reset(&mut self) {
        *self = LibraryCursor::default();
    }

    fn is_active(&self) -> bool {
        self.next_offset != 0
    }

    fn advance(&mut self, emitted: usize) {
        self.next_offset += emitted as u64;
    }
}

fn push_xml_escaped(out: &mut OutBuf<'_>, s: &str) -> Result<(), Error> {
    for &b in s.as_bytes() {
        match b {
            b'&' => out.extend(b"&amp;")?,
            b'<' => out.extend(b"&lt;")?,
            b'>' => out.extend(b"&gt;")?,
            b'"' => out.extend(b"&quot;")?,
            _ => out.push(b)?,
        }
    }
    Ok(())
}

/// Format one `<library>` element.
fn format_entry(out: &mut OutBuf<'_>, image: &Image<'_>) -> Result<(), Error> {
    out.extend(b"  <library name=\"")?;
    push_xml_escaped(out, image.path)?;
    out.format(format_args!(
        "\"><segment address=\"{:#x}\"/></library>\n",
        image.load_address
    ))
}

/// Emit one chunk with the `m` (more) or `l` (last) prefix.
fn emit(req: &mut Request<'_, impl Target>, last: bool, body: &[u8]) -> Result<(), Error> {
    req.reply.push(if last { b'l' } else { b'm' })?;
    req.reply.extend_escaped(body)
}

/// Serve `qXfer:libraries:read::<offset>,<length>`, `args` is the part after `::`.
///
/// Every reply carries a single document piece which is always shorter than the
/// packet buffer, the requested length is only validated.
pub(crate) fn read<T: Target>(req: &mut Request<'_, T>, args: &[u8]) -> Result<(), Error> {
    let (offset_field, len_field) =
        split_once(args, b',').ok_or(Error::MalformedField("length"))?;
    let offset = parse_hex_u64(offset_field, "offset")?;
    parse_hex_u64(len_field, "length")?;

    if offset == 0 {
        req.state.library.reset();
        emit(req, false, HEADER)?;
        req.state.library.advance(HEADER.len());
        return Ok(());
    }

    let cursor = req.state.library;
    if !cursor.is_active() || offset != cursor.next_offset {
        req.state.library.reset();
        return Err(Error::OffsetMismatch {
            expected: cursor.next_offset,
            requested: offset,
        });
    }

    let mut index = cursor.index;
    while let Some(image) = req.images.image(index) {
        index += 1;

        let mut storage = [0u8; ENTRY_CAPACITY];
        let mut entry = OutBuf::new(&mut storage);
        if format_entry(&mut entry, &image).is_err() {
            tl_warn!(
                target: "stub",
                "library entry for {} does not fit {ENTRY_CAPACITY} bytes, skipped",
                image.path
            );
            continue;
        }

        emit(req, false, entry.as_bytes())?;
        req.state.library.index = index;
        req.state.library.advance(entry.len());
        return Ok(());
    }

    emit(req, true, FOOTER)?;
    req.state.library.reset();
    Ok(())
}
