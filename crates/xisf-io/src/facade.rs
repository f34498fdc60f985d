//! Public reader/writer façade (C10): format sniffing and the top-level
//! `read`/`read_header`/`write` entry points, per the XISF 1.0 specification's
//! façade section.

use crate::carrier::ReadSeek;
use crate::options::{ReaderOptions, WriterOptions};
use crate::{distributed, monolithic, Error, Result};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, instrument};
use xisf_model::{Header, StorageModel, Unit};

/// An explicit override for format detection. Supplying one skips sniffing
/// entirely: useful when the carrier's extension is already known, or the
/// carrier is not cheaply seekable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Monolithic,
    Distributed,
}

/// Result of a façade read: the assembled unit plus each image's
/// materialized raw pixel bytes, in `unit.images` order.
pub struct UnitRead {
    pub unit: Unit,
    pub image_payloads: Vec<Option<Vec<u8>>>,
}

impl From<monolithic::MonolithicRead> for UnitRead {
    fn from(r: monolithic::MonolithicRead) -> Self {
        UnitRead { unit: r.unit, image_payloads: r.image_payloads }
    }
}

impl From<distributed::DistributedRead> for UnitRead {
    fn from(r: distributed::DistributedRead) -> Self {
        UnitRead { unit: r.unit, image_payloads: r.image_payloads }
    }
}

/// The framed bytes or XML text produced by [`write`], depending on which
/// storage engine handled the unit.
pub enum WrittenUnit {
    Monolithic(Vec<u8>),
    Distributed(String),
}

/// Peek the carrier's leading 8 bytes without disturbing its read position.
/// Returns `None` when fewer than 8 bytes are available (an empty or
/// truncated carrier).
fn sniff<R: ReadSeek>(carrier: &mut R) -> Result<Option<[u8; 8]>> {
    let start = carrier.stream_position()?;
    let mut buf = [0u8; 8];
    let result = match carrier.read_exact(&mut buf) {
        Ok(()) => Some(buf),
        Err(_) => None,
    };
    carrier.seek(SeekFrom::Start(start))?;
    Ok(result)
}

fn detect_format<R: ReadSeek>(carrier: &mut R, hint: Option<FormatHint>) -> Result<FormatHint> {
    if let Some(hint) = hint {
        return Ok(hint);
    }
    match sniff(carrier)? {
        Some(sig) if sig == monolithic::SIGNATURE => Ok(FormatHint::Monolithic),
        Some(sig) if sig == distributed::XISB_SIGNATURE => Err(Error::DirectXisbRead),
        Some(_) => Ok(FormatHint::Distributed),
        // Fewer than 8 bytes to sniff: default to monolithic. A truncated
        // carrier will simply fail framing validation next.
        None => Ok(FormatHint::Monolithic),
    }
}

/// Read a complete unit from `carrier`. `header_filename` names the carrier
/// for distributed units (becomes `StorageModel::Distributed.header_filename`);
/// it is ignored for monolithic units.
#[instrument(skip(carrier, options))]
pub fn read<R: ReadSeek>(
    carrier: &mut R,
    hint: Option<FormatHint>,
    header_filename: impl Into<String> + std::fmt::Debug,
    options: &ReaderOptions,
) -> Result<UnitRead> {
    let header_filename = header_filename.into();
    match detect_format(carrier, hint)? {
        FormatHint::Monolithic => {
            debug!("dispatching to monolithic storage engine");
            Ok(monolithic::read(carrier, options)?.into())
        }
        FormatHint::Distributed => {
            debug!("dispatching to distributed storage engine");
            Ok(distributed::read(carrier, header_filename, options)?.into())
        }
    }
}

/// Read just the file header and XML header, skipping pixel data.
#[instrument(skip(carrier))]
pub fn read_header<R: ReadSeek>(carrier: &mut R, hint: Option<FormatHint>) -> Result<Header> {
    match detect_format(carrier, hint)? {
        FormatHint::Monolithic => monolithic::read_header(carrier),
        FormatHint::Distributed => {
            let mut xml = String::new();
            carrier.read_to_string(&mut xml)?;
            Ok(xisf_xml::parse_document(&xml)?.header)
        }
    }
}

/// Validate and write `unit`, routing to the monolithic or distributed
/// storage engine based on `unit.storage_model`.
///
/// `image_payloads[i]` supplies the raw pixel bytes for `unit.images[i]`;
/// see [`crate::monolithic::write`] for why the data model needs this
/// side-channel. Distributed writes ignore it: `.xish` emission is XML-only,
/// and external payloads are persisted by separate calls the façade does
/// not prescribe.
#[instrument(skip(unit, image_payloads, options))]
pub fn write(unit: &Unit, image_payloads: &[Option<&[u8]>], options: &WriterOptions) -> Result<WrittenUnit> {
    match &unit.storage_model {
        StorageModel::Monolithic => {
            debug!("writing monolithic unit");
            Ok(WrittenUnit::Monolithic(monolithic::write(unit, image_payloads, options)?))
        }
        StorageModel::Distributed { .. } => {
            debug!("writing distributed (.xish) header");
            Ok(WrittenUnit::Distributed(distributed::write(unit, options)?))
        }
    }
}

/// Convenience: read a unit directly from a filesystem path.
pub fn read_file(path: impl AsRef<Path>, options: &ReaderOptions) -> Result<UnitRead> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path)?;
    let filename = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    read(&mut file, None, filename, options)
}

/// Convenience: read just the header from a filesystem path.
pub fn read_header_file(path: impl AsRef<Path>) -> Result<Header> {
    let mut file = std::fs::File::open(path.as_ref())?;
    read_header(&mut file, None)
}
