//! Export archive access.
//!
//! Locates the score table inside the vendor's zip export, reads it fully,
//! and decodes it from UTF-16 before handing the text to the parser.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use zip::ZipArchive;

use crate::error::ParseError;
use crate::model::Battery;
use crate::parser::parse_export_text;

/// Name suffix of the data member inside the archive.
pub const DATA_EXTENSION: &str = ".csv";

/// Parse the export archive at `path`.
///
/// The file is closed before this returns, on success and on every error.
pub fn parse_archive(path: &Path) -> Result<Battery, ParseError> {
    tracing::debug!(path = %path.display(), "opening export archive");
    let file = File::open(path)?;
    parse_reader(BufReader::new(file))
}

/// Parse an export archive from any seekable byte stream, such as an
/// uploaded file held in memory.
pub fn parse_reader<R: Read + Seek>(reader: R) -> Result<Battery, ParseError> {
    let text = read_export_text(reader)?;
    parse_export_text(&text)
}

/// Read and decode the data member of an export archive.
pub fn read_export_text<R: Read + Seek>(reader: R) -> Result<String, ParseError> {
    let mut archive = ZipArchive::new(reader)?;

    let member = archive
        .file_names()
        .find(|name| name.ends_with(DATA_EXTENSION))
        .map(str::to_string)
        .ok_or(ParseError::MissingDataMember)?;
    tracing::debug!(member = %member, members = archive.len(), "selected data member");

    let mut bytes = Vec::new();
    archive.by_name(&member)?.read_to_end(&mut bytes)?;

    decode_export(&bytes).ok_or(ParseError::Decoding { member })
}

/// Decode UTF-16 export bytes.
///
/// A byte-order mark selects the byte order and is dropped; without one the
/// bytes are read as little-endian. Returns `None` for an odd trailing byte
/// or an unpaired surrogate.
pub fn decode_export(bytes: &[u8]) -> Option<String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) if encoding == UTF_16BE || encoding == UTF_16LE => {
            (encoding, &bytes[bom_len..])
        }
        _ => (UTF_16LE, bytes),
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
}
