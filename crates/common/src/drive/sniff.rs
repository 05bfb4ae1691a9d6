//! In-process content sniffing.
//!
//! Looks at the first bytes of a blob and matches them against a table of
//! well-known signatures, producing the same kind of MIME string that
//! `file --mime-type` reports. Text content is refined using the filename.

use std::fs::File;
use std::io::Read;
use std::str::FromStr;

use mime::Mime;

use super::error::DriveError;
use super::ids::BlobKey;
use crate::blobs::BlobStore;

/// Bytes inspected per blob
pub const SNIFF_LEN: usize = 512;

const EMPTY: &str = "inode/x-empty";

struct Signature {
    offset: usize,
    magic: &'static [u8],
    mime: &'static str,
}

const fn sig(offset: usize, magic: &'static [u8], mime: &'static str) -> Signature {
    Signature {
        offset,
        magic,
        mime,
    }
}

const SIGNATURES: &[Signature] = &[
    sig(0, b"\x89PNG\r\n\x1a\n", "image/png"),
    sig(0, b"\xff\xd8\xff", "image/jpeg"),
    sig(0, b"GIF87a", "image/gif"),
    sig(0, b"GIF89a", "image/gif"),
    sig(0, b"II*\x00", "image/tiff"),
    sig(0, b"MM\x00*", "image/tiff"),
    sig(0, b"%PDF-", "application/pdf"),
    sig(0, b"PK\x03\x04", "application/zip"),
    sig(0, b"PK\x05\x06", "application/zip"),
    sig(0, b"\x1f\x8b", "application/gzip"),
    sig(0, b"BZh", "application/x-bzip2"),
    sig(0, b"\xfd7zXZ\x00", "application/x-xz"),
    sig(0, b"7z\xbc\xaf\x27\x1c", "application/x-7z-compressed"),
    sig(0, b"SQLite format 3\x00", "application/vnd.sqlite3"),
    sig(0, b"\x7fELF", "application/x-executable"),
    sig(0, b"\x00asm", "application/wasm"),
    sig(0, b"ID3", "audio/mpeg"),
    sig(0, b"fLaC", "audio/flac"),
    sig(0, b"OggS", "audio/ogg"),
    sig(8, b"WEBP", "image/webp"),
    sig(8, b"WAVE", "audio/x-wav"),
    sig(8, b"AVI ", "video/x-msvideo"),
    sig(4, b"ftyp", "video/mp4"),
    sig(0, b"BM", "image/bmp"),
];

// markup is matched case-insensitively after leading whitespace
const MARKUP: &[(&[u8], &str)] = &[
    (b"<?xml", "text/xml"),
    (b"<svg", "image/svg+xml"),
    (b"<!doctype html", "text/html"),
    (b"<html", "text/html"),
];

fn parse(mime: &str) -> Mime {
    Mime::from_str(mime).unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

fn matches_signature(head: &[u8], signature: &Signature) -> bool {
    let end = signature.offset + signature.magic.len();
    // the RIFF container carries its format tag at offset 8
    if signature.offset == 8 && !head.starts_with(b"RIFF") {
        return false;
    }
    head.len() >= end && &head[signature.offset..end] == signature.magic
}

fn looks_like_text(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(_) => true,
        // a multi-byte sequence cut off by the sniff window is still text
        Err(err) => err.error_len().is_none(),
    }
}

fn refine_text(filename: &str) -> Option<Mime> {
    let guess = mime_guess::from_path(filename).first()?;
    let texty = guess.type_() == mime::TEXT
        || matches!(
            guess.subtype().as_str(),
            "json" | "xml" | "javascript" | "toml" | "x-yaml" | "yaml"
        );
    texty.then_some(guess)
}

/// Detect the MIME type of content starting with `head`.
///
/// `filename` is only consulted when the bytes alone are inconclusive.
pub fn sniff(head: &[u8], filename: &str) -> Mime {
    if head.is_empty() {
        return parse(EMPTY);
    }

    if let Some(signature) = SIGNATURES.iter().find(|s| matches_signature(head, s)) {
        return parse(signature.mime);
    }

    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let trimmed = &head[start..];
    for (prefix, mime) in MARKUP {
        if trimmed.len() >= prefix.len() && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix) {
            return parse(mime);
        }
    }

    if looks_like_text(head) {
        return refine_text(filename).unwrap_or(mime::TEXT_PLAIN);
    }

    mime_guess::from_path(filename)
        .first()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

fn read_head(reader: &mut dyn Read) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    reader.take(SNIFF_LEN as u64).read_to_end(&mut head)?;
    Ok(head)
}

/// Sniff a stored blob, reading the local file directly when the
///  backend exposes one
pub(crate) fn sniff_blob(
    blobs: &dyn BlobStore,
    key: &BlobKey,
    filename: &str,
) -> Result<Mime, DriveError> {
    let head = match blobs.local_file(key) {
        Some(path) => read_head(&mut File::open(path)?)?,
        None => match blobs.reader(key)? {
            Some(mut reader) => read_head(&mut reader)?,
            None => return Err(DriveError::NotFound(format!("blob {}", key))),
        },
    };
    Ok(sniff(&head, filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_numbers() {
        let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
        assert_eq!(sniff(png, "whatever.bin").as_ref(), "image/png");
        assert_eq!(sniff(b"%PDF-1.7\n", "x").as_ref(), "application/pdf");
        assert_eq!(sniff(b"PK\x03\x04rest", "x").as_ref(), "application/zip");
        assert_eq!(sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 ", "x").as_ref(), "image/webp");
        assert_eq!(sniff(b"\x00\x00\x00\x18ftypmp42", "x").as_ref(), "video/mp4");
    }

    #[test]
    fn test_riff_tag_requires_riff_header() {
        assert_ne!(sniff(b"12345678WEBP", "x").as_ref(), "image/webp");
    }

    #[test]
    fn test_markup() {
        assert_eq!(sniff(b"  <!DOCTYPE html><p>", "x").as_ref(), "text/html");
        assert_eq!(sniff(b"<?xml version=\"1.0\"?>", "x").as_ref(), "text/xml");
    }

    #[test]
    fn test_text_and_refinement() {
        assert_eq!(sniff(b"hello", "a.txt").as_ref(), "text/plain");
        assert_eq!(sniff(b"hello", "noext").as_ref(), "text/plain");
        assert_eq!(sniff(b"{\"a\": 1}", "data.json").as_ref(), "application/json");
        // a png name does not turn text into an image
        assert_eq!(sniff(b"hello", "fake.png").as_ref(), "text/plain");
    }

    #[test]
    fn test_truncated_utf8_is_text() {
        let mut head = "é".repeat(10).into_bytes();
        head.pop();
        assert_eq!(sniff(&head, "x").as_ref(), "text/plain");
    }

    #[test]
    fn test_empty_and_binary() {
        assert_eq!(sniff(b"", "x").as_ref(), "inode/x-empty");
        assert_eq!(
            sniff(b"\x00\x01\x02\x03", "x").as_ref(),
            "application/octet-stream"
        );
    }
}
