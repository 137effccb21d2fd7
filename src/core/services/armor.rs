//! OpenPGP ASCII armor for public key blocks (RFC 4880 §6).
//!
//! Only framing is handled here: the payload is never parsed as packets.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::core::errors::{DirectoryError, Result};

const BEGIN_PUBLIC_KEY: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----";
const END_PUBLIC_KEY: &str = "-----END PGP PUBLIC KEY BLOCK-----";
const PUBLIC_KEY_BLOCK: &str = "PUBLIC KEY BLOCK";
const SIGNED_MESSAGE: &str = "SIGNED MESSAGE";

/// Base64 characters per body line.
const LINE_WIDTH: usize = 76;

const CRC24_INIT: u32 = 0x00B7_04CE;
const CRC24_POLY: u32 = 0x0186_4CFB;
const CRC24_MASK: u32 = 0x00FF_FFFF;

/// The OpenPGP CRC-24 checksum.
pub fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;
    for &byte in data {
        crc ^= u32::from(byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
        }
    }
    crc & CRC24_MASK
}

/// Base64 form of the checksum, as it appears after the `=` on the armor line.
fn checksum_text(data: &[u8]) -> String {
    let crc = crc24(data);
    STANDARD.encode([(crc >> 16) as u8, (crc >> 8) as u8, crc as u8])
}

/// Wrap `data` in a `PGP PUBLIC KEY BLOCK`.
pub fn encode(data: &[u8]) -> String {
    let body = STANDARD.encode(data);

    let mut out = String::with_capacity(body.len() + body.len() / LINE_WIDTH + 96);
    out.push_str(BEGIN_PUBLIC_KEY);
    out.push_str("\n\n");
    // Base64 output is ASCII, so byte chunks are always valid str boundaries.
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push('=');
    out.push_str(&checksum_text(data));
    out.push('\n');
    out.push_str(END_PUBLIC_KEY);
    out.push('\n');
    out
}

/// An armor block as seen while decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArmorBlock {
    pub block_type: String,
    pub checksum: Option<String>,
    pub payload: Vec<u8>,
}

impl ArmorBlock {
    pub fn is_public_key(&self) -> bool {
        self.block_type.contains(PUBLIC_KEY_BLOCK)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first marker.
    Outside,
    /// Between a BEGIN marker and the first body line.
    Headers,
    /// Cleartext of a signed message, up to the signature marker.
    SignedText,
    Body,
    Done,
}

/// `-----BEGIN X-----` / `-----END X-----` → `X` with its verb.
fn marker(line: &str) -> Option<&str> {
    let inner = line.strip_prefix("-----")?.strip_suffix("-----")?;
    (!inner.is_empty() && !inner.contains("-----")).then_some(inner)
}

/// `Version: 1.0`, `Comment: ...`.
fn is_header(line: &str) -> bool {
    match line.split_once(": ") {
        Some((name, _)) => {
            !name.is_empty()
                && !name.contains(':')
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        None => false,
    }
}

/// Split on `\n`, `\r\n` and lone `\r`.
fn armor_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .flat_map(|line| line.split('\r'))
}

/// Parse the first armor block in `lines`, returning it with the number of
/// lines it consumed.
///
/// The checksum, when present, is verified against the decoded payload.
/// Returns `None` when no marker line is found.
fn parse_lines(lines: &[&str]) -> Result<Option<(ArmorBlock, usize)>> {
    let mut state = State::Outside;
    let mut block = ArmorBlock::default();
    let mut body = String::new();
    let mut consumed = lines.len();

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        match state {
            State::Outside => {
                if let Some(kind) = marker(line) {
                    block.block_type = kind.trim_start_matches("BEGIN ").to_string();
                    state = if block.block_type.contains(SIGNED_MESSAGE) {
                        State::SignedText
                    } else {
                        State::Headers
                    };
                }
            }
            State::SignedText => {
                if let Some(kind) = marker(line) {
                    block.block_type = kind.trim_start_matches("BEGIN ").to_string();
                    state = State::Headers;
                }
            }
            State::Headers if line.is_empty() || is_header(line) => {}
            State::Headers | State::Body => {
                state = State::Body;
                if line.is_empty() {
                    continue;
                }
                if marker(line).is_some() {
                    state = State::Done;
                    consumed = i + 1;
                    break;
                } else if let Some(sum) = line.strip_prefix('=') {
                    block.checksum = Some(sum.to_string());
                } else {
                    body.push_str(line);
                }
            }
            State::Done => break,
        }
    }

    if state == State::Outside {
        return Ok(None);
    }

    block.payload = STANDARD
        .decode(body.as_bytes())
        .map_err(|e| DirectoryError::ArmorEncoding {
            detail: format!("{} body is not valid base64: {e}", block.block_type),
        })?;

    if let Some(sum) = &block.checksum
        && *sum != checksum_text(&block.payload)
    {
        return Err(DirectoryError::ArmorIntegrity);
    }

    Ok(Some((block, consumed)))
}

/// Unwrap every public key block in `text`, concatenating their payloads in
/// order.
///
/// Armor of any other type (signatures, signed messages, messages) is
/// recognized but contributes nothing.
pub fn decode_all(text: &str) -> Result<Vec<u8>> {
    let lines: Vec<&str> = armor_lines(text).collect();
    let mut rest = &lines[..];
    let mut out = Vec::new();

    while let Some((block, consumed)) = parse_lines(rest)? {
        if block.is_public_key() {
            out.extend_from_slice(&block.payload);
        }
        rest = &rest[consumed..];
    }
    Ok(out)
}
