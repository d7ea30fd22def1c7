//! Macaroon - binary decoding of lnd's delegated-authority token
//!
//! lnd writes macaroons in the v2 binary layout. The v1 packet layout is
//! accepted too, since older tooling still produces it. Only structure is
//! checked here: the root key lives in lnd, so the HMAC chain cannot be
//! verified client-side.
//!
//! ```text
//! v2:  0x02 | [loc] id EOS | ([loc] id [vid] EOS)* | EOS | sig
//!      field = type:u8 len:uvarint data
//! v1:  packet* where packet = "%04x" "key value\n"
//! ```
//!
//! Decoding stops at the signature. Anything after it (a trailing newline,
//! padding) is ignored and never sent back to lnd.

use std::fmt;

use zeroize::Zeroizing;

const V2_VERSION: u8 = 2;
const SIGNATURE_LEN: usize = 32;

const FIELD_EOS: u8 = 0;
const FIELD_LOCATION: u8 = 1;
const FIELD_IDENTIFIER: u8 = 2;
const FIELD_VERIFICATION_ID: u8 = 4;
const FIELD_SIGNATURE: u8 = 6;

const V1_HEADER_LEN: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum MacaroonError {
    #[error("read: {0}")]
    Read(#[from] std::io::Error),
    #[error("empty macaroon")]
    Empty,
    #[error("unsupported macaroon version byte {0:#04x}")]
    UnknownVersion(u8),
    #[error("truncated {0}")]
    Truncated(&'static str),
    #[error("varint overflow")]
    VarintOverflow,
    #[error("unexpected field type {found} (expected {expected})")]
    UnexpectedField { expected: &'static str, found: u8 },
    #[error("field type {0} out of order")]
    FieldOrder(u8),
    #[error("missing identifier")]
    MissingIdentifier,
    #[error("signature must be 32 bytes, got {0}")]
    SignatureLength(usize),
    #[error("location is not utf-8")]
    InvalidLocation,
    #[error("bad v1 packet: {0}")]
    BadPacket(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacaroonVersion { V1, V2 }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caveat {
    pub identifier: Vec<u8>,
    pub verification_id: Option<Vec<u8>>,
    pub location: Option<String>,
}

impl Caveat {
    /// First-party caveats carry no verification id.
    pub fn is_first_party(&self) -> bool { self.verification_id.is_none() }
}

/// Parsed macaroon. `raw` is the encoded macaroon up to and including the
/// signature; lnd expects exactly those bytes back, hex encoded, on every call.
#[derive(Clone, PartialEq, Eq)]
pub struct Macaroon {
    version: MacaroonVersion,
    location: Option<String>,
    identifier: Vec<u8>,
    caveats: Vec<Caveat>,
    signature: [u8; SIGNATURE_LEN],
    raw: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for Macaroon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the raw bytes are a bearer credential; keep them out of logs
        f.debug_struct("Macaroon")
            .field("version", &self.version)
            .field("location", &self.location)
            .field("identifier", &hex::encode(&self.identifier))
            .field("caveats", &self.caveats.len())
            .finish_non_exhaustive()
    }
}

impl Macaroon {
    pub fn from_binary(data: &[u8]) -> Result<Self, MacaroonError> {
        let first = *data.first().ok_or(MacaroonError::Empty)?;
        if first == V2_VERSION {
            parse_v2(data)
        } else if first.is_ascii_hexdigit() {
            parse_v1(data)
        } else {
            Err(MacaroonError::UnknownVersion(first))
        }
    }

    pub fn version(&self) -> MacaroonVersion { self.version }
    pub fn location(&self) -> Option<&str> { self.location.as_deref() }
    pub fn identifier(&self) -> &[u8] { &self.identifier }
    pub fn caveats(&self) -> &[Caveat] { &self.caveats }
    pub fn signature(&self) -> &[u8; SIGNATURE_LEN] { &self.signature }
    pub fn as_bytes(&self) -> &[u8] { &self.raw }

    /// Hex form sent in the `macaroon` metadata entry.
    pub fn to_hex(&self) -> Zeroizing<String> { Zeroizing::new(hex::encode(self.raw.as_slice())) }
}

// =============================================================================
// v2 binary
// =============================================================================

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self { Self { data, pos: 0 } }

    fn remaining(&self) -> usize { self.data.len() - self.pos }

    fn peek(&self) -> Option<u8> { self.data.get(self.pos).copied() }

    fn byte(&mut self, what: &'static str) -> Result<u8, MacaroonError> {
        let b = self.peek().ok_or(MacaroonError::Truncated(what))?;
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], MacaroonError> {
        if self.remaining() < len {
            return Err(MacaroonError::Truncated(what));
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn uvarint(&mut self) -> Result<u64, MacaroonError> {
        let mut value: u64 = 0;
        for shift in (0..64).step_by(7) {
            let b = self.byte("field length")?;
            if shift == 63 && b > 1 {
                return Err(MacaroonError::VarintOverflow);
            }
            value |= u64::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(MacaroonError::VarintOverflow)
    }

    /// Reads one `type len data` field, or `None` at an end-of-section marker.
    fn field(&mut self) -> Result<Option<(u8, &'a [u8])>, MacaroonError> {
        let kind = self.byte("field type")?;
        if kind == FIELD_EOS {
            return Ok(None);
        }
        let len = usize::try_from(self.uvarint()?).map_err(|_| MacaroonError::VarintOverflow)?;
        let data = self.take(len, "field data")?;
        Ok(Some((kind, data)))
    }
}

#[derive(Default)]
struct Section {
    location: Option<String>,
    identifier: Option<Vec<u8>>,
    verification_id: Option<Vec<u8>>,
}

/// Fields within a section must appear in strictly increasing type order.
fn read_section(r: &mut Reader<'_>, allow_vid: bool) -> Result<Section, MacaroonError> {
    let mut section = Section::default();
    let mut last = FIELD_EOS;
    while let Some((kind, data)) = r.field()? {
        if kind <= last {
            return Err(MacaroonError::FieldOrder(kind));
        }
        last = kind;
        match kind {
            FIELD_LOCATION => section.location = Some(utf8(data)?),
            FIELD_IDENTIFIER => section.identifier = Some(data.to_vec()),
            FIELD_VERIFICATION_ID if allow_vid => section.verification_id = Some(data.to_vec()),
            other => return Err(MacaroonError::UnexpectedField { expected: "location/identifier", found: other }),
        }
    }
    Ok(section)
}

fn parse_v2(data: &[u8]) -> Result<Macaroon, MacaroonError> {
    let mut r = Reader::new(data);
    r.byte("version")?;

    let header = read_section(&mut r, false)?;
    let identifier = header.identifier.ok_or(MacaroonError::MissingIdentifier)?;

    let mut caveats = Vec::new();
    loop {
        if r.peek().ok_or(MacaroonError::Truncated("caveat section"))? == FIELD_EOS {
            r.byte("caveat terminator")?;
            break;
        }
        let section = read_section(&mut r, true)?;
        caveats.push(Caveat {
            identifier: section.identifier.ok_or(MacaroonError::MissingIdentifier)?,
            verification_id: section.verification_id,
            location: section.location,
        });
    }

    let (kind, sig) = r.field()?.ok_or(MacaroonError::Truncated("signature"))?;
    if kind != FIELD_SIGNATURE {
        return Err(MacaroonError::UnexpectedField { expected: "signature", found: kind });
    }
    let signature = signature(sig)?;

    Ok(Macaroon {
        version: MacaroonVersion::V2,
        location: header.location,
        identifier,
        caveats,
        signature,
        raw: Zeroizing::new(data[..r.pos].to_vec()),
    })
}

// =============================================================================
// v1 packets
// =============================================================================

fn parse_v1(data: &[u8]) -> Result<Macaroon, MacaroonError> {
    let mut location = None;
    let mut identifier = None;
    let mut caveats: Vec<Caveat> = Vec::new();
    let mut sig = None;
    let mut rest = data;

    while sig.is_none() {
        if rest.is_empty() {
            return Err(MacaroonError::Truncated("signature"));
        }
        let (key, value, tail) = v1_packet(rest)?;
        rest = tail;
        match key {
            b"location" => location = Some(utf8(value)?),
            b"identifier" => identifier = Some(value.to_vec()),
            b"cid" => caveats.push(Caveat { identifier: value.to_vec(), verification_id: None, location: None }),
            b"vid" => last_caveat(&mut caveats, "vid")?.verification_id = Some(value.to_vec()),
            b"cl" => last_caveat(&mut caveats, "cl")?.location = Some(utf8(value)?),
            b"signature" => sig = Some(signature(value)?),
            other => return Err(MacaroonError::BadPacket(format!("unknown key {:?}", String::from_utf8_lossy(other)))),
        }
    }

    Ok(Macaroon {
        version: MacaroonVersion::V1,
        location,
        identifier: identifier.ok_or(MacaroonError::MissingIdentifier)?,
        caveats,
        signature: sig.ok_or(MacaroonError::Truncated("signature"))?,
        raw: Zeroizing::new(data[..data.len() - rest.len()].to_vec()),
    })
}

fn v1_packet(data: &[u8]) -> Result<(&[u8], &[u8], &[u8]), MacaroonError> {
    if data.len() < V1_HEADER_LEN {
        return Err(MacaroonError::Truncated("packet header"));
    }
    let header = std::str::from_utf8(&data[..V1_HEADER_LEN])
        .map_err(|_| MacaroonError::BadPacket("non-hex length".into()))?;
    let len = usize::from_str_radix(header, 16)
        .map_err(|_| MacaroonError::BadPacket(format!("non-hex length {header:?}")))?;
    if len <= V1_HEADER_LEN + 1 || len > data.len() {
        return Err(MacaroonError::BadPacket(format!("length {len} out of range")));
    }
    let body = &data[V1_HEADER_LEN..len];
    let body = body
        .strip_suffix(b"\n")
        .ok_or_else(|| MacaroonError::BadPacket("missing newline".into()))?;
    let space = body
        .iter()
        .position(|b| *b == b' ')
        .ok_or_else(|| MacaroonError::BadPacket("missing key separator".into()))?;
    Ok((&body[..space], &body[space + 1..], &data[len..]))
}

fn last_caveat<'a>(caveats: &'a mut [Caveat], key: &str) -> Result<&'a mut Caveat, MacaroonError> {
    caveats
        .last_mut()
        .ok_or_else(|| MacaroonError::BadPacket(format!("{key} before any cid")))
}

fn utf8(data: &[u8]) -> Result<String, MacaroonError> {
    String::from_utf8(data.to_vec()).map_err(|_| MacaroonError::InvalidLocation)
}

fn signature(data: &[u8]) -> Result<[u8; SIGNATURE_LEN], MacaroonError> {
    data.try_into().map_err(|_| MacaroonError::SignatureLength(data.len()))
}
