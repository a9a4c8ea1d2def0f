//! Decoded DLIS values.
//!
//! Each representation code decodes into its own [`Value`] variant carrying
//! the decayed payload (native float, integer, string, or composite struct).
//! Composites keep their wire fields; nothing is interpreted semantically.

use chrono::NaiveDateTime;

use super::RepresentationCode;

/// A single decoded value, tagged with the representation code it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Fshort(f32),
    Fsingl(f32),
    /// Value and confidence companion.
    Fsing1(f32, f32),
    /// Value and two bound companions.
    Fsing2(f32, f32, f32),
    Isingl(f32),
    Vsingl(f32),
    Fdoubl(f64),
    Fdoub1(f64, f64),
    Fdoub2(f64, f64, f64),
    /// Real and imaginary parts.
    Csingl(f32, f32),
    Cdoubl(f64, f64),
    Sshort(i8),
    Snorm(i16),
    Slong(i32),
    Ushort(u8),
    Unorm(u16),
    Ulong(u32),
    Uvari(u32),
    Ident(String),
    Ascii(String),
    Dtime(DateTime),
    Origin(u32),
    Obname(Obname),
    Objref(Objref),
    Attref(Attref),
    /// Kept as the raw byte: 0 is false, any other value is true.
    Status(u8),
    Units(String),
}

impl Value {
    /// The representation code this value decodes from.
    #[must_use]
    pub fn reprc(&self) -> RepresentationCode {
        match self {
            Self::Fshort(_) => RepresentationCode::Fshort,
            Self::Fsingl(_) => RepresentationCode::Fsingl,
            Self::Fsing1(..) => RepresentationCode::Fsing1,
            Self::Fsing2(..) => RepresentationCode::Fsing2,
            Self::Isingl(_) => RepresentationCode::Isingl,
            Self::Vsingl(_) => RepresentationCode::Vsingl,
            Self::Fdoubl(_) => RepresentationCode::Fdoubl,
            Self::Fdoub1(..) => RepresentationCode::Fdoub1,
            Self::Fdoub2(..) => RepresentationCode::Fdoub2,
            Self::Csingl(..) => RepresentationCode::Csingl,
            Self::Cdoubl(..) => RepresentationCode::Cdoubl,
            Self::Sshort(_) => RepresentationCode::Sshort,
            Self::Snorm(_) => RepresentationCode::Snorm,
            Self::Slong(_) => RepresentationCode::Slong,
            Self::Ushort(_) => RepresentationCode::Ushort,
            Self::Unorm(_) => RepresentationCode::Unorm,
            Self::Ulong(_) => RepresentationCode::Ulong,
            Self::Uvari(_) => RepresentationCode::Uvari,
            Self::Ident(_) => RepresentationCode::Ident,
            Self::Ascii(_) => RepresentationCode::Ascii,
            Self::Dtime(_) => RepresentationCode::Dtime,
            Self::Origin(_) => RepresentationCode::Origin,
            Self::Obname(_) => RepresentationCode::Obname,
            Self::Objref(_) => RepresentationCode::Objref,
            Self::Attref(_) => RepresentationCode::Attref,
            Self::Status(_) => RepresentationCode::Status,
            Self::Units(_) => RepresentationCode::Units,
        }
    }

    /// Status as a boolean, when this is a status value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Status(raw) => Some(*raw != 0),
            _ => None,
        }
    }
}

/// Date and time, as stored on the wire.
///
/// | Field       | Wire encoding                  |
/// |-------------|--------------------------------|
/// | year        | 1 byte, years since 1900       |
/// | tz, month   | 1 byte, high and low nibble    |
/// | day         | 1 byte                         |
/// | hour        | 1 byte                         |
/// | minute      | 1 byte                         |
/// | second      | 1 byte                         |
/// | millisecond | 2 bytes, big-endian            |
///
/// The time-zone nibble is 0 for local standard, 1 for local daylight
/// savings, 2 for GMT; other values are preserved untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    /// Full year (wire byte + 1900).
    pub year: u16,
    /// Time-zone nibble, kept raw.
    pub tz: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl DateTime {
    /// Convert to a [`chrono::NaiveDateTime`], dropping the time-zone
    /// nibble. Returns `None` for out-of-range field combinations.
    #[must_use]
    pub fn as_naive(&self) -> Option<NaiveDateTime> {
        chrono::NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), u32::from(self.day))?
            .and_hms_milli_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
                u32::from(self.millisecond),
            )
    }
}

/// Object name: origin, copy number, and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Obname {
    pub origin: u32,
    pub copy: u8,
    pub id: String,
}

/// Reference to a named object of a given type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Objref {
    pub object_type: String,
    pub name: Obname,
}

impl Objref {
    /// Byte-exact canonical key for this reference.
    ///
    /// Serialises type, id, origin, and copy number with per-field length
    /// prefixes (identifier fields use `ident` rules, the origin a minimal
    /// `uvari`), so two references compare equal exactly when their
    /// fingerprints do. Stable across processes; usable as a map key.
    #[must_use]
    pub fn fingerprint(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.object_type.len() + self.name.id.len() + 8);
        push_ident(&mut out, &self.object_type);
        push_ident(&mut out, &self.name.id);
        push_uvari(&mut out, self.name.origin);
        out.push(self.name.copy);
        out
    }
}

/// Reference to a single attribute of a named object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attref {
    pub object_type: String,
    pub name: Obname,
    pub label: String,
}

fn push_ident(out: &mut Vec<u8>, text: &str) {
    let bytes = text.as_bytes();
    let len = bytes.len().min(255);
    out.push(len as u8);
    out.extend_from_slice(&bytes[..len]);
}

fn push_uvari(out: &mut Vec<u8>, value: u32) {
    if value < 0x80 {
        out.push(value as u8);
    } else if value < 0x4000 {
        out.extend_from_slice(&((value as u16) | 0x8000).to_be_bytes());
    } else {
        out.extend_from_slice(&((value & 0x3FFF_FFFF) | 0xC000_0000).to_be_bytes());
    }
}
