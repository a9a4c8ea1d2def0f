//! Byte primitives: one decoder per representation code.
//!
//! Every decoder takes a byte cursor and returns the decoded value together
//! with the remaining input, so calls chain naturally:
//!
//! ```
//! use dlis_core::decode;
//!
//! let wire = [0x00, 0x05, 0x03, b'L', b'A', b'S'];
//! let (length, rest) = decode::unorm(&wire).unwrap();
//! let (id, rest) = decode::ident(rest).unwrap();
//! assert_eq!(length, 5);
//! assert_eq!(id, "LAS");
//! assert!(rest.is_empty());
//! ```
//!
//! All multi-byte encodings are big-endian on the wire regardless of host
//! endianness. Running out of input is a [`DlisError::Truncated`] error.

use crate::error::{DlisError, Result};
use crate::float;
use crate::types::{Attref, DateTime, Obname, Objref, RepresentationCode, Value};

fn take<'a>(input: &'a [u8], n: usize, what: &'static str) -> Result<(&'a [u8], &'a [u8])> {
    if input.len() < n {
        return Err(DlisError::truncated(format!(
            "{what}: need {n} bytes, have {}",
            input.len()
        )));
    }
    Ok(input.split_at(n))
}

/// Decode a signed 1-byte integer.
pub fn sshort(input: &[u8]) -> Result<(i8, &[u8])> {
    let (bytes, rest) = take(input, 1, "sshort")?;
    Ok((bytes[0] as i8, rest))
}

/// Decode a big-endian signed 2-byte integer.
pub fn snorm(input: &[u8]) -> Result<(i16, &[u8])> {
    let (bytes, rest) = take(input, 2, "snorm")?;
    Ok((i16::from_be_bytes([bytes[0], bytes[1]]), rest))
}

/// Decode a big-endian signed 4-byte integer.
pub fn slong(input: &[u8]) -> Result<(i32, &[u8])> {
    let (bytes, rest) = take(input, 4, "slong")?;
    Ok((
        i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        rest,
    ))
}

/// Decode an unsigned 1-byte integer.
pub fn ushort(input: &[u8]) -> Result<(u8, &[u8])> {
    let (bytes, rest) = take(input, 1, "ushort")?;
    Ok((bytes[0], rest))
}

/// Decode a big-endian unsigned 2-byte integer.
pub fn unorm(input: &[u8]) -> Result<(u16, &[u8])> {
    let (bytes, rest) = take(input, 2, "unorm")?;
    Ok((u16::from_be_bytes([bytes[0], bytes[1]]), rest))
}

/// Decode a big-endian unsigned 4-byte integer.
pub fn ulong(input: &[u8]) -> Result<(u32, &[u8])> {
    let (bytes, rest) = take(input, 4, "ulong")?;
    Ok((
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        rest,
    ))
}

/// Decode a variable-width unsigned integer.
///
/// The leading byte's top two bits select the width: `00`/`01` one byte
/// (7-bit value), `10` two bytes (14-bit), `11` four bytes (30-bit). The
/// selector bits are cleared out of the value.
pub fn uvari(input: &[u8]) -> Result<(u32, &[u8])> {
    let first = *input
        .first()
        .ok_or_else(|| DlisError::truncated("uvari: empty input"))?;
    match first >> 6 {
        0b00 | 0b01 => Ok((u32::from(first), &input[1..])),
        0b10 => {
            let (bytes, rest) = take(input, 2, "uvari")?;
            Ok((u32::from(u16::from_be_bytes([bytes[0] & 0x3F, bytes[1]])), rest))
        }
        _ => {
            let (bytes, rest) = take(input, 4, "uvari")?;
            Ok((
                u32::from_be_bytes([bytes[0] & 0x3F, bytes[1], bytes[2], bytes[3]]),
                rest,
            ))
        }
    }
}

/// Decode a low precision float.
pub fn fshort(input: &[u8]) -> Result<(f32, &[u8])> {
    let (raw, rest) = unorm(input)?;
    Ok((float::fshort_to_ieee(raw), rest))
}

/// Decode an IEEE single precision float.
pub fn fsingl(input: &[u8]) -> Result<(f32, &[u8])> {
    let (bytes, rest) = take(input, 4, "fsingl")?;
    Ok((
        f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        rest,
    ))
}

/// Decode an IEEE double precision float.
pub fn fdoubl(input: &[u8]) -> Result<(f64, &[u8])> {
    let (bytes, rest) = take(input, 8, "fdoubl")?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    Ok((f64::from_be_bytes(buf), rest))
}

/// Decode a validated single: value plus confidence companion.
pub fn fsing1(input: &[u8]) -> Result<((f32, f32), &[u8])> {
    let (value, rest) = fsingl(input)?;
    let (a, rest) = fsingl(rest)?;
    Ok(((value, a), rest))
}

/// Decode a two-way validated single: value plus two companions.
pub fn fsing2(input: &[u8]) -> Result<((f32, f32, f32), &[u8])> {
    let (value, rest) = fsingl(input)?;
    let (a, rest) = fsingl(rest)?;
    let (b, rest) = fsingl(rest)?;
    Ok(((value, a, b), rest))
}

/// Decode a validated double.
pub fn fdoub1(input: &[u8]) -> Result<((f64, f64), &[u8])> {
    let (value, rest) = fdoubl(input)?;
    let (a, rest) = fdoubl(rest)?;
    Ok(((value, a), rest))
}

/// Decode a two-way validated double.
pub fn fdoub2(input: &[u8]) -> Result<((f64, f64, f64), &[u8])> {
    let (value, rest) = fdoubl(input)?;
    let (a, rest) = fdoubl(rest)?;
    let (b, rest) = fdoubl(rest)?;
    Ok(((value, a, b), rest))
}

/// Decode an IBM System/360 single precision float.
pub fn isingl(input: &[u8]) -> Result<(f32, &[u8])> {
    let (bytes, rest) = take(input, 4, "isingl")?;
    Ok((
        float::ibm_to_ieee([bytes[0], bytes[1], bytes[2], bytes[3]]),
        rest,
    ))
}

/// Decode a VAX F single precision float.
pub fn vsingl(input: &[u8]) -> Result<(f32, &[u8])> {
    let (bytes, rest) = take(input, 4, "vsingl")?;
    Ok((
        float::vax_to_ieee([bytes[0], bytes[1], bytes[2], bytes[3]]),
        rest,
    ))
}

/// Decode a single precision complex number as (re, im).
pub fn csingl(input: &[u8]) -> Result<((f32, f32), &[u8])> {
    let (re, rest) = fsingl(input)?;
    let (im, rest) = fsingl(rest)?;
    Ok(((re, im), rest))
}

/// Decode a double precision complex number as (re, im).
pub fn cdoubl(input: &[u8]) -> Result<((f64, f64), &[u8])> {
    let (re, rest) = fdoubl(input)?;
    let (im, rest) = fdoubl(rest)?;
    Ok(((re, im), rest))
}

/// Decode a short identifier: 1-byte length, then that many bytes.
///
/// Not null-terminated. Bytes outside UTF-8 are replaced, which the format
/// permits for identifiers; exotic encodings are a caller concern.
pub fn ident(input: &[u8]) -> Result<(String, &[u8])> {
    let (len, rest) = ushort(input)?;
    let (bytes, rest) = take(rest, usize::from(len), "ident")?;
    Ok((String::from_utf8_lossy(bytes).into_owned(), rest))
}

/// Decode a long string: `uvari` length, then that many bytes.
pub fn ascii(input: &[u8]) -> Result<(String, &[u8])> {
    let (len, rest) = uvari(input)?;
    let (bytes, rest) = take(rest, len as usize, "ascii")?;
    Ok((String::from_utf8_lossy(bytes).into_owned(), rest))
}

/// Decode a units expression; same wire shape as `ident`.
pub fn units(input: &[u8]) -> Result<(String, &[u8])> {
    let (len, rest) = take(input, 1, "units")?;
    let (bytes, rest) = take(rest, usize::from(len[0]), "units")?;
    Ok((String::from_utf8_lossy(bytes).into_owned(), rest))
}

/// Decode an 8-byte date and time.
pub fn dtime(input: &[u8]) -> Result<(DateTime, &[u8])> {
    let (bytes, rest) = take(input, 8, "dtime")?;
    let value = DateTime {
        year: 1900 + u16::from(bytes[0]),
        tz: bytes[1] >> 4,
        month: bytes[1] & 0x0F,
        day: bytes[2],
        hour: bytes[3],
        minute: bytes[4],
        second: bytes[5],
        millisecond: u16::from_be_bytes([bytes[6], bytes[7]]),
    };
    Ok((value, rest))
}

/// Decode an origin reference; same wire shape as `uvari`.
pub fn origin(input: &[u8]) -> Result<(u32, &[u8])> {
    uvari(input)
}

/// Decode an object name: origin, copy number, identifier.
pub fn obname(input: &[u8]) -> Result<(Obname, &[u8])> {
    let (origin, rest) = uvari(input)?;
    let (copy, rest) = ushort(rest)?;
    let (id, rest) = ident(rest)?;
    Ok((Obname { origin, copy, id }, rest))
}

/// Decode an object reference: type identifier, then object name.
pub fn objref(input: &[u8]) -> Result<(Objref, &[u8])> {
    let (object_type, rest) = ident(input)?;
    let (name, rest) = obname(rest)?;
    Ok((Objref { object_type, name }, rest))
}

/// Decode an attribute reference: type identifier, object name, label.
pub fn attref(input: &[u8]) -> Result<(Attref, &[u8])> {
    let (object_type, rest) = ident(input)?;
    let (name, rest) = obname(rest)?;
    let (label, rest) = ident(rest)?;
    Ok((
        Attref {
            object_type,
            name,
            label,
        },
        rest,
    ))
}

/// Decode a 1-byte status. The raw byte is preserved so callers can
/// distinguish source encodings of "true".
pub fn status(input: &[u8]) -> Result<(u8, &[u8])> {
    ushort(input)
}

/// Decode one value of the given representation code.
pub fn decode_value(reprc: RepresentationCode, input: &[u8]) -> Result<(Value, &[u8])> {
    use RepresentationCode as R;
    Ok(match reprc {
        R::Fshort => {
            let (v, rest) = fshort(input)?;
            (Value::Fshort(v), rest)
        }
        R::Fsingl => {
            let (v, rest) = fsingl(input)?;
            (Value::Fsingl(v), rest)
        }
        R::Fsing1 => {
            let ((v, a), rest) = fsing1(input)?;
            (Value::Fsing1(v, a), rest)
        }
        R::Fsing2 => {
            let ((v, a, b), rest) = fsing2(input)?;
            (Value::Fsing2(v, a, b), rest)
        }
        R::Isingl => {
            let (v, rest) = isingl(input)?;
            (Value::Isingl(v), rest)
        }
        R::Vsingl => {
            let (v, rest) = vsingl(input)?;
            (Value::Vsingl(v), rest)
        }
        R::Fdoubl => {
            let (v, rest) = fdoubl(input)?;
            (Value::Fdoubl(v), rest)
        }
        R::Fdoub1 => {
            let ((v, a), rest) = fdoub1(input)?;
            (Value::Fdoub1(v, a), rest)
        }
        R::Fdoub2 => {
            let ((v, a, b), rest) = fdoub2(input)?;
            (Value::Fdoub2(v, a, b), rest)
        }
        R::Csingl => {
            let ((re, im), rest) = csingl(input)?;
            (Value::Csingl(re, im), rest)
        }
        R::Cdoubl => {
            let ((re, im), rest) = cdoubl(input)?;
            (Value::Cdoubl(re, im), rest)
        }
        R::Sshort => {
            let (v, rest) = sshort(input)?;
            (Value::Sshort(v), rest)
        }
        R::Snorm => {
            let (v, rest) = snorm(input)?;
            (Value::Snorm(v), rest)
        }
        R::Slong => {
            let (v, rest) = slong(input)?;
            (Value::Slong(v), rest)
        }
        R::Ushort => {
            let (v, rest) = ushort(input)?;
            (Value::Ushort(v), rest)
        }
        R::Unorm => {
            let (v, rest) = unorm(input)?;
            (Value::Unorm(v), rest)
        }
        R::Ulong => {
            let (v, rest) = ulong(input)?;
            (Value::Ulong(v), rest)
        }
        R::Uvari => {
            let (v, rest) = uvari(input)?;
            (Value::Uvari(v), rest)
        }
        R::Ident => {
            let (v, rest) = ident(input)?;
            (Value::Ident(v), rest)
        }
        R::Ascii => {
            let (v, rest) = ascii(input)?;
            (Value::Ascii(v), rest)
        }
        R::Dtime => {
            let (v, rest) = dtime(input)?;
            (Value::Dtime(v), rest)
        }
        R::Origin => {
            let (v, rest) = origin(input)?;
            (Value::Origin(v), rest)
        }
        R::Obname => {
            let (v, rest) = obname(input)?;
            (Value::Obname(v), rest)
        }
        R::Objref => {
            let (v, rest) = objref(input)?;
            (Value::Objref(v), rest)
        }
        R::Attref => {
            let (v, rest) = attref(input)?;
            (Value::Attref(v), rest)
        }
        R::Status => {
            let (v, rest) = status(input)?;
            (Value::Status(v), rest)
        }
        R::Units => {
            let (v, rest) = units(input)?;
            (Value::Units(v), rest)
        }
    })
}

/// Shape information for a pack format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSpec {
    /// Total wire size, known only when every field has fixed width.
    pub src_size: Option<usize>,
    /// Number of fields in the format.
    pub fields: usize,
    /// True when any field has data-dependent width.
    pub variable: bool,
}

fn code_for(ch: char) -> Option<RepresentationCode> {
    use RepresentationCode as R;
    Some(match ch {
        'r' => R::Fshort,
        'f' => R::Fsingl,
        'b' => R::Fsing1,
        'B' => R::Fsing2,
        'x' => R::Isingl,
        'V' => R::Vsingl,
        'F' => R::Fdoubl,
        'z' => R::Fdoub1,
        'Z' => R::Fdoub2,
        'c' => R::Csingl,
        'C' => R::Cdoubl,
        'd' => R::Sshort,
        'D' => R::Snorm,
        'i' => R::Slong,
        'u' => R::Ushort,
        'U' => R::Unorm,
        'l' => R::Ulong,
        'L' => R::Uvari,
        's' => R::Ident,
        'S' => R::Ascii,
        'j' => R::Dtime,
        'J' => R::Origin,
        'o' => R::Obname,
        'O' => R::Objref,
        'A' => R::Attref,
        'q' => R::Status,
        'Q' => R::Units,
        _ => return None,
    })
}

/// Inspect a pack format string: one character per field.
///
/// Fails with an invalid-format error on any unknown character. The
/// reported source size is `None` as soon as one field is variable-width
/// (strings, `uvari`, object names).
pub fn pack_spec(fmt: &str) -> Result<PackSpec> {
    let mut src_size = 0usize;
    let mut fields = 0usize;
    let mut variable = false;
    for ch in fmt.chars() {
        let reprc = code_for(ch).ok_or(DlisError::InvalidFormat { ch })?;
        fields += 1;
        match reprc.fixed_size() {
            Some(n) => src_size += n,
            None => variable = true,
        }
    }
    Ok(PackSpec {
        src_size: if variable { None } else { Some(src_size) },
        fields,
        variable,
    })
}

/// Decode a packed source buffer according to a format string, one value
/// per format character, returning the values and the unconsumed input.
pub fn packf<'a>(fmt: &str, src: &'a [u8]) -> Result<(Vec<Value>, &'a [u8])> {
    let mut values = Vec::with_capacity(fmt.len());
    let mut cur = src;
    for ch in fmt.chars() {
        let reprc = code_for(ch).ok_or(DlisError::InvalidFormat { ch })?;
        let (value, rest) = decode_value(reprc, cur)?;
        values.push(value);
        cur = rest;
    }
    Ok((values, cur))
}
