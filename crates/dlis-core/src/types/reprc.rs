//! Representation codes.
//!
//! Every value in a DLIS file is tagged with a representation code, an
//! integer in `[1, 27]` naming its wire encoding. All multi-byte encodings
//! are big-endian.

use std::fmt;

/// On-wire type tag for a DLIS value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RepresentationCode {
    /// Low precision floating point, 2 bytes.
    Fshort = 1,
    /// IEEE single precision, 4 bytes.
    Fsingl = 2,
    /// Validated single precision: value + confidence, 8 bytes.
    Fsing1 = 3,
    /// Two-way validated single precision: value + two bounds, 12 bytes.
    Fsing2 = 4,
    /// IBM System/360 single precision, 4 bytes.
    Isingl = 5,
    /// VAX F single precision, 4 bytes.
    Vsingl = 6,
    /// IEEE double precision, 8 bytes.
    Fdoubl = 7,
    /// Validated double precision, 16 bytes.
    Fdoub1 = 8,
    /// Two-way validated double precision, 24 bytes.
    Fdoub2 = 9,
    /// Single precision complex, 8 bytes.
    Csingl = 10,
    /// Double precision complex, 16 bytes.
    Cdoubl = 11,
    /// Signed 1-byte integer.
    Sshort = 12,
    /// Signed 2-byte integer.
    Snorm = 13,
    /// Signed 4-byte integer.
    Slong = 14,
    /// Unsigned 1-byte integer.
    Ushort = 15,
    /// Unsigned 2-byte integer.
    Unorm = 16,
    /// Unsigned 4-byte integer.
    Ulong = 17,
    /// Variable-width unsigned integer, 1, 2 or 4 bytes.
    Uvari = 18,
    /// Short identifier: 1-byte length prefix, then that many bytes.
    Ident = 19,
    /// Long string: `uvari` length prefix, then that many bytes.
    Ascii = 20,
    /// Date and time, 8 bytes.
    Dtime = 21,
    /// Origin reference, encoded as `uvari`.
    Origin = 22,
    /// Object name: origin + copy number + identifier.
    Obname = 23,
    /// Object reference: type identifier + object name.
    Objref = 24,
    /// Attribute reference: type identifier + object name + label.
    Attref = 25,
    /// Boolean status, 1 byte.
    Status = 26,
    /// Units expression, encoded like `ident`.
    Units = 27,
}

impl RepresentationCode {
    /// Look up a code by its wire tag. Returns `None` outside `[1, 27]`.
    #[must_use]
    pub fn from_u8(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Fshort,
            2 => Self::Fsingl,
            3 => Self::Fsing1,
            4 => Self::Fsing2,
            5 => Self::Isingl,
            6 => Self::Vsingl,
            7 => Self::Fdoubl,
            8 => Self::Fdoub1,
            9 => Self::Fdoub2,
            10 => Self::Csingl,
            11 => Self::Cdoubl,
            12 => Self::Sshort,
            13 => Self::Snorm,
            14 => Self::Slong,
            15 => Self::Ushort,
            16 => Self::Unorm,
            17 => Self::Ulong,
            18 => Self::Uvari,
            19 => Self::Ident,
            20 => Self::Ascii,
            21 => Self::Dtime,
            22 => Self::Origin,
            23 => Self::Obname,
            24 => Self::Objref,
            25 => Self::Attref,
            26 => Self::Status,
            27 => Self::Units,
            _ => return None,
        })
    }

    /// Wire size in bytes, or `None` when the width is data-dependent.
    #[must_use]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Sshort | Self::Ushort | Self::Status => Some(1),
            Self::Fshort | Self::Snorm | Self::Unorm => Some(2),
            Self::Fsingl | Self::Isingl | Self::Vsingl | Self::Slong | Self::Ulong => Some(4),
            Self::Fsing1 | Self::Fdoubl | Self::Csingl | Self::Dtime => Some(8),
            Self::Fsing2 => Some(12),
            Self::Fdoub1 | Self::Cdoubl => Some(16),
            Self::Fdoub2 => Some(24),
            Self::Uvari
            | Self::Ident
            | Self::Ascii
            | Self::Origin
            | Self::Obname
            | Self::Objref
            | Self::Attref
            | Self::Units => None,
        }
    }

    /// True when the wire width depends on the data.
    #[must_use]
    pub const fn is_variable(self) -> bool {
        self.fixed_size().is_none()
    }
}

impl fmt::Display for RepresentationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fshort => "fshort",
            Self::Fsingl => "fsingl",
            Self::Fsing1 => "fsing1",
            Self::Fsing2 => "fsing2",
            Self::Isingl => "isingl",
            Self::Vsingl => "vsingl",
            Self::Fdoubl => "fdoubl",
            Self::Fdoub1 => "fdoub1",
            Self::Fdoub2 => "fdoub2",
            Self::Csingl => "csingl",
            Self::Cdoubl => "cdoubl",
            Self::Sshort => "sshort",
            Self::Snorm => "snorm",
            Self::Slong => "slong",
            Self::Ushort => "ushort",
            Self::Unorm => "unorm",
            Self::Ulong => "ulong",
            Self::Uvari => "uvari",
            Self::Ident => "ident",
            Self::Ascii => "ascii",
            Self::Dtime => "dtime",
            Self::Origin => "origin",
            Self::Obname => "obname",
            Self::Objref => "objref",
            Self::Attref => "attref",
            Self::Status => "status",
            Self::Units => "units",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_covers_all_codes() {
        for code in 1..=27u8 {
            let reprc = RepresentationCode::from_u8(code).unwrap();
            assert_eq!(reprc as u8, code);
        }
        assert!(RepresentationCode::from_u8(0).is_none());
        assert!(RepresentationCode::from_u8(28).is_none());
    }

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(RepresentationCode::Fsingl.fixed_size(), Some(4));
        assert_eq!(RepresentationCode::Dtime.fixed_size(), Some(8));
        assert_eq!(RepresentationCode::Fdoub2.fixed_size(), Some(24));
        assert!(RepresentationCode::Uvari.is_variable());
        assert!(RepresentationCode::Obname.is_variable());
    }

    #[test]
    fn test_display() {
        assert_eq!(RepresentationCode::Unorm.to_string(), "unorm");
        assert_eq!(RepresentationCode::Objref.to_string(), "objref");
    }
}
