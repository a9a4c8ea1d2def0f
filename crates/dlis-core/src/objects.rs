//! Object sets: the payload of explicitly formatted logical records.
//!
//! An EFLR body is a stream of components, each opened by a descriptor
//! byte whose top three bits name its role and whose low bits flag which
//! fields follow:
//!
//! | Role      | Bits  | Field presence flags                        |
//! |-----------|-------|---------------------------------------------|
//! | absent    | `000` | none                                        |
//! | attribute | `001` | label, count, reprc, units, value           |
//! | invariant | `010` | label, count, reprc, units, value           |
//! | object    | `011` | name                                        |
//! | set       | `111` | type, name (`101`/`110` for redundant sets) |
//!
//! The set component comes first, then a template of attribute components,
//! then the objects. Each object re-walks the template positionally: a
//! field its component does not carry is inherited from the template slot
//! at the same index, and attributes the object never mentions are the
//! template's entirely.

use crate::decode::{decode_value, ident, obname, uvari};
use crate::error::{DlisError, Result};
use crate::types::{Obname, RepresentationCode, Value};

const ROLE_ABSENT: u8 = 0b000;
const ROLE_ATTRIBUTE: u8 = 0b001;
const ROLE_INVARIANT: u8 = 0b010;
const ROLE_OBJECT: u8 = 0b011;
const ROLE_RDSET: u8 = 0b101;
const ROLE_RSET: u8 = 0b110;
const ROLE_SET: u8 = 0b111;

const SET_HAS_TYPE: u8 = 1 << 4;
const SET_HAS_NAME: u8 = 1 << 3;
const OBJECT_HAS_NAME: u8 = 1 << 4;
const ATTR_HAS_LABEL: u8 = 1 << 4;
const ATTR_HAS_COUNT: u8 = 1 << 3;
const ATTR_HAS_REPRC: u8 = 1 << 2;
const ATTR_HAS_UNITS: u8 = 1 << 1;
const ATTR_HAS_VALUE: u8 = 1 << 0;

/// One attribute of an object or template slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAttribute {
    pub label: String,
    pub count: u32,
    pub reprc: RepresentationCode,
    pub units: String,
    pub value: Vec<Value>,
    /// Declared invariant in the template: the value is fixed across all
    /// objects of the set.
    pub invariant: bool,
}

impl Default for ObjectAttribute {
    fn default() -> Self {
        Self {
            label: String::new(),
            count: 1,
            reprc: RepresentationCode::Ident,
            units: String::new(),
            value: Vec::new(),
            invariant: false,
        }
    }
}

/// A named object: its name plus one attribute per template slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: Obname,
    pub attributes: Vec<ObjectAttribute>,
}

/// One parsed object set. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSet {
    pub set_type: String,
    pub name: String,
    pub template: Vec<ObjectAttribute>,
    pub objects: Vec<Object>,
}

/// Parse one reassembled, unencrypted, explicitly formatted record body
/// into an object set.
///
/// The body must be consumed exactly: running out of bytes mid-component
/// is a truncation error, and components that cannot belong where they
/// appear are unexpected-value errors.
pub fn parse_object_set(body: &[u8]) -> Result<ObjectSet> {
    let (descriptor, mut cur) = next_descriptor(body, "set component")?;
    let role = descriptor >> 5;
    if !matches!(role, ROLE_SET | ROLE_RDSET | ROLE_RSET) {
        return Err(DlisError::unexpected(format!(
            "expected a set component, got role {role:#05b}"
        )));
    }
    if descriptor & SET_HAS_TYPE == 0 {
        return Err(DlisError::inconsistent("set component without a type"));
    }
    if descriptor & SET_HAS_NAME == 0 {
        return Err(DlisError::inconsistent("set component without a name"));
    }
    let (set_type, rest) = ident(cur)?;
    let (name, rest) = ident(rest)?;
    cur = rest;

    let mut template: Vec<ObjectAttribute> = Vec::new();
    loop {
        // a set may carry no objects at all
        let Some(&descriptor) = cur.first() else {
            break;
        };
        match descriptor >> 5 {
            ROLE_ATTRIBUTE | ROLE_INVARIANT => {
                let (attribute, rest) = parse_template_attribute(descriptor, &cur[1..])?;
                template.push(attribute);
                cur = rest;
            }
            ROLE_OBJECT => break,
            role => {
                return Err(DlisError::unexpected(format!(
                    "template attribute roles can only be attribute or invariant, got {role:#05b}"
                )));
            }
        }
    }

    let mut objects = Vec::new();
    while !cur.is_empty() {
        let (descriptor, rest) = next_descriptor(cur, "object component")?;
        debug_assert_eq!(descriptor >> 5, ROLE_OBJECT);
        if descriptor & OBJECT_HAS_NAME == 0 {
            return Err(DlisError::inconsistent("object component without a name"));
        }
        let (name, rest) = obname(rest)?;
        cur = rest;

        let mut attributes = template.clone();
        let mut slot = 0usize;
        while let Some(&descriptor) = cur.first() {
            let role = descriptor >> 5;
            if role == ROLE_OBJECT {
                break;
            }
            cur = &cur[1..];
            if slot >= template.len() {
                return Err(DlisError::inconsistent(format!(
                    "object carries more attributes than the {}-slot template",
                    template.len()
                )));
            }
            match role {
                ROLE_ABSENT => {
                    // the slot stays positionally occupied, but empty
                    attributes[slot] = ObjectAttribute {
                        label: template[slot].label.clone(),
                        count: 0,
                        reprc: template[slot].reprc,
                        units: String::new(),
                        value: Vec::new(),
                        invariant: template[slot].invariant,
                    };
                }
                ROLE_ATTRIBUTE => {
                    let (attribute, rest) =
                        parse_object_attribute(descriptor, cur, &attributes[slot])?;
                    attributes[slot] = attribute;
                    cur = rest;
                }
                role => {
                    return Err(DlisError::unexpected(format!(
                        "object attribute roles can only be attribute or absent, got {role:#05b}"
                    )));
                }
            }
            slot += 1;
        }

        objects.push(Object { name, attributes });
    }

    Ok(ObjectSet {
        set_type,
        name,
        template,
        objects,
    })
}

fn next_descriptor<'a>(input: &'a [u8], what: &'static str) -> Result<(u8, &'a [u8])> {
    let Some((&descriptor, rest)) = input.split_first() else {
        return Err(DlisError::truncated(format!("{what}: empty input")));
    };
    Ok((descriptor, rest))
}

/// Parse one template attribute. Template attributes must carry a label;
/// everything else falls back to the defaults (count 1, `ident`, no units,
/// no value).
fn parse_template_attribute(descriptor: u8, input: &[u8]) -> Result<(ObjectAttribute, &[u8])> {
    if descriptor & ATTR_HAS_LABEL == 0 {
        return Err(DlisError::inconsistent("template attribute without a label"));
    }
    let base = ObjectAttribute {
        invariant: descriptor >> 5 == ROLE_INVARIANT,
        ..ObjectAttribute::default()
    };
    parse_attribute_fields(descriptor, input, base)
}

/// Parse one object attribute on top of its template slot: only the
/// fields flagged present in the descriptor are replaced.
fn parse_object_attribute<'a>(
    descriptor: u8,
    input: &'a [u8],
    base: &ObjectAttribute,
) -> Result<(ObjectAttribute, &'a [u8])> {
    parse_attribute_fields(descriptor, input, base.clone())
}

fn parse_attribute_fields(
    descriptor: u8,
    mut cur: &[u8],
    mut attribute: ObjectAttribute,
) -> Result<(ObjectAttribute, &[u8])> {
    if descriptor & ATTR_HAS_LABEL != 0 {
        let (label, rest) = ident(cur)?;
        attribute.label = label;
        cur = rest;
    }
    if descriptor & ATTR_HAS_COUNT != 0 {
        let (count, rest) = uvari(cur)?;
        attribute.count = count;
        cur = rest;
    }
    if descriptor & ATTR_HAS_REPRC != 0 {
        let Some((&code, rest)) = cur.split_first() else {
            return Err(DlisError::truncated("attribute representation code"));
        };
        attribute.reprc = RepresentationCode::from_u8(code)
            .ok_or(DlisError::InvalidRepcode { code: code.into() })?;
        cur = rest;
    }
    if descriptor & ATTR_HAS_UNITS != 0 {
        let (units, rest) = ident(cur)?;
        attribute.units = units;
        cur = rest;
    }
    if descriptor & ATTR_HAS_VALUE != 0 {
        let mut values = Vec::with_capacity(attribute.count as usize);
        for _ in 0..attribute.count {
            let (value, rest) = decode_value(attribute.reprc, cur)?;
            values.push(value);
            cur = rest;
        }
        attribute.value = values;
    }
    Ok((attribute, cur))
}
