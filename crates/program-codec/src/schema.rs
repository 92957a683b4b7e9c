//! Runtime layout descriptors.
//!
//! The typed macros cover layouts known at compile time. Tools that load a
//! program's account and instruction tables at startup (explorers, indexers,
//! generic decoders) describe them with [`Layout`] instead and decode into
//! [`Value`]. Layouts are built once and only read afterwards, so a
//! [`Registry`] can be shared across threads freely.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::codec::Codec;
use crate::cursor::{fill_bytes, read_bytes, write_bytes};
use crate::error::{CodecError, Result};
use crate::prim::{decode_flag, decode_len, encode_len};
use crate::pubkey::{Pubkey, PUBKEY_BYTES};
use crate::record::check_discriminator;
use crate::string::{decode_fixed_str, encode_fixed_str};

// ---------------------------------------------------------------------------
// Layouts
// ---------------------------------------------------------------------------

/// Shape of an encoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    Bool,
    Pubkey,
    /// Raw bytes of a fixed length.
    Bytes(usize),
    /// u32-length-prefixed UTF-8.
    String,
    /// UTF-8 in a fixed number of bytes, zero padded.
    FixedString(usize),
    Option(Box<Layout>),
    /// u32 tag and an always-present payload slot.
    COption(Box<Layout>),
    /// u32-count-prefixed sequence.
    Vec(Box<Layout>),
    /// Fixed-count sequence, no prefix.
    Array(Box<Layout>, usize),
    Tuple(Vec<Layout>),
    Struct(StructLayout),
    Enum(EnumLayout),
}

/// A named field of a [`StructLayout`] or enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub layout: Layout,
}

impl Field {
    pub fn new(name: impl Into<String>, layout: Layout) -> Self {
        Self {
            name: name.into(),
            layout,
        }
    }
}

/// Ordered named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    name: String,
    fields: Vec<Field>,
}

impl StructLayout {
    /// Build a struct layout. Field names must be unique.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Self> {
        let name = name.into();
        check_unique_fields(&name, &fields)?;
        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn fixed_size(&self) -> Option<usize> {
        fixed_sum(self.fields.iter().map(|f| &f.layout))
    }

    fn size(&self, value: &Value) -> Result<usize> {
        let values = expect_struct(value)?;
        let mut total = 0;
        for field in &self.fields {
            total = grow(total, field.layout.size(lookup(values, &field.name)?)?)?;
        }
        Ok(total)
    }

    fn encode(&self, value: &Value, buf: &mut [u8], mut offset: usize) -> Result<usize> {
        let values = expect_struct(value)?;
        for field in &self.fields {
            offset = field.layout.encode(lookup(values, &field.name)?, buf, offset)?;
        }
        Ok(offset)
    }

    fn decode_fields(fields: &[Field], buf: &[u8], mut offset: usize) -> Result<(Vec<(String, Value)>, usize)> {
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            let (value, next) = field.layout.decode(buf, offset)?;
            values.push((field.name.clone(), value));
            offset = next;
        }
        Ok((values, offset))
    }

    fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize)> {
        let (values, offset) = Self::decode_fields(&self.fields, buf, offset)?;
        Ok((Value::Struct(values), offset))
    }
}

/// Width of the tag word in front of an enum variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagWidth {
    U8,
    U16,
    U32,
}

impl TagWidth {
    pub const fn bytes(self) -> usize {
        match self {
            TagWidth::U8 => 1,
            TagWidth::U16 => 2,
            TagWidth::U32 => 4,
        }
    }

    const fn max(self) -> u32 {
        match self {
            TagWidth::U8 => u8::MAX as u32,
            TagWidth::U16 => u16::MAX as u32,
            TagWidth::U32 => u32::MAX,
        }
    }

    fn encode(self, tag: u32, buf: &mut [u8], offset: usize) -> Result<usize> {
        // Tags are range checked when the layout is built.
        match self {
            TagWidth::U8 => (tag as u8).encode(buf, offset),
            TagWidth::U16 => (tag as u16).encode(buf, offset),
            TagWidth::U32 => tag.encode(buf, offset),
        }
    }

    fn decode(self, buf: &[u8], offset: usize) -> Result<(u32, usize)> {
        match self {
            TagWidth::U8 => u8::decode(buf, offset).map(|(t, o)| (t.into(), o)),
            TagWidth::U16 => u16::decode(buf, offset).map(|(t, o)| (t.into(), o)),
            TagWidth::U32 => u32::decode(buf, offset),
        }
    }
}

/// One variant of an [`EnumLayout`]. Unit variants have no fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub tag: u32,
    pub fields: Vec<Field>,
}

impl Variant {
    pub fn new(name: impl Into<String>, tag: u32, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            tag,
            fields,
        }
    }

    pub fn unit(name: impl Into<String>, tag: u32) -> Self {
        Self::new(name, tag, Vec::new())
    }
}

/// A tagged choice between variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLayout {
    name: String,
    tag_width: TagWidth,
    variants: Vec<Variant>,
}

impl EnumLayout {
    /// Build an enum layout with one-byte tags.
    pub fn new(name: impl Into<String>, variants: Vec<Variant>) -> Result<Self> {
        Self::with_tag_width(name, TagWidth::U8, variants)
    }

    /// Build an enum layout. Tags must be unique and fit `tag_width`;
    /// variant names must be unique; field names must be unique per variant.
    pub fn with_tag_width(
        name: impl Into<String>,
        tag_width: TagWidth,
        variants: Vec<Variant>,
    ) -> Result<Self> {
        let name = name.into();
        for (i, variant) in variants.iter().enumerate() {
            if variant.tag > tag_width.max() {
                return Err(CodecError::InvalidLayout(format!(
                    "{name}::{} tag {} does not fit {} byte(s)",
                    variant.name,
                    variant.tag,
                    tag_width.bytes()
                )));
            }
            if let Some(other) = variants[..i].iter().find(|v| v.tag == variant.tag) {
                return Err(CodecError::InvalidLayout(format!(
                    "{name}: variants {} and {} share tag {}",
                    other.name, variant.name, variant.tag
                )));
            }
            if variants[..i].iter().any(|v| v.name == variant.name) {
                return Err(CodecError::InvalidLayout(format!(
                    "{name}: duplicate variant {}",
                    variant.name
                )));
            }
            check_unique_fields(&format!("{name}::{}", variant.name), &variant.fields)?;
        }
        Ok(Self {
            name,
            tag_width,
            variants,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn fixed_size(&self) -> Option<usize> {
        let mut widths = self
            .variants
            .iter()
            .map(|v| fixed_sum(v.fields.iter().map(|f| &f.layout)));
        let first = widths.next()??;
        if widths.all(|w| w == Some(first)) {
            self.tag_width.bytes().checked_add(first)
        } else {
            None
        }
    }

    fn variant_named(&self, name: &str) -> Result<&Variant> {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| CodecError::InvalidEncoding(format!("{} has no variant {name}", self.name)))
    }

    fn size(&self, value: &Value) -> Result<usize> {
        let (name, values) = expect_enum(value)?;
        let variant = self.variant_named(name)?;
        let mut total = self.tag_width.bytes();
        for field in &variant.fields {
            total = grow(total, field.layout.size(lookup(values, &field.name)?)?)?;
        }
        Ok(total)
    }

    fn encode(&self, value: &Value, buf: &mut [u8], offset: usize) -> Result<usize> {
        let (name, values) = expect_enum(value)?;
        let variant = self.variant_named(name)?;
        let mut offset = self.tag_width.encode(variant.tag, buf, offset)?;
        for field in &variant.fields {
            offset = field.layout.encode(lookup(values, &field.name)?, buf, offset)?;
        }
        Ok(offset)
    }

    fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize)> {
        let (tag, offset) = self.tag_width.decode(buf, offset)?;
        let variant = self
            .variants
            .iter()
            .find(|v| v.tag == tag)
            .ok_or(CodecError::UnknownVariant(tag))?;
        let (fields, offset) = StructLayout::decode_fields(&variant.fields, buf, offset)?;
        Ok((
            Value::Enum {
                variant: variant.name.clone(),
                fields,
            },
            offset,
        ))
    }
}

fn check_unique_fields(owner: &str, fields: &[Field]) -> Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if fields[..i].iter().any(|f| f.name == field.name) {
            return Err(CodecError::InvalidLayout(format!(
                "{owner}: duplicate field {}",
                field.name
            )));
        }
    }
    Ok(())
}

fn grow(total: usize, more: usize) -> Result<usize> {
    total
        .checked_add(more)
        .ok_or_else(|| CodecError::InvalidLayout("encoded size overflows usize".into()))
}

/// `None` when any part is variable or the total does not fit a `usize`.
fn fixed_sum<'a>(mut layouts: impl Iterator<Item = &'a Layout>) -> Option<usize> {
    layouts.try_fold(0usize, |total, layout| total.checked_add(layout.fixed_size()?))
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A decoded value, shaped by the [`Layout`] that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    /// Any unsigned integer layout.
    UInt(u128),
    /// Any signed integer layout.
    Int(i128),
    Pubkey(Pubkey),
    Bytes(Vec<u8>),
    String(String),
    Option(Option<Box<Value>>),
    /// Vec, array and tuple members.
    List(Vec<Value>),
    /// Struct fields in layout order.
    Struct(Vec<(String, Value)>),
    Enum {
        variant: String,
        fields: Vec<(String, Value)>,
    },
}

impl Value {
    /// Build a struct value from `(name, value)` pairs.
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Value::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build an enum value from its variant name and fields.
    pub fn variant<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Value::Enum {
            variant: name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn some(value: Value) -> Self {
        Value::Option(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        Value::Option(None)
    }

    /// Field of a struct or enum value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) | Value::Enum { fields, .. } => {
                fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => u128::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_pubkey(&self) -> Option<&Pubkey> {
        match self {
            Value::Pubkey(k) => Some(k),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::UInt(_) => "unsigned integer",
            Value::Int(_) => "signed integer",
            Value::Pubkey(_) => "pubkey",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Option(_) => "option",
            Value::List(_) => "list",
            Value::Struct(_) => "struct",
            Value::Enum { .. } => "enum",
        }
    }

    /// Pretty-printed JSON rendering.
    ///
    /// Byte strings render as hex, keys as Base58, enums as an object whose
    /// `__kind` entry names the variant.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CodecError::InvalidEncoding(e.to_string()))
    }
}

struct FieldMap<'a>(&'a [(String, Value)], Option<&'a str>);

impl Serialize for FieldMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = self.0.len() + usize::from(self.1.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(kind) = self.1 {
            map.serialize_entry("__kind", kind)?;
        }
        for (k, v) in self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::UInt(v) => match u64::try_from(*v) {
                Ok(small) => serializer.serialize_u64(small),
                Err(_) => serializer.serialize_str(&v.to_string()),
            },
            Value::Int(v) => match i64::try_from(*v) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.serialize_str(&v.to_string()),
            },
            Value::Pubkey(k) => k.serialize(serializer),
            Value::Bytes(b) => serializer.serialize_str(&hex::encode(b)),
            Value::String(s) => serializer.serialize_str(s),
            Value::Option(None) => serializer.serialize_none(),
            Value::Option(Some(v)) => serializer.serialize_some(&**v),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Struct(fields) => FieldMap(fields, None).serialize(serializer),
            Value::Enum { variant, fields } => FieldMap(fields, Some(variant)).serialize(serializer),
        }
    }
}

fn mismatch(expected: &'static str, value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected,
        found: value.kind(),
    }
}

fn expect_struct(value: &Value) -> Result<&[(String, Value)]> {
    match value {
        Value::Struct(fields) => Ok(fields),
        other => Err(mismatch("struct", other)),
    }
}

fn expect_enum(value: &Value) -> Result<(&str, &[(String, Value)])> {
    match value {
        Value::Enum { variant, fields } => Ok((variant, fields)),
        other => Err(mismatch("enum", other)),
    }
}

fn expect_list<'a>(value: &'a Value, expected: &'static str) -> Result<&'a [Value]> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(mismatch(expected, other)),
    }
}

fn lookup<'a>(fields: &'a [(String, Value)], name: &str) -> Result<&'a Value> {
    fields
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
        .ok_or_else(|| CodecError::MissingField(name.to_string()))
}

fn unsigned<T: TryFrom<u128>>(value: &Value, expected: &'static str) -> Result<T> {
    let raw = match value {
        Value::UInt(v) => *v,
        Value::Int(v) => u128::try_from(*v)
            .map_err(|_| CodecError::InvalidEncoding(format!("{v} is out of range for {expected}")))?,
        other => return Err(mismatch(expected, other)),
    };
    T::try_from(raw).map_err(|_| CodecError::InvalidEncoding(format!("{raw} is out of range for {expected}")))
}

fn signed<T: TryFrom<i128>>(value: &Value, expected: &'static str) -> Result<T> {
    let raw = match value {
        Value::Int(v) => *v,
        Value::UInt(v) => i128::try_from(*v)
            .map_err(|_| CodecError::InvalidEncoding(format!("{v} is out of range for {expected}")))?,
        other => return Err(mismatch(expected, other)),
    };
    T::try_from(raw).map_err(|_| CodecError::InvalidEncoding(format!("{raw} is out of range for {expected}")))
}

// ---------------------------------------------------------------------------
// Layout transcoding
// ---------------------------------------------------------------------------

impl Layout {
    pub fn option(inner: Layout) -> Self {
        Layout::Option(Box::new(inner))
    }

    pub fn coption(inner: Layout) -> Self {
        Layout::COption(Box::new(inner))
    }

    pub fn vec(inner: Layout) -> Self {
        Layout::Vec(Box::new(inner))
    }

    pub fn array(inner: Layout, len: usize) -> Self {
        Layout::Array(Box::new(inner), len)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Layout::U8 => "u8",
            Layout::U16 => "u16",
            Layout::U32 => "u32",
            Layout::U64 => "u64",
            Layout::U128 => "u128",
            Layout::I8 => "i8",
            Layout::I16 => "i16",
            Layout::I32 => "i32",
            Layout::I64 => "i64",
            Layout::I128 => "i128",
            Layout::Bool => "bool",
            Layout::Pubkey => "pubkey",
            Layout::Bytes(_) => "bytes",
            Layout::String => "string",
            Layout::FixedString(_) => "fixed string",
            Layout::Option(_) => "option",
            Layout::COption(_) => "coption",
            Layout::Vec(_) => "vec",
            Layout::Array(..) => "array",
            Layout::Tuple(_) => "tuple",
            Layout::Struct(_) => "struct",
            Layout::Enum(_) => "enum",
        }
    }

    /// Width when every value of this layout encodes to the same size.
    ///
    /// A width too large for `usize` counts as not fixed.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Layout::U8 | Layout::I8 | Layout::Bool => Some(1),
            Layout::U16 | Layout::I16 => Some(2),
            Layout::U32 | Layout::I32 => Some(4),
            Layout::U64 | Layout::I64 => Some(8),
            Layout::U128 | Layout::I128 => Some(16),
            Layout::Pubkey => Some(PUBKEY_BYTES),
            Layout::Bytes(n) | Layout::FixedString(n) => Some(*n),
            Layout::String | Layout::Option(_) | Layout::Vec(_) => None,
            Layout::COption(inner) => inner.fixed_size().and_then(|n| n.checked_add(4)),
            Layout::Array(inner, len) => inner.fixed_size().and_then(|n| n.checked_mul(*len)),
            Layout::Tuple(members) => fixed_sum(members.iter()),
            Layout::Struct(s) => s.fixed_size(),
            Layout::Enum(e) => e.fixed_size(),
        }
    }

    fn coption_slot(inner: &Layout) -> Result<usize> {
        inner
            .fixed_size()
            .ok_or_else(|| CodecError::InvalidLayout(format!("coption of variable-size {}", inner.kind())))
    }

    /// Exact encoded width of `value`.
    pub fn size(&self, value: &Value) -> Result<usize> {
        if let Some(n) = self.fixed_size() {
            return Ok(n);
        }
        match self {
            Layout::String => match value {
                Value::String(s) => Ok(4 + s.len()),
                other => Err(mismatch("string", other)),
            },
            Layout::Option(inner) => match value {
                Value::Option(None) => Ok(1),
                Value::Option(Some(v)) => grow(1, inner.size(v)?),
                other => Err(mismatch("option", other)),
            },
            Layout::Vec(inner) => {
                let items = expect_list(value, "vec")?;
                let mut total = 4;
                for item in items {
                    total = grow(total, inner.size(item)?)?;
                }
                Ok(total)
            }
            Layout::Array(inner, _) => {
                let items = expect_list(value, "array")?;
                let mut total = 0;
                for item in items {
                    total = grow(total, inner.size(item)?)?;
                }
                Ok(total)
            }
            Layout::Tuple(members) => {
                let items = expect_list(value, "tuple")?;
                let mut total = 0;
                for (layout, item) in members.iter().zip(items) {
                    total = grow(total, layout.size(item)?)?;
                }
                Ok(total)
            }
            Layout::Struct(s) => s.size(value),
            Layout::Enum(e) => e.size(value),
            Layout::COption(inner) => Err(CodecError::InvalidLayout(format!(
                "coption of variable-size {}",
                inner.kind()
            ))),
            // Every other layout has a fixed size.
            _ => Err(mismatch(self.kind(), value)),
        }
    }

    /// Write `value` at `offset`, returning the offset just past it.
    pub fn encode(&self, value: &Value, buf: &mut [u8], offset: usize) -> Result<usize> {
        match self {
            Layout::U8 => unsigned::<u8>(value, "u8")?.encode(buf, offset),
            Layout::U16 => unsigned::<u16>(value, "u16")?.encode(buf, offset),
            Layout::U32 => unsigned::<u32>(value, "u32")?.encode(buf, offset),
            Layout::U64 => unsigned::<u64>(value, "u64")?.encode(buf, offset),
            Layout::U128 => unsigned::<u128>(value, "u128")?.encode(buf, offset),
            Layout::I8 => signed::<i8>(value, "i8")?.encode(buf, offset),
            Layout::I16 => signed::<i16>(value, "i16")?.encode(buf, offset),
            Layout::I32 => signed::<i32>(value, "i32")?.encode(buf, offset),
            Layout::I64 => signed::<i64>(value, "i64")?.encode(buf, offset),
            Layout::I128 => signed::<i128>(value, "i128")?.encode(buf, offset),
            Layout::Bool => match value {
                Value::Bool(b) => b.encode(buf, offset),
                other => Err(mismatch("bool", other)),
            },
            Layout::Pubkey => match value {
                Value::Pubkey(k) => k.encode(buf, offset),
                other => Err(mismatch("pubkey", other)),
            },
            Layout::Bytes(n) => match value {
                Value::Bytes(b) if b.len() == *n => write_bytes(buf, offset, b),
                Value::Bytes(b) => Err(CodecError::Overflow {
                    capacity: *n,
                    actual: b.len(),
                }),
                other => Err(mismatch("bytes", other)),
            },
            Layout::String => match value {
                Value::String(s) => s.encode(buf, offset),
                other => Err(mismatch("string", other)),
            },
            Layout::FixedString(n) => match value {
                Value::String(s) => encode_fixed_str(s, *n, buf, offset),
                other => Err(mismatch("fixed string", other)),
            },
            Layout::Option(inner) => match value {
                Value::Option(None) => 0u8.encode(buf, offset),
                Value::Option(Some(v)) => {
                    let offset = 1u8.encode(buf, offset)?;
                    inner.encode(v, buf, offset)
                }
                other => Err(mismatch("option", other)),
            },
            Layout::COption(inner) => {
                let slot = Self::coption_slot(inner)?;
                match value {
                    Value::Option(None) => {
                        let offset = 0u32.encode(buf, offset)?;
                        fill_bytes(buf, offset, slot, 0)
                    }
                    Value::Option(Some(v)) => {
                        let offset = 1u32.encode(buf, offset)?;
                        inner.encode(v, buf, offset)
                    }
                    other => Err(mismatch("coption", other)),
                }
            }
            Layout::Vec(inner) => {
                let items = expect_list(value, "vec")?;
                let mut offset = encode_len(items.len(), buf, offset)?;
                for item in items {
                    offset = inner.encode(item, buf, offset)?;
                }
                Ok(offset)
            }
            Layout::Array(inner, len) => {
                let items = expect_list(value, "array")?;
                if items.len() != *len {
                    return Err(CodecError::Overflow {
                        capacity: *len,
                        actual: items.len(),
                    });
                }
                let mut offset = offset;
                for item in items {
                    offset = inner.encode(item, buf, offset)?;
                }
                Ok(offset)
            }
            Layout::Tuple(members) => {
                let items = expect_list(value, "tuple")?;
                if items.len() != members.len() {
                    return Err(CodecError::Overflow {
                        capacity: members.len(),
                        actual: items.len(),
                    });
                }
                let mut offset = offset;
                for (layout, item) in members.iter().zip(items) {
                    offset = layout.encode(item, buf, offset)?;
                }
                Ok(offset)
            }
            Layout::Struct(s) => s.encode(value, buf, offset),
            Layout::Enum(e) => e.encode(value, buf, offset),
        }
    }

    /// Read a value at `offset`, returning it with the offset just past it.
    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize)> {
        fn uint<T: Codec + Into<u128>>(buf: &[u8], offset: usize) -> Result<(Value, usize)> {
            T::decode(buf, offset).map(|(v, o)| (Value::UInt(v.into()), o))
        }
        fn int<T: Codec + Into<i128>>(buf: &[u8], offset: usize) -> Result<(Value, usize)> {
            T::decode(buf, offset).map(|(v, o)| (Value::Int(v.into()), o))
        }
        fn items(inner: &Layout, buf: &[u8], mut offset: usize, count: usize) -> Result<(Value, usize)> {
            let plausible = buf.len().saturating_sub(offset) / inner.fixed_size().unwrap_or(1).max(1);
            let mut items = Vec::with_capacity(count.min(plausible));
            for _ in 0..count {
                let (item, next) = inner.decode(buf, offset)?;
                items.push(item);
                offset = next;
            }
            Ok((Value::List(items), offset))
        }

        match self {
            Layout::U8 => uint::<u8>(buf, offset),
            Layout::U16 => uint::<u16>(buf, offset),
            Layout::U32 => uint::<u32>(buf, offset),
            Layout::U64 => uint::<u64>(buf, offset),
            Layout::U128 => uint::<u128>(buf, offset),
            Layout::I8 => int::<i8>(buf, offset),
            Layout::I16 => int::<i16>(buf, offset),
            Layout::I32 => int::<i32>(buf, offset),
            Layout::I64 => int::<i64>(buf, offset),
            Layout::I128 => int::<i128>(buf, offset),
            Layout::Bool => bool::decode(buf, offset).map(|(b, o)| (Value::Bool(b), o)),
            Layout::Pubkey => Pubkey::decode(buf, offset).map(|(k, o)| (Value::Pubkey(k), o)),
            Layout::Bytes(n) => {
                let (bytes, next) = read_bytes(buf, offset, *n)?;
                Ok((Value::Bytes(bytes.to_vec()), next))
            }
            Layout::String => String::decode(buf, offset).map(|(s, o)| (Value::String(s), o)),
            Layout::FixedString(n) => {
                decode_fixed_str(buf, offset, *n).map(|(s, o)| (Value::String(s), o))
            }
            Layout::Option(inner) => {
                let (present, offset) = decode_flag(buf, offset, "option")?;
                if !present {
                    return Ok((Value::none(), offset));
                }
                let (value, offset) = inner.decode(buf, offset)?;
                Ok((Value::some(value), offset))
            }
            Layout::COption(inner) => {
                let slot = Self::coption_slot(inner)?;
                let (tag, body) = u32::decode(buf, offset)?;
                match tag {
                    0 => {
                        let (_, next) = read_bytes(buf, body, slot)?;
                        Ok((Value::none(), next))
                    }
                    1 => {
                        let (value, next) = inner.decode(buf, body)?;
                        Ok((Value::some(value), next))
                    }
                    other => Err(CodecError::InvalidEncoding(format!(
                        "coption tag {other} at offset {offset}"
                    ))),
                }
            }
            Layout::Vec(inner) => {
                let (count, offset) = decode_len(buf, offset)?;
                if count > 0 && inner.fixed_size() == Some(0) {
                    return Err(CodecError::InvalidEncoding(format!(
                        "vec of {count} zero-width {} at offset {offset}",
                        inner.kind()
                    )));
                }
                items(inner, buf, offset, count)
            }
            Layout::Array(inner, len) => items(inner, buf, offset, *len),
            Layout::Tuple(members) => {
                let mut values = Vec::with_capacity(members.len());
                let mut offset = offset;
                for layout in members {
                    let (value, next) = layout.decode(buf, offset)?;
                    values.push(value);
                    offset = next;
                }
                Ok((Value::List(values), offset))
            }
            Layout::Struct(s) => s.decode(buf, offset),
            Layout::Enum(e) => e.decode(buf, offset),
        }
    }

    /// Allocate exactly `size(value)` bytes and encode into them.
    pub fn to_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        let size = self.size(value)?;
        if isize::try_from(size).is_err() {
            return Err(CodecError::InvalidLayout(format!("{size}-byte {} cannot be allocated", self.kind())));
        }
        let mut buf = vec![0u8; size];
        self.encode(value, &mut buf, 0)?;
        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// Records and the registry
// ---------------------------------------------------------------------------

/// A struct payload framed by a constant discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    discriminator: Vec<u8>,
    payload: StructLayout,
}

impl RecordLayout {
    pub fn new(discriminator: impl Into<Vec<u8>>, payload: StructLayout) -> Result<Self> {
        let discriminator = discriminator.into();
        if discriminator.is_empty() {
            return Err(CodecError::InvalidLayout(format!(
                "{}: empty discriminator",
                payload.name()
            )));
        }
        Ok(Self {
            discriminator,
            payload,
        })
    }

    pub fn name(&self) -> &str {
        self.payload.name()
    }

    pub fn discriminator(&self) -> &[u8] {
        &self.discriminator
    }

    pub fn payload(&self) -> &StructLayout {
        &self.payload
    }

    pub fn size(&self, value: &Value) -> Result<usize> {
        Ok(self.discriminator.len() + self.payload.size(value)?)
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.size(value)?];
        let offset = write_bytes(&mut buf, 0, &self.discriminator)?;
        self.payload.encode(value, &mut buf, offset)?;
        Ok(buf)
    }

    /// Check the discriminator and decode the payload, returning the value
    /// and bytes consumed.
    pub fn decode(&self, buf: &[u8]) -> Result<(Value, usize)> {
        let offset = check_discriminator(&self.discriminator, buf, 0)?;
        self.payload.decode(buf, offset)
    }
}

/// A record decoded through a [`Registry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedRecord {
    pub name: String,
    pub value: Value,
    #[serde(skip)]
    pub consumed: usize,
}

/// Record layouts of one or more programs, keyed by discriminator.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: Vec<RecordLayout>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record layout.
    ///
    /// A discriminator equal to, or a prefix of, one already registered would
    /// make routing ambiguous and is rejected.
    pub fn register(&mut self, record: RecordLayout) -> Result<()> {
        if let Some(existing) = self.records.iter().find(|r| {
            r.discriminator.starts_with(&record.discriminator)
                || record.discriminator.starts_with(&r.discriminator)
        }) {
            return Err(CodecError::InvalidLayout(format!(
                "discriminator of {} collides with {}",
                record.name(),
                existing.name()
            )));
        }
        debug!(
            record = record.name(),
            discriminator = %hex::encode(&record.discriminator),
            "registered record layout"
        );
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RecordLayout> {
        self.records.iter().find(|r| r.name() == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Route `buf` to the record whose discriminator it starts with.
    pub fn decode(&self, buf: &[u8]) -> Result<DecodedRecord> {
        let Some(record) = self.records.iter().find(|r| buf.starts_with(&r.discriminator)) else {
            let width = self
                .records
                .iter()
                .map(|r| r.discriminator.len())
                .max()
                .unwrap_or(0)
                .min(buf.len());
            return Err(CodecError::UnknownDiscriminator(buf[..width].to_vec()));
        };
        let (value, consumed) = record.decode(buf)?;
        trace!(record = record.name(), consumed, "decoded record");
        Ok(DecodedRecord {
            name: record.name().to_string(),
            value,
            consumed,
        })
    }
}
