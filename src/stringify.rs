//! Deterministic one-line rendering of any serializable record.
//!
//! `Client{id:1, name:"Client 1", created_at:{2018-01-31T20:34:30Z}}`: absent
//! optional fields are skipped, strings are quoted, sequences render as
//! `[a b]` and the temporal types render inside braces.

use std::fmt;

use serde::ser::{self, Serialize};

const BRACED_TYPES: [&str; 3] = ["Date", "Time", "Timestamp"];

pub fn stringify<T: Serialize + ?Sized>(value: &T) -> String {
    match value.serialize(Stringifier::default()) {
        Ok(rendered) => rendered.unwrap_or_default(),
        Err(err) => format!("<{err}>"),
    }
}

macro_rules! impl_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&$crate::stringify::stringify(self))
                }
            }
        )*
    };
}

pub(crate) use impl_display;

#[derive(Debug)]
pub struct StringifyError(String);

impl fmt::Display for StringifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StringifyError {}

impl ser::Error for StringifyError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

/// Renders to `Some(text)`, or `None` for an absent value.
#[derive(Debug, Clone, Copy, Default)]
struct Stringifier {
    bare_strings: bool,
}

type Rendered = Result<Option<String>, StringifyError>;

impl Stringifier {
    fn text(value: impl ToString) -> Rendered {
        Ok(Some(value.to_string()))
    }
}

impl ser::Serializer for Stringifier {
    type Ok = Option<String>;
    type Error = StringifyError;
    type SerializeSeq = SeqRenderer;
    type SerializeTuple = SeqRenderer;
    type SerializeTupleStruct = SeqRenderer;
    type SerializeTupleVariant = SeqRenderer;
    type SerializeMap = MapRenderer;
    type SerializeStruct = StructRenderer;
    type SerializeStructVariant = StructRenderer;

    fn serialize_bool(self, v: bool) -> Rendered {
        Self::text(v)
    }

    fn serialize_i8(self, v: i8) -> Rendered {
        Self::text(v)
    }

    fn serialize_i16(self, v: i16) -> Rendered {
        Self::text(v)
    }

    fn serialize_i32(self, v: i32) -> Rendered {
        Self::text(v)
    }

    fn serialize_i64(self, v: i64) -> Rendered {
        Self::text(v)
    }

    fn serialize_u8(self, v: u8) -> Rendered {
        Self::text(v)
    }

    fn serialize_u16(self, v: u16) -> Rendered {
        Self::text(v)
    }

    fn serialize_u32(self, v: u32) -> Rendered {
        Self::text(v)
    }

    fn serialize_u64(self, v: u64) -> Rendered {
        Self::text(v)
    }

    fn serialize_f32(self, v: f32) -> Rendered {
        Self::text(v)
    }

    fn serialize_f64(self, v: f64) -> Rendered {
        Self::text(v)
    }

    fn serialize_char(self, v: char) -> Rendered {
        self.serialize_str(v.encode_utf8(&mut [0; 4]))
    }

    fn serialize_str(self, v: &str) -> Rendered {
        if self.bare_strings {
            Self::text(v)
        } else {
            Ok(Some(format!("{v:?}")))
        }
    }

    fn serialize_bytes(self, v: &[u8]) -> Rendered {
        Ok(Some(format!("{v:?}")))
    }

    fn serialize_none(self) -> Rendered {
        Ok(None)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Rendered {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Rendered {
        Ok(None)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Rendered {
        Self::text(name)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Rendered {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Rendered {
        if BRACED_TYPES.contains(&name) {
            let inner = value.serialize(Stringifier { bare_strings: true })?;
            return Ok(inner.map(|inner| format!("{{{inner}}}")));
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Rendered {
        let inner = value.serialize(Stringifier::default())?.unwrap_or_default();
        Ok(Some(format!("{variant}{{{inner}}}")))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqRenderer, StringifyError> {
        Ok(SeqRenderer::new(None, len))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqRenderer, StringifyError> {
        Ok(SeqRenderer::new(None, Some(len)))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<SeqRenderer, StringifyError> {
        Ok(SeqRenderer::new(Some(name), Some(len)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqRenderer, StringifyError> {
        Ok(SeqRenderer::new(Some(variant), Some(len)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapRenderer, StringifyError> {
        Ok(MapRenderer {
            entries: Vec::with_capacity(len.unwrap_or_default()),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<StructRenderer, StringifyError> {
        Ok(StructRenderer::new(name, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<StructRenderer, StringifyError> {
        Ok(StructRenderer::new(variant, len))
    }
}

struct SeqRenderer {
    name: Option<&'static str>,
    items: Vec<String>,
}

impl SeqRenderer {
    fn new(name: Option<&'static str>, len: Option<usize>) -> Self {
        Self {
            name,
            items: Vec::with_capacity(len.unwrap_or_default()),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), StringifyError> {
        if let Some(item) = value.serialize(Stringifier::default())? {
            self.items.push(item);
        }
        Ok(())
    }

    fn finish(self) -> Rendered {
        Ok(Some(format!(
            "{}[{}]",
            self.name.unwrap_or_default(),
            self.items.join(" ")
        )))
    }
}

impl ser::SerializeSeq for SeqRenderer {
    type Ok = Option<String>;
    type Error = StringifyError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), StringifyError> {
        self.push(value)
    }

    fn end(self) -> Rendered {
        self.finish()
    }
}

impl ser::SerializeTuple for SeqRenderer {
    type Ok = Option<String>;
    type Error = StringifyError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), StringifyError> {
        self.push(value)
    }

    fn end(self) -> Rendered {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SeqRenderer {
    type Ok = Option<String>;
    type Error = StringifyError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), StringifyError> {
        self.push(value)
    }

    fn end(self) -> Rendered {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SeqRenderer {
    type Ok = Option<String>;
    type Error = StringifyError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), StringifyError> {
        self.push(value)
    }

    fn end(self) -> Rendered {
        self.finish()
    }
}

struct MapRenderer {
    entries: Vec<String>,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapRenderer {
    type Ok = Option<String>;
    type Error = StringifyError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), StringifyError> {
        self.pending_key = key.serialize(Stringifier { bare_strings: true })?;
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), StringifyError> {
        let key = self.pending_key.take().unwrap_or_default();
        if let Some(value) = value.serialize(Stringifier::default())? {
            self.entries.push(format!("{key}:{value}"));
        }
        Ok(())
    }

    fn end(self) -> Rendered {
        Ok(Some(format!("{{{}}}", self.entries.join(", "))))
    }
}

struct StructRenderer {
    name: &'static str,
    fields: Vec<String>,
}

impl StructRenderer {
    fn new(name: &'static str, len: usize) -> Self {
        Self {
            name,
            fields: Vec::with_capacity(len),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<(), StringifyError> {
        if let Some(value) = value.serialize(Stringifier::default())? {
            self.fields.push(format!("{key}:{value}"));
        }
        Ok(())
    }

    fn finish(self) -> Rendered {
        Ok(Some(format!("{}{{{}}}", self.name, self.fields.join(", "))))
    }
}

impl ser::SerializeStruct for StructRenderer {
    type Ok = Option<String>;
    type Error = StringifyError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), StringifyError> {
        self.push(key, value)
    }

    fn end(self) -> Rendered {
        self.finish()
    }
}

impl ser::SerializeStructVariant for StructRenderer {
    type Ok = Option<String>;
    type Error = StringifyError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), StringifyError> {
        self.push(key, value)
    }

    fn end(self) -> Rendered {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{Date, Timestamp};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Owner {
        id: Option<i64>,
        name: Option<String>,
    }

    #[derive(Serialize)]
    struct Record {
        id: Option<i64>,
        name: Option<String>,
        notes: Option<String>,
        is_active: Option<bool>,
        amount: Option<f64>,
        tags: Option<Vec<String>>,
        owner: Option<Owner>,
        issue_date: Option<Date>,
        created_at: Option<Timestamp>,
    }

    fn record() -> Record {
        Record {
            id: Some(1),
            name: Some("Client 1".to_string()),
            notes: None,
            is_active: Some(true),
            amount: Some(1575.86),
            tags: Some(vec!["a".to_string(), "b".to_string()]),
            owner: Some(Owner {
                id: Some(7),
                name: None,
            }),
            issue_date: Date::new(2018, 3, 30),
            created_at: Some(Timestamp::parse("2018-01-31T20:34:30Z").unwrap()),
        }
    }

    #[test]
    fn renders_present_fields_only() {
        assert_eq!(
            stringify(&record()),
            r#"Record{id:1, name:"Client 1", is_active:true, amount:1575.86, tags:["a" "b"], owner:Owner{id:7}, issue_date:{2018-03-30}, created_at:{2018-01-31T20:34:30Z}}"#
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let value = record();
        assert_eq!(stringify(&value), stringify(&value));
    }

    #[test]
    fn absent_nested_sequence_is_skipped() {
        let value = Record {
            tags: None,
            owner: None,
            ..record()
        };
        let rendered = stringify(&value);
        assert!(!rendered.contains("tags"));
        assert!(!rendered.contains("owner"));
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(stringify("say \"hi\""), r#""say \"hi\"""#);
    }
}
