//! Dynamic message instances over a [`MessageDescriptor`].
//!
//! Presence follows proto3 rules: a message field or a oneof member is
//! present once set, a repeated field is present when non-empty, and a plain
//! scalar is present when it differs from its default. Setting a scalar to
//! its default clears it, so structural equality never depends on whether a
//! default was written explicitly.

use crate::descriptor::{FieldDescriptor, Kind, MessageDescriptor, OneofDescriptor};
use crate::error::{Error, Result};
use std::borrow::Cow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    EnumNumber(i32),
    Message(DynamicMessage),
    List(Vec<Value>),
}

impl Value {
    pub fn default_for_kind(kind: &Kind) -> Value {
        match kind {
            Kind::Bool => Value::Bool(false),
            Kind::Int32 => Value::I32(0),
            Kind::Int64 => Value::I64(0),
            Kind::Uint32 => Value::U32(0),
            Kind::Uint64 => Value::U64(0),
            Kind::Double => Value::F64(0.0),
            Kind::String => Value::String(String::new()),
            Kind::Bytes => Value::Bytes(Vec::new()),
            Kind::Enum(_) => Value::EnumNumber(0),
            Kind::Message(desc) => Value::Message(DynamicMessage::new(desc.clone())),
        }
    }

    pub fn default_for_field(field: &FieldDescriptor) -> Value {
        if field.is_list() {
            Value::List(Vec::new())
        } else {
            Value::default_for_kind(&field.kind())
        }
    }

    /// Whether this (non-list) value can be stored in a field of `kind`
    pub fn is_valid_for_kind(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Value::Bool(_), Kind::Bool)
            | (Value::I32(_), Kind::Int32)
            | (Value::I64(_), Kind::Int64)
            | (Value::U32(_), Kind::Uint32)
            | (Value::U64(_), Kind::Uint64)
            | (Value::F64(_), Kind::Double)
            | (Value::String(_), Kind::String)
            | (Value::Bytes(_), Kind::Bytes)
            | (Value::EnumNumber(_), Kind::Enum(_)) => true,
            (Value::Message(msg), Kind::Message(desc)) => msg.descriptor() == desc,
            _ => false,
        }
    }

    pub fn is_valid_for_field(&self, field: &FieldDescriptor) -> bool {
        let kind = field.kind();
        match self {
            Value::List(items) if field.is_list() => {
                items.iter().all(|item| item.is_valid_for_kind(&kind))
            }
            _ if field.is_list() => false,
            _ => self.is_valid_for_kind(&kind),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum_number(&self) -> Option<i32> {
        match self {
            Value::EnumNumber(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn as_message_mut(&mut self) -> Option<&mut DynamicMessage> {
        match self {
            Value::Message(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<DynamicMessage> for Value {
    fn from(msg: DynamicMessage) -> Self {
        Value::Message(msg)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// A message instance whose shape is only known at runtime.
///
/// Equality is structural: same type and the same populated fields.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    desc: MessageDescriptor,
    fields: BTreeMap<u32, Value>,
}

impl DynamicMessage {
    pub fn new(desc: MessageDescriptor) -> Self {
        Self {
            desc,
            fields: BTreeMap::new(),
        }
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.desc
    }

    pub fn has_field(&self, field: &FieldDescriptor) -> bool {
        if field.containing_message() != &self.desc {
            return false;
        }
        match self.fields.get(&field.number()) {
            None => false,
            Some(Value::List(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }

    pub fn has_field_by_name(&self, name: &str) -> bool {
        self.desc
            .get_field_by_name(name)
            .is_some_and(|field| self.has_field(&field))
    }

    /// Value of `field`, or its default when unset
    pub fn get_field(&self, field: &FieldDescriptor) -> Cow<'_, Value> {
        match self.fields.get(&field.number()) {
            Some(value) if field.containing_message() == &self.desc => Cow::Borrowed(value),
            _ => Cow::Owned(Value::default_for_field(field)),
        }
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<Cow<'_, Value>> {
        let field = self.desc.get_field_by_name(name)?;
        Some(match self.fields.get(&field.number()) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(Value::default_for_field(&field)),
        })
    }

    pub fn set_field(&mut self, field: &FieldDescriptor, value: Value) -> Result<()> {
        self.check_owned(field)?;
        if !value.is_valid_for_field(field) {
            return Err(Error::TypeMismatch(field.full_name()));
        }

        if let Some(oneof) = field.containing_oneof() {
            self.clear_oneof_except(&oneof, field.number());
            self.fields.insert(field.number(), value);
            return Ok(());
        }

        let is_scalar = !field.is_list() && field.message_type().is_none();
        if is_scalar && value == Value::default_for_field(field) {
            self.fields.remove(&field.number());
        } else {
            self.fields.insert(field.number(), value);
        }
        Ok(())
    }

    pub fn set_field_by_name(&mut self, name: &str, value: Value) -> Result<()> {
        let field = self.field_by_name(name)?;
        self.set_field(&field, value)
    }

    /// The member of `oneof` that is currently set
    pub fn which_oneof(&self, oneof: &OneofDescriptor) -> Option<FieldDescriptor> {
        if oneof.containing_message() != &self.desc {
            return None;
        }
        oneof
            .fields()
            .find(|field| self.fields.contains_key(&field.number()))
    }

    /// The singular message stored in `field`, if set
    pub fn get_message(&self, field: &FieldDescriptor) -> Option<&DynamicMessage> {
        if field.containing_message() != &self.desc {
            return None;
        }
        self.fields
            .get(&field.number())
            .and_then(Value::as_message)
    }

    /// Mutable access to a singular message field, initializing it when unset
    pub fn get_message_mut(&mut self, field: &FieldDescriptor) -> Result<&mut DynamicMessage> {
        self.check_owned(field)?;
        let Some(desc) = field.message_type().filter(|_| !field.is_list()) else {
            return Err(Error::NotMessage(field.full_name()));
        };
        if !self.fields.contains_key(&field.number()) {
            if let Some(oneof) = field.containing_oneof() {
                self.clear_oneof_except(&oneof, field.number());
            }
        }
        self.fields
            .entry(field.number())
            .or_insert_with(|| Value::Message(DynamicMessage::new(desc)))
            .as_message_mut()
            .ok_or_else(|| Error::NotMessage(field.full_name()))
    }

    /// Elements of a repeated field (empty when unset)
    pub fn get_list(&self, field: &FieldDescriptor) -> &[Value] {
        if field.containing_message() != &self.desc {
            return &[];
        }
        self.fields
            .get(&field.number())
            .and_then(Value::as_list)
            .unwrap_or(&[])
    }

    pub fn get_list_mut(&mut self, field: &FieldDescriptor) -> Result<&mut Vec<Value>> {
        self.check_owned(field)?;
        if !field.is_list() {
            return Err(Error::NotRepeated(field.full_name()));
        }
        match self
            .fields
            .entry(field.number())
            .or_insert_with(|| Value::List(Vec::new()))
        {
            Value::List(items) => Ok(items),
            _ => Err(Error::NotRepeated(field.full_name())),
        }
    }

    /// Populated fields in field-number order
    pub fn populated_fields(&self) -> impl Iterator<Item = (FieldDescriptor, &Value)> + '_ {
        self.fields.iter().filter_map(move |(number, value)| {
            let field = self.desc.get_field(*number)?;
            self.has_field(&field).then_some((field, value))
        })
    }

    fn present(&self) -> impl Iterator<Item = (&u32, &Value)> + '_ {
        self.fields
            .iter()
            .filter(|(_, value)| !matches!(value, Value::List(items) if items.is_empty()))
    }

    fn field_by_name(&self, name: &str) -> Result<FieldDescriptor> {
        self.desc
            .get_field_by_name(name)
            .ok_or_else(|| Error::FieldNotFound {
                message: self.desc.full_name().to_string(),
                field: name.to_string(),
            })
    }

    fn check_owned(&self, field: &FieldDescriptor) -> Result<()> {
        if field.containing_message() == &self.desc {
            Ok(())
        } else {
            Err(Error::FieldNotInMessage {
                message: self.desc.full_name().to_string(),
                field: field.full_name(),
            })
        }
    }

    fn clear_oneof_except(&mut self, oneof: &OneofDescriptor, keep: u32) {
        for sibling in oneof.fields() {
            if sibling.number() != keep {
                self.fields.remove(&sibling.number());
            }
        }
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.desc == other.desc && self.present().eq(other.present())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DescriptorPool;
    use serde_json::json;

    fn pool() -> DescriptorPool {
        DescriptorPool::from_json_value(json!({
            "messages": [
                {
                    "name": "test.String",
                    "fields": [{ "name": "value", "number": 1, "type": "string" }]
                },
                {
                    "name": "test.Holder",
                    "fields": [
                        { "name": "names", "number": 1, "type": "message", "typeName": "test.String", "repeated": true },
                        { "name": "text", "number": 2, "type": "message", "typeName": "test.String", "oneof": "choice" },
                        { "name": "flag", "number": 3, "type": "bool", "oneof": "choice" },
                        { "name": "count", "number": 4, "type": "int32" }
                    ],
                    "oneofs": [{ "name": "choice" }]
                }
            ]
        }))
        .unwrap()
    }

    fn string(pool: &DescriptorPool, value: &str) -> DynamicMessage {
        let mut msg = DynamicMessage::new(pool.get_message_by_name("test.String").unwrap());
        msg.set_field_by_name("value", value.into()).unwrap();
        msg
    }

    #[test]
    fn test_scalar_default_is_not_present() {
        let pool = pool();
        let mut holder = DynamicMessage::new(pool.get_message_by_name("test.Holder").unwrap());
        let count = holder.descriptor().get_field_by_name("count").unwrap();

        holder.set_field(&count, Value::I32(0)).unwrap();
        assert!(!holder.has_field(&count));

        holder.set_field(&count, Value::I32(7)).unwrap();
        assert!(holder.has_field(&count));
        assert_eq!(*holder.get_field(&count), Value::I32(7));
    }

    #[test]
    fn test_oneof_members_are_exclusive() {
        let pool = pool();
        let mut holder = DynamicMessage::new(pool.get_message_by_name("test.Holder").unwrap());
        let desc = holder.descriptor().clone();
        let oneof = desc.get_oneof_by_name("choice").unwrap();

        holder
            .set_field_by_name("text", string(&pool, "a").into())
            .unwrap();
        assert_eq!(holder.which_oneof(&oneof).unwrap().name(), "text");

        // A oneof member set to its default still counts as set.
        holder.set_field_by_name("flag", Value::Bool(false)).unwrap();
        assert_eq!(holder.which_oneof(&oneof).unwrap().name(), "flag");
        assert!(!holder.has_field_by_name("text"));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let pool = pool();
        let mut holder = DynamicMessage::new(pool.get_message_by_name("test.Holder").unwrap());
        let err = holder
            .set_field_by_name("count", Value::String("x".into()))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));

        let err = holder
            .set_field_by_name("names", string(&pool, "x").into())
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
    }

    #[test]
    fn test_list_presence() {
        let pool = pool();
        let mut holder = DynamicMessage::new(pool.get_message_by_name("test.Holder").unwrap());
        let names = holder.descriptor().get_field_by_name("names").unwrap();

        holder.get_list_mut(&names).unwrap();
        assert!(!holder.has_field(&names));

        holder
            .get_list_mut(&names)
            .unwrap()
            .push(string(&pool, "a").into());
        assert!(holder.has_field(&names));
        assert_eq!(holder.get_list(&names).len(), 1);
    }

    #[test]
    fn test_structural_equality() {
        let pool = pool();
        assert_eq!(string(&pool, "a"), string(&pool, "a"));
        assert_ne!(string(&pool, "a"), string(&pool, "b"));
    }

    #[test]
    fn test_get_message_mut_initializes() {
        let pool = pool();
        let mut holder = DynamicMessage::new(pool.get_message_by_name("test.Holder").unwrap());
        let text = holder.descriptor().get_field_by_name("text").unwrap();
        holder
            .get_message_mut(&text)
            .unwrap()
            .set_field_by_name("value", "hello".into())
            .unwrap();
        assert_eq!(
            holder.get_message(&text).unwrap().get_field_by_name("value").unwrap().as_str(),
            Some("hello")
        );
    }
}
