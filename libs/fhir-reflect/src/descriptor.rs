//! Descriptor pool and the cheap handle types that point into it.
//!
//! A [`DescriptorPool`] is immutable once built. Handles ([`MessageDescriptor`],
//! [`FieldDescriptor`], ...) are an `Arc` clone plus an index, and compare and
//! hash by identity: two handles are equal only if they come from the same pool
//! and point at the same definition.

use crate::error::{Error, Result};
use crate::options::{EnumValueOptions, FieldOptions, MessageOptions, OneofOptions};
use crate::schema::{FieldType, MessageDef, SchemaFile};
use heck::ToLowerCamelCase;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone)]
pub struct DescriptorPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    messages: Vec<MessageData>,
    enums: Vec<EnumData>,
    message_names: HashMap<String, usize>,
    enum_names: HashMap<String, usize>,
}

#[derive(Debug)]
struct MessageData {
    full_name: String,
    options: MessageOptions,
    fields: Vec<FieldData>,
    oneofs: Vec<OneofData>,
    fields_by_number: HashMap<u32, usize>,
    fields_by_name: HashMap<String, usize>,
}

#[derive(Debug)]
struct FieldData {
    name: String,
    json_name: String,
    number: u32,
    repeated: bool,
    kind: KindIndex,
    oneof: Option<usize>,
    options: FieldOptions,
}

#[derive(Debug, Clone, Copy)]
enum KindIndex {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Double,
    String,
    Bytes,
    Enum(usize),
    Message(usize),
}

#[derive(Debug)]
struct OneofData {
    name: String,
    fields: Vec<usize>,
    options: OneofOptions,
}

#[derive(Debug)]
struct EnumData {
    full_name: String,
    values: Vec<EnumValueData>,
}

#[derive(Debug)]
struct EnumValueData {
    name: String,
    number: i32,
    options: EnumValueOptions,
}

impl DescriptorPool {
    /// Build a pool from one or more schema documents.
    ///
    /// Type names must be unique across all documents; field types are
    /// resolved against the union, so documents may reference each other.
    pub fn from_files(files: impl IntoIterator<Item = SchemaFile>) -> Result<Self> {
        let files: Vec<SchemaFile> = files.into_iter().collect();

        let mut message_names = HashMap::new();
        let mut enum_names = HashMap::new();
        for def in files.iter().flat_map(|f| f.messages.iter()) {
            let index = message_names.len();
            if message_names.insert(def.name.clone(), index).is_some() {
                return Err(Error::DuplicateType(def.name.clone()));
            }
        }
        for def in files.iter().flat_map(|f| f.enums.iter()) {
            if message_names.contains_key(&def.name) {
                return Err(Error::DuplicateType(def.name.clone()));
            }
            let index = enum_names.len();
            if enum_names.insert(def.name.clone(), index).is_some() {
                return Err(Error::DuplicateType(def.name.clone()));
            }
        }

        let mut messages = Vec::with_capacity(message_names.len());
        for def in files.iter().flat_map(|f| f.messages.iter()) {
            messages.push(build_message(def, &message_names, &enum_names)?);
        }

        let enums = files
            .iter()
            .flat_map(|f| f.enums.iter())
            .map(|def| EnumData {
                full_name: def.name.clone(),
                values: def
                    .values
                    .iter()
                    .map(|v| EnumValueData {
                        name: v.name.clone(),
                        number: v.number,
                        options: v.options.clone(),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            inner: Arc::new(PoolInner {
                messages,
                enums,
                message_names,
                enum_names,
            }),
        })
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let file: SchemaFile = serde_json::from_str(input)?;
        Self::from_files([file])
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let file: SchemaFile = serde_json::from_value(value)?;
        Self::from_files([file])
    }

    pub fn get_message_by_name(&self, full_name: &str) -> Option<MessageDescriptor> {
        self.inner
            .message_names
            .get(full_name)
            .map(|&index| MessageDescriptor {
                pool: self.clone(),
                index,
            })
    }

    pub fn all_messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        (0..self.inner.messages.len()).map(move |index| MessageDescriptor {
            pool: self.clone(),
            index,
        })
    }

    fn ptr(&self) -> *const PoolInner {
        Arc::as_ptr(&self.inner)
    }
}

impl PartialEq for DescriptorPool {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for DescriptorPool {}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorPool")
            .field("messages", &self.inner.messages.len())
            .field("enums", &self.inner.enums.len())
            .finish()
    }
}

fn build_message(
    def: &MessageDef,
    message_names: &HashMap<String, usize>,
    enum_names: &HashMap<String, usize>,
) -> Result<MessageData> {
    let mut oneofs: Vec<OneofData> = def
        .oneofs
        .iter()
        .map(|o| OneofData {
            name: o.name.clone(),
            fields: Vec::new(),
            options: o.options.clone(),
        })
        .collect();

    let mut fields = Vec::with_capacity(def.fields.len());
    let mut fields_by_number = HashMap::new();
    let mut fields_by_name = HashMap::new();

    for (index, field) in def.fields.iter().enumerate() {
        let full_field = format!("{}.{}", def.name, field.name);
        let duplicate = || Error::DuplicateField {
            message: def.name.clone(),
            field: field.name.clone(),
        };
        if fields_by_number.insert(field.number, index).is_some() {
            return Err(duplicate());
        }
        if fields_by_name.insert(field.name.clone(), index).is_some() {
            return Err(duplicate());
        }

        let kind = match field.field_type {
            FieldType::Bool => KindIndex::Bool,
            FieldType::Int32 => KindIndex::Int32,
            FieldType::Int64 => KindIndex::Int64,
            FieldType::Uint32 => KindIndex::Uint32,
            FieldType::Uint64 => KindIndex::Uint64,
            FieldType::Double => KindIndex::Double,
            FieldType::String => KindIndex::String,
            FieldType::Bytes => KindIndex::Bytes,
            FieldType::Enum | FieldType::Message => {
                let type_name = field.type_name.as_ref().ok_or_else(|| Error::MissingTypeName {
                    field: full_field.clone(),
                })?;
                let unresolved = || Error::UnresolvedType {
                    field: full_field.clone(),
                    type_name: type_name.clone(),
                };
                if field.field_type == FieldType::Enum {
                    KindIndex::Enum(*enum_names.get(type_name).ok_or_else(unresolved)?)
                } else {
                    KindIndex::Message(*message_names.get(type_name).ok_or_else(unresolved)?)
                }
            }
        };

        let oneof = match &field.oneof {
            Some(name) => {
                let position = oneofs.iter().position(|o| &o.name == name).ok_or_else(|| {
                    Error::UnknownOneof {
                        field: full_field.clone(),
                        oneof: name.clone(),
                    }
                })?;
                oneofs[position].fields.push(index);
                Some(position)
            }
            None => None,
        };

        fields.push(FieldData {
            name: field.name.clone(),
            json_name: field
                .json_name
                .clone()
                .unwrap_or_else(|| field.name.to_lower_camel_case()),
            number: field.number,
            repeated: field.repeated,
            kind,
            oneof,
            options: field.options.clone(),
        });
    }

    Ok(MessageData {
        full_name: def.name.clone(),
        options: def.options.clone(),
        fields,
        oneofs,
        fields_by_number,
        fields_by_name,
    })
}

fn short_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Clone)]
pub struct MessageDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl MessageDescriptor {
    fn data(&self) -> &MessageData {
        &self.pool.inner.messages[self.index]
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    pub fn full_name(&self) -> &str {
        &self.data().full_name
    }

    pub fn name(&self) -> &str {
        short_name(self.full_name())
    }

    pub fn options(&self) -> &MessageOptions {
        &self.data().options
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        (0..self.data().fields.len()).map(move |index| FieldDescriptor {
            message: self.clone(),
            index,
        })
    }

    pub fn get_field(&self, number: u32) -> Option<FieldDescriptor> {
        self.data()
            .fields_by_number
            .get(&number)
            .map(|&index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.data()
            .fields_by_name
            .get(name)
            .map(|&index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    pub fn oneofs(&self) -> impl ExactSizeIterator<Item = OneofDescriptor> + '_ {
        (0..self.data().oneofs.len()).map(move |index| OneofDescriptor {
            message: self.clone(),
            index,
        })
    }

    pub fn get_oneof_by_name(&self, name: &str) -> Option<OneofDescriptor> {
        self.data()
            .oneofs
            .iter()
            .position(|o| o.name == name)
            .map(|index| OneofDescriptor {
                message: self.clone(),
                index,
            })
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.pool == other.pool
    }
}

impl Eq for MessageDescriptor {}

impl Hash for MessageDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool.ptr().hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

// ============================================================================
// Fields
// ============================================================================

/// Value type of a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Double,
    String,
    Bytes,
    Enum(EnumDescriptor),
    Message(MessageDescriptor),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "bool"),
            Kind::Int32 => write!(f, "int32"),
            Kind::Int64 => write!(f, "int64"),
            Kind::Uint32 => write!(f, "uint32"),
            Kind::Uint64 => write!(f, "uint64"),
            Kind::Double => write!(f, "double"),
            Kind::String => write!(f, "string"),
            Kind::Bytes => write!(f, "bytes"),
            Kind::Enum(desc) => write!(f, "enum {}", desc.full_name()),
            Kind::Message(desc) => write!(f, "message {}", desc.full_name()),
        }
    }
}

#[derive(Clone)]
pub struct FieldDescriptor {
    message: MessageDescriptor,
    index: usize,
}

impl FieldDescriptor {
    fn data(&self) -> &FieldData {
        &self.message.data().fields[self.index]
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn json_name(&self) -> &str {
        &self.data().json_name
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.message.full_name(), self.name())
    }

    pub fn number(&self) -> u32 {
        self.data().number
    }

    pub fn is_list(&self) -> bool {
        self.data().repeated
    }

    pub fn kind(&self) -> Kind {
        let pool = &self.message.pool;
        match self.data().kind {
            KindIndex::Bool => Kind::Bool,
            KindIndex::Int32 => Kind::Int32,
            KindIndex::Int64 => Kind::Int64,
            KindIndex::Uint32 => Kind::Uint32,
            KindIndex::Uint64 => Kind::Uint64,
            KindIndex::Double => Kind::Double,
            KindIndex::String => Kind::String,
            KindIndex::Bytes => Kind::Bytes,
            KindIndex::Enum(index) => Kind::Enum(EnumDescriptor {
                pool: pool.clone(),
                index,
            }),
            KindIndex::Message(index) => Kind::Message(MessageDescriptor {
                pool: pool.clone(),
                index,
            }),
        }
    }

    /// Message type of the field, if it is message-typed
    pub fn message_type(&self) -> Option<MessageDescriptor> {
        match self.data().kind {
            KindIndex::Message(index) => Some(MessageDescriptor {
                pool: self.message.pool.clone(),
                index,
            }),
            _ => None,
        }
    }

    pub fn options(&self) -> &FieldOptions {
        &self.data().options
    }

    pub fn containing_message(&self) -> &MessageDescriptor {
        &self.message
    }

    pub fn containing_oneof(&self) -> Option<OneofDescriptor> {
        self.data().oneof.map(|index| OneofDescriptor {
            message: self.message.clone(),
            index,
        })
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.message == other.message
    }
}

impl Eq for FieldDescriptor {}

impl Hash for FieldDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.message.hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

// ============================================================================
// Oneofs
// ============================================================================

#[derive(Clone)]
pub struct OneofDescriptor {
    message: MessageDescriptor,
    index: usize,
}

impl OneofDescriptor {
    fn data(&self) -> &OneofData {
        &self.message.data().oneofs[self.index]
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.message.full_name(), self.name())
    }

    pub fn options(&self) -> &OneofOptions {
        &self.data().options
    }

    pub fn containing_message(&self) -> &MessageDescriptor {
        &self.message
    }

    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.data().fields.iter().map(move |&index| FieldDescriptor {
            message: self.message.clone(),
            index,
        })
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.fields().find(|f| f.name() == name)
    }
}

impl PartialEq for OneofDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.message == other.message
    }
}

impl Eq for OneofDescriptor {}

impl fmt::Debug for OneofDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OneofDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

// ============================================================================
// Enums
// ============================================================================

#[derive(Clone)]
pub struct EnumDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl EnumDescriptor {
    fn data(&self) -> &EnumData {
        &self.pool.inner.enums[self.index]
    }

    pub fn full_name(&self) -> &str {
        &self.data().full_name
    }

    pub fn name(&self) -> &str {
        short_name(self.full_name())
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = EnumValueDescriptor> + '_ {
        (0..self.data().values.len()).map(move |index| EnumValueDescriptor {
            parent: self.clone(),
            index,
        })
    }

    pub fn get_value_by_name(&self, name: &str) -> Option<EnumValueDescriptor> {
        self.values().find(|v| v.name() == name)
    }

    pub fn get_value(&self, number: i32) -> Option<EnumValueDescriptor> {
        self.values().find(|v| v.number() == number)
    }
}

impl PartialEq for EnumDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.pool == other.pool
    }
}

impl Eq for EnumDescriptor {}

impl Hash for EnumDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool.ptr().hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

#[derive(Clone)]
pub struct EnumValueDescriptor {
    parent: EnumDescriptor,
    index: usize,
}

impl EnumValueDescriptor {
    fn data(&self) -> &EnumValueData {
        &self.parent.data().values[self.index]
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn number(&self) -> i32 {
        self.data().number
    }

    pub fn options(&self) -> &EnumValueOptions {
        &self.data().options
    }
}

impl fmt::Debug for EnumValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumValueDescriptor")
            .field("name", &self.name())
            .field("number", &self.number())
            .finish()
    }
}
