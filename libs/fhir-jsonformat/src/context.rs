use crate::config::FormatConfig;
use crate::error::{Result, SchemaError, ValidationError};
use crate::field_map::{FieldMap, FieldMapCache};
use crate::reference::ReferenceTypeTable;
use crate::registry::ConstraintRegistry;
use crate::validation;
use ferrum_reflect::{DescriptorPool, DynamicMessage, FieldDescriptor, MessageDescriptor};
use tracing::debug;

/// Owns the indexes built from one descriptor pool.
///
/// The constraint registry and reference table are built eagerly by
/// [`FormatContext::new`] and are read-only afterwards; field maps are cached
/// on first use. Share it behind an `Arc`.
#[derive(Debug)]
pub struct FormatContext {
    pool: DescriptorPool,
    config: FormatConfig,
    registry: ConstraintRegistry,
    references: ReferenceTypeTable,
    field_maps: FieldMapCache,
}

impl FormatContext {
    /// Build every index up front. Any schema defect fails construction.
    pub fn new(pool: DescriptorPool, config: FormatConfig) -> std::result::Result<Self, SchemaError> {
        let registry = ConstraintRegistry::build(&pool, &config)?;
        let references = ReferenceTypeTable::build(&pool, &config)?;
        debug!(
            container_roots = config.container_roots.len(),
            reference_types = config.reference_types.len(),
            "format context ready"
        );
        Ok(Self {
            pool,
            config,
            registry,
            references,
            field_maps: FieldMapCache::new(),
        })
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    pub fn references(&self) -> &ReferenceTypeTable {
        &self.references
    }

    pub fn field_maps(&self) -> &FieldMapCache {
        &self.field_maps
    }

    pub fn field_map_for(&self, desc: &MessageDescriptor) -> FieldMap {
        self.field_maps.field_map_for(desc)
    }

    pub fn validate_required_fields(&self, message: &DynamicMessage) -> std::result::Result<(), ValidationError> {
        validation::validate_required_fields(&self.registry, message)
    }

    pub fn validate_string(&self, value: &str) -> std::result::Result<(), ValidationError> {
        validation::validate_string_with_limit(value, self.config.max_string_bytes)
    }

    pub fn validate_primitive_value(
        &self,
        desc: &MessageDescriptor,
        value: &str,
    ) -> std::result::Result<(), ValidationError> {
        validation::validate_primitive_value(&self.registry, desc, value)
    }

    pub fn validate_reference_type(
        &self,
        field: &FieldDescriptor,
        reference: &DynamicMessage,
    ) -> std::result::Result<(), ValidationError> {
        self.references.validate_reference_type(field, reference)
    }

    pub fn validate_resource(&self, message: &DynamicMessage) -> std::result::Result<(), ValidationError> {
        validation::validate_resource(self, message)
    }

    pub fn split_if_relative_reference(&self, reference: &mut DynamicMessage) -> Result<()> {
        self.references.split_if_relative_reference(reference)
    }

    pub fn reference_to_string(&self, reference: &DynamicMessage) -> Result<Option<String>> {
        self.references.reference_to_string(reference)
    }
}
