//! Required-field index and value regexes, built once per context.

use crate::config::FormatConfig;
use crate::error::SchemaError;
use crate::schema;
use ferrum_reflect::{DescriptorPool, MessageDescriptor};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error};

#[derive(Debug, Default)]
pub struct ConstraintRegistry {
    /// Message full name -> numbers of fields marked required by FHIR
    required: HashMap<String, Vec<u32>>,
    /// Primitive full name -> anchored value regex
    regexes: HashMap<String, Regex>,
}

impl ConstraintRegistry {
    pub fn build(pool: &DescriptorPool, config: &FormatConfig) -> Result<Self, SchemaError> {
        let mut registry = Self::default();

        let mut seen = HashSet::new();
        for root_name in &config.container_roots {
            let root = lookup(pool, root_name)?;
            schema::walk_from(&root, &mut seen, &mut |node| registry.collect_required(node));
        }

        for type_name in &config.regex_primitives {
            let desc = lookup(pool, type_name)?;
            if let Some(pattern) = &desc.options().value_regex {
                let regex = Regex::new(&format!("^{pattern}$")).map_err(|source| {
                    error!(type_name = %type_name, "unparsable value regex");
                    SchemaError::InvalidRegex {
                        type_name: type_name.clone(),
                        source,
                    }
                })?;
                registry.regexes.insert(type_name.clone(), regex);
            }
        }

        debug!(
            messages = seen.len(),
            with_required = registry.required.values().filter(|f| !f.is_empty()).count(),
            regexes = registry.regexes.len(),
            "built constraint registry"
        );
        Ok(registry)
    }

    fn collect_required(&mut self, desc: &MessageDescriptor) {
        let numbers = self.required.entry(desc.full_name().to_string()).or_default();
        for field in desc.fields() {
            if field.options().is_required_by_fhir() && !numbers.contains(&field.number()) {
                numbers.push(field.number());
            }
        }
    }

    /// Anchored value regex of a primitive type
    pub fn constraint_for(&self, desc: &MessageDescriptor) -> Option<&Regex> {
        self.regexes.get(desc.full_name())
    }

    /// Required field numbers in declaration order; empty when none or unindexed
    pub fn required_fields_for(&self, desc: &MessageDescriptor) -> &[u32] {
        self.required
            .get(desc.full_name())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `desc` was reached from a container root
    pub fn is_indexed(&self, desc: &MessageDescriptor) -> bool {
        self.required.contains_key(desc.full_name())
    }
}

fn lookup(pool: &DescriptorPool, name: &str) -> Result<MessageDescriptor, SchemaError> {
    pool.get_message_by_name(name).ok_or_else(|| {
        error!(type_name = %name, "configured type missing from descriptor pool");
        SchemaError::UnknownType(name.to_string())
    })
}
