//! The binding engine.
//!
//! A [`Walker`] binds one source's data onto one destination: it walks the
//! destination's record descriptors, resolves each field's external key,
//! projects nested data onto records, mappings and lists, and coerces the
//! remaining strings into leaves.

mod coerce;
mod collection;
mod files;
mod notation;
mod project;

use tracing::trace;

use crate::config::BinderConfig;
use crate::error::BindError;
use crate::shape::{Field, Shape};
use crate::slot::{ListSlot, Record, Slot};
use crate::source::{lookup, BindingSource, FileMap, ValueMap};

/// Binds data from a single source, reading that source's tag.
pub(crate) struct Walker<'c> {
    config: &'c BinderConfig,
    source: BindingSource,
    tag: &'c str,
}

impl<'c> Walker<'c> {
    pub(crate) fn new(config: &'c BinderConfig, source: BindingSource) -> Self {
        Self {
            config,
            source,
            tag: source.tag(config),
        }
    }

    /// Binds `data` and `files` onto the destination behind `slot`.
    ///
    /// Empty input is a no-op. Mappings take every key; records are walked
    /// field by field. Any other destination is skipped for path, query and
    /// header data and rejected for form data.
    pub(crate) fn bind(
        &self,
        slot: &mut Slot<'_>,
        data: &ValueMap,
        files: &FileMap,
    ) -> Result<(), BindError> {
        if data.is_empty() && files.is_empty() {
            return Ok(());
        }

        match slot {
            Slot::Mapping(mapping) => {
                mapping.populate(data);
                Ok(())
            }
            Slot::Record(record) => self.bind_record(&mut **record, data, files),
            other if self.source.tolerates_incompatible_destination() => {
                trace!(
                    source = %self.source,
                    shape = other.shape().name(),
                    "skipping incompatible destination"
                );
                Ok(())
            }
            other => Err(BindError::IncompatibleDestination {
                found: other.shape().name(),
            }),
        }
    }

    /// Binds projected data into a nested destination.
    ///
    /// One optional is materialized; lists are filled by index.
    fn bind_nested(
        &self,
        slot: &mut Slot<'_>,
        field: &str,
        data: &ValueMap,
        files: &FileMap,
    ) -> Result<(), BindError> {
        match slot {
            Slot::Optional(optional) => {
                let mut inner = optional.materialize();
                if let Slot::Optional(_) = inner {
                    return Err(BindError::NestedOptional);
                }
                self.bind_nested(&mut inner, field, data, files)
            }
            Slot::List(list) => self.bind_indexed(&mut **list, field, data, files),
            other => self.bind(other, data, files),
        }
    }

    fn bind_record(
        &self,
        record: &mut dyn Record,
        data: &ValueMap,
        files: &FileMap,
    ) -> Result<(), BindError> {
        for field in record.fields() {
            let key = field.tag(self.tag);

            let Some(slot) = record.field_mut(field) else {
                trace!(field = field.name, "field is not assignable");
                continue;
            };

            let mut slot = if field.embedded {
                match slot {
                    Slot::Optional(optional) => match optional.present_mut() {
                        Some(inner) => inner,
                        None => {
                            trace!(field = field.name, "skipping absent embedded record");
                            continue;
                        }
                    },
                    other => other,
                }
            } else {
                slot
            };

            if field.embedded && key.is_some() && matches!(slot, Slot::Record(_)) {
                return Err(BindError::TaggedEmbeddedField { field: field.name });
            }

            let Some(key) = key else {
                // Untagged records share the parent's keys.
                if let Slot::Record(inner) = &mut slot {
                    self.bind_record(&mut **inner, data, files)?;
                }
                continue;
            };

            self.bind_field(field, key, &mut slot, data, files)?;
        }
        Ok(())
    }

    fn bind_field(
        &self,
        field: &Field,
        key: &str,
        slot: &mut Slot<'_>,
        data: &ValueMap,
        files: &FileMap,
    ) -> Result<(), BindError> {
        if !files.is_empty() && files::bind_files(slot, field, key, files)? {
            return Ok(());
        }

        let separator = self.config.separator();
        let (shape, _) = slot.shape().unwrap_optional();
        let mut indexed = false;

        match shape {
            Shape::Record => {
                let projection =
                    project::project(key, data, files, self.config.nested_pattern(), separator);
                if !projection.is_empty() {
                    trace!(field = field.name, key, "binding nested record");
                    self.bind_nested(slot, key, &projection.values, &projection.files)?;
                }
                return Ok(());
            }
            Shape::Mapping(_) => {
                let projection =
                    project::project(key, data, files, self.config.key_pattern(), separator);
                if !projection.is_empty() {
                    trace!(field = field.name, key, "binding bracketed mapping keys");
                    self.bind_nested(slot, key, &projection.values, &projection.files)?;
                }
            }
            Shape::List { .. } => {
                let projection =
                    project::project(key, data, files, self.config.index_pattern(), separator);
                if !projection.is_empty() {
                    trace!(field = field.name, key, "binding indexed list");
                    with_list(slot, |list| {
                        self.bind_indexed(list, key, &projection.values, &projection.files)
                    })?;
                    indexed = true;
                }
            }
            _ => {}
        }

        let Some(values) = lookup(data, key) else {
            return Ok(());
        };
        if values.is_empty() {
            return Ok(());
        }

        if coerce::decode_custom(slot, values)? {
            return Ok(());
        }

        match slot {
            Slot::Optional(optional) => {
                let mut inner = optional.materialize();
                self.assign_direct(&mut inner, key, values, indexed)
            }
            other => self.assign_direct(other, key, values, indexed),
        }
    }

    fn assign_direct(
        &self,
        slot: &mut Slot<'_>,
        key: &str,
        values: &[String],
        indexed: bool,
    ) -> Result<(), BindError> {
        match slot {
            Slot::Optional(_) => Err(BindError::NestedOptional),
            Slot::List(_) if indexed => Ok(()),
            Slot::List(list) => self.bind_flat(&mut **list, key, values),
            other => coerce::coerce(other, &values[0]),
        }
    }
}

/// Runs `f` against the list behind `slot`, materializing one optional.
fn with_list(
    slot: &mut Slot<'_>,
    f: impl FnOnce(&mut dyn ListSlot) -> Result<(), BindError>,
) -> Result<(), BindError> {
    match slot {
        Slot::List(list) => f(&mut **list),
        Slot::Optional(optional) => match optional.materialize() {
            Slot::List(list) => f(list),
            Slot::Optional(_) => Err(BindError::NestedOptional),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}
