//! List filling from indexed keys or from a flat value sequence.

use std::collections::BTreeSet;

use tracing::trace;

use super::coerce;
use super::files::assign_single;
use super::notation::split_first;
use super::project::project;
use super::Walker;
use crate::error::BindError;
use crate::slot::ListSlot;
use crate::source::{FileMap, ValueMap};

impl Walker<'_> {
    /// Fills a list from data keyed by index (`0`, `1`, `0.name`, ...).
    ///
    /// Indices may be sparse; gaps are filled with default elements. A key
    /// with a trailing path binds into the element at that index.
    pub(super) fn bind_indexed(
        &self,
        list: &mut dyn ListSlot,
        field: &str,
        data: &ValueMap,
        files: &FileMap,
    ) -> Result<(), BindError> {
        let separator = self.config.separator();
        let mut nested = BTreeSet::new();

        for (sub_key, values) in data {
            let (literal, rest) = split_first(sub_key, separator);
            let index = self.check_index(list, field, literal)?;
            list.grow(index + 1);
            if rest.is_some() {
                nested.insert(index);
                continue;
            }
            let Some(first) = values.first() else {
                continue;
            };
            if let Some(mut element) = list.element_mut(index) {
                coerce::assign(&mut element, first)?;
            }
        }

        for (sub_key, found) in files {
            let (literal, rest) = split_first(sub_key, separator);
            let index = self.check_index(list, field, literal)?;
            list.grow(index + 1);
            if rest.is_some() {
                nested.insert(index);
                continue;
            }
            let Some(first) = found.first() else {
                continue;
            };
            if let Some(mut element) = list.element_mut(index) {
                assign_single(&mut element, first);
            }
        }

        for index in nested {
            let prefix = index.to_string();
            let projection = project(&prefix, data, files, self.config.nested_pattern(), separator);
            if projection.is_empty() {
                continue;
            }
            trace!(field, index, "binding nested list element");
            let element_field = format!("{field}[{index}]");
            if let Some(mut element) = list.element_mut(index) {
                let (sub_values, sub_files) = (&projection.values, &projection.files);
                self.bind_nested(&mut element, &element_field, sub_values, sub_files)?;
            }
        }

        Ok(())
    }

    /// Replaces the list with one element per value, in order.
    pub(super) fn bind_flat(
        &self,
        list: &mut dyn ListSlot,
        field: &str,
        values: &[String],
    ) -> Result<(), BindError> {
        let Some(last) = values.len().checked_sub(1) else {
            return Ok(());
        };
        self.ensure_index(list, field, last)?;

        list.reset(values.len());
        for (index, value) in values.iter().enumerate() {
            if let Some(mut element) = list.element_mut(index) {
                coerce::assign(&mut element, value)?;
            }
        }
        Ok(())
    }

    fn check_index(
        &self,
        list: &dyn ListSlot,
        field: &str,
        literal: &str,
    ) -> Result<usize, BindError> {
        let index: usize = literal
            .parse()
            .map_err(|_| BindError::InvalidCollectionIndex {
                field: field.to_string(),
                index: literal.to_string(),
            })?;

        self.ensure_index(list, field, index)?;
        Ok(index)
    }

    fn ensure_index(
        &self,
        list: &dyn ListSlot,
        field: &str,
        index: usize,
    ) -> Result<(), BindError> {
        match self.max_index_for(list) {
            Some(max) if index <= max => Ok(()),
            max => Err(BindError::IndexExceedsMaximum {
                field: field.to_string(),
                index,
                max: max.unwrap_or(0),
            }),
        }
    }

    /// The largest index `list` accepts: the configured maximum, capped by
    /// the length of a fixed-size list. `None` when the list holds nothing.
    fn max_index_for(&self, list: &dyn ListSlot) -> Option<usize> {
        match list.fixed_len() {
            Some(fixed) => fixed.checked_sub(1).map(|last| self.config.max_index().min(last)),
            None => Some(self.config.max_index()),
        }
    }
}
