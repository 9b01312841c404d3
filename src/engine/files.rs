//! Uploaded-file assignment.

use std::sync::Arc;

use tracing::trace;

use crate::error::BindError;
use crate::file::UploadedFile;
use crate::shape::{Field, FileBinding};
use crate::slot::Slot;
use crate::source::FileMap;

/// Assigns the files uploaded under `key` to a file-shaped field.
///
/// Returns `Ok(true)` when files were assigned, `Ok(false)` when the field
/// is not a file destination or nothing was uploaded under the key. A bare
/// handle is rejected whether or not anything was uploaded for it.
pub(crate) fn bind_files(
    slot: &mut Slot<'_>,
    field: &Field,
    key: &str,
    files: &FileMap,
) -> Result<bool, BindError> {
    match slot.shape().file_binding() {
        FileBinding::NotFile => return Ok(false),
        FileBinding::Bare => {
            return Err(BindError::UnsupportedFileDestination { field: field.name });
        }
        FileBinding::Supported => {}
    }

    let Some(found) = files.get(key).filter(|found| !found.is_empty()) else {
        trace!(field = field.name, key, "no files uploaded");
        return Ok(false);
    };

    match slot {
        Slot::Optional(_) => Ok(assign_single(slot, &found[0])),
        Slot::List(list) => {
            if let Some(fixed) = list.fixed_len() {
                if found.len() > fixed {
                    return Err(BindError::IndexExceedsMaximum {
                        field: key.to_string(),
                        index: found.len() - 1,
                        max: fixed.saturating_sub(1),
                    });
                }
            }
            list.reset(found.len());
            for (index, file) in found.iter().enumerate() {
                if let Some(mut element) = list.element_mut(index) {
                    assign_single(&mut element, file);
                }
            }
            trace!(field = field.name, count = found.len(), "files assigned");
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Stores one file into a handle or an optional handle.
pub(crate) fn assign_single(slot: &mut Slot<'_>, file: &Arc<UploadedFile>) -> bool {
    match slot {
        Slot::File(handle) => {
            handle.assign(file);
            true
        }
        Slot::Optional(optional)
            if optional.optional_shape().file_binding() == FileBinding::Supported =>
        {
            let mut inner = optional.materialize();
            assign_single(&mut inner, file)
        }
        _ => false,
    }
}
