/*!
 Polymorphic dispatch: reading and writing an object whose kind is given by a tag in the stream.

 An object is framed as `[u32 byte count][u32 tag]`, where the byte count is optional
 (marked with [`K_BYTE_COUNT_MASK`]). The tag is either
 - `0`, a null pointer,
 - a reference to an object already read from this buffer,
 - [`K_NEW_CLASS_TAG`] followed by a null-terminated class name, or
 - a reference to a class name already read from this buffer, marked with [`K_CLASS_MASK`].
*/

use tracing::trace;

use crate::{
    error::record::RecordError,
    models::record::Record,
    util::{
        constants::{K_BYTE_COUNT_MASK, K_CLASS_MASK, K_MAP_OFFSET, K_NEW_CLASS_TAG},
        context::Context,
        cursor::{Chunk, Cursor, Reference},
        header::check_num_bytes,
    },
};

/// Tag of a null pointer
const NULL_TAG: u32 = 0;
/// Tag of an object that refers to itself
const SELF_TAG: u32 = 1;

/// Read one object of any registered kind at the cursor
///
/// Returns [`None`] for null pointers and for references to objects this buffer never
/// defined, after skipping past them.
pub fn read_object_any(
    cursor: &mut Cursor<'_>,
    ctx: &mut Context,
) -> Result<Option<Box<dyn Record>>, RecordError> {
    let beg_index = cursor.index();
    let beg = cursor.displacement();
    let count = cursor.field::<u32>()?;

    let (num_bytes, start, tag) = if count & K_BYTE_COUNT_MASK == 0 || count == K_NEW_CLASS_TAG {
        (None, 0, count)
    } else {
        let start = cursor.displacement();
        (Some(count & !K_BYTE_COUNT_MASK), start, cursor.field::<u32>()?)
    };

    if tag & K_CLASS_MASK == 0 {
        return match tag {
            NULL_TAG => Ok(None),
            SELF_TAG => Err(RecordError::SelfReference(beg_index, ctx.source.clone())),
            _ => match cursor.refs().get(&i64::from(tag)) {
                Some(Reference::Object(object)) => {
                    trace!(offset = beg_index, key = tag, "Resolved object reference");
                    Ok(Some(object.clone()))
                }
                _ => {
                    trace!(offset = beg_index, key = tag, "Skipping unresolved object reference");
                    cursor.move_to(beg_index + num_bytes.unwrap_or(0) as usize + 4);
                    Ok(None)
                }
            },
        };
    }

    let class_name = if tag == K_NEW_CLASS_TAG {
        let class_name = cursor.classname()?;
        let key = match num_bytes {
            Some(_) => start + K_MAP_OFFSET,
            None => cursor.refs().len() as i64 + 1,
        };
        cursor
            .refs_mut()
            .insert(key, Reference::Class(class_name.clone()));
        class_name
    } else {
        let key = i64::from(tag & !K_CLASS_MASK);
        match cursor.refs().get(&key) {
            Some(Reference::Class(class_name)) => class_name.clone(),
            _ => {
                return Err(RecordError::UnresolvedType {
                    tag: format!("reference {key}"),
                    offset: beg_index,
                    source: ctx.source.clone(),
                })
            }
        }
    };

    let factory = ctx
        .registry()
        .get(&class_name)
        .ok_or_else(|| RecordError::UnresolvedType {
            tag: class_name.clone(),
            offset: beg_index,
            source: ctx.source.clone(),
        })?;

    trace!(class = %class_name, offset = beg_index, "Reading object");
    let object = factory(cursor, ctx)?;

    let key = match num_bytes {
        Some(_) => beg + K_MAP_OFFSET,
        None => cursor.refs().len() as i64 + 1,
    };
    cursor
        .refs_mut()
        .insert(key, Reference::Object(object.clone()));

    check_num_bytes(beg_index, cursor.index(), num_bytes, &class_name, ctx)?;
    Ok(Some(object))
}

/// Append `object` framed for [`read_object_any`]; [`None`] is written as a null pointer
pub fn serialize_object_any(
    out: &mut Vec<u8>,
    object: Option<&dyn Record>,
    name: Option<&str>,
) -> Result<(), RecordError> {
    let Some(object) = object else {
        out.extend_from_slice(&NULL_TAG.to_be_bytes());
        return Ok(());
    };

    let start = out.len();
    out.extend_from_slice(&K_NEW_CLASS_TAG.to_be_bytes());
    out.extend_from_slice(object.class_name().as_bytes());
    out.push(0);
    object.serialize(out, true, name, 0)?;

    let num_bytes = out.len() - start;
    let count = u32::try_from(num_bytes)
        .ok()
        .filter(|count| count & K_BYTE_COUNT_MASK == 0)
        .ok_or_else(|| RecordError::TooLarge(object.class_name().to_string(), num_bytes))?;
    out.splice(start..start, (count | K_BYTE_COUNT_MASK).to_be_bytes());
    Ok(())
}

/// Decode the object at the start of `data`
pub fn read_object(data: &[u8], ctx: &mut Context) -> Result<Option<Box<dyn Record>>, RecordError> {
    let chunk = Chunk::from(data);
    let mut cursor = Cursor::new(&chunk);
    read_object_any(&mut cursor, ctx)
}

/// Encode `object` so that [`read_object`] can decode it
pub fn write_object(object: &dyn Record) -> Result<Vec<u8>, RecordError> {
    let mut out = vec![];
    serialize_object_any(&mut out, Some(object), None)?;
    Ok(out)
}
