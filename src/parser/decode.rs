//! Per-section decoders. Each one reads its own payload reader and returns a
//! partial result; the caller decides how to merge it.

use crate::wasm::{infer_target, pages_to_bytes, Export, ExternalKind, Import, Target};

use super::{error::ParseError, reader::BinaryReader};

/// Custom sections whose first four bytes are read as a stack size hint.
const STACK_HINT_SECTIONS: [&str; 2] = ["target_features", "linking"];
const STACK_HINT_MIN: u32 = 1024;
const STACK_HINT_MAX: u32 = 100 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLimits {
    pub initial: u32,
    pub maximum: Option<u32>,
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSection {
    pub name: String,
    pub data: Vec<u8>,
    pub stack_size: Option<u32>,
}

/// Function, table and global sections only contribute their entry count.
pub fn decode_count(reader: &mut BinaryReader<'_>) -> Result<u32, ParseError> {
    reader.read_var_u32()
}

fn skip_limits(reader: &mut BinaryReader<'_>) -> Result<(), ParseError> {
    let flags = reader.read_u8()?;
    reader.read_var_u32()?;
    if flags & 0x01 != 0 {
        reader.read_var_u32()?;
    }
    Ok(())
}

pub fn decode_imports(reader: &mut BinaryReader<'_>) -> Result<Vec<Import>, ParseError> {
    let count = reader.read_var_u32()?;
    let mut imports = Vec::new();
    for _ in 0..count {
        let module = reader.read_name()?;
        let name = reader.read_name()?;
        let kind = ExternalKind::from_byte(reader.read_u8()?);
        match kind {
            Some(ExternalKind::Function) => {
                // type index
                reader.read_var_u32()?;
            }
            Some(ExternalKind::Table) => {
                // reference type
                reader.read_u8()?;
                skip_limits(reader)?;
            }
            Some(ExternalKind::Memory) => skip_limits(reader)?,
            Some(ExternalKind::Global) => {
                // value type, mutability
                reader.read_u8()?;
                reader.read_u8()?;
            }
            Some(ExternalKind::Unknown) | None => {}
        }
        imports.push(Import { module, name, kind });
    }
    Ok(imports)
}

/// Reads the first memory entry, if any. Further entries are ignored.
pub fn decode_memory(reader: &mut BinaryReader<'_>) -> Result<Option<MemoryLimits>, ParseError> {
    let count = reader.read_var_u32()?;
    if count == 0 {
        return Ok(None);
    }
    let flags = reader.read_u8()?;
    let initial = reader.read_var_u32()?;
    // Only the plain "has maximum" flag is honoured; shared and 64-bit
    // variants are reported as if no maximum were declared.
    let maximum = if flags == 0x01 {
        Some(reader.read_var_u32()?)
    } else {
        None
    };
    Ok(Some(MemoryLimits {
        initial,
        maximum,
        target: infer_target(maximum.unwrap_or(initial)),
    }))
}

impl MemoryLimits {
    pub fn initial_bytes(&self) -> u32 {
        pages_to_bytes(self.initial)
    }

    pub fn max_bytes(&self) -> u32 {
        self.maximum.map_or(0, pages_to_bytes)
    }
}

pub fn decode_exports(reader: &mut BinaryReader<'_>) -> Result<Vec<Export>, ParseError> {
    let count = reader.read_var_u32()?;
    let mut exports = Vec::new();
    for _ in 0..count {
        let name = reader.read_name()?;
        let kind = ExternalKind::from_byte(reader.read_u8()?).unwrap_or(ExternalKind::Unknown);
        let index = reader.read_var_u32()?;
        exports.push(Export { name, kind, index });
    }
    Ok(exports)
}

pub fn decode_custom(reader: &mut BinaryReader<'_>) -> Result<CustomSection, ParseError> {
    let name = reader.read_name()?;
    let data = reader.rest().to_vec();
    let stack_size = if STACK_HINT_SECTIONS.contains(&name.as_str()) {
        stack_size_hint(&data)
    } else {
        None
    };
    Ok(CustomSection {
        name,
        data,
        stack_size,
    })
}

/// Heuristic only: neither `target_features` nor `linking` defines a stack
/// size field. A leading little-endian u32 strictly between 1 KiB and
/// 100 MiB is taken as one.
fn stack_size_hint(data: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = data.get(..4)?.try_into().ok()?;
    let value = u32::from_le_bytes(bytes);
    (value > STACK_HINT_MIN && value < STACK_HINT_MAX).then_some(value)
}
