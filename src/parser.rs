pub mod decode;
pub mod error;
pub mod reader;
pub mod section;

use tracing::{debug, trace};

use crate::wasm::WasmModuleInfo;
use decode::{decode_count, decode_custom, decode_exports, decode_imports, decode_memory};
use error::ParseError;
use reader::BinaryReader;
use section::{SectionId, Sections};

pub const WASM_MAGIC: [u8; 4] = *b"\0asm";
/// Version 1 as stored on disk (`01 00 00 00`).
pub const WASM_VERSION: u32 = 1;
/// Version 1 written big-endian (`00 00 00 01`); tolerated as well.
pub const WASM_VERSION_SWAPPED: u32 = 0x0100_0000;

fn parse_header(reader: &mut BinaryReader<'_>) -> Result<(), ParseError> {
    let magic = reader.read_bytes(4)?;
    if magic != WASM_MAGIC {
        let mut found = [0; 4];
        found.copy_from_slice(magic);
        return Err(ParseError::MagicMismatch { found });
    }
    let version = reader.read_u32_le()?;
    if version != WASM_VERSION && version != WASM_VERSION_SWAPPED {
        return Err(ParseError::UnsupportedVersion(version));
    }
    Ok(())
}

/// Extracts the structural summary of a binary module. Either the whole
/// buffer decodes or the first error is returned.
pub fn parse(buf: &[u8]) -> Result<WasmModuleInfo, ParseError> {
    let mut reader = BinaryReader::new(buf);
    parse_header(&mut reader)?;

    let mut module = WasmModuleInfo::default();
    for section in Sections::new(reader) {
        let section = section?;
        let mut payload = section.payload;
        debug!(
            id = u8::from(section.id),
            offset = section.offset,
            size = payload.remaining(),
            "section"
        );
        match section.id {
            SectionId::Import => module.imports.extend(decode_imports(&mut payload)?),
            SectionId::Function => module.function_count = decode_count(&mut payload)?,
            SectionId::Table => module.table_count = decode_count(&mut payload)?,
            SectionId::Global => module.global_count = decode_count(&mut payload)?,
            SectionId::Memory => {
                if let Some(limits) = decode_memory(&mut payload)? {
                    module.initial_memory = limits.initial_bytes();
                    module.max_memory = limits.max_bytes();
                    module.target = limits.target;
                }
            }
            SectionId::Export => module.exports.extend(decode_exports(&mut payload)?),
            SectionId::Custom => {
                let custom = decode_custom(&mut payload)?;
                if let Some(stack_size) = custom.stack_size {
                    debug!(section = %custom.name, stack_size, "stack size hint");
                    module.stack_size = stack_size;
                }
                module.custom_sections.insert(custom.name, custom.data);
            }
            other => trace!(?other, "skipping section"),
        }
    }
    Ok(module)
}
