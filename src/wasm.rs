use std::{collections::BTreeMap, fmt};

use serde::{Serialize, Serializer};

/// Size of one linear-memory page.
pub const PAGE_SIZE: u32 = 65536;

/// Page count at the 4 GiB ceiling of 32-bit addressing.
pub const WASM32_MAX_PAGES: u32 = 65536;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalKind {
    Function,
    Table,
    Memory,
    Global,
    Unknown,
}

impl ExternalKind {
    /// Maps an import/export kind tag. Tags outside the MVP set yield `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(ExternalKind::Function),
            0x01 => Some(ExternalKind::Table),
            0x02 => Some(ExternalKind::Memory),
            0x03 => Some(ExternalKind::Global),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalKind::Function => "function",
            ExternalKind::Table => "table",
            ExternalKind::Memory => "memory",
            ExternalKind::Global => "global",
            ExternalKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ExternalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Wasm32,
    Wasm64,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Wasm32 => "wasm32",
            Target::Wasm64 => "wasm64",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guesses the address width from a page count: anything past the 32-bit
/// ceiling must be a 64-bit memory.
pub fn infer_target(pages: u32) -> Target {
    if pages > WASM32_MAX_PAGES {
        Target::Wasm64
    } else {
        Target::Wasm32
    }
}

/// Converts a page count to bytes, saturating at `u32::MAX`.
pub fn pages_to_bytes(pages: u32) -> u32 {
    pages.saturating_mul(PAGE_SIZE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    pub name: String,
    pub kind: ExternalKind,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub module: String,
    pub name: String,
    /// `None` when the kind tag was not one of the four MVP kinds.
    pub kind: Option<ExternalKind>,
}

/// Structural summary of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasmModuleInfo {
    /// Stack size hint taken from a `target_features` or `linking` custom
    /// section; 0 when none was found.
    pub stack_size: u32,
    /// Clamped to `u32::MAX` once the page count reaches 4 GiB.
    pub initial_memory: u32,
    /// 0 when the memory declares no maximum. Clamped to `u32::MAX` like
    /// `initial_memory`, so a declared maximum never reads as 0.
    pub max_memory: u32,
    pub target: Target,
    #[serde(serialize_with = "serialize_custom_sections")]
    pub custom_sections: BTreeMap<String, Vec<u8>>,
    pub exports: Vec<Export>,
    pub imports: Vec<Import>,
    pub function_count: u32,
    pub global_count: u32,
    pub table_count: u32,
}

impl WasmModuleInfo {
    pub fn imported_function_count(&self) -> usize {
        self.imports
            .iter()
            .filter(|import| import.kind == Some(ExternalKind::Function))
            .count()
    }

    pub fn exports_of_kind(&self, kind: ExternalKind) -> impl Iterator<Item = &Export> {
        self.exports.iter().filter(move |export| export.kind == kind)
    }

    pub fn custom_section(&self, name: &str) -> Option<&[u8]> {
        self.custom_sections.get(name).map(Vec::as_slice)
    }

    pub fn has_max_memory(&self) -> bool {
        self.max_memory > 0
    }
}

// Payloads are opaque, so only their lengths are worth printing.
fn serialize_custom_sections<S: Serializer>(
    sections: &BTreeMap<String, Vec<u8>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(sections.iter().map(|(name, data)| (name, data.len())))
}
