use std::fmt;

use crate::{
    format::format_size,
    wasm::{ExternalKind, WasmModuleInfo},
};

/// Human-readable analysis of a parsed module, one fact per line.
pub struct Report<'a> {
    info: &'a WasmModuleInfo,
    file_size: usize,
}

impl<'a> Report<'a> {
    pub fn new(info: &'a WasmModuleInfo, file_size: usize) -> Self {
        Report { info, file_size }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, label: &str, items: &[String]) -> fmt::Result {
    let Some(first) = items.first() else {
        return Ok(());
    };
    write!(f, "  {label}: {first}")?;
    if items.len() > 1 {
        write!(f, " (+{} more)", items.len() - 1)?;
    }
    writeln!(f)
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info;
        let size = u32::try_from(self.file_size).unwrap_or(u32::MAX);
        writeln!(f, "File Size: {} ({} bytes)", format_size(size), self.file_size)?;
        if info.initial_memory > 0 {
            writeln!(f, "Initial Memory: {}", format_size(info.initial_memory))?;
        }
        if info.has_max_memory() {
            writeln!(f, "Maximum Memory: {}", format_size(info.max_memory))?;
        }
        if info.stack_size > 0 {
            writeln!(f, "Stack Size: {}", format_size(info.stack_size))?;
        }
        writeln!(f, "Target: {}", info.target)?;

        write!(f, "Functions: {}", info.function_count)?;
        let imported = info.imported_function_count();
        if imported > 0 {
            write!(f, " ({imported} imported)")?;
        }
        writeln!(f)?;
        if info.global_count > 0 {
            writeln!(f, "Globals: {}", info.global_count)?;
        }
        if info.table_count > 0 {
            writeln!(f, "Tables: {}", info.table_count)?;
        }

        if !info.exports.is_empty() {
            let names = |kind: ExternalKind| -> Vec<String> {
                info.exports_of_kind(kind)
                    .map(|export| export.name.clone())
                    .collect()
            };
            let functions = names(ExternalKind::Function);
            let memories = names(ExternalKind::Memory);
            let other: Vec<String> = info
                .exports
                .iter()
                .filter(|export| {
                    !matches!(export.kind, ExternalKind::Function | ExternalKind::Memory)
                })
                .map(|export| format!("{} ({})", export.name, export.kind))
                .collect();
            writeln!(f, "Exports: {} total", info.exports.len())?;
            write_group(f, "Functions", &functions)?;
            if let Some(memory) = memories.first() {
                writeln!(f, "  Memory: {memory}")?;
            }
            write_group(f, "Other", &other)?;
        }

        if !info.custom_sections.is_empty() {
            writeln!(f, "Custom Sections: {} found", info.custom_sections.len())?;
        }
        Ok(())
    }
}
