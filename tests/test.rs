use anyhow::Result;
use wasm_info::{
    format_size, parse, report::Report, ExternalKind, ParseError, Target, WasmModuleInfo,
};
use wasmparser::{Parser, Payload, TypeRef};

const HEADER: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

fn section(id: u8, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() < 0x80);
    let mut bytes = vec![id, payload.len() as u8];
    bytes.extend_from_slice(payload);
    bytes
}

fn module(sections: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = HEADER.to_vec();
    for section in sections {
        bytes.extend_from_slice(section);
    }
    bytes
}

fn custom(name: &str, data: &[u8]) -> Vec<u8> {
    let mut payload = vec![name.len() as u8];
    payload.extend_from_slice(name.as_bytes());
    payload.extend_from_slice(data);
    section(0, &payload)
}

fn kind_name(kind: wasmparser::ExternalKind) -> &'static str {
    match kind {
        wasmparser::ExternalKind::Func => "function",
        wasmparser::ExternalKind::Table => "table",
        wasmparser::ExternalKind::Memory => "memory",
        wasmparser::ExternalKind::Global => "global",
        _ => "unknown",
    }
}

fn type_ref_name(ty: TypeRef) -> &'static str {
    match ty {
        TypeRef::Func(_) => "function",
        TypeRef::Table(_) => "table",
        TypeRef::Memory(_) => "memory",
        TypeRef::Global(_) => "global",
        _ => "unknown",
    }
}

/// Checks the import and export catalogs against wasmparser's reading of the
/// same binary.
fn assert_matches_wasmparser(bytes: &[u8], info: &WasmModuleInfo) -> Result<()> {
    let mut exports = Vec::new();
    let mut imports = Vec::new();
    for payload in Parser::new(0).parse_all(bytes) {
        match payload? {
            Payload::ExportSection(reader) => {
                for export in reader {
                    let export = export?;
                    exports.push((export.name.to_string(), kind_name(export.kind), export.index));
                }
            }
            Payload::ImportSection(reader) => {
                for import in reader {
                    let import = import?;
                    imports.push((
                        import.module.to_string(),
                        import.name.to_string(),
                        type_ref_name(import.ty),
                    ));
                }
            }
            _ => {}
        }
    }

    let ours: Vec<_> = info
        .exports
        .iter()
        .map(|e| (e.name.clone(), e.kind.as_str(), e.index))
        .collect();
    assert_eq!(ours, exports);

    let ours: Vec<_> = info
        .imports
        .iter()
        .map(|i| {
            (
                i.module.clone(),
                i.name.clone(),
                i.kind.map_or("unknown", |kind| kind.as_str()),
            )
        })
        .collect();
    assert_eq!(ours, imports);
    Ok(())
}

#[test]
fn test_empty_module() -> Result<()> {
    let bytes = wat::parse_str("(module)")?;
    let info = parse(&bytes)?;
    assert_eq!(info.function_count, 0);
    assert_eq!(info.global_count, 0);
    assert_eq!(info.table_count, 0);
    assert!(info.exports.is_empty());
    assert!(info.imports.is_empty());
    assert!(info.custom_sections.is_empty());
    assert_eq!(info.target, Target::Wasm32);
    assert_eq!(info.stack_size, 0);
    Ok(())
}

#[test]
fn test_memory_limits() -> Result<()> {
    let bytes = wat::parse_str("(module (memory 1 2))")?;
    let info = parse(&bytes)?;
    assert_eq!(info.initial_memory, 65536);
    assert_eq!(info.max_memory, 131072);
    assert_eq!(info.target, Target::Wasm32);
    Ok(())
}

#[test]
fn test_memory_without_maximum() -> Result<()> {
    let bytes = wat::parse_str("(module (memory 17))")?;
    let info = parse(&bytes)?;
    assert_eq!(info.initial_memory, 17 * 65536);
    assert_eq!(info.max_memory, 0);
    assert!(!info.has_max_memory());
    assert_eq!(info.target, Target::Wasm32);
    Ok(())
}

#[test]
fn test_large_maximum_is_wasm64() -> Result<()> {
    // limits flag 1, initial 1, maximum 65537
    let bytes = module(&[section(5, &[0x01, 0x01, 0x01, 0x81, 0x80, 0x04])]);
    let info = parse(&bytes)?;
    assert_eq!(info.target, Target::Wasm64);
    assert_eq!(info.initial_memory, 65536);
    assert_eq!(info.max_memory, u32::MAX);
    Ok(())
}

#[test]
fn test_shared_memory_flag_has_no_maximum() -> Result<()> {
    // limits flag 3, initial 1, maximum 65537
    let bytes = module(&[section(5, &[0x01, 0x03, 0x01, 0x81, 0x80, 0x04])]);
    let info = parse(&bytes)?;
    assert_eq!(info.initial_memory, 65536);
    assert_eq!(info.max_memory, 0);
    assert!(!info.has_max_memory());
    assert_eq!(info.target, Target::Wasm32);
    Ok(())
}

#[test]
fn test_export_order() -> Result<()> {
    let bytes = module(&[section(
        7,
        &[
            0x03, //
            0x03, b'r', b'u', b'n', 0x00, 0x00, //
            0x03, b'm', b'e', b'm', 0x02, 0x00, //
            0x02, b's', b'p', 0x03, 0x01,
        ],
    )]);
    let info = parse(&bytes)?;
    let exports: Vec<_> = info
        .exports
        .iter()
        .map(|e| (e.name.as_str(), e.kind.as_str(), e.index))
        .collect();
    assert_eq!(
        exports,
        vec![("run", "function", 0), ("mem", "memory", 0), ("sp", "global", 1)]
    );
    assert_matches_wasmparser(&bytes, &info)
}

#[test]
fn test_imports_and_exports_match_wasmparser() -> Result<()> {
    let bytes = wat::parse_str(
        r#"
(module
  (import "env" "log" (func (param i32)))
  (import "env" "abort" (func))
  (import "env" "table" (table 1 8 funcref))
  (import "env" "memory" (memory 1 16))
  (import "env" "base" (global i32))
  (import "wasi_snapshot_preview1" "fd_write"
    (func (param i32 i32 i32 i32) (result i32)))
  (global (mut i32) (i32.const 0))
  (global i64 (i64.const 7))
  (func (export "add") (param i32 i32) (result i32)
    local.get 0
    local.get 1
    i32.add)
  (func (export "noop"))
  (export "memory" (memory 0))
  (export "counter" (global 1))
  (export "table" (table 0))
)
"#,
    )?;
    let info = parse(&bytes)?;
    assert_eq!(info.function_count, 2);
    assert_eq!(info.global_count, 2);
    assert_eq!(info.table_count, 0);
    assert_eq!(info.imports.len(), 6);
    assert_eq!(info.imported_function_count(), 3);
    assert_eq!(info.exports.len(), 5);
    assert_eq!(info.exports_of_kind(ExternalKind::Function).count(), 2);
    // Imported memories do not populate the memory figures.
    assert_eq!(info.initial_memory, 0);
    assert_matches_wasmparser(&bytes, &info)
}

#[test]
fn test_unknown_section_is_skipped() -> Result<()> {
    let bytes = module(&[
        section(0x42, &[0xff, 0xff, 0xff, 0xff]),
        section(7, &[0x01, 0x01, b'f', 0x00, 0x00]),
    ]);
    let info = parse(&bytes)?;
    assert_eq!(info.exports.len(), 1);
    assert_eq!(info.exports[0].name, "f");
    assert_eq!(info.exports[0].kind, ExternalKind::Function);
    Ok(())
}

#[test]
fn test_code_and_data_sections_are_skipped() -> Result<()> {
    let bytes = wat::parse_str(
        r#"
(module
  (memory 1)
  (data (i32.const 0) "hello")
  (func (export "f") (result i32) i32.const 42)
)
"#,
    )?;
    let info = parse(&bytes)?;
    assert_eq!(info.function_count, 1);
    assert_eq!(info.exports.len(), 1);
    assert_eq!(info.initial_memory, 65536);
    Ok(())
}

#[test]
fn test_truncated_varint_never_succeeds() {
    // export index 300 encodes as ac 02
    let payload = [0x01, 0x01, b'f', 0x00, 0xac, 0x02];
    let full = module(&[section(7, &payload)]);
    for len in (0..full.len()).filter(|&len| len != HEADER.len()) {
        assert!(parse(&full[..len]).is_err(), "prefix of {len} bytes parsed");
    }

    // Section size agrees with the payload, the index inside is cut short.
    let cut = module(&[section(7, &payload[..5])]);
    assert!(matches!(
        parse(&cut),
        Err(ParseError::TruncatedInput { .. })
    ));
}

#[test]
fn test_overlong_varint_is_malformed() {
    let bytes = module(&[section(3, &[0x80, 0x80, 0x80, 0x80, 0x80, 0x00])]);
    assert_eq!(
        parse(&bytes),
        Err(ParseError::MalformedVarint { offset: 10 })
    );
}

#[test]
fn test_stack_size_hint() -> Result<()> {
    let bytes = module(&[custom("target_features", &50000u32.to_le_bytes())]);
    let info = parse(&bytes)?;
    assert_eq!(info.stack_size, 50000);
    assert_eq!(
        info.custom_section("target_features"),
        Some(&50000u32.to_le_bytes()[..])
    );

    let bytes = module(&[custom("target_features", &500u32.to_le_bytes())]);
    assert_eq!(parse(&bytes)?.stack_size, 0);

    let bytes = module(&[custom("linking", &(2 * 1024 * 1024u32).to_le_bytes())]);
    assert_eq!(parse(&bytes)?.stack_size, 2 * 1024 * 1024);
    Ok(())
}

#[test]
fn test_errors() {
    assert_eq!(
        parse(b"\x7fELF\x01\x00\x00\x00"),
        Err(ParseError::MagicMismatch {
            found: *b"\x7fELF"
        })
    );
    assert_eq!(
        parse(b"\0asm\x02\x00\x00\x00"),
        Err(ParseError::UnsupportedVersion(2))
    );

    let error = parse(&module(&[vec![0x07, 0x7f]])).unwrap_err();
    assert_eq!(error.offset(), 8);
    assert_eq!(
        error.to_string(),
        "Section 7 at offset 8 declares 127 bytes but only 0 remain"
    );
}

#[test]
fn test_report_and_format() -> Result<()> {
    assert_eq!(format_size(0), "0");
    assert_eq!(format_size(2048), "2 KB");
    assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
    assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3 GB");

    let bytes = wat::parse_str(
        r#"
(module
  (import "env" "log" (func (param i32)))
  (memory (export "memory") 2 4)
  (func (export "_start"))
)
"#,
    )?;
    let info = parse(&bytes)?;
    let report = Report::new(&info, bytes.len()).to_string();
    assert!(report.contains("Initial Memory: 128 KB\n"));
    assert!(report.contains("Maximum Memory: 256 KB\n"));
    assert!(report.contains("Functions: 1 (1 imported)\n"));
    assert!(report.contains("  Functions: _start\n"));
    assert!(report.contains("  Memory: memory\n"));
    Ok(())
}
