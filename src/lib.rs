pub mod format;
pub mod parser;
pub mod report;
pub mod wasm;

pub use format::format_size;
pub use parser::{error::ParseError, parse};
pub use wasm::{infer_target, Export, ExternalKind, Import, Target, WasmModuleInfo};
