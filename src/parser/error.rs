use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid magic number: {found:02x?}")]
    MagicMismatch { found: [u8; 4] },
    #[error("Unsupported version: 0x{0:08x}")]
    UnsupportedVersion(u32),
    #[error("Unexpected end of input at offset {offset}: needed {needed} bytes, {remaining} left")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("Malformed LEB128 u32 at offset {offset}")]
    MalformedVarint { offset: usize },
    #[error("Section {id} at offset {offset} declares {size} bytes but only {remaining} remain")]
    SectionOverrun {
        id: u8,
        offset: usize,
        size: usize,
        remaining: usize,
    },
}

impl ParseError {
    /// Absolute byte offset into the module where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::MagicMismatch { .. } => 0,
            ParseError::UnsupportedVersion(_) => 4,
            ParseError::TruncatedInput { offset, .. }
            | ParseError::MalformedVarint { offset }
            | ParseError::SectionOverrun { offset, .. } => *offset,
        }
    }
}
