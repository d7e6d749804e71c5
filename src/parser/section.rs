use super::{error::ParseError, reader::BinaryReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionId {
    Custom,
    Type,
    Import,
    Function,
    Table,
    Memory,
    Global,
    Export,
    Start,
    Element,
    Code,
    Data,
    DataCount,
    Unknown(u8),
}

impl From<u8> for SectionId {
    fn from(id: u8) -> Self {
        match id {
            0 => SectionId::Custom,
            1 => SectionId::Type,
            2 => SectionId::Import,
            3 => SectionId::Function,
            4 => SectionId::Table,
            5 => SectionId::Memory,
            6 => SectionId::Global,
            7 => SectionId::Export,
            8 => SectionId::Start,
            9 => SectionId::Element,
            10 => SectionId::Code,
            11 => SectionId::Data,
            12 => SectionId::DataCount,
            other => SectionId::Unknown(other),
        }
    }
}

impl From<SectionId> for u8 {
    fn from(id: SectionId) -> Self {
        match id {
            SectionId::Custom => 0,
            SectionId::Type => 1,
            SectionId::Import => 2,
            SectionId::Function => 3,
            SectionId::Table => 4,
            SectionId::Memory => 5,
            SectionId::Global => 6,
            SectionId::Export => 7,
            SectionId::Start => 8,
            SectionId::Element => 9,
            SectionId::Code => 10,
            SectionId::Data => 11,
            SectionId::DataCount => 12,
            SectionId::Unknown(other) => other,
        }
    }
}

/// One `(id, size, payload)` frame. `payload` reads with absolute offsets.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub id: SectionId,
    pub offset: usize,
    pub payload: BinaryReader<'a>,
}

/// Walks the section frames following the module header. Stops cleanly at end
/// of input and yields nothing after the first error.
pub struct Sections<'a> {
    reader: BinaryReader<'a>,
    done: bool,
}

impl<'a> Sections<'a> {
    pub fn new(reader: BinaryReader<'a>) -> Self {
        Sections {
            reader,
            done: false,
        }
    }

    fn read_section(&mut self) -> Result<Section<'a>, ParseError> {
        let offset = self.reader.offset();
        let raw_id = self.reader.read_u8()?;
        let size = self.reader.read_var_u32()? as usize;
        let remaining = self.reader.remaining();
        if size > remaining {
            return Err(ParseError::SectionOverrun {
                id: raw_id,
                offset,
                size,
                remaining,
            });
        }
        let payload = self.reader.sub_reader(size)?;
        Ok(Section {
            id: SectionId::from(raw_id),
            offset,
            payload,
        })
    }
}

impl<'a> Iterator for Sections<'a> {
    type Item = Result<Section<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.reader.is_empty() {
            return None;
        }
        let section = self.read_section();
        if section.is_err() {
            self.done = true;
        }
        Some(section)
    }
}
