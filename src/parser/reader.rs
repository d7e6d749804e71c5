use super::error::ParseError;

/// Bounds-checked cursor over an immutable byte slice.
///
/// `base` is the absolute offset of `data[0]` within the whole module so that
/// errors raised by a reader over a section payload still point into the
/// original buffer.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_offset(data, 0)
    }

    pub fn with_offset(data: &'a [u8], base: usize) -> Self {
        BinaryReader { data, pos: 0, base }
    }

    /// Absolute offset of the next byte to be read.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn truncated(&self, needed: usize) -> ParseError {
        ParseError::TruncatedInput {
            offset: self.offset(),
            needed,
            remaining: self.remaining(),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        let byte = *self.data.get(self.pos).ok_or_else(|| self.truncated(1))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Borrows the next `len` bytes. The length is checked against what is
    /// left before anything is handed out, so an oversized declared length
    /// never turns into an allocation.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        if len > self.remaining() {
            return Err(self.truncated(len));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, ParseError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Unsigned LEB128, at most five bytes. The fifth byte may only carry the
    /// top four bits of the value.
    pub fn read_var_u32(&mut self) -> Result<u32, ParseError> {
        let start = self.offset();
        let mut result: u32 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.read_u8()?;
            if shift == 28 && byte > 0x0f {
                return Err(ParseError::MalformedVarint { offset: start });
            }
            result |= u32::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    /// Length-prefixed name. Invalid UTF-8 is replaced rather than rejected.
    pub fn read_name(&mut self) -> Result<String, ParseError> {
        let len = self.read_var_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Splits the next `len` bytes off into their own reader.
    pub fn sub_reader(&mut self, len: usize) -> Result<BinaryReader<'a>, ParseError> {
        let base = self.offset();
        let data = self.read_bytes(len)?;
        Ok(BinaryReader::with_offset(data, base))
    }

    /// Consumes everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}
