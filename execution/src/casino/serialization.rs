//! Cursor helpers for round state blobs.

#[derive(Clone, Copy, Debug)]
pub(crate) struct StateReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> StateReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    pub(crate) fn read_u8(&mut self) -> Option<u8> {
        let value = *self.buf.get(self.offset)?;
        self.offset += 1;
        Some(value)
    }

    pub(crate) fn read_u32_be(&mut self) -> Option<u32> {
        let bytes = self.read_bytes(4)?;
        Some(u32::from_be_bytes(bytes.try_into().ok()?))
    }

    pub(crate) fn read_u64_be(&mut self) -> Option<u64> {
        let bytes = self.read_bytes(8)?;
        Some(u64::from_be_bytes(bytes.try_into().ok()?))
    }

    pub(crate) fn read_u128_be(&mut self) -> Option<u128> {
        let bytes = self.read_bytes(16)?;
        Some(u128::from_be_bytes(bytes.try_into().ok()?))
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.remaining() < len {
            return None;
        }
        let start = self.offset;
        self.offset += len;
        Some(&self.buf[start..self.offset])
    }

    /// Read a `[len:u8] [bytes...]` section.
    pub(crate) fn read_u8_prefixed(&mut self) -> Option<Vec<u8>> {
        let len = self.read_u8()? as usize;
        Some(self.read_bytes(len)?.to_vec())
    }
}

#[derive(Debug)]
pub(crate) struct StateWriter {
    buf: Vec<u8>,
}

impl StateWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub(crate) fn push_u32_be(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub(crate) fn push_u64_be(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub(crate) fn push_u128_be(&mut self, value: u128) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub(crate) fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a `[len:u8] [bytes...]` section. Sections never exceed 255 bytes.
    pub(crate) fn push_u8_prefixed(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= u8::MAX as usize);
        self.buf.push(bytes.len() as u8);
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_writer_agree() {
        let mut writer = StateWriter::with_capacity(32);
        writer.push_u8(3);
        writer.push_u32_be(70_000);
        writer.push_u64_be(u64::MAX - 1);
        writer.push_u128_be(1u128 << 99);
        writer.push_u8_prefixed(&[9, 8, 7]);
        writer.push_bytes(&[1, 2]);
        let buf = writer.into_inner();

        let mut reader = StateReader::new(&buf);
        assert_eq!(reader.read_u8(), Some(3));
        assert_eq!(reader.read_u32_be(), Some(70_000));
        assert_eq!(reader.read_u64_be(), Some(u64::MAX - 1));
        assert_eq!(reader.read_u128_be(), Some(1u128 << 99));
        assert_eq!(reader.read_u8_prefixed(), Some(vec![9, 8, 7]));
        assert_eq!(reader.read_bytes(2), Some(&[1u8, 2][..]));
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.read_u8(), None);
    }
}
