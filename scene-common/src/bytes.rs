//! Little-endian primitive encoding
//!
//! `ByteWriter` and `ByteReader` are exact mirrors: every `write_*` has a
//! `read_*` consuming the same bytes. Strings and byte blocks carry a u32
//! length prefix; string-table references are u16 indices with
//! [`NO_STRING`] reserved for "absent".

use scenepack_shared::Transform;

use crate::error::{FormatError, Result};
use crate::string_table::StringTable;

/// Reserved string reference meaning `None`
pub const NO_STRING: u16 = u16::MAX;

const MIN_CAPACITY: usize = 64;

/// Growable output buffer with a movable cursor
///
/// Writes land at the cursor. Moving the cursor back with
/// [`set_offset`](Self::set_offset) lets a caller overwrite a placeholder;
/// the logical length is the furthest byte ever written.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
    offset: usize,
    len: usize,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Pre-size the backing buffer when the output size is known
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            offset: 0,
            len: 0,
        }
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.offset + additional;
        if needed <= self.buf.len() {
            return;
        }
        let mut capacity = self.buf.len().max(MIN_CAPACITY);
        while capacity < needed {
            capacity *= 2;
        }
        self.buf.resize(capacity, 0);
    }

    /// Append raw bytes at the cursor
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.buf[self.offset..self.offset + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
        self.len = self.len.max(self.offset);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_raw(&[value]);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_raw(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_raw(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_raw(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_raw(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_raw(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    pub fn write_vec3(&mut self, v: [f32; 3]) {
        for c in v {
            self.write_f32(c);
        }
    }

    pub fn write_quat(&mut self, q: [f32; 4]) {
        for c in q {
            self.write_f32(c);
        }
    }

    /// Position, rotation, scale
    pub fn write_transform(&mut self, t: &Transform) {
        self.write_vec3(t.position);
        self.write_quat(t.rotation);
        self.write_vec3(t.scale);
    }

    /// u32 byte length followed by UTF-8 bytes
    pub fn write_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// u32 byte length followed by the bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_u32(bytes.len() as u32);
        self.write_raw(bytes);
    }

    /// 2-byte element count, rejecting lists a u16 cannot hold
    pub fn write_count_u16(&mut self, what: &'static str, count: usize) -> Result<()> {
        let count = u16::try_from(count).map_err(|_| FormatError::CountOverflow { what, count })?;
        self.write_u16(count);
        Ok(())
    }

    /// Intern `s` and write its 2-byte table index
    pub fn write_string_ref(&mut self, table: &mut StringTable, s: &str) -> Result<()> {
        let index = table.add(s);
        if index >= NO_STRING as u32 {
            return Err(FormatError::StringTableOverflow(table.len()));
        }
        self.write_u16(index as u16);
        Ok(())
    }

    pub fn write_opt_string_ref(&mut self, table: &mut StringTable, s: Option<&str>) -> Result<()> {
        match s {
            Some(s) => self.write_string_ref(table, s),
            None => {
                self.write_u16(NO_STRING);
                Ok(())
            }
        }
    }

    /// Zero-pad the cursor up to the next multiple of `alignment`
    pub fn align(&mut self, alignment: usize) {
        let padding = padding_for(self.offset, alignment);
        if padding > 0 {
            self.reserve(padding);
            self.buf[self.offset..self.offset + padding].fill(0);
            self.offset += padding;
            self.len = self.len.max(self.offset);
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move the cursor; the logical length never shrinks
    pub fn set_offset(&mut self, offset: usize) {
        if offset > self.buf.len() {
            self.reserve(offset - self.offset);
        }
        self.offset = offset;
    }

    /// Overwrite a previously written u32 without moving the cursor
    pub fn patch_u32_at(&mut self, offset: usize, value: u32) {
        let saved = self.offset;
        self.set_offset(offset);
        self.write_u32(value);
        self.offset = saved;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.len);
        self.buf
    }
}

/// Bytes needed to bring `offset` up to a multiple of `alignment`
pub fn padding_for(offset: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return 0;
    }
    (alignment - offset % alignment) % alignment
}

/// Cursor over a borrowed byte slice
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Borrow the next `n` bytes and advance
    pub fn read_raw(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(FormatError::Truncated {
                offset: self.offset,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_raw(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Any non-zero byte reads as `true`
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_vec3(&mut self) -> Result<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    pub fn read_quat(&mut self) -> Result<[f32; 4]> {
        Ok([
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ])
    }

    pub fn read_transform(&mut self) -> Result<Transform> {
        Ok(Transform {
            position: self.read_vec3()?,
            rotation: self.read_quat()?,
            scale: self.read_vec3()?,
        })
    }

    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_raw(len)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub fn read_string_ref(&mut self, table: &StringTable) -> Result<String> {
        let index = self.read_u16()?;
        table
            .get(index as u32)
            .map(str::to_string)
            .ok_or(FormatError::BadStringIndex(index as u32))
    }

    pub fn read_opt_string_ref(&mut self, table: &StringTable) -> Result<Option<String>> {
        let index = self.read_u16()?;
        if index == NO_STRING {
            return Ok(None);
        }
        table
            .get(index as u32)
            .map(|s| Some(s.to_string()))
            .ok_or(FormatError::BadStringIndex(index as u32))
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_raw(n).map(|_| ())
    }

    /// Skip padding up to the next multiple of `alignment`
    ///
    /// Padding missing at the very end of the input is tolerated.
    pub fn align(&mut self, alignment: usize) {
        let padding = padding_for(self.offset, alignment);
        self.offset = (self.offset + padding).min(self.data.len());
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.data.len());
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_roundtrip() {
        let mut w = ByteWriter::new();
        w.write_u8(7);
        w.write_u16(0xBEEF);
        w.write_u32(0xDEAD_BEEF);
        w.write_i32(-42);
        w.write_f32(1.5);
        w.write_f64(-2.25);
        w.write_bool(true);
        w.write_string("héllo");
        w.write_bytes(&[1, 2, 3]);
        let bytes = w.into_bytes();

        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.read_u16().unwrap(), 0xBEEF);
        assert_eq!(r.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(r.read_i32().unwrap(), -42);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert_eq!(r.read_f64().unwrap(), -2.25);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.read_string().unwrap(), "héllo");
        assert_eq!(r.read_bytes().unwrap(), &[1, 2, 3]);
        assert!(r.is_eof());
    }

    #[test]
    fn test_little_endian_layout() {
        let mut w = ByteWriter::new();
        w.write_u32(0x0403_0201);
        assert_eq!(w.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_transform_roundtrip() {
        let t = Transform {
            position: [1.0, 2.0, 3.0],
            rotation: [0.0, 0.7071068, 0.0, 0.7071068],
            scale: [2.0, 2.0, 0.5],
        };
        let mut w = ByteWriter::new();
        w.write_transform(&t);
        assert_eq!(w.len(), 40);
        let bytes = w.into_bytes();
        assert_eq!(ByteReader::new(&bytes).read_transform().unwrap(), t);
    }

    #[test]
    fn test_growth_by_doubling() {
        let mut w = ByteWriter::with_capacity(1);
        for i in 0..1000u32 {
            w.write_u32(i);
        }
        assert_eq!(w.len(), 4000);
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        r.skip(999 * 4).unwrap();
        assert_eq!(r.read_u32().unwrap(), 999);
    }

    #[test]
    fn test_align_pads_with_zeros() {
        let mut w = ByteWriter::new();
        w.write_u8(0xFF);
        w.align(4);
        assert_eq!(w.as_slice(), &[0xFF, 0, 0, 0]);
        w.align(4);
        assert_eq!(w.len(), 4);
    }

    #[test]
    fn test_backpatch_keeps_length() {
        let mut w = ByteWriter::new();
        w.write_u32(0);
        w.write_u32(0xAAAA_AAAA);
        w.patch_u32_at(0, 8);
        assert_eq!(w.offset(), 8);
        assert_eq!(w.len(), 8);

        w.set_offset(0);
        w.write_u8(9);
        assert_eq!(w.len(), 8);
        assert_eq!(&w.as_slice()[..4], &[9, 0, 0, 0]);
    }

    #[test]
    fn test_string_refs() {
        let mut table = StringTable::new();
        let mut w = ByteWriter::new();
        w.write_string_ref(&mut table, "node").unwrap();
        w.write_opt_string_ref(&mut table, None).unwrap();
        w.write_string_ref(&mut table, "node").unwrap();
        assert_eq!(w.len(), 6);
        assert_eq!(table.len(), 1);

        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_string_ref(&table).unwrap(), "node");
        assert_eq!(r.read_opt_string_ref(&table).unwrap(), None);
        assert_eq!(r.read_opt_string_ref(&table).unwrap().as_deref(), Some("node"));
    }

    #[test]
    fn test_count_overflow() {
        let mut w = ByteWriter::new();
        w.write_count_u16("tags", u16::MAX as usize).unwrap();
        assert!(matches!(
            w.write_count_u16("tags", u16::MAX as usize + 1),
            Err(FormatError::CountOverflow { what: "tags", count: 65536 })
        ));
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn test_bad_string_index() {
        let table = StringTable::new();
        let bytes = 3u16.to_le_bytes();
        let err = ByteReader::new(&bytes).read_string_ref(&table).unwrap_err();
        assert!(matches!(err, FormatError::BadStringIndex(3)));
    }

    #[test]
    fn test_truncated_read() {
        let mut r = ByteReader::new(&[1, 2]);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(
            err,
            FormatError::Truncated {
                offset: 0,
                needed: 4,
                available: 2
            }
        ));
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn test_truncated_string_length() {
        let mut w = ByteWriter::new();
        w.write_u32(100);
        w.write_raw(b"short");
        let bytes = w.into_bytes();
        assert!(ByteReader::new(&bytes).read_string().is_err());
    }

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(0, 4), 0);
        assert_eq!(padding_for(5, 4), 3);
        assert_eq!(padding_for(8, 8), 0);
        assert_eq!(padding_for(3, 1), 0);
    }
}
