//! Persistent configuration region.
//!
//! Layout of the whole store:
//!
//! ```text
//! [ TLV records ... ][ version: u16 LE ][ CRC: u16 LE ]
//! ```
//!
//! Records are `tag: u8, length: u8, value: [u8; length]`. The CRC covers
//! every byte before it, including unused space and the version word.

pub mod crc;

use crate::config::CONFIG_VERSION;
use crate::error::LoadError;

use self::crc::{crc16_update, CRC_INIT};

const VERSION_BYTES: usize = 2;
const CRC_BYTES: usize = 2;
const TRAILER_BYTES: usize = VERSION_BYTES + CRC_BYTES;
/// Read size when folding the region into the CRC
const CHUNK: usize = 16;

/// Value of unwritten EEPROM cells
pub const ERASED: u8 = 0xFF;

/// Byte addressable persistent memory
pub trait Store {
    fn region_length(&self) -> usize;
    fn read_at(&mut self, offset: usize, buf: &mut [u8]);
    fn write_at(&mut self, offset: usize, buf: &[u8]);
}

/// Record tags of the persisted configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    ModuleId = 0,
    Pin = 1,
    End = 0xFF,
}

impl Tag {
    pub fn from_u8(raw: u8) -> Option<Tag> {
        match raw {
            0 => Some(Tag::ModuleId),
            1 => Some(Tag::Pin),
            0xFF => Some(Tag::End),
            _ => None,
        }
    }
}

/// Sequential cursor over the record area of a [`Store`].
pub struct ConfigStore<'a, S: Store> {
    store: &'a mut S,
    cursor: usize,
}

impl<'a, S: Store> ConfigStore<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store, cursor: 0 }
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes available to records, in front of the version and CRC words.
    pub fn records_len(&self) -> usize {
        self.store.region_length().saturating_sub(TRAILER_BYTES)
    }

    pub fn eof(&self) -> bool {
        self.cursor >= self.records_len()
    }

    /// Reads the next byte. Past the record area it reads as erased.
    pub fn get_u8(&mut self) -> u8 {
        let mut byte = [ERASED];
        if !self.eof() {
            self.store.read_at(self.cursor, &mut byte);
        }
        self.cursor += 1;
        byte[0]
    }

    pub fn get_u16(&mut self) -> u16 {
        let lo = self.get_u8();
        let hi = self.get_u8();
        u16::from_le_bytes([lo, hi])
    }

    /// Writes the next byte. Writes past the record area are dropped.
    pub fn put_u8(&mut self, value: u8) {
        if !self.eof() {
            self.store.write_at(self.cursor, &[value]);
        }
        self.cursor += 1;
    }

    pub fn put_u16(&mut self, value: u16) {
        for byte in value.to_le_bytes() {
            self.put_u8(byte);
        }
    }

    pub fn put_record(&mut self, tag: Tag, value: &[u8]) {
        self.put_u8(tag as u8);
        self.put_u8(value.len() as u8);
        for &byte in value {
            self.put_u8(byte);
        }
    }

    pub fn skip(&mut self, len: usize) {
        self.cursor += len;
    }

    /// CRC over the region, leaving out its last `minus` bytes.
    pub fn crc(&mut self, minus: usize) -> u16 {
        let end = self.store.region_length().saturating_sub(minus);
        let mut crc = CRC_INIT;
        let mut chunk = [0u8; CHUNK];
        let mut offset = 0;
        while offset < end {
            let len = CHUNK.min(end - offset);
            self.store.read_at(offset, &mut chunk[..len]);
            crc = chunk[..len].iter().fold(crc, |crc, &b| crc16_update(crc, b));
            offset += len;
        }
        crc
    }

    /// Verifies the CRC and the schema version.
    pub fn check(&mut self) -> Result<(), LoadError> {
        let residue = self.crc(0);
        if residue != 0 {
            return Err(LoadError::BadCrc(residue));
        }

        let mut raw = [0u8; VERSION_BYTES];
        self.store.read_at(self.records_len(), &mut raw);
        let found = u16::from_le_bytes(raw);
        if found != CONFIG_VERSION {
            return Err(LoadError::BadVersion {
                found,
                expected: CONFIG_VERSION,
            });
        }
        Ok(())
    }

    /// Stores the version word, then the CRC of everything before it.
    pub fn seal(&mut self) {
        let version_at = self.records_len();
        self.store.write_at(version_at, &CONFIG_VERSION.to_le_bytes());
        let crc = self.crc(CRC_BYTES);
        self.store.write_at(version_at + VERSION_BYTES, &crc.to_le_bytes());
    }
}

/// Store kept in RAM, starts erased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamStore<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> RamStore<N> {
    pub fn new() -> Self {
        Self { bytes: [ERASED; N] }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl<const N: usize> Default for RamStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Store for RamStore<N> {
    fn region_length(&self) -> usize {
        N
    }

    fn read_at(&mut self, offset: usize, buf: &mut [u8]) {
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.bytes.get(offset + i).copied().unwrap_or(ERASED);
        }
    }

    fn write_at(&mut self, offset: usize, buf: &[u8]) {
        for (i, &byte) in buf.iter().enumerate() {
            if let Some(slot) = self.bytes.get_mut(offset + i) {
                *slot = byte;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_advances_by_width() {
        let mut store = RamStore::<16>::new();
        let mut cfg = ConfigStore::new(&mut store);
        cfg.put_u8(0x12);
        cfg.put_u16(0xBEEF);
        assert_eq!(cfg.position(), 3);

        cfg.rewind();
        assert_eq!(cfg.get_u8(), 0x12);
        assert_eq!(cfg.get_u16(), 0xBEEF);
        assert_eq!(cfg.position(), 3);
        assert_eq!(&store.as_bytes()[..3], &[0x12, 0xEF, 0xBE]);
    }

    #[test]
    fn eof_stops_before_trailer() {
        let mut store = RamStore::<8>::new();
        let mut cfg = ConfigStore::new(&mut store);
        assert_eq!(cfg.records_len(), 4);
        for value in 0..6u8 {
            cfg.put_u8(value);
        }
        assert!(cfg.eof());
        cfg.rewind();
        cfg.skip(4);
        assert!(cfg.eof());
        assert_eq!(cfg.get_u8(), ERASED);
        // the trailer was not touched
        assert_eq!(&store.as_bytes()[4..], &[ERASED; 4]);
    }

    #[test]
    fn sealed_region_checks() {
        let mut store = RamStore::<64>::new();
        let mut cfg = ConfigStore::new(&mut store);
        cfg.put_record(Tag::ModuleId, &[7]);
        cfg.put_record(Tag::End, &[]);
        cfg.seal();
        assert_eq!(cfg.check(), Ok(()));
        assert_eq!(cfg.crc(0), 0);
    }

    #[test]
    fn erased_region_fails_crc() {
        let mut store = RamStore::<64>::new();
        let mut cfg = ConfigStore::new(&mut store);
        assert!(matches!(cfg.check(), Err(LoadError::BadCrc(_))));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut store = RamStore::<32>::new();
        {
            let mut cfg = ConfigStore::new(&mut store);
            cfg.put_record(Tag::End, &[]);
            cfg.seal();
        }
        // rewrite version and fix up the CRC as an older firmware would have
        store.write_at(28, &0x0001u16.to_le_bytes());
        let crc = crate::storage::crc::crc16(&store.as_bytes()[..30]);
        store.write_at(30, &crc.to_le_bytes());

        let mut cfg = ConfigStore::new(&mut store);
        assert_eq!(
            cfg.check(),
            Err(LoadError::BadVersion {
                found: 1,
                expected: CONFIG_VERSION
            })
        );
    }

    #[test]
    fn tags() {
        assert_eq!(Tag::from_u8(0), Some(Tag::ModuleId));
        assert_eq!(Tag::from_u8(1), Some(Tag::Pin));
        assert_eq!(Tag::from_u8(0xFF), Some(Tag::End));
        assert_eq!(Tag::from_u8(2), None);
    }
}
