//! Fixed capacity bit vector used as a per-reader "dirty pin" mask.
//!
//! Every set owns a 32 byte buffer, enough for 255 bits; only the first
//! `(capacity + 7) / 8` bytes are in use. Indices at or beyond the
//! capacity read as clear and ignore writes.

const MAX_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    capacity: u8,
    bytes: [u8; MAX_BYTES],
}

impl BitSet {
    pub fn new(capacity: u8) -> Self {
        Self {
            capacity,
            bytes: [0; MAX_BYTES],
        }
    }

    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    pub fn get(&self, idx: u8) -> bool {
        if idx >= self.capacity {
            return false;
        }
        let byte = self.bytes()[(idx / 8) as usize];
        byte & (1 << (idx & 7)) != 0
    }

    pub fn set(&mut self, idx: u8, value: bool) {
        if idx >= self.capacity {
            return;
        }
        let byte = &mut self.bytes_mut()[(idx / 8) as usize];
        if value {
            *byte |= 1 << (idx & 7);
        } else {
            *byte &= !(1 << (idx & 7));
        }
    }

    pub fn toggle(&mut self, idx: u8) {
        let value = self.get(idx);
        self.set(idx, !value);
    }

    pub fn clear(&mut self) {
        self.bytes_mut().iter_mut().for_each(|b| *b = 0);
    }

    /// Marks every index below the capacity.
    pub fn set_all(&mut self) {
        for idx in 0..self.capacity {
            self.set(idx, true);
        }
    }

    pub fn any(&self) -> bool {
        self.bytes().iter().any(|&b| b != 0)
    }

    fn used(&self) -> usize {
        (self.capacity as usize + 7) / 8
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes[..self.used()]
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        let used = self.used();
        &mut self.bytes[..used]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_capacity_starts_clear_and_bounds_writes() {
        for n in 0..=255u8 {
            let mut bits = BitSet::new(n);
            for i in 0..n {
                assert!(!bits.get(i));
            }
            for i in 0..n {
                bits.set(i, true);
                assert!(bits.get(i), "capacity {} index {}", n, i);
            }
            for i in n..=255 {
                bits.set(i, true);
                assert!(!bits.get(i));
            }
        }
    }

    #[test]
    fn used_bytes_follow_capacity() {
        assert!(BitSet::new(0).bytes().is_empty());
        assert_eq!(BitSet::new(8).bytes().len(), 1);
        assert_eq!(BitSet::new(33).bytes().len(), 5);
        assert_eq!(BitSet::new(255).bytes().len(), 32);
    }

    #[test]
    fn toggle_and_clear() {
        let mut bits = BitSet::new(100);
        bits.toggle(99);
        bits.toggle(3);
        assert!(bits.get(99));
        assert!(bits.get(3));
        bits.toggle(3);
        assert!(!bits.get(3));
        assert!(bits.any());

        bits.clear();
        assert!(!bits.get(99));
        assert!(!bits.any());
    }

    #[test]
    fn set_all_stops_at_capacity() {
        let mut bits = BitSet::new(10);
        bits.set_all();
        assert!((0..10).all(|i| bits.get(i)));
        // the padding bits of the last byte stay clear
        assert_eq!(bits.bytes()[1], 0b0000_0011);
    }
}
