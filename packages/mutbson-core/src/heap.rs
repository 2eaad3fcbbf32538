use crate::ids::HeapRef;

const LEN_PREFIX: usize = 4;

/// Largest body a single heap entry can hold; the length prefix is a `u32`.
pub const MAX_ENTRY_LEN: usize = u32::MAX as usize;

fn frame_len(len: usize) -> [u8; LEN_PREFIX] {
    match u32::try_from(len) {
        Ok(len) => len.to_le_bytes(),
        Err(_) => panic!("heap entry of {len} bytes exceeds {MAX_ENTRY_LEN}"),
    }
}

/// Append-only byte store backing field names and out-of-line values.
///
/// Every entry is written as a little-endian `u32` length, the raw bytes and a zero
/// terminator. Offsets handed out by [`Heap::put_bytes`] stay valid for the lifetime of
/// the heap; growth may move the buffer but never renumbers it.
#[derive(Clone, Debug, Default)]
pub struct Heap {
    data: Vec<u8>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
        }
    }

    /// # Panics
    ///
    /// Panics if `bytes` is longer than [`MAX_ENTRY_LEN`], the same way `Vec` treats a
    /// capacity overflow.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> HeapRef {
        let offset = self.data.len();
        self.data.extend_from_slice(&frame_len(bytes.len()));
        self.data.extend_from_slice(bytes);
        self.data.push(0);
        HeapRef(offset)
    }

    pub fn put_str(&mut self, s: &str) -> HeapRef {
        self.put_bytes(s.as_bytes())
    }

    pub fn get_bytes(&self, at: HeapRef) -> Option<&[u8]> {
        let start = at.0;
        let prefix = self.data.get(start..start + LEN_PREFIX)?;
        let mut len = [0u8; LEN_PREFIX];
        len.copy_from_slice(prefix);
        let len = u32::from_le_bytes(len) as usize;
        let body = start + LEN_PREFIX;
        self.data.get(body..body + len)
    }

    /// Returns `None` for an offset that was not produced by this heap, or for an entry
    /// that was written as non UTF-8 bytes.
    pub fn get_str(&self, at: HeapRef) -> Option<&str> {
        std::str::from_utf8(self.get_bytes(at)?).ok()
    }

    /// Total bytes written so far, including framing.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_survive_growth() {
        let mut heap = Heap::with_capacity(1);
        let first = heap.put_str("alpha");
        let refs: Vec<_> = (0..1000).map(|i| heap.put_str(&format!("s{i}"))).collect();
        assert_eq!(heap.get_str(first), Some("alpha"));
        assert_eq!(heap.get_str(refs[999]), Some("s999"));
    }

    #[test]
    fn entries_are_framed_and_terminated() {
        let mut heap = Heap::new();
        let empty = heap.put_str("");
        let abc = heap.put_bytes(b"abc");
        assert_eq!(heap.get_str(empty), Some(""));
        assert_eq!(heap.get_bytes(abc), Some(&b"abc"[..]));
        assert_eq!(heap.len(), (LEN_PREFIX + 1) + (LEN_PREFIX + 3 + 1));
    }

    #[test]
    fn length_prefix_is_little_endian() {
        let mut heap = Heap::new();
        heap.put_bytes(&[7; 0x0102]);
        assert_eq!(heap.data[..LEN_PREFIX], [0x02, 0x01, 0, 0]);
        assert_eq!(frame_len(MAX_ENTRY_LEN), [0xff; LEN_PREFIX]);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    #[should_panic(expected = "exceeds")]
    fn oversized_entries_are_refused_not_truncated() {
        frame_len(MAX_ENTRY_LEN + 1);
    }

    #[test]
    fn binary_entries_may_contain_zero_bytes() {
        let mut heap = Heap::new();
        let at = heap.put_bytes(&[0, 1, 0, 2]);
        assert_eq!(heap.get_bytes(at), Some(&[0u8, 1, 0, 2][..]));
    }

    #[test]
    fn foreign_offsets_are_rejected() {
        let heap = Heap::new();
        assert_eq!(heap.get_bytes(HeapRef(42)), None);
    }

    #[test]
    fn invalid_utf8_is_not_a_string() {
        let mut heap = Heap::new();
        let at = heap.put_bytes(&[0xff, 0xfe]);
        assert_eq!(heap.get_str(at), None);
    }
}
