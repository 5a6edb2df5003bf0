// Thu Aug 20 2026 - Alex

use std::fmt;

/// Byte template with wildcards. `mask[i]` false means position `i`
/// matches any byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    bytes: Vec<u8>,
    mask: Vec<bool>,
}

impl Pattern {
    pub fn new(bytes: Vec<u8>, mask: Vec<bool>) -> Self {
        assert_eq!(bytes.len(), mask.len(), "Pattern bytes and mask must have same length");
        Self { bytes, mask }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mask = vec![true; bytes.len()];
        Self { bytes: bytes.to_vec(), mask }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn significant_byte_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    pub fn wildcard_byte_count(&self) -> usize {
        self.mask.iter().filter(|&&m| !m).count()
    }

    /// Test the window of `data` starting at `offset` against this
    /// template. False when the window would run past the end of `data`.
    pub fn matches_at(&self, data: &[u8], offset: usize) -> bool {
        let window = match data.get(offset..offset + self.bytes.len()) {
            Some(w) => w,
            None => return false,
        };
        self.bytes
            .iter()
            .zip(self.mask.iter())
            .zip(window.iter())
            .all(|((pattern_byte, &significant), &data_byte)| {
                !significant || *pattern_byte == data_byte
            })
    }

    pub fn to_hex_string(&self) -> String {
        self.bytes
            .iter()
            .zip(self.mask.iter())
            .map(|(b, &m)| if m { format!("{:02X}", b) } else { "??".to_string() })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

pub struct PatternBuilder {
    bytes: Vec<u8>,
    mask: Vec<bool>,
}

impl PatternBuilder {
    pub fn new() -> Self {
        Self { bytes: Vec::new(), mask: Vec::new() }
    }

    pub fn byte(mut self, b: u8) -> Self {
        self.bytes.push(b);
        self.mask.push(true);
        self
    }

    pub fn bytes(mut self, bs: &[u8]) -> Self {
        for &b in bs {
            self.bytes.push(b);
            self.mask.push(true);
        }
        self
    }

    pub fn wildcards(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.bytes.push(0);
            self.mask.push(false);
        }
        self
    }

    pub fn zeroes(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.bytes.push(0);
            self.mask.push(true);
        }
        self
    }

    pub fn build(self) -> Pattern {
        Pattern { bytes: self.bytes, mask: self.mask }
    }
}

impl Default for PatternBuilder {
    fn default() -> Self {
        Self::new()
    }
}
