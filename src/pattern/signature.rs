// Thu Aug 20 2026 - Alex

use crate::config::ScanConfig;
use crate::pattern::{Pattern, PatternBuilder};

/// Build the record signature for one character struct:
/// the unlocked flag byte (0x80), a wildcard run covering the stat
/// fields, then the zeroed padding tail.
pub fn record_signature(config: &ScanConfig) -> Pattern {
    let wildcard_run = config.struct_size - 1 - config.padding_length;
    PatternBuilder::new()
        .byte(0x80)
        .wildcards(wildcard_run)
        .zeroes(config.padding_length)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_shape() {
        let config = ScanConfig {
            struct_size: 50,
            padding_length: 4,
            ..ScanConfig::default()
        };
        let sig = record_signature(&config);
        assert_eq!(sig.len(), 50);
        assert_eq!(sig.bytes()[0], 0x80);
        assert!(sig.mask()[0]);
        assert_eq!(sig.wildcard_byte_count(), 45);
        // Padding tail is significant zero bytes.
        for i in 46..50 {
            assert!(sig.mask()[i]);
            assert_eq!(sig.bytes()[i], 0x00);
        }
    }

    #[test]
    fn test_signature_matches_synthetic_record() {
        let config = ScanConfig {
            struct_size: 8,
            padding_length: 2,
            ..ScanConfig::default()
        };
        let sig = record_signature(&config);
        assert!(sig.matches_at(&[0x80, 9, 9, 9, 9, 9, 0, 0], 0));
        assert!(!sig.matches_at(&[0x80, 9, 9, 9, 9, 9, 0, 1], 0));
        assert!(!sig.matches_at(&[0x00, 9, 9, 9, 9, 9, 0, 0], 0));
    }
}
