//! Entropy estimation
//!
//! A rotation is credited `bits_per_record` for every fresh record, capped
//! by the Shannon estimate of the derived key bytes. The cap catches a
//! degenerate derivation no matter how many records were supplied.

/// Shannon entropy of a byte string in bits (per-byte estimate times length).
pub fn shannon_bits(bytes: &[u8]) -> u32 {
    if bytes.is_empty() {
        return 0;
    }

    let mut counts = [0u32; 256];
    for &b in bytes {
        counts[b as usize] += 1;
    }

    let len = bytes.len() as f64;
    let per_byte: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / len;
            -p * p.log2()
        })
        .sum();

    (per_byte * len).floor() as u32
}

/// Entropy credited to a rotation folding `fresh_records` new records.
pub fn estimate_bits(fresh_records: usize, bits_per_record: u32, derived_key: &[u8]) -> u32 {
    let credited = (fresh_records as u64)
        .saturating_mul(bits_per_record as u64)
        .min(u32::MAX as u64) as u32;
    credited.min(shannon_bits(derived_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_bytes_have_no_entropy() {
        assert_eq!(shannon_bits(&[0xAA; 32]), 0);
        assert_eq!(shannon_bits(&[]), 0);
    }

    #[test]
    fn test_distinct_bytes_reach_maximum() {
        let bytes: Vec<u8> = (0u8..32).collect();
        // 32 distinct symbols: log2(32) = 5 bits each
        assert_eq!(shannon_bits(&bytes), 160);
    }

    #[test]
    fn test_estimate_capped_by_shannon() {
        assert_eq!(estimate_bits(100, 32, &[0u8; 32]), 0);
        let bytes: Vec<u8> = (0u8..32).collect();
        assert_eq!(estimate_bits(1, 32, &bytes), 32);
        assert_eq!(estimate_bits(0, 32, &bytes), 0);
    }
}
