/// Seed shared by both accumulators: `(5381 << 16) + 5381`
const SEED: u32 = (5381 << 16) + 5381;

/// Multiplier folding the odd-unit accumulator into the result
const MIX: u32 = 1_566_083_941;

/// Prefix marking a resolved hash tag
pub const TAG_PREFIX: char = '#';

/// Compute the stable 32-bit hash of a location key.
///
/// Operates on UTF-16 code units, two per step: even units feed the first
/// accumulator, odd units the second. A trailing unpaired unit only touches
/// the first accumulator. All arithmetic wraps at 32 bits.
///
/// The value is identical on every run, machine, and process; it never goes
/// through `std::hash`, whose hashers are randomly seeded.
pub fn deterministic_hash(input: &str) -> u32 {
    let mut hash1 = SEED;
    let mut hash2 = SEED;

    let units: Vec<u16> = input.encode_utf16().collect();
    for pair in units.chunks(2) {
        hash1 = (hash1 << 5).wrapping_add(hash1) ^ u32::from(pair[0]);
        if let Some(&odd) = pair.get(1) {
            hash2 = (hash2 << 5).wrapping_add(hash2) ^ u32::from(odd);
        }
    }

    hash1.wrapping_add(hash2.wrapping_mul(MIX))
}

/// Render a hash as 8 zero-padded lowercase hex digits
pub fn hash_to_hex(hash: u32) -> String {
    hex::encode(hash.to_be_bytes())
}

/// Compute the `#xxxxxxxx` tag for a location key
pub fn hash_tag(location: &str) -> String {
    format!("{}{}", TAG_PREFIX, hash_to_hex(deterministic_hash(location)))
}

/// Whether a tag is a resolved hash tag rather than a raw fallback key
pub fn is_hash_tag(tag: &str) -> bool {
    match tag.strip_prefix(TAG_PREFIX) {
        Some(digits) => {
            digits.len() == 8 && digits.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        }
        None => false,
    }
}
