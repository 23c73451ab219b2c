//! Codec library.
//!
//! Stateless conversions from the compact encodings found in raw title
//! data into the numeric values the rest of the engine works with:
//! resist code strings, packed resist values, display summaries,
//! inheritance bitmasks and price estimates.

use crate::error::CompendiumError;
use crate::name::Name;
use std::collections::BTreeMap;

/// Resist alphabet: single-character code to numeric value.
pub type ResistAlphabet = BTreeMap<char, i32>;

/// Number of physical resist columns in a summary-family title.
pub const PHYSICAL_RESISTS: usize = 14;

/// Number of magic resist columns in a summary-family title.
pub const MAGIC_RESISTS: usize = 13;

/// Number of columns in a resist summary.
pub const SUMMARY_RESISTS: usize = 14;

/// Bit position of the category in a packed resist value.
pub const CATEGORY_SHIFT: u32 = 10;

/// Mask selecting the severity bits of a packed resist value.
pub const SEVERITY_MASK: u32 = (1 << CATEGORY_SHIFT) - 1;

/// Raw codes are `category * CATEGORY_SCALE + severity_points`.
pub const CATEGORY_SCALE: i32 = 1000;

/// Maximum number of elements an inheritance bitmask can hold.
pub const MAX_INHERIT_ELEMENTS: usize = 32;

/// Decode a single resist code character.
///
/// # Errors
///
/// Returns `CompendiumError::UnknownCode` if `code` is not in `alphabet`.
///
/// # Examples
///
/// ```rust
/// use demon_compendium::codec::{decode_resist_code, ResistAlphabet};
///
/// let alphabet = ResistAlphabet::from([('w', 1000), ('s', -500)]);
/// assert_eq!(decode_resist_code('w', &alphabet), Ok(1000));
/// assert!(decode_resist_code('z', &alphabet).is_err());
/// ```
pub fn decode_resist_code(code: char, alphabet: &ResistAlphabet) -> Result<i32, CompendiumError> {
    alphabet
        .get(&code)
        .copied()
        .ok_or(CompendiumError::UnknownCode { code })
}

/// Decode a resist code string, one value per character.
pub fn decode_resist_codes(
    codes: &str,
    alphabet: &ResistAlphabet,
) -> Result<Vec<i32>, CompendiumError> {
    codes
        .chars()
        .map(|c| decode_resist_code(c, alphabet))
        .collect()
}

fn mean(values: &[i32]) -> f64 {
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

/// Build the display summary of a summary-family resist profile.
///
/// The column grouping mirrors the order of the raw tables: any change
/// to element ordering there needs a matching change here.
///
/// ```text
///  0: avg physical[0..7]    7: magic[1]
///  1: physical[7]           8: magic[2]
///  2: avg physical[8..11]   9: magic[3]
///  3: physical[11]         10: avg magic[4..8]
///  4: physical[12]         11: avg magic[8..10]
///  5: physical[13]         12: avg magic[10..12]
///  6: magic[0]             13: magic[12]
/// ```
pub fn summarize_resists(
    physical: &[i32; PHYSICAL_RESISTS],
    magic: &[i32; MAGIC_RESISTS],
) -> [f64; SUMMARY_RESISTS] {
    [
        mean(&physical[0..7]),
        f64::from(physical[7]),
        mean(&physical[8..11]),
        f64::from(physical[11]),
        f64::from(physical[12]),
        f64::from(physical[13]),
        f64::from(magic[0]),
        f64::from(magic[1]),
        f64::from(magic[2]),
        f64::from(magic[3]),
        mean(&magic[4..8]),
        mean(&magic[8..10]),
        mean(&magic[10..12]),
        f64::from(magic[12]),
    ]
}

/// Pack a binary vector into an integer, first entry most significant.
///
/// # Errors
///
/// Returns `CompendiumError::InheritOverflow` for vectors longer than
/// `MAX_INHERIT_ELEMENTS`.
pub fn pack_inherit_bits(bits: &[u8]) -> Result<u32, CompendiumError> {
    if bits.len() > MAX_INHERIT_ELEMENTS {
        return Err(CompendiumError::InheritOverflow(bits.len()));
    }
    Ok(bits
        .iter()
        .fold(0u32, |acc, &bit| (acc << 1) | u32::from(bit != 0)))
}

/// Encode which elements a demon can pass on as a bitmask.
///
/// Every element of `elements` starts inheritable; each entry of
/// `disinherited` clears its bit. The first element is the most
/// significant bit.
///
/// # Errors
///
/// Returns `CompendiumError::UnknownElement` if a disinherited element is
/// not part of `elements`, attributed to `owner`.
///
/// # Examples
///
/// ```rust
/// use demon_compendium::codec::encode_inherit_bitmask;
/// use demon_compendium::Name;
///
/// let elements: Vec<Name> = ["phys", "fire", "ice"].into_iter().map(Name::new).collect();
/// let owner = Name::new("Pixie");
/// let mask = encode_inherit_bitmask(&owner, &[Name::new("fire")], &elements).unwrap();
/// assert_eq!(mask, 0b101);
/// ```
pub fn encode_inherit_bitmask(
    owner: &Name,
    disinherited: &[Name],
    elements: &[Name],
) -> Result<u32, CompendiumError> {
    let mut bits = vec![1u8; elements.len()];
    for element in disinherited {
        let pos = elements.iter().position(|e| e == element).ok_or_else(|| {
            CompendiumError::UnknownElement {
                owner: owner.clone(),
                element: element.clone(),
            }
        })?;
        bits[pos] = 0;
    }
    pack_inherit_bits(&bits)
}

/// Decode an inheritance bitmask into a binary vector.
///
/// The vector is zero padded on the left to `length`. Masks with more
/// significant bits than `length` yield a longer vector rather than
/// losing bits.
///
/// # Examples
///
/// ```rust
/// use demon_compendium::codec::decode_inherit_bitmask;
///
/// assert_eq!(decode_inherit_bitmask(0b101, 5), vec![0, 0, 1, 0, 1]);
/// ```
pub fn decode_inherit_bitmask(mask: u32, length: usize) -> Vec<u8> {
    let significant = (u32::BITS - mask.leading_zeros()) as usize;
    let width = length.max(significant);
    (0..width)
        .rev()
        .map(|bit| if bit < 32 && (mask >> bit) & 1 == 1 { 1 } else { 0 })
        .collect()
}

/// Turn an affinity string (`o` = inheritable) into a binary vector.
pub fn decode_affinities(codes: &str) -> Vec<u8> {
    codes.chars().map(|c| u8::from(c == 'o')).collect()
}

/// `points / 2.5`, truncated toward zero. `None` on overflow.
fn severity_points(points: i32) -> Option<i32> {
    points.checked_mul(2).map(|doubled| doubled / 5)
}

/// Pack a raw resist code as `(category << 10) | severity`.
///
/// The category is `code / 1000`. The severity is `(code % 1000) / 2.5`
/// truncated, unless `modifier / 2.5` truncates to a non-zero value, in
/// which case the modifier wins.
///
/// # Errors
///
/// Returns `CompendiumError::InvalidPackedCode` for negative codes, for
/// modifiers that overflow, and for severities that do not fit in the
/// severity bits.
///
/// # Examples
///
/// ```rust
/// use demon_compendium::codec::{pack_resist, unpack_resist};
///
/// let packed = pack_resist(2050, None).unwrap();
/// assert_eq!(packed, (2 << 10) | 20);
/// assert_eq!(unpack_resist(packed), (2, 20));
///
/// assert_eq!(pack_resist(2050, Some(125)).unwrap(), (2 << 10) | 50);
/// ```
pub fn pack_resist(code: i32, modifier: Option<i32>) -> Result<u32, CompendiumError> {
    if code < 0 {
        return Err(CompendiumError::InvalidPackedCode {
            code,
            reason: "negative codes have no category",
        });
    }
    let category = code / CATEGORY_SCALE;
    let severity = match modifier.map(severity_points) {
        Some(None) => {
            return Err(CompendiumError::InvalidPackedCode {
                code,
                reason: "severity modifier overflows",
            })
        }
        Some(Some(points)) if points != 0 => points,
        _ => (code % CATEGORY_SCALE) * 2 / 5,
    };
    if !(0..=SEVERITY_MASK as i32).contains(&severity) {
        return Err(CompendiumError::InvalidPackedCode {
            code,
            reason: "severity does not fit in ten bits",
        });
    }
    Ok(((category as u32) << CATEGORY_SHIFT) | severity as u32)
}

/// Split a packed resist value into `(category, severity)`.
pub fn unpack_resist(packed: u32) -> (u32, u32) {
    (packed >> CATEGORY_SHIFT, packed & SEVERITY_MASK)
}

/// Decode and pack a resist code string.
///
/// `modifiers[i]`, when present, overrides the severity of column `i`.
pub fn pack_resist_codes(
    codes: &str,
    alphabet: &ResistAlphabet,
    modifiers: Option<&[i32]>,
) -> Result<Vec<u32>, CompendiumError> {
    codes
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let code = decode_resist_code(c, alphabet)?;
            pack_resist(code, modifiers.and_then(|m| m.get(i)).copied())
        })
        .collect()
}

/// Estimate the base price of a demon from its stats.
///
/// Sums the stats from index 2 on into `x`, then computes
/// `floor((floor(pcoeff * x^3 / 1000) + 1300) * 0.75)`.
///
/// # Errors
///
/// Returns `CompendiumError::PriceOverflow` if the estimate does not fit
/// in an `i64`.
///
/// # Examples
///
/// ```rust
/// use demon_compendium::codec::estimate_base_price;
///
/// assert_eq!(estimate_base_price(&[100, 100, 1, 1, 1, 1, 1], 96), Ok(984));
/// ```
pub fn estimate_base_price(stats: &[i32], pcoeff: i32) -> Result<i64, CompendiumError> {
    let x: i64 = stats.iter().skip(2).map(|&s| i64::from(s)).sum();
    let overflow = CompendiumError::PriceOverflow { pcoeff, stat_sum: x };
    let scaled = x
        .checked_pow(3)
        .and_then(|cube| cube.checked_mul(i64::from(pcoeff)))
        .ok_or_else(|| overflow.clone())?
        .div_euclid(1000);
    scaled
        .checked_add(1300)
        .and_then(|base| base.checked_mul(3))
        .map(|price| price.div_euclid(4))
        .ok_or(overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet() -> ResistAlphabet {
        ResistAlphabet::from([('-', 100), ('w', 1000), ('s', -500), ('n', 0)])
    }

    #[test]
    fn test_decode_resist_codes() {
        assert_eq!(decode_resist_codes("ws", &alphabet()), Ok(vec![1000, -500]));
    }

    #[test]
    fn test_decode_unknown_code() {
        assert_eq!(
            decode_resist_codes("wz", &alphabet()),
            Err(CompendiumError::UnknownCode { code: 'z' })
        );
    }

    #[test]
    fn test_summarize_resists() {
        let mut physical = [100; PHYSICAL_RESISTS];
        physical[0] = 800;
        physical[7] = 50;
        physical[8] = 0;
        let mut magic = [100; MAGIC_RESISTS];
        magic[4] = 500;
        magic[12] = -100;

        let summary = summarize_resists(&physical, &magic);
        assert_eq!(summary[0], 200.0);
        assert_eq!(summary[1], 50.0);
        assert!((summary[2] - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary[10], 200.0);
        assert_eq!(summary[13], -100.0);
    }

    #[test]
    fn test_inherit_bitmask_round_trip() {
        let length = 8;
        for x in 0u32..(1 << length) {
            let bits = decode_inherit_bitmask(x, length);
            assert_eq!(bits.len(), length);
            assert_eq!(pack_inherit_bits(&bits), Ok(x));
        }
    }

    #[test]
    fn test_encode_unknown_element() {
        let elements = vec![Name::new("fire")];
        let result = encode_inherit_bitmask(&Name::new("Pixie"), &[Name::new("elec")], &elements);
        assert!(matches!(result, Err(CompendiumError::UnknownElement { .. })));
    }

    #[test]
    fn test_decode_wider_than_length() {
        assert_eq!(decode_inherit_bitmask(0b1001, 2), vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_pack_inherit_overflow() {
        let bits = vec![1u8; 33];
        assert_eq!(
            pack_inherit_bits(&bits),
            Err(CompendiumError::InheritOverflow(33))
        );
    }

    #[test]
    fn test_pack_resist_bit_exact() {
        for code in [0, 100, 999, 1000, 1250, 2999, 5500] {
            let packed = pack_resist(code, None).unwrap();
            let (category, severity) = unpack_resist(packed);
            assert_eq!(category as i32, code / 1000);
            assert_eq!(severity as i32, (code % 1000) * 2 / 5);
            assert_eq!((category << CATEGORY_SHIFT) | severity, packed);
        }
    }

    #[test]
    fn test_pack_resist_zero_modifier_falls_back() {
        assert_eq!(pack_resist(1100, Some(0)), pack_resist(1100, None));
        assert_eq!(pack_resist(1100, Some(2)), pack_resist(1100, None));
    }

    #[test]
    fn test_pack_resist_rejects_negative() {
        assert!(pack_resist(-500, None).is_err());
        assert!(pack_resist(1000, Some(5000)).is_err());
    }

    #[test]
    fn test_pack_resist_modifier_overflow() {
        assert_eq!(
            pack_resist(1100, Some(i32::MAX)),
            Err(CompendiumError::InvalidPackedCode {
                code: 1100,
                reason: "severity modifier overflows"
            })
        );
    }

    #[test]
    fn test_affinities() {
        assert_eq!(decode_affinities("o-o"), vec![1, 0, 1]);
        assert_eq!(pack_inherit_bits(&decode_affinities("o-o")), Ok(0b101));
    }

    #[test]
    fn test_estimate_base_price() {
        // x = 10 + 10 = 20, 96 * 8000 / 1000 = 768, (768 + 1300) * 0.75 = 1551
        assert_eq!(estimate_base_price(&[50, 50, 10, 10], 96), Ok(1551));
    }

    #[test]
    fn test_estimate_base_price_overflow() {
        assert_eq!(
            estimate_base_price(&[1, 1, 600_000], 96),
            Err(CompendiumError::PriceOverflow {
                pcoeff: 96,
                stat_sum: 600_000
            })
        );
    }
}
