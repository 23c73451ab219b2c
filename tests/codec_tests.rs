use demon_compendium::codec::*;
use demon_compendium::{CompendiumError, Name};

#[test]
fn test_decode_resist_string() {
    let alphabet = ResistAlphabet::from([('w', 1000), ('s', -500)]);

    assert_eq!(decode_resist_codes("ws", &alphabet), Ok(vec![1000, -500]));
    assert_eq!(
        decode_resist_codes("wz", &alphabet),
        Err(CompendiumError::UnknownCode { code: 'z' })
    );
}

#[test]
fn test_inherit_bitmask_is_lossless() {
    let elements: Vec<Name> = ["phys", "fire", "ice", "elec", "force"]
        .into_iter()
        .map(Name::new)
        .collect();
    let owner = Name::new("Pixie");

    for mask in 0..(1u32 << elements.len()) {
        let bits = decode_inherit_bitmask(mask, elements.len());
        assert_eq!(bits.len(), elements.len());
        assert_eq!(pack_inherit_bits(&bits), Ok(mask));

        let disinherited: Vec<Name> = elements
            .iter()
            .zip(&bits)
            .filter(|(_, bit)| **bit == 0)
            .map(|(e, _)| e.clone())
            .collect();
        assert_eq!(
            encode_inherit_bitmask(&owner, &disinherited, &elements),
            Ok(mask)
        );
    }
}

#[test]
fn test_unknown_disinherit_element() {
    let elements = vec![Name::new("phys")];
    assert_eq!(
        encode_inherit_bitmask(&Name::new("Pixie"), &[Name::new("void")], &elements),
        Err(CompendiumError::UnknownElement {
            owner: Name::new("Pixie"),
            element: Name::new("void")
        })
    );
}

#[test]
fn test_summary_groups_columns() {
    let mut physical = [100; PHYSICAL_RESISTS];
    physical[0] = 30;
    physical[7] = 0;
    let mut magic = [100; MAGIC_RESISTS];
    magic[4] = 200;
    magic[12] = 50;

    let summary = summarize_resists(&physical, &magic);
    assert_eq!(summary[0], 90.0);
    assert_eq!(summary[1], 0.0);
    assert_eq!(summary[10], 125.0);
    assert_eq!(summary[13], 50.0);
}

#[test]
fn test_packed_code_limits() {
    assert!(matches!(
        pack_resist(-1, None),
        Err(CompendiumError::InvalidPackedCode { code: -1, .. })
    ));
    assert!(pack_resist(1000, Some(5000)).is_err());
    assert_eq!(unpack_resist(pack_resist(4999, None).unwrap()), (4, 399));
}
