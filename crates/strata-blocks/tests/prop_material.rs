use proptest::prelude::*;
use strata_blocks::Material;

#[derive(serde::Deserialize)]
struct Holder {
    m: Material,
}

proptest! {
    // serde names and FromStr names agree for every material
    #[test]
    fn serde_and_fromstr_agree(idx in 0usize..Material::ALL.len()) {
        let m = Material::ALL[idx];
        let doc = format!("m = \"{}\"", m.name());
        let parsed: Holder = toml::from_str(&doc).unwrap();
        prop_assert_eq!(parsed.m, m);
        prop_assert_eq!(m.name().parse::<Material>().unwrap(), m);
    }

    // bytes outside the table never decode
    #[test]
    fn from_byte_rejects_out_of_range(b in (Material::ALL.len() as u8)..=u8::MAX) {
        prop_assert!(Material::from_byte(b).is_none());
    }
}
