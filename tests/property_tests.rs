use proptest::prelude::*;
use scrubsum::tracking::codec::{decode, encode, escape_name, unescape_name};
use scrubsum::tracking::{Digest, Manifest};
use scrubsum::utils::hash::{hash_bytes, hash_reader};
use scrubsum::utils::paths::bytes_to_path;

fn digest_strategy() -> impl Strategy<Value = Digest> {
    "[0-9a-f]{40}".prop_map(|hex| Digest::parse(hex.as_bytes()).unwrap())
}

fn name_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec("[a-zA-Z0-9_. \\\\\n\r-]{1,12}", 1..4)
        .prop_map(|parts| parts.join("/").into_bytes())
}

proptest! {
    #[test]
    fn test_manifest_round_trip(
        entries in prop::collection::vec((name_strategy(), digest_strategy()), 0..64)
    ) {
        let manifest: Manifest = entries
            .into_iter()
            .map(|(name, digest)| (bytes_to_path(&name), digest))
            .collect();

        let encoded = encode(&manifest);
        prop_assert_eq!(decode(&encoded), manifest);
    }

    #[test]
    fn test_encoding_is_canonical(
        entries in prop::collection::vec((name_strategy(), digest_strategy()), 0..32)
    ) {
        let manifest: Manifest = entries
            .into_iter()
            .map(|(name, digest)| (bytes_to_path(&name), digest))
            .collect();

        let once = encode(&manifest);
        let twice = encode(&decode(&once));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_escape_is_reversible(name in prop::collection::vec(any::<u8>(), 0..256)) {
        let escaped = escape_name(&name);
        prop_assert!(!escaped.contains(&b'\n'));
        prop_assert_eq!(unescape_name(&escaped), name);
    }

    #[test]
    fn test_hash_independent_of_buffer_size(
        data in prop::collection::vec(any::<u8>(), 0..20000),
        buffer_size in 1usize..9000
    ) {
        let streamed = hash_reader(data.as_slice(), buffer_size).unwrap();
        prop_assert_eq!(streamed, hash_bytes(&data));
    }
}
