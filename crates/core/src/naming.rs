use uuid::Uuid;

/// Generate a resource name from `prefix` followed by `suffix_len` random
/// lowercase hex characters, e.g. `rg-aci-3f9a1c`.
///
/// The suffix is drawn from a v4 UUID, so at most 32 characters are added.
pub fn random_resource_name(prefix: &str, suffix_len: usize) -> String {
    let entropy = Uuid::new_v4().simple().to_string();
    let take = suffix_len.min(entropy.len());
    format!("{prefix}{}", &entropy[..take])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_prefix_and_length() {
        let name = random_resource_name("rg-aci-", 6);
        assert!(name.starts_with("rg-aci-"));
        assert_eq!(name.len(), "rg-aci-".len() + 6);
        assert!(
            name["rg-aci-".len()..]
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        );
    }

    #[test]
    fn names_differ() {
        assert_ne!(random_resource_name("aci-", 12), random_resource_name("aci-", 12));
    }

    #[test]
    fn suffix_is_capped() {
        assert_eq!(random_resource_name("x", 100).len(), 33);
        assert_eq!(random_resource_name("x", 0), "x");
    }
}
