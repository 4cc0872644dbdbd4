/// Interpret a reply to a `[yes] no` prompt.
///
/// The default is yes: only `n` or `no` (any case, surrounding whitespace
/// ignored) decline. Empty input and anything else proceed.
pub fn parse_confirmation(input: &str) -> bool {
    let reply = input.trim();
    !(reply.eq_ignore_ascii_case("n") || reply.eq_ignore_ascii_case("no"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_defaults_to_yes() {
        assert!(parse_confirmation(""));
        assert!(parse_confirmation("   \n"));
    }

    #[test]
    fn yes_variants_proceed() {
        for reply in ["yes", "y", "YES", "Y", "Yes", " y\n"] {
            assert!(parse_confirmation(reply), "{reply:?} should proceed");
        }
    }

    #[test]
    fn no_variants_decline() {
        for reply in ["no", "n", "NO", "N", "No", "  no  \r\n"] {
            assert!(!parse_confirmation(reply), "{reply:?} should decline");
        }
    }

    #[test]
    fn other_replies_proceed() {
        assert!(parse_confirmation("maybe"));
        assert!(parse_confirmation("nope"));
    }
}
