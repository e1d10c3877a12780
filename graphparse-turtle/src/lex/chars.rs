//! Character classes of the Turtle grammar (the `PN_*` productions).

/// Non-ASCII ranges of `PN_CHARS_BASE`
const NAME_START_RANGES: &[(char, char)] = &[
    ('\u{C0}', '\u{D6}'),
    ('\u{D8}', '\u{F6}'),
    ('\u{F8}', '\u{2FF}'),
    ('\u{370}', '\u{37D}'),
    ('\u{37F}', '\u{1FFF}'),
    ('\u{200C}', '\u{200D}'),
    ('\u{2070}', '\u{218F}'),
    ('\u{2C00}', '\u{2FEF}'),
    ('\u{3001}', '\u{D7FF}'),
    ('\u{F900}', '\u{FDCF}'),
    ('\u{FDF0}', '\u{FFFD}'),
    ('\u{10000}', '\u{EFFFF}'),
];

pub fn is_pn_chars_base(c: char) -> bool {
    c.is_ascii_alphabetic() || NAME_START_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
}

pub fn is_pn_chars_u(c: char) -> bool {
    c == '_' || is_pn_chars_base(c)
}

pub fn is_pn_chars(c: char) -> bool {
    matches!(c, '-' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
        || is_pn_chars_u(c)
}

/// First character of a local name
pub fn is_pn_local_start(c: char) -> bool {
    c == ':' || c.is_ascii_digit() || is_pn_chars_u(c)
}

/// Variable names in update `WHERE` patterns
pub fn is_varname_char(c: char) -> bool {
    c == '\u{B7}' || c.is_ascii_digit() || is_pn_chars_u(c)
}

pub fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Allowed unescaped between `<` and `>`
pub fn is_iri_char(c: char) -> bool {
    c > ' ' && !"<>\"{}|^`\\".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_characters() {
        assert!(is_pn_chars_base('é'));
        assert!(!is_pn_chars_base('_'));
        assert!(is_pn_chars_u('_'));
        assert!(is_pn_chars('-') && is_pn_chars('7'));
        assert!(!is_pn_chars('.'));
        assert!(is_pn_local_start('1') && is_pn_local_start(':'));
    }

    #[test]
    fn test_iri_characters() {
        assert!(is_iri_char('#'));
        assert!(!is_iri_char(' '));
        assert!(!is_iri_char('^'));
        assert!(!is_iri_char('\u{1}'));
    }
}
