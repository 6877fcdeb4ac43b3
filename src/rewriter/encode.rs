use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

pub fn encode_uri(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('%') {
        out.extend(utf8_percent_encode(&rest[..pos], URI));
        let tail = &rest[pos..];
        if is_escape(tail.as_bytes()) {
            out.push_str(&tail[..3]);
            rest = &tail[3..];
        } else {
            out.push_str("%25");
            rest = &tail[1..];
        }
    }
    out.extend(utf8_percent_encode(rest, URI));
    out
}

fn is_escape(bytes: &[u8]) -> bool {
    bytes.len() >= 3 && bytes[1].is_ascii_hexdigit() && bytes[2].is_ascii_hexdigit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_characters_stay_literal() {
        assert_eq!(
            encode_uri("https://a.test/x/y.js?q=1&r=(2)#top"),
            "https://a.test/x/y.js?q=1&r=(2)#top"
        );
    }

    #[test]
    fn spaces_and_unicode_are_encoded() {
        assert_eq!(encode_uri("my files/café.png"), "my%20files/caf%C3%A9.png");
        assert_eq!(encode_uri("a\"b<c>"), "a%22b%3Cc%3E");
    }

    #[test]
    fn existing_escapes_are_preserved() {
        assert_eq!(encode_uri("my%20files/a.png"), "my%20files/a.png");
        assert_eq!(encode_uri(&encode_uri("x y")), "x%20y");
        assert_eq!(encode_uri("100%"), "100%25");
        assert_eq!(encode_uri("%zz"), "%25zz");
    }
}
