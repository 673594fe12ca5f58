//! Lexical rules of the reference grammar.
//!
//! ```text
//! reference  := [ registry "/" ] repository [ ":" tag | "@" digest ]
//! registry   := domain [ ":" port ]
//! domain     := label ( "." label )+
//! repository := component ( "/" component )*
//! digest     := algorithm ":" hex{32,}
//! ```
//!
//! Each rule looks at a byte slice and returns how many bytes it consumed,
//! or a short reason when it cannot match. Rules only accept ASCII, so byte
//! offsets are always valid `str` boundaries.

/// Outcome of a single rule: bytes consumed, or why the rule failed.
pub(crate) type Rule = Result<usize, &'static str>;

const MAX_LABEL_LEN: usize = 63;
const MAX_TAG_LEN: usize = 128;
const MIN_DIGEST_HEX_LEN: usize = 32;

/// Components of a reference, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Parts<'a> {
    pub registry: Option<&'a str>,
    pub repository: &'a str,
    pub suffix: Option<Suffix<'a>>,
}

/// The optional `:tag` or `@digest` trailer, without its delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Suffix<'a> {
    Tag(&'a str),
    Digest(&'a str),
}

/// Matches a complete reference. Trailing input is an error.
pub(crate) fn reference(input: &str) -> Result<Parts<'_>, &'static str> {
    if input.is_empty() {
        return Err("empty reference");
    }

    let (registry, rest) = split_registry(input);
    if rest.is_empty() {
        return Err("missing repository after registry");
    }
    let (repository, tail) = rest.split_at(repository(rest.as_bytes())?);

    Ok(Parts {
        registry,
        repository,
        suffix: suffix(tail)?,
    })
}

/// Splits off the registry host when the first path segment is a domain.
///
/// Only a segment with an internal dot counts: `localhost/app` and
/// `myregistry:5000/app` keep their first segment in the repository.
pub(crate) fn split_registry(input: &str) -> (Option<&str>, &str) {
    match input.split_once('/') {
        Some((head, rest)) if is_registry(head) => (Some(head), rest),
        _ => (None, input),
    }
}

fn is_registry(head: &str) -> bool {
    let (host, number) = match head.split_once(':') {
        Some((host, number)) => (host, Some(number)),
        None => (head, None),
    };
    matches!(domain(host.as_bytes()), Ok(len) if len == host.len())
        && number.is_none_or(|n| matches!(port(n.as_bytes()), Ok(len) if len == n.len()))
}

/// `label ( "." label )+`
pub(crate) fn domain(s: &[u8]) -> Rule {
    let mut pos = label(s)?;
    let mut labels = 1;
    while s.get(pos) == Some(&b'.') {
        pos += 1 + label(&s[pos + 1..])?;
        labels += 1;
    }
    if labels < 2 {
        return Err("registry host must contain a dot");
    }
    Ok(pos)
}

fn label(s: &[u8]) -> Rule {
    if !s.first().is_some_and(u8::is_ascii_alphanumeric) {
        return Err("domain label must start with a letter or digit");
    }
    let len = s
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
        .count();
    if s[len - 1] == b'-' {
        return Err("domain label must not end with a hyphen");
    }
    if len > MAX_LABEL_LEN {
        return Err("domain label longer than 63 characters");
    }
    Ok(len)
}

pub(crate) fn port(s: &[u8]) -> Rule {
    match s.iter().take_while(|b| b.is_ascii_digit()).count() {
        0 => Err("registry port must be numeric"),
        len => Ok(len),
    }
}

/// `component ( "/" component )*`
pub(crate) fn repository(s: &[u8]) -> Rule {
    let mut pos = path_component(s)?;
    while s.get(pos) == Some(&b'/') {
        pos += 1 + path_component(&s[pos + 1..])?;
    }
    Ok(pos)
}

/// Alphanumeric runs joined by single hyphens.
pub(crate) fn path_component(s: &[u8]) -> Rule {
    let mut pos = alnum_run(s);
    if pos == 0 {
        return Err("repository segment must start with a letter or digit");
    }
    while s.get(pos) == Some(&b'-') {
        let run = alnum_run(&s[pos + 1..]);
        if run == 0 {
            return Err("repository segment hyphens must sit between letters or digits");
        }
        pos += 1 + run;
    }
    Ok(pos)
}

pub(crate) fn tag(s: &[u8]) -> Rule {
    if !s.first().is_some_and(|b| is_word(*b)) {
        return Err("tag must start with a word character");
    }
    let len = s
        .iter()
        .take_while(|b| is_word(**b) || matches!(**b, b'.' | b'-'))
        .count();
    if len > MAX_TAG_LEN {
        return Err("tag longer than 128 characters");
    }
    Ok(len)
}

/// `algorithm ":" hex{32,}`
pub(crate) fn digest(s: &[u8]) -> Rule {
    let mut pos = algorithm(s)?;
    if s.get(pos) != Some(&b':') {
        return Err("digest must have the form `algorithm:hex`");
    }
    pos += 1;
    let hex = s[pos..].iter().take_while(|b| b.is_ascii_hexdigit()).count();
    if hex < MIN_DIGEST_HEX_LEN {
        return Err("digest value needs at least 32 hex digits");
    }
    Ok(pos + hex)
}

/// Letter-led components joined by `-`, `_`, `+` or `.`, e.g. `sha256`
/// or `multihash+base58`.
pub(crate) fn algorithm(s: &[u8]) -> Rule {
    let mut pos = algorithm_component(s)?;
    while s.get(pos).is_some_and(|&b| matches!(b, b'-' | b'_' | b'+' | b'.')) {
        pos += 1 + algorithm_component(&s[pos + 1..])?;
    }
    Ok(pos)
}

fn algorithm_component(s: &[u8]) -> Rule {
    if !s.first().is_some_and(u8::is_ascii_alphabetic) {
        return Err("digest algorithm components must start with a letter");
    }
    Ok(1 + alnum_run(&s[1..]))
}

fn suffix(tail: &str) -> Result<Option<Suffix<'_>>, &'static str> {
    if tail.is_empty() {
        return Ok(None);
    }
    if let Some(value) = tail.strip_prefix(':') {
        let len = tag(value.as_bytes())?;
        return match value.as_bytes().get(len).copied() {
            None => Ok(Some(Suffix::Tag(value))),
            Some(b'@') => Err("tag and digest are mutually exclusive"),
            Some(_) => Err("unexpected characters after tag"),
        };
    }
    if let Some(value) = tail.strip_prefix('@') {
        let len = digest(value.as_bytes())?;
        if len != value.len() {
            return Err("unexpected characters after digest");
        }
        return Ok(Some(Suffix::Digest(value)));
    }
    Err("expected `:tag` or `@digest` after repository")
}

fn alnum_run(s: &[u8]) -> usize {
    s.iter().take_while(|b| b.is_ascii_alphanumeric()).count()
}

const fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_registry_requires_dot() {
        assert_eq!(
            split_registry("registry.example.com/ns/app"),
            (Some("registry.example.com"), "ns/app")
        );
        assert_eq!(split_registry("ns/app"), (None, "ns/app"));
        assert_eq!(split_registry("localhost/app"), (None, "localhost/app"));
        assert_eq!(split_registry("app"), (None, "app"));
    }

    #[test]
    fn split_registry_with_port() {
        assert_eq!(
            split_registry("my.registry.com:5000/app"),
            (Some("my.registry.com:5000"), "app")
        );
        assert_eq!(
            split_registry("localhost:5000/app"),
            (None, "localhost:5000/app")
        );
        assert_eq!(split_registry("my.registry.com:/app"), (None, "my.registry.com:/app"));
        assert_eq!(split_registry("my.registry.com:50a/app"), (None, "my.registry.com:50a/app"));
    }

    #[test]
    fn domain_labels() {
        assert_eq!(domain(b"a.b"), Ok(3));
        assert_eq!(domain(b"xn--p1ai.example"), Ok(16));
        assert!(domain(b"example").is_err());
        assert!(domain(b"-a.b").is_err());
        assert!(domain(b"a-.b").is_err());
        assert!(domain(b"a..b").is_err());

        let long = format!("{}.com", "a".repeat(64));
        assert!(domain(long.as_bytes()).is_err());
        let max = format!("{}.com", "a".repeat(63));
        assert_eq!(domain(max.as_bytes()), Ok(max.len()));
    }

    #[test]
    fn path_component_hyphens() {
        assert_eq!(path_component(b"hello-world"), Ok(11));
        assert_eq!(path_component(b"a"), Ok(1));
        assert_eq!(path_component(b"app:v1"), Ok(3));
        assert!(path_component(b"-app").is_err());
        assert!(path_component(b"app-").is_err());
        assert!(path_component(b"app--x").is_err());
        assert!(path_component(b"").is_err());
    }

    #[test]
    fn repository_stops_at_suffix() {
        assert_eq!(repository(b"ns/app:v1"), Ok(6));
        assert_eq!(repository(b"a/b/c@sha256"), Ok(5));
        assert!(repository(b"ns//app").is_err());
        assert!(repository(b"ns/").is_err());
    }

    #[test]
    fn tag_length_limit() {
        let max = "t".repeat(128);
        assert_eq!(tag(max.as_bytes()), Ok(128));
        let over = "t".repeat(129);
        assert!(tag(over.as_bytes()).is_err());
        assert_eq!(tag(b"_v1.0-rc"), Ok(8));
        assert!(tag(b".v1").is_err());
        assert!(tag(b"-v1").is_err());
    }

    #[test]
    fn digest_rules() {
        let hex = "0123456789abcdef".repeat(2);
        assert_eq!(
            digest(format!("sha256:{hex}").as_bytes()),
            Ok(7 + hex.len())
        );
        assert!(digest(format!("sha256:{}", &hex[1..]).as_bytes()).is_err());
        assert!(digest(format!("256:{hex}").as_bytes()).is_err());
        assert!(digest(hex.as_bytes()).is_err());
        assert_eq!(algorithm(b"multihash+base58"), Ok(16));
        assert_eq!(algorithm(b"sha256.v2_x-y"), Ok(13));
        assert!(algorithm(b"sha256+").is_err());
        assert!(algorithm(b"sha256+1x").is_err());
    }

    #[test]
    fn reference_parts() {
        assert_eq!(
            reference("registry.example.com/ns/app:v1.0"),
            Ok(Parts {
                registry: Some("registry.example.com"),
                repository: "ns/app",
                suffix: Some(Suffix::Tag("v1.0")),
            })
        );
        assert_eq!(
            reference("app"),
            Ok(Parts {
                registry: None,
                repository: "app",
                suffix: None,
            })
        );
    }

    #[test]
    fn reference_failure_reasons() {
        let hex = "a".repeat(64);
        assert_eq!(reference(""), Err("empty reference"));
        assert_eq!(reference("a.b/"), Err("missing repository after registry"));
        assert_eq!(
            reference(&format!("app:v1@sha256:{hex}")),
            Err("tag and digest are mutually exclusive")
        );
        assert_eq!(
            reference(&format!("app@sha256:{hex}:v1")),
            Err("unexpected characters after digest")
        );
        assert_eq!(
            reference("app!"),
            Err("expected `:tag` or `@digest` after repository")
        );
    }
}
