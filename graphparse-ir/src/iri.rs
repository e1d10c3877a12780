//! RFC 3986 reference resolution
//!
//! Every backend resolves relative references through [`resolve`], so a
//! document's relative IRIs mean the same thing whatever its syntax.

use thiserror::Error;

/// IRI resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IriError {
    /// A relative reference was used where no base applies
    #[error("relative IRI <{0}> without a base")]
    NoBase(String),

    /// The base itself is relative
    #[error("base IRI <{0}> is not absolute")]
    RelativeBase(String),
}

/// Components of an IRI reference (RFC 3986 section 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Parts<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

fn scheme_of(iri: &str) -> Option<&str> {
    let end = iri.find(|c| matches!(c, ':' | '/' | '?' | '#'))?;
    if !iri[end..].starts_with(':') {
        return None;
    }
    let scheme = &iri[..end];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return None,
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

fn split(iri: &str) -> Parts<'_> {
    let scheme = scheme_of(iri);
    let mut rest = match scheme {
        Some(s) => &iri[s.len() + 1..],
        None => iri,
    };

    let fragment = rest.find('#').map(|pos| {
        let f = &rest[pos + 1..];
        rest = &rest[..pos];
        f
    });
    let query = rest.find('?').map(|pos| {
        let q = &rest[pos + 1..];
        rest = &rest[..pos];
        q
    });
    let authority = rest.strip_prefix("//").map(|after| {
        let end = after.find('/').unwrap_or(after.len());
        rest = &after[end..];
        &after[..end]
    });

    Parts {
        scheme,
        authority,
        path: rest,
        query,
        fragment,
    }
}

/// Whether `iri` carries a scheme
pub fn is_absolute(iri: &str) -> bool {
    scheme_of(iri).is_some()
}

/// Remove `.` and `..` segments from a path (RFC 3986 section 5.2.4)
pub fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::with_capacity(path.len());

    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") || input == "/.." {
            input = if input == "/.." { "/" } else { &input[3..] };
            match output.rfind('/') {
                Some(pos) => output.truncate(pos),
                None => output.clear(),
            }
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..]
                .find('/')
                .map(|p| p + start)
                .unwrap_or(input.len());
            output.push_str(&input[..end]);
            input = &input[end..];
        }
    }

    output
}

fn merge(base: &Parts<'_>, reference_path: &str) -> String {
    if base.authority.is_some() && base.path.is_empty() {
        format!("/{reference_path}")
    } else {
        match base.path.rfind('/') {
            Some(pos) => format!("{}{}", &base.path[..=pos], reference_path),
            None => reference_path.to_string(),
        }
    }
}

fn recompose(parts: &Parts<'_>, path: &str) -> String {
    let mut out = String::new();
    if let Some(scheme) = parts.scheme {
        out.push_str(scheme);
        out.push(':');
    }
    if let Some(authority) = parts.authority {
        out.push_str("//");
        out.push_str(authority);
    }
    out.push_str(path);
    if let Some(query) = parts.query {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = parts.fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Resolve `reference` against `base` (RFC 3986 section 5.2.2)
///
/// Absolute references are returned unchanged apart from dot-segment
/// removal. With an empty base, relative references are an error.
///
/// ```
/// use graphparse_ir::iri::resolve;
///
/// let base = "https://www.example.org/abc/def";
/// assert_eq!(resolve(base, "../#me").unwrap(), "https://www.example.org/#me");
/// assert_eq!(resolve(base, "xyz").unwrap(), "https://www.example.org/abc/xyz");
/// ```
pub fn resolve(base: &str, reference: &str) -> Result<String, IriError> {
    let r = split(reference);
    if r.scheme.is_some() {
        return Ok(recompose(&r, &remove_dot_segments(r.path)));
    }

    if base.is_empty() {
        return Err(IriError::NoBase(reference.to_string()));
    }
    let b = split(base);
    if b.scheme.is_none() {
        return Err(IriError::RelativeBase(base.to_string()));
    }

    let (authority, path, query) = if r.authority.is_some() {
        (r.authority, remove_dot_segments(r.path), r.query)
    } else if r.path.is_empty() {
        (b.authority, b.path.to_string(), r.query.or(b.query))
    } else if r.path.starts_with('/') {
        (b.authority, remove_dot_segments(r.path), r.query)
    } else {
        (b.authority, remove_dot_segments(&merge(&b, r.path)), r.query)
    };

    let target = Parts {
        scheme: b.scheme,
        authority,
        path: "",
        query,
        fragment: r.fragment,
    };
    Ok(recompose(&target, &path))
}

/// Resolve against an optional base, passing absolute IRIs through
pub fn resolve_opt(base: Option<&str>, reference: &str) -> Result<String, IriError> {
    match base {
        Some(base) => resolve(base, reference),
        None if is_absolute(reference) => Ok(reference.to_string()),
        None => Err(IriError::NoBase(reference.to_string())),
    }
}

/// The IRI with any fragment removed
pub fn strip_fragment(iri: &str) -> &str {
    match iri.find('#') {
        Some(pos) => &iri[..pos],
        None => iri,
    }
}
