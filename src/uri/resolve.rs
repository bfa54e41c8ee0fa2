//! Reference resolution (RFC 3986 section 5.2).

use super::{Part, Uri, UriError};

impl Uri {
    /// Resolve `reference` against `self`.
    ///
    /// `self` must be absolute and hierarchical. A reference that carries its
    /// own scheme is returned with its dot segments removed.
    pub fn join(&self, reference: &Uri) -> Result<Uri, UriError> {
        if self.scheme.is_none() || self.opaque {
            return Err(UriError::NotHierarchical(self.serialized.clone()));
        }
        if reference.opaque {
            return Ok(reference.clone());
        }

        let fresh = |p: &Part| Part::escaped(p.raw.clone());
        let fresh_opt = |p: &Option<Part>| p.as_ref().map(fresh);

        let (scheme, userinfo, host, port, path, query) = if reference.scheme.is_some() {
            (
                reference.scheme.clone(),
                fresh_opt(&reference.userinfo),
                fresh_opt(&reference.host),
                reference.port,
                remove_dot_segments(&reference.path.raw),
                fresh_opt(&reference.query),
            )
        } else if reference.host.is_some() {
            (
                self.scheme.clone(),
                fresh_opt(&reference.userinfo),
                fresh_opt(&reference.host),
                reference.port,
                remove_dot_segments(&reference.path.raw),
                fresh_opt(&reference.query),
            )
        } else {
            let (path, query) = if reference.path.raw.is_empty() {
                let query = if reference.query.is_some() {
                    fresh_opt(&reference.query)
                } else {
                    fresh_opt(&self.query)
                };
                (self.path.raw.clone(), query)
            } else if reference.path.raw.starts_with('/') {
                (
                    remove_dot_segments(&reference.path.raw),
                    fresh_opt(&reference.query),
                )
            } else {
                (
                    remove_dot_segments(&self.merge(&reference.path.raw)),
                    fresh_opt(&reference.query),
                )
            };
            (
                self.scheme.clone(),
                fresh_opt(&self.userinfo),
                fresh_opt(&self.host),
                self.port,
                path,
                query,
            )
        };

        Ok(Uri::assemble(
            scheme,
            userinfo,
            host,
            port,
            Part::escaped(path),
            query,
            fresh_opt(&reference.fragment),
            false,
            self.charset,
        ))
    }

    /// Parse `reference` as an escaped URI in this URI's charset and resolve it.
    pub fn join_str(&self, reference: &str) -> Result<Uri, UriError> {
        let reference = Uri::new(reference, true, self.charset.name())?;
        self.join(&reference)
    }

    fn merge(&self, relative: &str) -> String {
        if self.host.is_some() && self.path.raw.is_empty() {
            return format!("/{relative}");
        }
        match self.path.raw.rfind('/') {
            Some(i) => format!("{}{}", &self.path.raw[..=i], relative),
            None => relative.to_string(),
        }
    }
}

/// Remove `.` and `..` segments from a path.
pub(crate) fn remove_dot_segments(path: &str) -> String {
    fn pop_segment(out: &mut String) {
        match out.rfind('/') {
            Some(i) => out.truncate(i),
            None => out.clear(),
        }
    }

    let mut out = String::with_capacity(path.len());
    let mut input = path;
    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_segment(&mut out);
        } else if input == "/.." {
            input = "/";
            pop_segment(&mut out);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..]
                .find('/')
                .map(|i| i + start)
                .unwrap_or(input.len());
            out.push_str(&input[..end]);
            input = &input[end..];
        }
    }
    out
}
