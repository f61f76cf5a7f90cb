use std::collections::BTreeMap;

/// Multi-valued query parameters, keys kept in sorted order so everything derived from them
/// (filters, error lists, encoded links) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, Vec<String>>);

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw `a=1&a=2&b` query string. A leading `?` is ignored, `+` decodes to a space,
    /// and pairs whose percent-encoding is not valid UTF-8 are dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut out = Self::new();
        for seg in raw.strip_prefix('?').unwrap_or(raw).split('&') {
            if seg.is_empty() {
                continue;
            }
            let (k, v) = seg.split_once('=').unwrap_or((seg, ""));
            match (decode(k), decode(v)) {
                (Some(k), Some(v)) => out.append(k, v),
                _ => log::debug!("dropping undecodable query pair '{seg}'"),
            }
        }
        out
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Replaces every value of `key` with a single one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// First value for `key`, or `None` if the key is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|vs| vs.first()).map(String::as_str)
    }

    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.0.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, vs)| (k.as_str(), vs.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Percent-encodes back into `k=v&k=v` form, keys sorted.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut parts = Vec::new();
        for (k, vs) in &self.0 {
            for v in vs {
                parts.push(format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)));
            }
        }
        parts.join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.append(k, v);
        }
        out
    }
}

fn decode(s: &str) -> Option<String> {
    urlencoding::decode(&s.replace('+', " ")).ok().map(std::borrow::Cow::into_owned)
}
