use agora_core::DEFAULT_LOCALE;
use agora_core::LOCALES;

/// Active language for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale(&'static str);

impl Default for Locale {
    fn default() -> Self {
        Self(DEFAULT_LOCALE)
    }
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
    /// Supported locale matching a language tag by its primary subtag.
    pub fn supported(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        LOCALES.iter().find(|l| **l == primary).map(|l| Self(*l))
    }
    /// Explicit header first, then `Accept-Language` by weight, then the default.
    pub fn resolve(explicit: Option<&str>, accept: Option<&str>) -> Self {
        explicit
            .and_then(Self::supported)
            .or_else(|| accept.and_then(Self::negotiate))
            .unwrap_or_default()
    }
    fn negotiate(accept: &str) -> Option<Self> {
        let mut ranges = accept
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let tag = parts.next()?.trim();
                let q = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                    .unwrap_or(1.0);
                Some((tag, q))
            })
            .filter(|(_, q)| *q > 0.0)
            .collect::<Vec<_>>();
        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranges.into_iter().find_map(|(tag, _)| Self::supported(tag))
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}
