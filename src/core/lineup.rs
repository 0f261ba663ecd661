use crate::domain::model::ArtistName;
use regex::Regex;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::OnceLock;

fn parenthetical() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s\(.+\)").expect("static regex"))
}

fn leading_article() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^the\s").expect("static regex"))
}

/// Drops duplicate elements and hands back the same kind of collection.
/// Keeps the first occurrence of each element.
pub fn unique<C>(content: C) -> C
where
    C: IntoIterator + FromIterator<<C as IntoIterator>::Item>,
    C::Item: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    content
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Strips ` (...)` suffixes such as country tags and trims whitespace.
pub fn normalize_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    parenthetical().replace(&collapsed, "").trim().to_string()
}

/// Case-insensitive key with a leading "the " removed.
pub fn sort_key(name: &str) -> String {
    let lower = name.to_lowercase();
    leading_article().replace(&lower, "").trim().to_string()
}

/// Normalizes, deduplicates and sorts scraped names into a lineup.
pub fn prepare_lineup<I, S>(raw_names: I) -> Vec<ArtistName>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let normalized: Vec<ArtistName> = raw_names
        .into_iter()
        .map(|raw| normalize_name(raw.as_ref()))
        .filter(|name| !name.is_empty())
        .collect();

    let mut names = unique(normalized);
    names.sort_by_cached_key(|name| (sort_key(name), name.clone()));
    names
}
