/// Anything a search box can narrow down.
pub trait Searchable {
    fn search_values(&self) -> Vec<&str>;
}

/// Case-insensitive substring filter. Keeps the store's order; an empty term
/// keeps everything.
pub fn filter_view<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    if term.is_empty() {
        return items.iter().collect();
    }
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| matches_needle(*item, &needle))
        .collect()
}

fn matches_needle<T: Searchable>(item: &T, needle: &str) -> bool {
    item.search_values()
        .into_iter()
        .any(|v| v.to_lowercase().contains(needle))
}
