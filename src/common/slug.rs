/// Convert a display name to an identifier-safe slug, using `fallback` when
/// the name has no sluggable characters.
pub fn slugify(title: &str, fallback: &str) -> String {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Generate a slug for `title` that `taken` does not report as in use,
/// appending numeric suffixes when needed.
pub fn unique_slug(title: &str, fallback: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = slugify(title, fallback);
    if !taken(&base) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
