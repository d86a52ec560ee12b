/// Derive a URL-safe slug from a component title: lowercase, runs of
/// non-alphanumeric characters collapsed to a single `-`, leading and
/// trailing separators trimmed.
///
/// Uniqueness is not handled here -- the database enforces it with a
/// unique index, and `ComponentRepo::create` retries with a numeric
/// suffix on collision.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_sep = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep && !slug.is_empty() {
            slug.push('-');
            last_was_sep = true;
        }
    }
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Slug candidate for the Nth collision-retry attempt: the base slug
/// itself for attempt 0, then `base-1`, `base-2`, ...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Animated Button"), "animated-button");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("Hero -- Section!!"), "hero-section");
    }

    #[test]
    fn test_slugify_trims_separators() {
        assert_eq!(slugify("  Card  "), "card");
        assert_eq!(slugify("*Modal*"), "modal");
    }

    #[test]
    fn test_slugify_keeps_digits() {
        assert_eq!(slugify("Grid 2x2 Layout"), "grid-2x2-layout");
    }

    #[test]
    fn test_slugify_non_ascii_dropped() {
        assert_eq!(slugify("Café Menü"), "caf-men");
    }

    #[test]
    fn test_slug_candidate_sequence() {
        assert_eq!(slug_candidate("animated-button", 0), "animated-button");
        assert_eq!(slug_candidate("animated-button", 1), "animated-button-1");
        assert_eq!(slug_candidate("animated-button", 2), "animated-button-2");
    }
}
