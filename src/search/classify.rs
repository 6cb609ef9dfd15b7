//! Keyword-based category classification.
//!
//! A deliberate heuristic: cheap and explainable. It lives behind this
//! single function so it can be swapped for a learned classifier without
//! touching the aggregator or ranker.

/// Category assigned when no keyword list matches.
pub const GENERAL_CATEGORY: &str = "general";

/// Category keyword lists, checked in order; first match wins.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("news", &["news", "новости", "сми", "медиа", "лента"]),
    (
        "technology",
        &["tech", "технологии", "ит", "программирование", "ai", "разработка"],
    ),
    (
        "business",
        &["business", "бизнес", "предпринимательство", "стартап"],
    ),
    (
        "education",
        &["education", "образование", "курсы", "обучение", "знания"],
    ),
    (
        "entertainment",
        &["entertainment", "развлечения", "юмор", "мемы", "fun"],
    ),
    ("sport", &["sport", "спорт", "фитнес", "футбол", "хоккей"]),
    ("games", &["games", "игры", "gaming", "геймер", "game"]),
    ("music", &["music", "музыка", "песни", "аудио", "sound"]),
    ("movies", &["movies", "кино", "фильмы", "сериалы", "cinema"]),
    ("travel", &["travel", "путешествия", "туризм", "страны"]),
    ("food", &["cooking", "кулинария", "рецепты", "еда", "food"]),
    ("fashion", &["fashion", "мода", "стиль", "одежда", "beauty"]),
    ("auto", &["auto", "авто", "машины", "cars", "мото"]),
    (
        "crypto",
        &["crypto", "криптовалюты", "bitcoin", "блокчейн", "defi"],
    ),
    ("finance", &["finance", "финансы", "инвестиции", "деньги"]),
    ("health", &["health", "здоровье", "медицина", "wellness"]),
    (
        "psychology",
        &["psychology", "психология", "саморазвитие", "мотивация"],
    ),
    (
        "politics",
        &["politics", "политика", "власть", "государство", "выборы"],
    ),
    ("science", &["science", "наука", "исследования", "физика"]),
    (
        "real-estate",
        &["realestate", "недвижимость", "жилье", "ипотека"],
    ),
];

/// Classify an entity from its title and description.
pub fn classify(title: &str, description: Option<&str>) -> String {
    let text = format!("{} {}", title, description.unwrap_or_default()).to_lowercase();

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            return (*category).to_string();
        }
    }

    GENERAL_CATEGORY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_title() {
        assert_eq!(classify("Crypto Signals", None), "crypto");
        assert_eq!(classify("Спорт и футбол", None), "sport");
    }

    #[test]
    fn test_classify_uses_description() {
        assert_eq!(
            classify("Вечерний дайджест", Some("юмор и мемы")),
            "entertainment"
        );
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify("GAMING HUB", None), "games");
    }

    #[test]
    fn test_classify_unknown_is_general() {
        assert_eq!(classify("Untitled 123", None), GENERAL_CATEGORY);
    }

    #[test]
    fn test_first_match_wins() {
        // "news" appears before "crypto" in the table
        assert_eq!(classify("Bitcoin news", None), "news");
    }
}
