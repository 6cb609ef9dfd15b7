//! Query expansion through a bidirectional synonym/translation table.
//!
//! Pure and deterministic: no external calls, same input gives the same
//! variant list, original query always first.

use std::collections::HashSet;

/// How a query variant was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantOrigin {
    Original,
    Synonym,
    Translation,
}

/// One expanded form of the user's query.
#[derive(Debug, Clone)]
pub struct QueryVariant {
    pub text: String,
    pub origin: VariantOrigin,
}

/// Term-to-equivalents table, applied bidirectionally.
///
/// A constructed value owned by the engine - never a global - so tests
/// can swap in their own tables.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: Vec<(String, Vec<String>)>,
}

impl SynonymTable {
    /// An empty table: expansion returns only the original query.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add one term with its equivalents.
    pub fn with<'a>(mut self, term: &str, equivalents: impl IntoIterator<Item = &'a str>) -> Self {
        self.entries.push((
            term.to_lowercase(),
            equivalents
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
        ));
        self
    }

    /// The built-in Russian/English table for common community topics.
    pub fn built_in() -> Self {
        Self::empty()
            .with("новости", ["news", "сми", "медиа", "лента"])
            .with("игры", ["games", "gaming", "геймер"])
            .with("музыка", ["music", "песни", "аудио"])
            .with("фильмы", ["movies", "кино", "cinema"])
            .with("спорт", ["sport", "fitness", "тренировки"])
            .with("криптовалюты", ["crypto", "bitcoin", "блокчейн"])
            .with("программирование", ["coding", "разработка", "dev"])
            .with("бизнес", ["business", "предпринимательство"])
            .with("образование", ["education", "обучение", "курсы"])
    }

    /// Expand a query into its deduplicated variant list.
    ///
    /// For every table term found as a case-insensitive substring of the
    /// query, one variant per equivalent is produced by substitution; the
    /// reverse substitution is applied when the query contains an
    /// equivalent. The original query is always element 0.
    pub fn expand(&self, query: &str) -> Vec<QueryVariant> {
        let normalized = query.to_lowercase();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(normalized.clone());

        let mut variants = vec![QueryVariant {
            text: query.to_string(),
            origin: VariantOrigin::Original,
        }];

        for (term, equivalents) in &self.entries {
            if normalized.contains(term.as_str()) {
                for equivalent in equivalents {
                    push_variant(
                        &mut variants,
                        &mut seen,
                        normalized.replace(term.as_str(), equivalent),
                        VariantOrigin::Synonym,
                    );
                }
            }

            for equivalent in equivalents {
                if normalized.contains(equivalent.as_str()) {
                    push_variant(
                        &mut variants,
                        &mut seen,
                        normalized.replace(equivalent.as_str(), term),
                        VariantOrigin::Translation,
                    );
                }
            }
        }

        variants
    }
}

fn push_variant(
    variants: &mut Vec<QueryVariant>,
    seen: &mut HashSet<String>,
    text: String,
    origin: VariantOrigin,
) {
    if seen.insert(text.clone()) {
        variants.push(QueryVariant { text, origin });
    }
}
