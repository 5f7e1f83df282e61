// Evolution Client: Carpool Group Classifier
// CarpoolKeywords, fold, classify_groups, carpool_groups, get_carpool_groups
//
// A group is carpool-related when its case-folded subject contains at least
// one include keyword and no exclude keyword. Matching is plain substring
// (not whole-word), accent-sensitive, and uses full Unicode case folding.

use log::debug;

use crate::atoms::constants::{CARPOOL_EXCLUDE_KEYWORDS, CARPOOL_INCLUDE_KEYWORDS};
use crate::atoms::error::EvolutionResult;
use crate::atoms::traits::GroupSource;
use crate::atoms::types::Group;

// ── Folding ────────────────────────────────────────────────────────────

/// Locale-agnostic Unicode default case folding ("ß" → "ss", "Á" → "á").
pub fn fold(text: &str) -> String {
    caseless::default_case_fold_str(text)
}

// ── Keyword Sets ───────────────────────────────────────────────────────

/// Include/exclude keyword sets, stored already folded.
#[derive(Debug, Clone, PartialEq)]
pub struct CarpoolKeywords {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Default for CarpoolKeywords {
    fn default() -> Self {
        Self::new(CARPOOL_INCLUDE_KEYWORDS, CARPOOL_EXCLUDE_KEYWORDS)
    }
}

impl CarpoolKeywords {
    /// Blank keywords are dropped: an empty needle would match every subject.
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        CarpoolKeywords {
            include: fold_all(include),
            exclude: fold_all(exclude),
        }
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Exclusion is checked after inclusion and always wins.
    pub fn matches(&self, subject: &str) -> bool {
        if subject.is_empty() {
            return false;
        }
        let subject = fold(subject);
        self.include.iter().any(|w| subject.contains(w.as_str()))
            && !self.exclude.iter().any(|w| subject.contains(w.as_str()))
    }

    pub fn matches_group(&self, group: &Group) -> bool {
        self.matches(&group.subject)
    }
}

fn fold_all<I>(words: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| fold(w.as_ref().trim()))
        .filter(|w| !w.is_empty())
        .collect()
}

// ── Classification ─────────────────────────────────────────────────────

/// Keep the carpool groups, preserving input order.
pub fn classify_groups(groups: Vec<Group>, keywords: &CarpoolKeywords) -> Vec<Group> {
    let total = groups.len();
    let kept: Vec<Group> = groups
        .into_iter()
        .filter(|g| keywords.matches_group(g))
        .collect();
    debug!("[carpool] {} of {} groups look like carpool groups", kept.len(), total);
    kept
}

/// Borrowing variant of [`classify_groups`].
pub fn carpool_groups<'a>(
    groups: &'a [Group],
    keywords: &'a CarpoolKeywords,
) -> impl Iterator<Item = &'a Group> + 'a {
    groups.iter().filter(move |g| keywords.matches_group(g))
}

/// Classify `groups`, or the full list from `source` when none were given.
/// `Some(vec![])` is classified as-is and never triggers a fetch; the Python
/// tool this replaces refetched on an empty list.
pub async fn get_carpool_groups<S>(
    source: &S,
    groups: Option<Vec<Group>>,
    keywords: &CarpoolKeywords,
) -> EvolutionResult<Vec<Group>>
where
    S: GroupSource + ?Sized,
{
    let groups = match groups {
        Some(groups) => groups,
        None => source.fetch_all_groups().await?,
    };
    Ok(classify_groups(groups, keywords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::error::EvolutionError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn group(subject: &str) -> Group {
        serde_json::from_value(serde_json::json!({
            "id": format!("{}@g.us", subject.len()),
            "subject": subject,
        }))
        .unwrap()
    }

    fn subjects(groups: &[Group]) -> Vec<&str> {
        groups.iter().map(|g| g.subject.as_str()).collect()
    }

    struct FixedSource {
        groups: Vec<Group>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GroupSource for FixedSource {
        async fn fetch_all_groups(&self) -> EvolutionResult<Vec<Group>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.groups.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl GroupSource for FailingSource {
        async fn fetch_all_groups(&self) -> EvolutionResult<Vec<Group>> {
            Err(EvolutionError::gateway(401, "Unauthorized"))
        }
    }

    #[test]
    fn classifies_the_reference_scenario() {
        let groups = vec![group("Carona Zona Sul"), group("Rota Solidaria LDO"), group("Futebol")];
        let kept = classify_groups(groups, &CarpoolKeywords::default());
        assert_eq!(subjects(&kept), vec!["Carona Zona Sul"]);
    }

    #[test]
    fn accented_subject_matches_regardless_of_case() {
        let kw = CarpoolKeywords::default();
        assert!(kw.matches("Rota Solidária"));
        assert!(kw.matches("ROTA SOLIDÁRIA"));
        // ASCII-only lowering would leave "Á" untouched and miss the keyword.
        assert_ne!("SOLIDÁRIA".to_ascii_lowercase(), "solidária");
        let only_accented = CarpoolKeywords::new(["solidária"], Vec::<String>::new());
        assert!(only_accented.matches("GRUPO SOLIDÁRIA"));
    }

    #[test]
    fn matching_is_accent_sensitive() {
        let kw = CarpoolKeywords::new(["solidária"], Vec::<String>::new());
        assert!(!kw.matches("Grupo Solidaria"));
    }

    #[test]
    fn full_case_folding_expands_sharp_s() {
        assert_eq!(fold("STRAßE"), "strasse");
        let kw = CarpoolKeywords::new(["strasse"], Vec::<String>::new());
        assert!(kw.matches("Mitfahrt Hauptstraße"));
    }

    #[test]
    fn exclusion_overrides_inclusion() {
        let kw = CarpoolKeywords::default();
        assert!(!kw.matches("Carona LDO"));
        assert!(!kw.matches("carona ldo"));
        assert!(kw.matches("Carona"));
    }

    #[test]
    fn keywords_match_as_substrings() {
        let kw = CarpoolKeywords::default();
        assert!(kw.matches("Caronas UFRJ"));
        assert!(kw.matches("Rotary Club"));
        // "ldo" inside a word still excludes.
        assert!(!kw.matches("Carona do Reinaldo"));
    }

    #[test]
    fn empty_subject_never_matches() {
        let kw = CarpoolKeywords::default();
        assert!(!kw.matches(""));
        let kept = classify_groups(vec![group(""), group("Vagas Centro")], &kw);
        assert_eq!(subjects(&kept), vec!["Vagas Centro"]);
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let kw = CarpoolKeywords::new(["", "  ", "Carona"], [""]);
        assert_eq!(kw.include(), ["carona"]);
        assert!(kw.exclude().is_empty());
        assert!(!kw.matches("Futebol"));
    }

    #[test]
    fn output_preserves_input_order() {
        let groups = vec![group("Vagas B"), group("Futebol"), group("Carona A"), group("Rota C")];
        let kept = classify_groups(groups.clone(), &CarpoolKeywords::default());
        assert_eq!(subjects(&kept), vec!["Vagas B", "Carona A", "Rota C"]);

        let kw = CarpoolKeywords::default();
        let borrowed: Vec<&str> = carpool_groups(&groups, &kw).map(|g| g.subject.as_str()).collect();
        assert_eq!(borrowed, subjects(&kept));
    }

    #[tokio::test]
    async fn fetches_only_when_no_groups_supplied() {
        let source = FixedSource {
            groups: vec![group("Carona Norte"), group("Churrasco")],
            calls: AtomicUsize::new(0),
        };
        let kw = CarpoolKeywords::default();

        let fetched = get_carpool_groups(&source, None, &kw).await.unwrap();
        assert_eq!(subjects(&fetched), vec!["Carona Norte"]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let supplied = get_carpool_groups(&source, Some(vec![group("Rota Leste")]), &kw).await.unwrap();
        assert_eq!(subjects(&supplied), vec!["Rota Leste"]);

        let empty = get_carpool_groups(&source, Some(vec![]), &kw).await.unwrap();
        assert!(empty.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let err = get_carpool_groups(&FailingSource, None, &CarpoolKeywords::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
    }
}
