// src/catalog/ranker.rs

//! Given the catalog and a set of query terms, ranks packages into three
//! ordered buckets and picks a unique winner, prompting on ambiguity.

use crate::error::{NawabsError, Result};
use crate::model::{CandidateSet, Package};
use crate::prompt::{PromptOutcome, Prompter};

/// Evaluate each term (case-insensitive, Unicode-aware lowercasing) against
/// each package: exact name match wins bucket 0, substring-of-name wins
/// bucket 1, substring-of-any-tag wins bucket 2. Terms are tried in order
/// per package and the first one that matches at all decides the bucket;
/// later terms are not consulted even if they would match a higher-priority
/// bucket.
pub fn determine_candidates(catalog: &[Package], terms: &[&str]) -> CandidateSet {
    let mut set = CandidateSet::default();

    for package in catalog {
        let name_lower = package.name.to_lowercase();

        for term in terms {
            let term_lower = term.to_lowercase();

            if term_lower == name_lower {
                set.exact.push(package.clone());
                break;
            }
            if name_lower.contains(&term_lower) {
                set.substring.push(package.clone());
                break;
            }
            if package.tags.iter().any(|tag| tag.to_lowercase().contains(&term_lower)) {
                set.tag.push(package.clone());
                break;
            }
        }
    }

    set
}

/// Walk buckets in priority order. The first non-empty bucket decides: one
/// entry is the winner; more than one is disambiguated interactively (or is
/// an `AmbiguousNonInteractive` error when `interactive` is false). An
/// `abort` answer yields `Ok(None)` ("no selection"), matching the source's
/// treatment of abort as a non-fatal empty result.
pub fn select(
    candidates: &CandidateSet,
    query: &str,
    prompter: &dyn Prompter,
    interactive: bool,
) -> Result<Option<Package>> {
    for bucket in candidates.buckets() {
        if bucket.is_empty() {
            continue;
        }
        if bucket.len() == 1 {
            return Ok(Some(bucket[0].clone()));
        }

        for (i, package) in bucket.iter().enumerate() {
            println!("  [{}] {} - {}", i + 1, package.name, package.url);
        }

        if !interactive {
            return Err(NawabsError::AmbiguousNonInteractive { query: query.to_string(), count: bucket.len() });
        }

        let n = bucket.len();
        let question = format!("multiple candidates for `{query}`, pick [1-{n}] or `abort`:");
        let validate = |s: &str| s.parse::<usize>().is_ok_and(|i| i >= 1 && i <= n);

        return match prompter.ask(&question, &validate)? {
            PromptOutcome::Abort => Ok(None),
            PromptOutcome::Answer(answer) => {
                let idx: usize = answer.parse().expect("validated by prompter");
                Ok(Some(bucket[idx - 1].clone()))
            }
        };
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DownloadMethod;
    use crate::prompt::{NonInteractivePrompter, ScriptedPrompter};
    use std::collections::BTreeSet;

    fn pkg(name: &str, tags: &[&str]) -> Package {
        Package {
            name: name.to_string(),
            url: format!("git://h/{name}"),
            download_method: DownloadMethod::Git,
            license: "MIT".to_string(),
            description: String::new(),
            tags: tags.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            version: None,
            dvcs_tag: None,
            web: None,
        }
    }

    #[test]
    fn substring_ambiguity_scenario() {
        let catalog = vec![pkg("fooBar", &["util"]), pkg("foobaz", &["util"])];
        let candidates = determine_candidates(&catalog, &["foo"]);
        assert!(candidates.exact.is_empty());
        assert_eq!(candidates.substring.len(), 2);
        assert!(candidates.tag.is_empty());
    }

    #[test]
    fn substring_beats_tag_for_the_same_term() {
        let catalog = vec![pkg("http", &["http-client"])];
        let candidates = determine_candidates(&catalog, &["http"]);
        assert_eq!(candidates.substring.len(), 1);
        assert!(candidates.tag.is_empty());
    }

    #[test]
    fn exact_match_takes_priority() {
        let catalog = vec![pkg("http", &[]), pkg("httpclient", &[])];
        let candidates = determine_candidates(&catalog, &["http"]);
        assert_eq!(candidates.exact.len(), 1);
        assert_eq!(candidates.exact[0].name, "http");
        assert_eq!(candidates.substring.len(), 1);
        assert_eq!(candidates.substring[0].name, "httpclient");
    }

    #[test]
    fn first_term_wins_even_if_later_term_would_match_higher_bucket() {
        let catalog = vec![pkg("libfoo", &["bar"])];
        // "bar" (tag) is tried before "libfoo" (exact); once "bar" matches
        // the tag bucket the package is not re-evaluated against "libfoo".
        let candidates = determine_candidates(&catalog, &["bar", "libfoo"]);
        assert!(candidates.exact.is_empty());
        assert_eq!(candidates.tag.len(), 1);
    }

    #[test]
    fn select_returns_sole_candidate_without_prompting() {
        let catalog = vec![pkg("libfoo", &[])];
        let candidates = determine_candidates(&catalog, &["libfoo"]);
        let winner = select(&candidates, "libfoo", &NonInteractivePrompter, false).unwrap();
        assert_eq!(winner.unwrap().name, "libfoo");
    }

    #[test]
    fn select_errors_on_ambiguity_when_non_interactive() {
        let catalog = vec![pkg("fooBar", &[]), pkg("foobaz", &[])];
        let candidates = determine_candidates(&catalog, &["foo"]);
        let err = select(&candidates, "foo", &NonInteractivePrompter, false).unwrap_err();
        assert!(matches!(err, NawabsError::AmbiguousNonInteractive { count: 2, .. }));
    }

    #[test]
    fn select_prompts_and_honors_the_chosen_index() {
        let catalog = vec![pkg("fooBar", &[]), pkg("foobaz", &[])];
        let candidates = determine_candidates(&catalog, &["foo"]);
        let prompter = ScriptedPrompter::new(["2"]);
        let winner = select(&candidates, "foo", &prompter, true).unwrap();
        assert_eq!(winner.unwrap().name, "foobaz");
    }

    #[test]
    fn select_returns_none_on_abort() {
        let catalog = vec![pkg("fooBar", &[]), pkg("foobaz", &[])];
        let candidates = determine_candidates(&catalog, &["foo"]);
        let prompter = ScriptedPrompter::new(["abort"]);
        assert!(select(&candidates, "foo", &prompter, true).unwrap().is_none());
    }

    #[test]
    fn select_returns_none_when_no_bucket_matches() {
        let candidates = CandidateSet::default();
        assert!(select(&candidates, "nope", &NonInteractivePrompter, false).unwrap().is_none());
    }
}
