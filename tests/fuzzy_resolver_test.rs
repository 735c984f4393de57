//! Integration tests for fuzzy branch resolution.

use rstest::{fixture, rstest};

use canvas_arrange::domain::fuzzy::{score, FuzzyResolver, MatchPolicy};
use canvas_arrange::domain::Branch;
use canvas_arrange::util::testing::init_test_setup;

#[fixture]
fn branches() -> Vec<Branch> {
    init_test_setup();
    vec![
        Branch::new("a", "Landing Page"),
        Branch::new("b", "Landing Page Variant B"),
        Branch::new("c", "Checkout").with_description("hero banner experiment"),
    ]
}

// ============================================================
// Scoring
// ============================================================

#[rstest]
#[case("checkout", 100)]
#[case("check", 80)]
#[case("heck", 60)]
#[case("checkout flow", 40 + 10)]
fn given_term_when_scoring_against_name_then_rule_applies(
    #[case] term: &str,
    #[case] expected: u32,
) {
    let branch = Branch::new("c", "Checkout");
    // single-word name: every term word overlapping it adds the word bonus
    let word_bonus = if term.split_whitespace().count() == 1 { 10 } else { 0 };
    assert_eq!(score(term, &branch), expected + word_bonus);
}

#[test]
fn given_match_kinds_when_scoring_then_exact_beats_prefix_beats_contains_beats_reverse() {
    let term = "cart";
    let exact = score(term, &Branch::new("1", "Cart"));
    let prefix = score(term, &Branch::new("2", "Cartography"));
    let contains = score(term, &Branch::new("3", "Minicarts"));
    let reverse = score("cart page", &Branch::new("4", "Cart"));

    assert!(exact > prefix, "{exact} > {prefix}");
    assert!(prefix > contains, "{prefix} > {contains}");
    assert!(contains > score(term, &Branch::new("5", "Nothing")));
    assert!(contains > reverse, "{contains} > {reverse}");
    assert!(reverse > 0);
}

#[rstest]
fn given_description_hit_when_scoring_then_bonus_is_added(branches: Vec<Branch>) {
    assert_eq!(score("hero", &branches[2]), 20);
}

// ============================================================
// Resolution
// ============================================================

#[rstest]
fn given_specific_names_when_resolving_then_each_term_resolves(branches: Vec<Branch>) {
    let resolution = FuzzyResolver::default().resolve(&["Landing Page", "Variant B"], &branches);

    assert!(resolution.is_clean());
    let ids: Vec<&str> = resolution.matches.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[rstest]
fn given_low_confidence_term_when_resolving_then_ambiguous_with_candidates(
    branches: Vec<Branch>,
) {
    let resolution = FuzzyResolver::default().resolve(&["hero"], &branches);

    assert!(resolution.matches.is_empty());
    assert_eq!(resolution.ambiguous.len(), 1);
    let term = &resolution.ambiguous[0];
    assert_eq!(term.term, "hero");
    assert_eq!(term.candidates.len(), 1);
    assert_eq!(term.candidates[0].branch.id.as_str(), "c");
    assert_eq!(term.candidates[0].score, 20);
}

#[rstest]
fn given_unknown_term_when_resolving_then_unmatched(branches: Vec<Branch>) {
    let resolution = FuzzyResolver::default().resolve(&["zzz"], &branches);

    assert_eq!(resolution.unmatched, vec!["zzz".to_string()]);
    assert!(resolution.matches.is_empty());
    assert!(resolution.ambiguous.is_empty());
}

#[rstest]
fn given_terms_naming_same_branch_when_resolving_then_deduplicated(branches: Vec<Branch>) {
    let resolution = FuzzyResolver::default().resolve(&["checkout", "CHECKOUT"], &branches);

    assert_eq!(resolution.matches.len(), 1);
    assert_eq!(resolution.matches[0].id.as_str(), "c");
}

// "landing" scores 90 against both landing branches (prefix + word)
#[rstest]
#[case(MatchPolicy::Independent)]
#[case(MatchPolicy::Unique)]
fn given_term_tied_between_branches_when_resolving_then_policy_is_applied(
    branches: Vec<Branch>,
    #[case] policy: MatchPolicy,
) {
    let resolver = FuzzyResolver::default().with_policy(policy);

    let resolution = resolver.resolve(&["landing"], &branches);

    match policy {
        MatchPolicy::Independent => {
            assert_eq!(resolution.matches.len(), 1);
            assert_eq!(resolution.matches[0].id.as_str(), "a", "registry order wins");
            assert!(resolution.ambiguous.is_empty());
        }
        MatchPolicy::Unique => {
            assert!(resolution.matches.is_empty());
            let candidates = &resolution.ambiguous[0].candidates;
            assert_eq!(candidates.len(), 2);
            assert!(candidates.iter().all(|c| c.score == 90));
        }
    }
}

#[rstest]
fn given_max_candidates_when_ambiguous_then_list_is_truncated(branches: Vec<Branch>) {
    let resolver = FuzzyResolver::default()
        .with_policy(MatchPolicy::Unique)
        .with_max_candidates(1);

    let resolution = resolver.resolve(&["landing"], &branches);

    assert_eq!(resolution.ambiguous[0].candidates.len(), 1);
}

#[rstest]
fn given_lower_threshold_when_resolving_then_weak_match_accepted(branches: Vec<Branch>) {
    let resolver = FuzzyResolver::new(0.2).expect("valid threshold");

    let resolution = resolver.resolve(&["hero"], &branches);

    assert_eq!(resolution.matches[0].id.as_str(), "c");
}
