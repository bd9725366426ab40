//! Overview statistics aggregation.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::questions::RawQuestion;
use super::{as_count, percentage};
use crate::models::{CategoryShare, OverviewMode, OverviewStats, Winner};

/// Category used when a record has no category field.
const UNCATEGORIZED: &str = "—";

/// The overview endpoint has two generations: a pre-aggregated summary
/// object (reported mode) and a flat question list the client aggregates
/// itself (inferred mode).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OverviewPayload {
    Questions(Vec<RawQuestion>),
    Summary(RawSummary),
}

/// The summary object, as loosely as the backend sends it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSummary {
    totals: RawTotals,
    #[serde(rename = "topWinners")]
    top_winners: Vec<RawWinner>,
    #[serde(rename = "topCategories")]
    top_categories: Vec<RawCategory>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTotals {
    #[serde(rename = "totalGames")]
    total_games: Value,
    #[serde(rename = "totalCorrect")]
    total_correct: Value,
    #[serde(rename = "totalWrong")]
    total_wrong: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawWinner {
    username: Option<String>,
    alias: Option<String>,
    #[serde(rename = "gamesWon")]
    games_won: Value,
    wins: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCategory {
    category: Option<String>,
    nombre: Option<String>,
    name: Option<String>,
    #[serde(rename = "correctAnswers")]
    correct_answers: Value,
}

/// Aggregate an overview payload into canonical stats.
pub fn normalize_overview(payload: OverviewPayload) -> OverviewStats {
    match payload {
        OverviewPayload::Questions(list) => infer_from_questions(&list),
        OverviewPayload::Summary(summary) => from_summary(summary),
    }
}

/// Inferred mode: category frequency percentages from a raw question list.
/// Everything else is unknown in this mode and reported as zero.
fn infer_from_questions(list: &[RawQuestion]) -> OverviewStats {
    let mut freq: HashMap<String, u64> = HashMap::new();
    for q in list {
        let cat = q.resolved_category().unwrap_or(UNCATEGORIZED);
        *freq.entry(cat.to_string()).or_insert(0) += 1;
    }

    let total: u64 = freq.values().sum();
    let mut top_categories: Vec<CategoryShare> = freq
        .into_iter()
        .map(|(name, count)| CategoryShare {
            name,
            value: percentage(count, total),
        })
        .collect();
    sort_categories(&mut top_categories);

    OverviewStats {
        mode: OverviewMode::Inferred,
        played_matches: 0,
        winners: Vec::new(),
        top_categories,
        total_correct: 0,
        total_wrong: 0,
    }
}

/// Reported mode: totals and winners read directly; category accuracy
/// percentages against the reported total-correct, falling back to the
/// sum of per-category corrects when the total is missing or zero.
fn from_summary(summary: RawSummary) -> OverviewStats {
    let total_correct = as_count(&summary.totals.total_correct);

    let mut winners: Vec<Winner> = summary
        .top_winners
        .into_iter()
        .map(|w| Winner {
            alias: w
                .username
                .or(w.alias)
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            wins: first_count(&w.games_won, &w.wins),
        })
        .collect();
    winners.sort_by(|a, b| b.wins.cmp(&a.wins));

    let corrects: Vec<(String, u64)> = summary
        .top_categories
        .into_iter()
        .map(|c| {
            let name = c
                .category
                .or(c.nombre)
                .or(c.name)
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            (name, as_count(&c.correct_answers))
        })
        .collect();

    let base = if total_correct > 0 {
        total_correct
    } else {
        corrects.iter().map(|(_, n)| n).sum()
    };

    let mut top_categories: Vec<CategoryShare> = corrects
        .into_iter()
        .map(|(name, n)| CategoryShare {
            name,
            value: percentage(n, base),
        })
        .collect();
    sort_categories(&mut top_categories);

    OverviewStats {
        mode: OverviewMode::Reported,
        played_matches: as_count(&summary.totals.total_games),
        winners,
        top_categories,
        total_correct,
        total_wrong: as_count(&summary.totals.total_wrong),
    }
}

/// First non-null of two loosely typed count fields.
fn first_count(primary: &Value, fallback: &Value) -> u64 {
    if primary.is_null() {
        as_count(fallback)
    } else {
        as_count(primary)
    }
}

/// Descending by share, then by name so equal shares render stably.
fn sort_categories(categories: &mut [CategoryShare]) {
    categories.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> OverviewPayload {
        serde_json::from_value(value).unwrap()
    }

    fn share(name: &str, value: u32) -> CategoryShare {
        CategoryShare {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_inferred_frequency_percentages() {
        let payload = decode(json!([
            {"category": "A"},
            {"category": "A"},
            {"category": "B"}
        ]));
        let stats = normalize_overview(payload);

        assert_eq!(stats.mode, OverviewMode::Inferred);
        assert_eq!(stats.top_categories, vec![share("A", 67), share("B", 33)]);
        assert_eq!(stats.played_matches, 0);
        assert!(stats.winners.is_empty());
    }

    #[test]
    fn test_inferred_uses_spanish_category_alias() {
        let payload = decode(json!([
            {"categoria": "Historia"},
            {"sin_categoria": true}
        ]));
        let stats = normalize_overview(payload);

        assert_eq!(
            stats.top_categories,
            vec![share("Historia", 50), share("—", 50)]
        );
    }

    #[test]
    fn test_inferred_empty_list() {
        let stats = normalize_overview(decode(json!([])));

        assert_eq!(stats.mode, OverviewMode::Inferred);
        assert!(stats.top_categories.is_empty());
    }

    #[test]
    fn test_reported_base_fallback_to_category_sum() {
        let payload = decode(json!({
            "totals": {"totalCorrect": 0},
            "topCategories": [
                {"category": "A", "correctAnswers": 3},
                {"category": "B", "correctAnswers": 1}
            ]
        }));
        let stats = normalize_overview(payload);

        assert_eq!(stats.mode, OverviewMode::Reported);
        assert_eq!(stats.top_categories, vec![share("A", 75), share("B", 25)]);
    }

    #[test]
    fn test_reported_uses_backend_total_when_positive() {
        let payload = decode(json!({
            "totals": {"totalGames": 10, "totalCorrect": 8, "totalWrong": 2},
            "topCategories": [
                {"category": "A", "correctAnswers": 4},
                {"category": "B", "correctAnswers": 2}
            ]
        }));
        let stats = normalize_overview(payload);

        assert_eq!(stats.played_matches, 10);
        assert_eq!(stats.total_correct, 8);
        assert_eq!(stats.total_wrong, 2);
        assert_eq!(stats.top_categories, vec![share("A", 50), share("B", 25)]);
    }

    #[test]
    fn test_reported_zero_base_yields_zero_shares() {
        let payload = decode(json!({
            "topCategories": [{"category": "A"}, {"category": "B"}]
        }));
        let stats = normalize_overview(payload);

        assert_eq!(stats.top_categories, vec![share("A", 0), share("B", 0)]);
    }

    #[test]
    fn test_winners_sorted_and_aliased() {
        let payload = decode(json!({
            "totals": {},
            "topWinners": [
                {"alias": "@leo", "wins": 2},
                {"username": "@ana", "gamesWon": 9},
                {"gamesWon": "3"}
            ]
        }));
        let stats = normalize_overview(payload);

        let names: Vec<&str> = stats.winners.iter().map(|w| w.alias.as_str()).collect();
        assert_eq!(names, vec!["@ana", "—", "@leo"]);
        let wins: Vec<u64> = stats.winners.iter().map(|w| w.wins).collect();
        assert_eq!(wins, vec![9, 3, 2]);
    }

    #[test]
    fn test_category_name_aliases() {
        let payload = decode(json!({
            "totals": {"totalCorrect": 4},
            "topCategories": [
                {"nombre": "Arte", "correctAnswers": 2},
                {"name": "Ciencia", "correctAnswers": 2}
            ]
        }));
        let stats = normalize_overview(payload);

        assert_eq!(
            stats.top_categories,
            vec![share("Arte", 50), share("Ciencia", 50)]
        );
    }

    #[test]
    fn test_empty_summary_object() {
        let stats = normalize_overview(decode(json!({})));

        assert_eq!(stats.mode, OverviewMode::Reported);
        assert_eq!(stats.played_matches, 0);
        assert!(stats.winners.is_empty());
        assert!(stats.top_categories.is_empty());
    }

    #[test]
    fn test_shares_sum_near_100() {
        let payload = decode(json!([
            {"category": "A"}, {"category": "A"}, {"category": "A"},
            {"category": "B"}, {"category": "B"},
            {"category": "C"}
        ]));
        let stats = normalize_overview(payload);

        let sum: u32 = stats.top_categories.iter().map(|c| c.value).sum();
        assert!((99..=101).contains(&sum), "sum was {sum}");
    }
}
