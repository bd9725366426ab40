//! Canonical overview statistics.

use serde::{Deserialize, Serialize};

/// How the overview stats were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverviewMode {
    /// Derived client-side from a raw question list. Category percentages
    /// measure frequency.
    Inferred,
    /// Read from a pre-aggregated backend summary. Category percentages
    /// measure answer accuracy.
    Reported,
}

/// One entry in the winners ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub alias: String,
    pub wins: u64,
}

/// One category slice, as a rounded integer percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub name: String,
    pub value: u32,
}

/// Aggregate statistics for the overview panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewStats {
    pub mode: OverviewMode,
    pub played_matches: u64,
    pub winners: Vec<Winner>,
    pub top_categories: Vec<CategoryShare>,
    pub total_correct: u64,
    pub total_wrong: u64,
}

impl OverviewStats {
    /// Chart heading: frequency in inferred mode, accuracy in reported mode.
    pub fn categories_label(&self) -> &'static str {
        match self.mode {
            OverviewMode::Inferred => "Categorías más frecuentes",
            OverviewMode::Reported => "Categorías más acertadas",
        }
    }

    pub fn distinct_winners(&self) -> usize {
        self.winners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_label_by_mode() {
        let mut stats = OverviewStats {
            mode: OverviewMode::Inferred,
            played_matches: 0,
            winners: vec![],
            top_categories: vec![],
            total_correct: 0,
            total_wrong: 0,
        };
        assert_eq!(stats.categories_label(), "Categorías más frecuentes");

        stats.mode = OverviewMode::Reported;
        assert_eq!(stats.categories_label(), "Categorías más acertadas");
    }

    #[test]
    fn test_overview_serialization() {
        let stats = OverviewStats {
            mode: OverviewMode::Reported,
            played_matches: 42,
            winners: vec![Winner {
                alias: "@ana".to_string(),
                wins: 9,
            }],
            top_categories: vec![CategoryShare {
                name: "Historia".to_string(),
                value: 60,
            }],
            total_correct: 120,
            total_wrong: 30,
        };

        let json = serde_json::to_string(&stats).unwrap();
        let parsed: OverviewStats = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.played_matches, 42);
        assert_eq!(parsed.distinct_winners(), 1);
        assert_eq!(parsed.top_categories[0].value, 60);
    }
}
