//! Leaderboard
//!
//! The run only asks two questions of a leaderboard: does this score make
//! the table, and do we already know who the player is. Storage and
//! submission live with the host.

use serde::{Deserialize, Serialize};

/// Maximum number of entries to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 12;

/// Score-qualification collaborator consulted when a run ends
pub trait Leaderboard {
    /// Whether `score` would earn a place
    fn qualifies(&self, score: u64) -> bool;
    /// Whether a player name is already known, so name entry can be skipped
    fn has_identity(&self) -> bool;
}

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    /// Seconds survived
    pub survived: f32,
}

/// In-memory top-N table, sorted by score descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
    /// Name remembered from an earlier submission
    pub identity: Option<String>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table previously produced by `to_json`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Rank a score would achieve (1-indexed), None if it doesn't qualify
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score if it qualifies and remember the name as the player's
    /// identity. Returns the rank achieved (1-indexed).
    pub fn add_score(&mut self, name: &str, score: u64, survived: f32) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        let name: String = name.trim().chars().take(MAX_NAME_LEN).collect();

        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                name: name.clone(),
                score,
                survived,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        if !name.is_empty() {
            self.identity = Some(name);
        }
        log::info!("score {} entered the table at #{}", score, rank);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

impl Leaderboard for HighScores {
    fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    fn has_identity(&self) -> bool {
        self.identity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(1));
    }

    #[test]
    fn test_sorted_and_truncated() {
        let mut scores = HighScores::new();
        for i in 1..=12u64 {
            scores.add_score("p", i * 100, 10.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(1200));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(300));
        assert!(!scores.qualifies(300));
        assert!(scores.qualifies(301));
    }

    #[test]
    fn test_rank() {
        let mut scores = HighScores::new();
        scores.add_score("a", 500, 1.0);
        scores.add_score("b", 300, 1.0);
        assert_eq!(scores.potential_rank(400), Some(2));
        assert_eq!(scores.add_score("c", 600, 1.0), Some(1));
    }

    #[test]
    fn test_identity_remembered() {
        let mut scores = HighScores::new();
        assert!(!scores.has_identity());
        scores.add_score("  averyveryverylongname ", 10, 1.0);
        assert!(scores.has_identity());
        assert_eq!(scores.identity.as_deref(), Some("averyveryver"));
    }

    #[test]
    fn test_json_round_trip_resorts() {
        let json = r#"{"entries":[{"name":"a","score":1,"survived":1.0},{"name":"b","score":9,"survived":2.0}],"identity":null}"#;
        let scores = HighScores::from_json(json).unwrap();
        assert_eq!(scores.top_score(), Some(9));
        let again = HighScores::from_json(&scores.to_json().unwrap()).unwrap();
        assert_eq!(again.entries, scores.entries);
    }
}
