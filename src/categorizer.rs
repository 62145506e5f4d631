use rusqlite::Connection;

use crate::error::Result;
use crate::models::Rule;

/// In-memory copy of the `rules` table, kept in insertion order.
///
/// Loaded once per run. The ingest consumer owns it while transactions are
/// flowing; afterwards it is handed to the resolver, which appends every rule
/// it learns so later descriptions see it.
#[derive(Debug, Default)]
pub struct RuleBook {
    rules: Vec<Rule>,
}

impl RuleBook {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut stmt = conn.prepare("SELECT keyword, category FROM rules ORDER BY rowid")?;
        let rules = stmt
            .query_map([], |row| {
                Ok(Rule {
                    keyword: row.get(0)?,
                    category: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Category of the first rule whose keyword occurs in `description`.
    pub fn classify(&self, description: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| description.contains(rule.keyword.as_str()))
            .map(|rule| rule.category.as_str())
    }

    /// Appends a rule unless its keyword is already known (first writer wins).
    pub fn remember(&mut self, keyword: &str, category: &str) -> bool {
        if self.contains(keyword) {
            return false;
        }
        self.rules.push(Rule {
            keyword: keyword.to_string(),
            category: category.to_string(),
        });
        true
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.rules.iter().any(|rule| rule.keyword == keyword)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
