use chrono::NaiveDate;

/// A credit-card posting as it leaves the parser, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: f64,
    pub description: String,
}

impl Transaction {
    /// Builds a transaction, normalizing the description for rule matching.
    pub fn new(date: NaiveDate, amount: f64, description: &str) -> Self {
        Self {
            date,
            amount,
            description: normalize_description(description),
        }
    }

    /// Prefix of the description up to the first ASCII space.
    pub fn first_word(&self) -> &str {
        self.description.split(' ').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub keyword: String,
    pub category: String,
}

/// A row read back from the `transactions` table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTransaction {
    pub date: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub category: String,
}

pub fn normalize_description(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_description_is_upper_cased_and_trimmed() {
        let txn = Transaction::new(date(), -20.0, "  padaria central ");
        assert_eq!(txn.description, "PADARIA CENTRAL");
        assert_eq!(normalize_description(&txn.description), txn.description);
    }

    #[test]
    fn test_upper_casing_handles_accents() {
        let txn = Transaction::new(date(), -5.0, "açaí da esquina");
        assert_eq!(txn.description, "AÇAÍ DA ESQUINA");
    }

    #[test]
    fn test_first_word() {
        assert_eq!(Transaction::new(date(), 0.0, "padaria central").first_word(), "PADARIA");
        assert_eq!(Transaction::new(date(), 0.0, "99 app").first_word(), "99");
        assert_eq!(Transaction::new(date(), 0.0, "ifood*restaurante").first_word(), "IFOOD*RESTAURANTE");
        assert_eq!(Transaction::new(date(), 0.0, "").first_word(), "");
    }
}
