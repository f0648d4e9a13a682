use regex::Regex;

/// Description keywords that mark a legacy expense as a credit-card purchase.
pub const DEFAULT_CARD_KEYWORDS: &[&str] = &["parcela", "cartão", "cartao", "fatura", "credit card"];

/// Decides, from free-text descriptions, which legacy expenses were card
/// purchases. Only the import path uses this; stored transactions carry an
/// explicit kind.
pub struct CardExpenseClassifier {
    keywords: Vec<String>,
    marker: Option<Regex>,
}

impl Default for CardExpenseClassifier {
    fn default() -> Self {
        let keywords: Vec<String> = DEFAULT_CARD_KEYWORDS.iter().map(|k| k.to_string()).collect();
        Self::new(&keywords)
    }
}

impl CardExpenseClassifier {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            marker: Regex::new(r"\b(\d{1,3})\s*/\s*(\d{1,3})\b").ok(),
        }
    }

    pub fn is_card_expense(&self, description: &str) -> bool {
        let desc_lower = description.to_lowercase();
        self.keywords.iter().any(|k| desc_lower.contains(k.as_str()))
            || self.installment_marker(description).is_some()
    }

    /// `(n, m)` from an "n/m" installment marker such as "Notebook 3/12".
    /// Fractions that cannot be an installment position (n = 0 or n > m)
    /// are ignored.
    pub fn installment_marker(&self, description: &str) -> Option<(u32, u32)> {
        let caps = self.marker.as_ref()?.captures(description)?;
        let n: u32 = caps.get(1)?.as_str().parse().ok()?;
        let m: u32 = caps.get(2)?.as_str().parse().ok()?;
        (n >= 1 && n <= m && m > 1).then_some((n, m))
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
