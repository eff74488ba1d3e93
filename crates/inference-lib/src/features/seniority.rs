//! Seniority indicators derived from job-title keywords

use super::FeatureRow;

const SENIOR_KEYWORDS: &[&str] = &["senior", "sr.", "sr ", "lead", "principal", "architect"];
const MANAGER_KEYWORDS: &[&str] = &["manager", "director", "vp", "head", "chief"];
const PRINCIPAL_KEYWORDS: &[&str] = &["principal", "distinguished", "fellow"];
const LEAD_KEYWORDS: &[&str] = &["lead"];
const JUNIOR_KEYWORDS: &[&str] = &["junior", "jr.", "jr ", "entry", "entry-level", "graduate"];

/// Keyword flags for a title plus the resolved experience level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seniority {
    pub is_senior: bool,
    pub is_manager: bool,
    pub is_lead: bool,
    pub is_principal: bool,
    pub is_junior: bool,
    /// 0 junior, 1 mid-level, 2 senior, 3 manager/lead, 4 principal
    pub exp_level: u8,
}

/// Classify a title; precedence is principal > manager/lead > senior > junior
pub fn classify_title(title: &str) -> Seniority {
    let title = title.to_lowercase();
    let has = |keywords: &[&str]| keywords.iter().any(|k| title.contains(k));

    let is_senior = has(SENIOR_KEYWORDS);
    let is_manager = has(MANAGER_KEYWORDS);
    let is_lead = has(LEAD_KEYWORDS);
    let is_principal = has(PRINCIPAL_KEYWORDS);
    let is_junior = has(JUNIOR_KEYWORDS);

    let exp_level = if is_principal {
        4
    } else if is_manager || is_lead {
        3
    } else if is_senior {
        2
    } else if is_junior {
        0
    } else {
        1
    };

    Seniority {
        is_senior,
        is_manager,
        is_lead,
        is_principal,
        is_junior,
        exp_level,
    }
}

impl Seniority {
    pub fn insert_into(&self, row: &mut FeatureRow) {
        row.insert("is_senior", self.is_senior);
        row.insert("is_manager", self.is_manager);
        row.insert("is_lead", self.is_lead);
        row.insert("is_principal", self.is_principal);
        row.insert("is_junior", self.is_junior);
        row.insert("exp_level", u32::from(self.exp_level));
    }

    pub const COLUMNS: [&'static str; 6] = [
        "is_senior",
        "is_manager",
        "is_lead",
        "is_principal",
        "is_junior",
        "exp_level",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_beats_junior() {
        let s = classify_title("Junior Principal Data Engineer");
        assert!(s.is_principal);
        assert!(s.is_junior);
        assert_eq!(s.exp_level, 4);
    }

    #[test]
    fn test_senior_manager_resolves_to_manager() {
        let s = classify_title("Senior Manager, Analytics");
        assert!(s.is_senior && s.is_manager);
        assert_eq!(s.exp_level, 3);
    }

    #[test]
    fn test_lead_counts_as_senior_and_lead() {
        let s = classify_title("Lead Data Scientist");
        assert!(s.is_senior && s.is_lead);
        assert_eq!(s.exp_level, 3);
    }

    #[test]
    fn test_levels() {
        assert_eq!(classify_title("Sr. Data Analyst").exp_level, 2);
        assert_eq!(classify_title("Entry-Level Analyst").exp_level, 0);
        assert_eq!(classify_title("Data Engineer").exp_level, 1);
        assert_eq!(classify_title("Distinguished Fellow").exp_level, 4);
    }

    #[test]
    fn test_abbreviations_need_trailing_space() {
        assert_eq!(classify_title("sr data engineer").exp_level, 2);
        assert_eq!(classify_title("srdata").exp_level, 1);
    }

    #[test]
    fn test_insert_into_row() {
        let mut row = FeatureRow::new();
        classify_title("Data Scientist").insert_into(&mut row);
        assert_eq!(row.len(), Seniority::COLUMNS.len());
        assert_eq!(row.number("exp_level"), Some(1.0));
        assert_eq!(row.number("is_senior"), Some(0.0));
    }
}
