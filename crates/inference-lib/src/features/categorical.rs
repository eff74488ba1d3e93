//! Remapping of loosely typed categorical input onto training labels
//!
//! Remapping never fails: values that match neither a canonical label nor an
//! alias fall back to the table's sentinel.

use super::{normalize_text, FeatureRow};

/// Canonical labels, aliases and a fallback for one categorical field
#[derive(Debug, Clone, Copy)]
pub struct CategoryMap {
    pub canonical: &'static [&'static str],
    /// (lower-case alias, canonical label)
    pub aliases: &'static [(&'static str, &'static str)],
    pub fallback: &'static str,
}

impl CategoryMap {
    pub fn remap(&self, raw: &str) -> String {
        self.lookup(raw).unwrap_or(self.fallback).to_string()
    }

    /// Canonical label if the value is known
    pub fn lookup(&self, raw: &str) -> Option<&'static str> {
        let wanted = normalize_text(raw);
        if wanted.is_empty() {
            return None;
        }
        self.canonical
            .iter()
            .copied()
            .find(|c| c.to_lowercase() == wanted)
            .or_else(|| {
                self.aliases
                    .iter()
                    .find(|(alias, _)| *alias == wanted)
                    .map(|(_, canonical)| *canonical)
            })
    }
}

pub const COUNTRIES: CategoryMap = CategoryMap {
    canonical: &[
        "United States",
        "Canada",
        "United Kingdom",
        "France",
        "Germany",
        "Australia",
        "India",
        "China",
        "Japan",
        "Brazil",
        "Mexico",
        "Netherlands",
        "Spain",
        "Italy",
        "Singapore",
        "Hong Kong",
        "Ireland",
    ],
    aliases: &[
        ("us", "United States"),
        ("usa", "United States"),
        ("u.s.", "United States"),
        ("u.s.a.", "United States"),
        ("united states of america", "United States"),
        ("america", "United States"),
        ("uk", "United Kingdom"),
        ("u.k.", "United Kingdom"),
        ("great britain", "United Kingdom"),
        ("britain", "United Kingdom"),
        ("england", "United Kingdom"),
        ("deutschland", "Germany"),
        ("holland", "Netherlands"),
        ("the netherlands", "Netherlands"),
        ("españa", "Spain"),
        ("prc", "China"),
    ],
    fallback: "Other",
};

/// The health-insurance model was trained on abbreviated country labels
pub const HEALTH_COUNTRIES: CategoryMap = CategoryMap {
    canonical: &["USA", "UK", "Canada", "France", "Germany"],
    aliases: &[
        ("us", "USA"),
        ("u.s.", "USA"),
        ("u.s.a.", "USA"),
        ("united states", "USA"),
        ("united states of america", "USA"),
        ("america", "USA"),
        ("u.k.", "UK"),
        ("united kingdom", "UK"),
        ("great britain", "UK"),
        ("britain", "UK"),
        ("england", "UK"),
        ("deutschland", "Germany"),
    ],
    fallback: "Other",
};

pub const REMOTE_SCHEDULES: CategoryMap = CategoryMap {
    canonical: &["Full-time", "Part-time", "Contractor", "Internship", "Temp work"],
    aliases: &[
        ("full time", "Full-time"),
        ("fulltime", "Full-time"),
        ("full_time", "Full-time"),
        ("part time", "Part-time"),
        ("part_time", "Part-time"),
        ("contract", "Contractor"),
        ("contractor", "Contractor"),
        ("intern", "Internship"),
        ("temp", "Temp work"),
        ("temporary", "Temp work"),
    ],
    fallback: "Unknown",
};

pub const REMOTE_TITLES: CategoryMap = CategoryMap {
    canonical: &[
        "Business Analyst",
        "Cloud Engineer",
        "Data Analyst",
        "Data Engineer",
        "Data Scientist",
        "Machine Learning Engineer",
        "Senior Data Analyst",
        "Senior Data Engineer",
        "Senior Data Scientist",
        "Software Engineer",
    ],
    aliases: &[
        ("ml engineer", "Machine Learning Engineer"),
        ("swe", "Software Engineer"),
        ("software developer", "Software Engineer"),
        ("sr data analyst", "Senior Data Analyst"),
        ("sr data engineer", "Senior Data Engineer"),
        ("sr data scientist", "Senior Data Scientist"),
    ],
    fallback: "Other",
};

/// Unknown seniority is treated as mid-level
pub const REMOTE_SENIORITY: CategoryMap = CategoryMap {
    canonical: &["Lead", "Mid", "Senior"],
    aliases: &[
        ("mid-level", "Mid"),
        ("mid level", "Mid"),
        ("middle", "Mid"),
        ("intermediate", "Mid"),
        ("sr", "Senior"),
        ("sr.", "Senior"),
        ("team lead", "Lead"),
        ("tech lead", "Lead"),
    ],
    fallback: "Mid",
};

pub const INDUSTRIES: CategoryMap = CategoryMap {
    canonical: &[
        "Advertising & Marketing",
        "Business Products & Services",
        "Computer Hardware",
        "Construction",
        "Consumer Products & Services",
        "Education",
        "Energy",
        "Engineering",
        "Environmental Services",
        "Financial Services",
        "Food & Beverage",
        "Government Services",
        "Health",
        "Human Resources",
        "Insurance",
        "IT Management",
        "IT Services",
        "IT System Development",
        "Logistics & Transportation",
        "Manufacturing",
        "Media",
        "Real Estate",
        "Retail",
        "Security",
        "Software",
        "Telecommunications",
        "Travel & Hospitality",
    ],
    aliases: &[
        ("it", "IT Services"),
        ("information technology", "IT Services"),
        ("healthcare", "Health"),
        ("health care", "Health"),
        ("marketing", "Advertising & Marketing"),
        ("advertising", "Advertising & Marketing"),
        ("finance", "Financial Services"),
        ("banking", "Financial Services"),
        ("hr", "Human Resources"),
        ("logistics", "Logistics & Transportation"),
        ("transportation", "Logistics & Transportation"),
        ("telecom", "Telecommunications"),
        ("travel", "Travel & Hospitality"),
        ("hospitality", "Travel & Hospitality"),
        ("software development", "Software"),
        ("food", "Food & Beverage"),
    ],
    fallback: "Other",
};

/// (code, full name) for the 50 states and DC
pub const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// Two-letter code for a state given by code or full name
pub fn state_code(raw: &str) -> Option<&'static str> {
    let wanted = raw.trim();
    US_STATES
        .iter()
        .find(|(code, name)| code.eq_ignore_ascii_case(wanted) || name.eq_ignore_ascii_case(wanted))
        .map(|(code, _)| *code)
}

/// Insert `<prefix>_<option>` flags; at most one is set
pub fn one_hot(row: &mut FeatureRow, prefix: &str, options: &[&str], selected: Option<&str>) {
    for option in options {
        row.insert(format!("{}_{}", prefix, option), selected == Some(*option));
    }
}
