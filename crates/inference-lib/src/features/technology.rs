//! Technology-category flags over the raw skill string

use super::FeatureRow;
use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Keyword groups, overridable through `keyword_groups.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordGroups {
    pub big_data: Vec<String>,
    pub ml_libraries: Vec<String>,
    pub databases: Vec<String>,
    pub programming: Vec<String>,
    pub bi_tools: Vec<String>,
    pub cloud: Vec<String>,
}

impl Default for KeywordGroups {
    fn default() -> Self {
        Self {
            big_data: strings(&["hadoop", "spark", "kafka", "airflow", "databricks", "hive"]),
            ml_libraries: strings(&["tensorflow", "pytorch", "keras", "scikit", "sklearn", "xgboost"]),
            databases: strings(&["sql", "postgres", "mysql", "oracle", "mongodb", "cassandra", "redis"]),
            programming: strings(&["python", "java", "scala", "r", "go", "rust", "javascript"]),
            bi_tools: strings(&["tableau", "power_bi", "looker", "qlik", "cognos", "microstrategy"]),
            cloud: strings(&["aws", "azure", "gcp", "cloud"]),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TechnologyFlags {
    pub has_bigdata: bool,
    pub has_ml_lib: bool,
    pub has_db: bool,
    pub has_programming: bool,
    pub has_bi_tool: bool,
    pub has_cloud: bool,
}

impl KeywordGroups {
    /// Substring match of each group against the lower-cased skill text
    pub fn classify(&self, skills_text: &str) -> TechnologyFlags {
        let text = skills_text.to_lowercase();
        let any = |group: &[String]| group.iter().any(|k| text.contains(k.as_str()));

        TechnologyFlags {
            has_bigdata: any(&self.big_data),
            has_ml_lib: any(&self.ml_libraries),
            has_db: any(&self.databases),
            has_programming: any(&self.programming),
            has_bi_tool: any(&self.bi_tools),
            has_cloud: any(&self.cloud),
        }
    }
}

impl TechnologyFlags {
    pub const COLUMNS: [&'static str; 6] = [
        "has_bigdata",
        "has_ml_lib",
        "has_db",
        "has_programming",
        "has_bi_tool",
        "has_cloud",
    ];

    /// Number of categories present
    pub fn count(&self) -> usize {
        [
            self.has_bigdata,
            self.has_ml_lib,
            self.has_db,
            self.has_programming,
            self.has_bi_tool,
            self.has_cloud,
        ]
        .iter()
        .filter(|f| **f)
        .count()
    }

    pub fn insert_into(&self, row: &mut FeatureRow) {
        row.insert("has_bigdata", self.has_bigdata);
        row.insert("has_ml_lib", self.has_ml_lib);
        row.insert("has_db", self.has_db);
        row.insert("has_programming", self.has_programming);
        row.insert("has_bi_tool", self.has_bi_tool);
        row.insert("has_cloud", self.has_cloud);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_groups() {
        let flags = KeywordGroups::default().classify("PySpark, TensorFlow, AWS, Tableau");
        assert!(flags.has_bigdata);
        assert!(flags.has_ml_lib);
        assert!(flags.has_cloud);
        assert!(flags.has_bi_tool);
        assert!(!flags.has_db);
    }

    #[test]
    fn test_count() {
        let flags = KeywordGroups::default().classify("excel");
        assert_eq!(flags.count(), 0);

        let flags = KeywordGroups::default().classify("mysql, gcp");
        assert_eq!(flags.count(), 2);
    }

    #[test]
    fn test_partial_groups_file_keeps_defaults() {
        let groups: KeywordGroups = serde_json::from_str(r#"{"cloud": ["heroku"]}"#).unwrap();
        assert_eq!(groups.cloud, vec!["heroku"]);
        assert_eq!(groups.big_data, KeywordGroups::default().big_data);
    }
}
