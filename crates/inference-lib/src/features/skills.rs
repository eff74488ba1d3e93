//! Skill-set extraction against the reference vocabulary

use std::collections::BTreeSet;

/// Skills the salary model was trained with, one `skill_<name>` column each
pub const DEFAULT_SKILLS: &[&str] = &[
    // Languages
    "python", "java", "sql", "javascript", "c", "cpp", "csharp", "go", "golang", "rust", "swift",
    "kotlin", "scala", "ruby", "perl", "php", "r", "matlab", "julia", "assembly", "visual_basic",
    "crystal",
    // Web
    "node", "node.js", "react", "angular", "django", "flask", "fastapi", "spring", "express",
    // Data platforms and databases
    "hadoop", "spark", "pyspark", "kafka", "airflow", "databricks", "snowflake", "bigquery",
    "redshift", "postgresql", "mysql", "oracle", "mongodb", "mongo", "cassandra", "dynamodb",
    "redis", "elasticsearch", "neo4j", "db2", "sql_server", "t-sql", "no-sql", "nosql", "aurora",
    // Cloud
    "aws", "azure", "gcp", "ibm_cloud",
    // ML and data science
    "tensorflow", "pytorch", "keras", "scikit-learn", "pandas", "numpy", "matplotlib", "seaborn",
    "plotly", "ggplot2", "tidyverse", "rshiny", "jupyter",
    // Tooling
    "git", "github", "gitlab", "bitbucket", "svn", "docker", "kubernetes", "terraform", "ansible",
    "jenkins", "linux", "unix", "windows", "bash", "shell", "powershell", "terminal",
    // Office and collaboration
    "jira", "confluence", "slack", "zoom", "excel", "powerpoint", "word", "ms_access", "outlook",
    "google_sheets",
    // BI and analytics
    "tableau", "power_bi", "looker", "qlik", "microstrategy", "cognos", "alteryx", "datarobot",
    "sas", "spss", "visio", "smartsheet", "planner", "notion", "flow",
    // More ML
    "hugging_face", "opencv", "nltk", "mxnet", "theano",
    // Misc
    "vba", "spreadsheet", "gdpr", "sap", "unify", "ssrs", "ssis", "dax", "chef", "yarn", "phoenix",
    "unity", "html", "css", "jquery", "typescript", "graphql", "selenium", "splunk", "atlassian",
    "watson", "sharepoint",
];

/// Lower-case, trim, and join words with `_` ("Power BI" -> "power_bi")
pub fn normalize_skill(skill: &str) -> String {
    skill
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace('-', "_")
}

/// Normalized, de-duplicated user skills; ordering of the input is irrelevant
pub type SkillSet = BTreeSet<String>;

/// Parse a comma-separated skill string
pub fn parse_skills(text: &str) -> SkillSet {
    text.split(',')
        .map(normalize_skill)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Number of non-blank comma items, repeats included
pub fn count_skills(text: &str) -> usize {
    text.split(',').filter(|s| !s.trim().is_empty()).count()
}

/// One flag per vocabulary skill: set when any user skill contains it
pub fn skill_flags<'a>(skills: &SkillSet, vocabulary: &'a [String]) -> Vec<(&'a str, bool)> {
    vocabulary
        .iter()
        .map(|v| (v.as_str(), skills.iter().any(|s| s.contains(v.as_str()))))
        .collect()
}
