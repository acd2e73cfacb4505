//! Categorized keyword vocabulary.
//!
//! Treated as configuration data: the compiled-in lists below are the default, a JSON
//! file can replace them at start-up, and the result is frozen behind an `Arc`.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ProgrammingLanguages,
    WebTechnologies,
    Databases,
    FrameworksLibraries,
    CloudDevops,
    DataScienceMl,
    ToolsPlatforms,
    Methodologies,
    SoftSkills,
    BusinessDomains,
}

impl Category {
    /// Categories whose terms count as hard technical skills in job analysis.
    pub fn is_technical(self) -> bool {
        matches!(
            self,
            Category::ProgrammingLanguages
                | Category::WebTechnologies
                | Category::Databases
                | Category::FrameworksLibraries
                | Category::CloudDevops
                | Category::DataScienceMl
        )
    }
}

const PROGRAMMING_LANGUAGES: &[&str] = &[
    "python", "java", "javascript", "typescript", "c++", "c#", "php", "ruby", "go", "rust",
    "kotlin", "swift", "r", "matlab", "scala", "perl", "shell", "bash", "powershell", "lua",
    "dart", "elixir", "clojure", "haskell", "f#",
];

const WEB_TECHNOLOGIES: &[&str] = &[
    "html", "css", "react", "angular", "vue", "node.js", "express", "next.js", "nuxt.js",
    "gatsby", "svelte", "bootstrap", "tailwind", "sass", "less", "webpack", "vite", "parcel",
    "rollup", "jquery", "backbone.js", "ember.js", "react native", "flutter", "ionic", "cordova",
    "phonegap",
];

const DATABASES: &[&str] = &[
    "sql", "nosql", "mysql", "postgresql", "mongodb", "redis", "sqlite", "oracle", "sql server",
    "cassandra", "dynamodb", "elasticsearch", "neo4j", "firebase", "supabase", "mariadb",
    "couchdb", "influxdb", "clickhouse", "bigquery",
];

const FRAMEWORKS_LIBRARIES: &[&str] = &[
    "django", "flask", "fastapi", "spring", "spring boot", "laravel", "rails", "express.js",
    "nest.js", "asp.net", "xamarin", ".net", "entity framework", "hibernate", "struts",
    "play framework", "symfony", "codeigniter",
];

const CLOUD_DEVOPS: &[&str] = &[
    "aws", "azure", "gcp", "google cloud", "docker", "kubernetes", "jenkins", "gitlab ci",
    "github actions", "terraform", "ansible", "chef", "puppet", "vagrant", "nginx", "apache",
    "linux", "ubuntu", "centos", "redhat", "heroku", "digitalocean", "cloudflare", "lambda",
    "ec2", "s3", "rds",
];

const DATA_SCIENCE_ML: &[&str] = &[
    "machine learning", "deep learning", "artificial intelligence", "data science", "pandas",
    "numpy", "scikit-learn", "tensorflow", "pytorch", "keras", "matplotlib", "seaborn", "plotly",
    "jupyter", "anaconda", "spark", "hadoop", "tableau", "power bi", "looker", "qlik", "nlp",
    "computer vision", "opencv",
];

const TOOLS_PLATFORMS: &[&str] = &[
    "git", "github", "gitlab", "bitbucket", "jira", "confluence", "slack", "trello", "asana",
    "notion", "figma", "sketch", "adobe xd", "photoshop", "illustrator", "postman", "insomnia",
    "vs code", "intellij", "eclipse", "sublime", "atom", "vim", "emacs",
];

const METHODOLOGIES: &[&str] = &[
    "agile", "scrum", "kanban", "waterfall", "devops", "ci/cd", "tdd", "bdd", "microservices",
    "monolith", "api", "rest", "restful", "graphql", "soap", "json", "xml", "yaml", "oauth",
    "jwt", "websockets",
];

const SOFT_SKILLS: &[&str] = &[
    "leadership", "communication", "teamwork", "collaboration", "problem solving",
    "critical thinking", "project management", "time management", "analytical", "creative",
    "adaptable", "innovative", "strategic", "detail oriented", "mentoring", "coaching",
    "presentation", "negotiation",
];

const BUSINESS_DOMAINS: &[&str] = &[
    "fintech", "healthcare", "e-commerce", "education", "gaming", "media", "telecommunications",
    "automotive", "retail", "logistics", "real estate", "insurance", "banking", "saas", "b2b",
    "b2c", "startup", "enterprise",
];

/// A vocabulary term with the category that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub text: String,
    pub category: Category,
}

/// Immutable, de-duplicated vocabulary.
///
/// A term listed under several categories belongs to the first one in `Category` order.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: Vec<Term>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let lists: [(Category, &[&str]); 10] = [
            (Category::ProgrammingLanguages, PROGRAMMING_LANGUAGES),
            (Category::WebTechnologies, WEB_TECHNOLOGIES),
            (Category::Databases, DATABASES),
            (Category::FrameworksLibraries, FRAMEWORKS_LIBRARIES),
            (Category::CloudDevops, CLOUD_DEVOPS),
            (Category::DataScienceMl, DATA_SCIENCE_ML),
            (Category::ToolsPlatforms, TOOLS_PLATFORMS),
            (Category::Methodologies, METHODOLOGIES),
            (Category::SoftSkills, SOFT_SKILLS),
            (Category::BusinessDomains, BUSINESS_DOMAINS),
        ];
        let map = lists
            .into_iter()
            .map(|(c, terms)| (c, terms.iter().map(|t| t.to_string()).collect()))
            .collect();
        Self::from_categories(map)
    }
}

impl Vocabulary {
    pub fn from_categories(categories: BTreeMap<Category, Vec<String>>) -> Self {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        // BTreeMap iterates in Category order, which is the ownership priority.
        for (category, list) in categories {
            for raw in list {
                let text = normalize_term(&raw);
                if text.is_empty() || !seen.insert(text.clone()) {
                    continue;
                }
                terms.push(Term { text, category });
            }
        }
        Self { terms }
    }

    /// Loads a vocabulary from a JSON object of `category -> [terms]`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary file {}", path.display()))?;
        let categories: BTreeMap<Category, Vec<String>> = serde_json::from_str(&raw)
            .with_context(|| format!("Vocabulary file {} is not valid", path.display()))?;
        let vocabulary = Self::from_categories(categories);
        if vocabulary.is_empty() {
            anyhow::bail!("Vocabulary file {} defines no terms", path.display());
        }
        Ok(vocabulary)
    }

    /// Loads the override file when configured, the built-in lists otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_json_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

}

/// Lower-cases and collapses internal whitespace so terms match normalized text.
pub fn normalize_term(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
