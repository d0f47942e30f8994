//! Static lookup tables: per-domain and per-topic audience diversity.
//!
//! Both are loaded once at startup and never mutated afterwards.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{DiversityError, Result};

/// Minimum `n_visitors` for a domain row to be trusted.
pub const DEFAULT_MIN_VISITORS: u64 = 10;

const DOMAIN_COLUMN: &str = "private_domain";
const VISITORS_COLUMN: &str = "n_visitors";
const DIVERSITY_COLUMN: &str = "visitor_var";

// --- DomainTable ---

/// Registrable domain -> raw audience diversity (`visitor_var`).
#[derive(Debug, Clone, Default)]
pub struct DomainTable {
    values: HashMap<String, f64>,
}

impl DomainTable {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut values = HashMap::new();
        for (domain, value) in entries {
            values.entry(domain.into().to_lowercase()).or_insert(value);
        }
        Self { values }
    }

    /// Load the domain CSV. Needs a header row naming `private_domain`,
    /// `n_visitors` and `visitor_var` (any order, other columns ignored).
    pub fn load(path: &Path, min_visitors: u64) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| DiversityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse_csv(&raw, min_visitors).map_err(|(line, message)| {
            DiversityError::Table {
                path: path.to_path_buf(),
                line,
                message,
            }
        })?;
        info!(path = %path.display(), domains = table.len(), min_visitors, "Loaded domain diversity table");
        Ok(table)
    }

    /// Parse CSV text. Rows below `min_visitors` are dropped, the first row
    /// wins for a repeated domain, and rows without a finite `visitor_var`
    /// are skipped. Domains are lowercased to match `registrable_domain`.
    /// A row whose field count differs from the header's (e.g. a quoted
    /// field containing a comma) is an error. Errors carry the 1-based line
    /// number.
    fn parse_csv(raw: &str, min_visitors: u64) -> std::result::Result<Self, (usize, String)> {
        let mut lines = raw
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (header_line, header) = lines.next().ok_or((1, "file is empty".to_string()))?;
        let columns: Vec<String> = split_row(header);
        let column = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or((header_line, format!("missing column `{name}`")))
        };
        let domain_idx = column(DOMAIN_COLUMN)?;
        let visitors_idx = column(VISITORS_COLUMN)?;
        let diversity_idx = column(DIVERSITY_COLUMN)?;

        let mut values = HashMap::new();
        let mut skipped = 0usize;
        for (line_no, line) in lines {
            let fields = split_row(line);
            if fields.len() != columns.len() {
                return Err((
                    line_no,
                    format!("expected {} fields, found {}", columns.len(), fields.len()),
                ));
            }
            let field = |idx: usize| fields[idx].as_str();

            let domain = field(domain_idx);
            let visitors: f64 = field(visitors_idx)
                .parse()
                .map_err(|_| (line_no, format!("invalid {VISITORS_COLUMN}")))?;
            if visitors < min_visitors as f64 || domain.is_empty() {
                continue;
            }

            let diversity = field(diversity_idx);
            match diversity.parse::<f64>() {
                Ok(v) if v.is_finite() => {
                    values.entry(domain.to_lowercase()).or_insert(v);
                }
                Ok(_) => skipped += 1,
                Err(_) if diversity.is_empty() => skipped += 1,
                Err(_) => return Err((line_no, format!("invalid {DIVERSITY_COLUMN}: {diversity}"))),
            }
        }

        if skipped > 0 {
            debug!(skipped, "Skipped domain rows without a diversity value");
        }
        Ok(Self { values })
    }

    pub fn get(&self, domain: &str) -> Option<f64> {
        self.values.get(domain).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',')
        .map(|f| f.trim().trim_matches('"').to_string())
        .collect()
}

// --- TopicTable ---

/// Topic ID -> raw audience diversity of posts in that topic.
#[derive(Debug, Clone, Default)]
pub struct TopicTable {
    values: HashMap<i64, f64>,
}

impl TopicTable {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        Self {
            values: entries.into_iter().collect(),
        }
    }

    /// Load a JSON object keyed by string-encoded topic IDs: `{"0": 2.1, ...}`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| DiversityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: HashMap<String, f64> =
            serde_json::from_str(&raw).map_err(|source| DiversityError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let mut values = HashMap::with_capacity(parsed.len());
        for (key, value) in parsed {
            let topic: i64 = key.trim().parse().map_err(|_| DiversityError::Table {
                path: path.to_path_buf(),
                line: 0,
                message: format!("topic key `{key}` is not an integer"),
            })?;
            values.insert(topic, value);
        }

        info!(path = %path.display(), topics = values.len(), "Loaded topic diversity table");
        Ok(Self { values })
    }

    pub fn get(&self, topic: i64) -> Option<f64> {
        self.values.get(&topic).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
