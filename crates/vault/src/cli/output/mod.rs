//! Rendering and JSON serialization for CLI output.

use std::{
    env,
    io::{self, IsTerminal},
    sync::OnceLock,
};

use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use vault_index::{Corpus, Hit, Record};

/// ANSI escape codes.
mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Yellow text (for warnings).
    pub const YELLOW: &str = "\x1b[33m";
    /// Green text.
    pub const GREEN: &str = "\x1b[32m";
    /// Dim/gray text (for less important info).
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Returns true if stdout is a terminal and `NO_COLOR` is unset.
fn use_color() -> bool {
    static COLOR: OnceLock<bool> = OnceLock::new();
    *COLOR.get_or_init(|| io::stdout().is_terminal() && env::var_os("NO_COLOR").is_none())
}

/// Wraps text in an escape code when color is enabled.
fn styled(code: &str, text: &str) -> String {
    if use_color() {
        format!("{code}{text}{}", colors::RESET)
    } else {
        text.to_string()
    }
}

/// Formats text as a subheader (bold).
pub fn subheader(text: &str) -> String {
    styled(colors::BOLD, text)
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    styled(colors::DIM, text)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    styled(colors::YELLOW, text)
}

/// Formats text as a success message (green).
pub fn success(text: &str) -> String {
    styled(colors::GREEN, text)
}

/// One ranked result.
#[derive(Serialize)]
struct JsonResult<'a> {
    /// 1-based rank.
    rank: usize,
    /// Similarity score.
    score: f64,
    /// The matched record.
    #[serde(flatten)]
    record: &'a Record,
}

/// JSON output of `vault search`.
#[derive(Serialize)]
struct JsonSearchOutput<'a> {
    /// The query as searched.
    query: &'a str,
    /// Threshold applied.
    threshold: f64,
    /// Strategy used.
    strategy: &'a str,
    /// Number of records that passed the threshold, before the limit.
    total_matches: usize,
    /// Printed results.
    results: Vec<JsonResult<'a>>,
}

/// A search outcome ready to print.
pub struct SearchReport<'a> {
    /// The query as searched.
    pub query: &'a str,
    /// Threshold applied.
    pub threshold: f64,
    /// Strategy used.
    pub strategy: &'a str,
    /// Every hit above the threshold.
    pub hits: &'a [Hit],
    /// Maximum hits to print, 0 for all.
    pub limit: usize,
}

impl SearchReport<'_> {
    /// Hits that will be printed.
    fn shown(&self) -> &[Hit] {
        if self.limit == 0 {
            self.hits
        } else {
            &self.hits[..self.hits.len().min(self.limit)]
        }
    }

    /// Renders the report as pretty JSON.
    pub fn to_json(&self, corpus: &Corpus) -> serde_json::Result<String> {
        let results = self
            .shown()
            .iter()
            .enumerate()
            .filter_map(|(i, hit)| {
                corpus.record(hit.position).map(|record| JsonResult {
                    rank: i + 1,
                    score: hit.score,
                    record,
                })
            })
            .collect();
        serde_json::to_string_pretty(&JsonSearchOutput {
            query: self.query,
            threshold: self.threshold,
            strategy: self.strategy,
            total_matches: self.hits.len(),
            results,
        })
    }

    /// Renders the report as a table followed by a summary line.
    pub fn to_text(&self, corpus: &Corpus) -> String {
        if self.hits.is_empty() {
            return dim("No results.");
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["#", "Score", "ID", "Title", "Author"]);
        for (i, hit) in self.shown().iter().enumerate() {
            let Some(record) = corpus.record(hit.position) else {
                continue;
            };
            table.add_row(vec![
                Cell::new(i + 1).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.3}", hit.score)).set_alignment(CellAlignment::Right),
                Cell::new(&record.id),
                Cell::new(record.text("title")),
                Cell::new(record.text("author")),
            ]);
        }

        let shown = self.shown().len();
        let summary = if shown < self.hits.len() {
            format!("{shown} of {} results", self.hits.len())
        } else if shown == 1 {
            "1 result".to_string()
        } else {
            format!("{shown} results")
        };
        format!("{table}\n{}", dim(&summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        Corpus::new(vec![
            Record::new("cad/drivetrains/alpha")
                .with("title", "Drivetrain Alpha")
                .with("author", "Ava"),
            Record::new("cad/claws/claw").with("title", "Claw"),
            Record::new("cad/drivetrains/beta").with("title", "Drivetrain Beta"),
        ])
    }

    fn hits() -> Vec<Hit> {
        vec![
            Hit {
                position: 2,
                score: 0.9,
            },
            Hit {
                position: 0,
                score: 0.4,
            },
        ]
    }

    fn report<'a>(hits: &'a [Hit], limit: usize) -> SearchReport<'a> {
        SearchReport {
            query: "drivetrain",
            threshold: 0.01,
            strategy: "tfidf",
            hits,
            limit,
        }
    }

    #[test]
    fn json_lists_ranked_records() {
        let hits = hits();
        let json = report(&hits, 0).to_json(&corpus()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_matches"], 2);
        assert_eq!(value["results"][0]["rank"], 1);
        assert_eq!(value["results"][0]["id"], "cad/drivetrains/beta");
        assert_eq!(value["results"][1]["fields"]["author"], "Ava");
    }

    #[test]
    fn limit_truncates_but_reports_total() {
        let hits = hits();
        let json = report(&hits, 1).to_json(&corpus()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_matches"], 2);
        assert_eq!(value["results"].as_array().unwrap().len(), 1);

        let text = report(&hits, 1).to_text(&corpus());
        assert!(text.contains("cad/drivetrains/beta"));
        assert!(!text.contains("cad/drivetrains/alpha"));
        assert!(text.contains("1 of 2 results"));
    }

    #[test]
    fn table_shows_title_and_author() {
        let hits = hits();
        let text = report(&hits, 0).to_text(&corpus());
        assert!(text.contains("Drivetrain Alpha"));
        assert!(text.contains("Ava"));
        assert!(text.contains("0.900"));
    }

    #[test]
    fn empty_results() {
        assert!(report(&[], 0).to_text(&corpus()).contains("No results."));
    }
}
