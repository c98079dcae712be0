use anyhow::{bail, Result};
use tracing::{debug, warn};

use crate::models::Keyword;

/// Quote-aware CSV split. SEMrush exports arrive with comma, semicolon
/// or TAB delimiters depending on locale, so all three are accepted.
/// Rows that are entirely empty are dropped.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut inside_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if inside_quotes && chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    inside_quotes = !inside_quotes;
                }
            }
            ',' | '\t' | ';' if !inside_quotes => {
                row.push(cell.trim().to_string());
                cell.clear();
            }
            '\r' => {} // normalized away
            '\n' if !inside_quotes => {
                row.push(cell.trim().to_string());
                cell.clear();
                if row.iter().any(|c| !c.is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => cell.push(c),
        }
    }

    if !cell.trim().is_empty() {
        row.push(cell.trim().to_string());
    }
    if row.iter().any(|c| !c.is_empty()) {
        rows.push(row);
    }

    rows
}

/// Case-insensitive substring match over the header row, so
/// "Search Volume", "Volume" and "Monthly Volume" all resolve.
pub fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.to_lowercase();
        candidates.iter().any(|name| header.contains(&name.to_lowercase()))
    })
}

fn lenient_u64(cell: &str) -> u64 {
    let cleaned: String = cell
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | ' '))
        .collect();
    cleaned.parse().unwrap_or(0)
}

fn lenient_difficulty(cell: &str) -> f64 {
    let cleaned: String = cell
        .chars()
        .filter(|c| !matches!(c, '%' | ',' | ' '))
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0).clamp(0.0, 100.0)
}

fn lenient_cpc(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect::<String>()
        .replace(',', ".");
    cleaned.parse().ok()
}

/// Parse a keyword CSV into model records.
///
/// Column layout is resolved by header aliases; keyword, volume and
/// difficulty columns are required, intent and CPC are optional.
/// Malformed numeric cells degrade to 0 per row — only a file that
/// yields no keyword at all is an error.
pub fn parse_keywords(text: &str) -> Result<Vec<Keyword>> {
    let rows = parse_csv(text);
    if rows.len() < 2 {
        bail!("CSV file must contain headers and data");
    }

    let headers = &rows[0];
    let keyword_idx = find_column(headers, &["keyword", "keywords", "term"])
        .ok_or_else(|| anyhow::anyhow!("Keyword column not found"))?;
    let volume_idx = find_column(headers, &["volume", "search volume", "monthly volume"])
        .ok_or_else(|| anyhow::anyhow!("Volume column not found"))?;
    let difficulty_idx =
        find_column(headers, &["difficulty", "keyword difficulty", "kd", "difficulty %"])
            .ok_or_else(|| anyhow::anyhow!("Difficulty column not found"))?;
    let intent_idx = find_column(headers, &["intent", "search intent"]);
    let cpc_idx = find_column(headers, &["cpc", "cost per click", "cpc (usd)"]);

    let mut keywords = Vec::new();
    for (line, row) in rows.iter().enumerate().skip(1) {
        let Some(term) = row.get(keyword_idx).map(|c| c.trim()).filter(|c| !c.is_empty())
        else {
            debug!("Skipping row {} - empty keyword cell", line + 1);
            continue;
        };

        let mut kw = Keyword::new(
            term,
            row.get(volume_idx).map(|c| lenient_u64(c)).unwrap_or(0),
            row.get(difficulty_idx).map(|c| lenient_difficulty(c)).unwrap_or(0.0),
        );
        if let Some(idx) = intent_idx {
            kw.intent = row.get(idx).map(|c| c.trim()).filter(|c| !c.is_empty()).map(String::from);
        }
        if let Some(idx) = cpc_idx {
            kw.cpc = row.get(idx).and_then(|c| lenient_cpc(c));
        }
        keywords.push(kw);
    }

    if keywords.is_empty() {
        bail!("No valid keywords found in the file");
    }

    debug!("CSV import - rows={}, keywords={}", rows.len() - 1, keywords.len());
    Ok(keywords)
}

/// Drop repeated keyword texts, keeping the first occurrence. Keyword
/// text is unique within a tier, so later rows are re-imports.
pub fn dedupe_keywords(keywords: Vec<Keyword>) -> Vec<Keyword> {
    let before = keywords.len();
    let mut seen = std::collections::HashSet::new();
    let kept: Vec<Keyword> = keywords
        .into_iter()
        .filter(|k| seen.insert(k.keyword.clone()))
        .collect();
    if kept.len() < before {
        warn!("Deduplication - removed={} duplicates, retained={}", before - kept.len(), kept.len());
    }
    kept
}
