//! Parsers for winget's human-oriented output
//!
//! winget has no stable machine format for `search`, so these heuristics
//! track its table layout. Bump [`PARSER_VERSION`] when they change.

/// Revision of the heuristics below
pub const PARSER_VERSION: u32 = 1;

/// Maximum length of an extracted error line, in characters
pub const ERROR_LINE_LIMIT: usize = 120;

/// Keywords marking the line that explains a failed install
const FAILURE_KEYWORDS: &[&str] = &["error", "failed", "no package", "not found", "0x"];

/// Best package identifier found in search output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub package_id: String,
    /// Number of query-name words seen before the identifier column
    pub score: usize,
}

/// Whether a table cell looks like a package identifier (`Vendor.Product`)
fn is_candidate(token: &str) -> bool {
    token.chars().count() > 3
        && token.contains('.')
        && !token.starts_with('-')
        // sentences such as "No package found matching input criteria."
        && !token.ends_with('.')
}

/// Pick the best identifier from `winget search` output for `name`
///
/// Only the first candidate cell of each row is considered. Its score is the
/// number of words of `name` occurring in the row text before it; the highest
/// score wins and ties keep the earlier row.
#[must_use]
pub fn parse_search_output(output: &str, name: &str) -> Option<SearchMatch> {
    let name_lower = name.to_lowercase();
    let words: Vec<&str> = name_lower.split_whitespace().collect();
    let mut best: Option<SearchMatch> = None;

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let Some(col) = parts.iter().position(|p| is_candidate(p)) else {
            continue;
        };

        let row_text = parts[..col].join(" ").to_lowercase();
        let score = words.iter().filter(|w| row_text.contains(*w)).count();

        let better = match &best {
            None => true,
            Some(current) => score > current.score,
        };
        if better {
            best = Some(SearchMatch {
                package_id: parts[col].to_string(),
                score,
            });
        }
    }

    best
}

/// First word of a name, used for the broader fallback search
#[must_use]
pub fn first_word(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

fn truncate(line: &str) -> String {
    line.chars().take(ERROR_LINE_LIMIT).collect()
}

/// Extract the line that best explains a failed install
#[must_use]
pub fn extract_install_error(output: &str) -> String {
    if let Some(line) = output.lines().find(|line| {
        let lower = line.to_lowercase();
        FAILURE_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }) {
        return truncate(line.trim());
    }

    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map_or_else(|| "Unknown error".to_string(), truncate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_TABLE: &str = "\
Name                    Id                           Version  Match        Source
----------------------------------------------------------------------------------
Visual Studio Code      Microsoft.VisualStudioCode   1.85.1                winget
Visual Studio Code Insiders Microsoft.VisualStudioCode.Insiders 1.86.0 winget
VSCodium                VSCodium.VSCodium            1.85.1   Tag: vscode  winget
";

    #[test]
    fn test_best_score_wins() {
        let found = parse_search_output(SEARCH_TABLE, "Visual Studio Code").unwrap();
        assert_eq!(found.package_id, "Microsoft.VisualStudioCode");
        assert_eq!(found.score, 3);
    }

    #[test]
    fn test_tie_keeps_first_row() {
        let output = "\
Git     Git.Git        2.43.0  winget
Git LFS GitHub.GitLFS  3.4.1   winget
";
        let found = parse_search_output(output, "Git").unwrap();
        assert_eq!(found.package_id, "Git.Git");
    }

    #[test]
    fn test_candidate_length_counts_characters() {
        // five bytes, three characters
        assert_eq!(parse_search_output("Ünï  é.é  winget\n", "Ünï"), None);
        let found = parse_search_output("Ünï  Ü.né  winget\n", "Ünï").unwrap();
        assert_eq!(found.package_id, "Ü.né");
    }

    #[test]
    fn test_zero_score_first_candidate_is_kept() {
        let output = "Zed  ZedIndustries.Zed  0.1  winget\n";
        let found = parse_search_output(output, "Totally Different").unwrap();
        assert_eq!(found.package_id, "ZedIndustries.Zed");
        assert_eq!(found.score, 0);
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(parse_search_output("", "Git"), None);
        assert_eq!(
            parse_search_output("No package found matching input criteria.", "Git"),
            None
        );
        assert_eq!(
            parse_search_output("Name Id Version\n---------- -- -------\n", "Git"),
            None
        );
    }

    #[test]
    fn test_flag_like_and_short_tokens_skipped() {
        let output = "Tool --id.x a.b Vendor.Tool 1.0\n";
        let found = parse_search_output(output, "Tool").unwrap();
        assert_eq!(found.package_id, "Vendor.Tool");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = parse_search_output(SEARCH_TABLE, "Visual Studio Code");
        let _ = parse_search_output(SEARCH_TABLE, "VSCodium");
        let b = parse_search_output(SEARCH_TABLE, "Visual Studio Code");
        assert_eq!(a, b);
    }

    #[test]
    fn test_first_word() {
        assert_eq!(first_word("Mozilla Firefox (x64 en-US)"), "Mozilla");
        assert_eq!(first_word("  7-Zip"), "7-Zip");
        assert_eq!(first_word(""), "");
    }

    #[test]
    fn test_extract_keyword_line() {
        let output = "Found Foo [Vendor.Foo]\nInstaller failed with exit code: 1603\nbye";
        assert_eq!(extract_install_error(output), "Installer failed with exit code: 1603");

        let hex = "Starting package install...\n  0x8a15002b : hash mismatch  ";
        assert_eq!(extract_install_error(hex), "0x8a15002b : hash mismatch");
    }

    #[test]
    fn test_extract_falls_back_to_last_line() {
        assert_eq!(extract_install_error("one\ntwo\n\n  "), "two");
        assert_eq!(extract_install_error("   \n"), "Unknown error");
    }

    #[test]
    fn test_extract_truncates() {
        let long = format!("error: {}", "x".repeat(300));
        assert_eq!(extract_install_error(&long).chars().count(), ERROR_LINE_LIMIT);
    }
}
