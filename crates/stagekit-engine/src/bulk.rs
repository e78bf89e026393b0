//! Bulk operation taxonomy: resolving raw selection entries into web paths
//! and classifying per-item results into a three-level summary.

/// Outcome of one item in a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResult {
    /// The resolved web path this result belongs to.
    pub path: String,
    pub ok: bool,
    /// HTTP status of the item's operation; 0 when no response arrived.
    pub status: u16,
    pub error: Option<String>,
}

/// Severity of a completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Every item succeeded.
    Info,
    /// Some items failed.
    Warning,
    /// Every item failed.
    Fatal,
}

/// ok/failed buckets plus the batch severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSummary {
    pub ok: Vec<BulkResult>,
    pub failed: Vec<BulkResult>,
    pub severity: Severity,
}

/// Classify a completed batch.
///
/// `normalize` lets callers rewrite raw error details into user-facing
/// categories; [`normalize_error_message`] supplies the built-in rules.
pub fn summarize(
    results: Vec<BulkResult>,
    normalize: Option<&dyn Fn(&str) -> Option<String>>,
) -> BulkSummary {
    let mut ok = Vec::new();
    let mut failed = Vec::new();
    for mut result in results {
        if result.ok {
            ok.push(result);
        } else {
            if let (Some(normalize), Some(error)) = (normalize, result.error.as_deref())
                && let Some(rewritten) = normalize(error)
            {
                result.error = Some(rewritten);
            }
            failed.push(result);
        }
    }

    let severity = if failed.is_empty() {
        Severity::Info
    } else if ok.is_empty() {
        Severity::Fatal
    } else {
        Severity::Warning
    };

    BulkSummary {
        ok,
        failed,
        severity,
    }
}

/// Built-in error-message rewriting for well-known admin API responses.
pub fn normalize_error_message(raw: &str) -> Option<String> {
    let lower = raw.to_lowercase();
    if lower.contains("not supported") {
        return Some("file type not supported".to_string());
    }
    if lower.contains("source does not exist") {
        return Some("source file not found".to_string());
    }
    None
}

/// Resolve a raw selection entry into a web path under `folder`.
///
/// Word-processor documents publish without an extension, spreadsheets as
/// `.json`, `index` collapses onto the folder itself, and everything else
/// keeps its extension. File stems are slugified.
pub fn resolve_web_path(folder: &str, filename: &str) -> String {
    let folder = folder.trim_end_matches('/');
    let (stem, extension) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext.to_lowercase())),
        _ => (filename, None),
    };
    let slug = slugify(stem);

    let tail = match extension.as_deref() {
        // Documents become extensionless pages.
        None | Some("docx") | Some("doc") | Some("md") => {
            if slug == "index" {
                String::new()
            } else {
                slug
            }
        }
        // Spreadsheets surface as JSON resources.
        Some("xlsx") | Some("xls") => format!("{}.json", slug),
        Some(ext) => format!("{}.{}", slug, ext),
    };
    format!("{}/{}", folder, tail)
}

/// Lowercase, fold common Latin diacritics, turn separators into dashes and
/// drop everything else.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = false;
    for ch in name.to_lowercase().chars() {
        let folded: &str = match ch {
            'ä' | 'á' | 'à' | 'â' | 'å' | 'ã' => "a",
            'ö' | 'ó' | 'ò' | 'ô' | 'õ' => "o",
            'ü' | 'ú' | 'ù' | 'û' => "u",
            'é' | 'è' | 'ê' | 'ë' => "e",
            'í' | 'ì' | 'î' | 'ï' => "i",
            'ñ' => "n",
            'ç' => "c",
            'ß' => "ss",
            'a'..='z' | '0'..='9' => {
                slug.push(ch);
                last_dash = false;
                continue;
            }
            _ => "",
        };
        if folded.is_empty() {
            // Separator or unsupported character: collapse into one dash.
            if !last_dash && !slug.is_empty() {
                slug.push('-');
                last_dash = true;
            }
        } else {
            slug.push_str(folded);
            last_dash = false;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(path: &str, ok: bool, error: Option<&str>) -> BulkResult {
        BulkResult {
            path: path.to_string(),
            ok,
            status: if ok { 200 } else { 502 },
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn severity_classification() {
        let all_ok = summarize(
            vec![result("/a", true, None), result("/b", true, None), result("/c", true, None)],
            None,
        );
        assert_eq!(all_ok.severity, Severity::Info);
        assert_eq!(all_ok.ok.len(), 3);

        let partial = summarize(
            vec![result("/a", true, None), result("/b", true, None), result("/c", false, None)],
            None,
        );
        assert_eq!(partial.severity, Severity::Warning);
        assert_eq!((partial.ok.len(), partial.failed.len()), (2, 1));

        let none_ok = summarize(
            vec![
                result("/a", false, None),
                result("/b", false, None),
                result("/c", false, None),
            ],
            None,
        );
        assert_eq!(none_ok.severity, Severity::Fatal);
    }

    #[test]
    fn built_in_message_rewriting() {
        let summary = summarize(
            vec![
                result("/a", false, Some("operation not supported for mp4")),
                result("/b", false, Some("source does not exist")),
                result("/c", false, Some("internal error")),
            ],
            Some(&normalize_error_message),
        );
        let errors: Vec<&str> = summary
            .failed
            .iter()
            .map(|r| r.error.as_deref().unwrap())
            .collect();
        assert_eq!(
            errors,
            vec!["file type not supported", "source file not found", "internal error"]
        );
    }

    #[test]
    fn web_path_resolution() {
        assert_eq!(resolve_web_path("/en", "My Post.docx"), "/en/my-post");
        assert_eq!(resolve_web_path("/en/", "index.md"), "/en/");
        assert_eq!(resolve_web_path("/en", "rates.xlsx"), "/en/rates.json");
        assert_eq!(resolve_web_path("/en", "paper.pdf"), "/en/paper.pdf");
        assert_eq!(resolve_web_path("", "Übersicht.docx"), "/ubersicht");
    }

    #[test]
    fn slug_rules() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Déjà vu"), "deja-vu");
        assert_eq!(slugify("straße"), "strasse");
        assert_eq!(slugify("a--b"), "a-b");
        assert_eq!(slugify("trailing "), "trailing");
    }
}
