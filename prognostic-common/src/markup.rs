//! Markup-to-HTML transform
//!
//! Renders the lightweight markup accepted by the insert endpoints into the
//! HTML fragment stored in the database. Pure and deterministic.
//!
//! Rule order is load-bearing: heading rules run against the string already
//! rewritten by the bold rule, and the newline rule runs last so heading
//! lines are matched while real newlines still exist.
//!
//! The input is NOT escaped. Text that already contains HTML passes through
//! untouched, so rendering untrusted input to a browser requires
//! sanitization downstream.

use regex::Regex;
use std::sync::LazyLock;

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));

static H3_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^### (.*)").expect("valid regex"));

static H2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## (.*)").expect("valid regex"));

/// Render markup to the stored HTML form.
///
/// 1. `**X**` -> `<strong>X</strong>` (non-greedy, global)
/// 2. lines starting `### ` -> `<h3 class="text-xl font-bold mb-2">...</h3>`
/// 3. lines starting `## ` -> `<h2 class="text-2xl font-bold mb-4">...</h2>`
/// 4. `\n` -> `<br>`
pub fn render(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "<strong>$1</strong>");
    let text = H3_RE.replace_all(&text, r#"<h3 class="text-xl font-bold mb-2">$1</h3>"#);
    let text = H2_RE.replace_all(&text, r#"<h2 class="text-2xl font-bold mb-4">$1</h2>"#);
    text.replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_span() {
        assert_eq!(render("**bold**"), "<strong>bold</strong>");
    }

    #[test]
    fn test_bold_non_greedy() {
        assert_eq!(
            render("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
    }

    #[test]
    fn test_h2_line() {
        assert_eq!(
            render("## Head"),
            r#"<h2 class="text-2xl font-bold mb-4">Head</h2>"#
        );
    }

    #[test]
    fn test_h3_line() {
        assert_eq!(
            render("### Sub"),
            r#"<h3 class="text-xl font-bold mb-2">Sub</h3>"#
        );
    }

    #[test]
    fn test_h3_matched_before_h2() {
        // The h3 rule must consume "### " lines so the h2 rule never sees
        // them as "## " plus a leading '#'
        let out = render("### Sub");
        assert!(out.contains("<h3"));
        assert!(!out.contains("<h2"));
    }

    #[test]
    fn test_newlines_become_breaks() {
        let out = render("one\ntwo");
        assert_eq!(out, "one<br>two");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_bold_inside_heading() {
        // Bold runs first, so headings wrap already-rendered strong tags
        assert_eq!(
            render("## **Big**"),
            r#"<h2 class="text-2xl font-bold mb-4"><strong>Big</strong></h2>"#
        );
    }

    #[test]
    fn test_combined_document() {
        let out = render("**Hi**\n## Sub");
        assert_eq!(
            out,
            r#"<strong>Hi</strong><br><h2 class="text-2xl font-bold mb-4">Sub</h2>"#
        );
    }

    #[test]
    fn test_existing_html_passes_through() {
        assert_eq!(render("<p>kept</p>"), "<p>kept</p>");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(render("no markup here"), "no markup here");
    }
}
