//! Trusted Markdown to markup transform.
//!
//! Agent text is rendered to HTML with raw HTML passthrough disabled, so the
//! output is safe to hand to any markup-aware view.

use markdown::{Options, to_html_with_options};

/// Render agent Markdown (GitHub flavored) to safe HTML
pub fn render_markdown(text: &str) -> String {
    // `Options::gfm()` keeps `allow_dangerous_html` off.
    to_html_with_options(text, &Options::gfm()).unwrap_or_else(|_| markdown::to_html(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_paragraph_and_emphasis() {
        let html = render_markdown("It's a *poetry* collection.");
        assert_eq!(html, "<p>It's a <em>poetry</em> collection.</p>");
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render_markdown("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn lists_render_as_items() {
        let html = render_markdown("- one\n- two");
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<li>two</li>"));
    }
}
