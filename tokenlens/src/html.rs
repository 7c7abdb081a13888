//! Static HTML export of a rendered response
//!
//! Produces a self-contained page: one `<span>` per token carrying its
//! tooltip markup, and a small script that shows the shared tooltip next to
//! the pointer.

use crate::surface::{NoticeKind, OutputNode};
use crate::tooltip::{html_escape, TooltipContent, TOOLTIP_OFFSET};

const PAGE_HEAD: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body { font-family: 'SF Mono', 'Consolas', monospace; background: #1a1a2e; color: #eee; padding: 20px; }
        h1 { font-size: 1rem; color: #888; font-weight: normal; }
        #response-output { line-height: 1.8; white-space: pre-wrap; }
        .token { cursor: default; border-radius: 2px; }
        .token:hover { background: #0f3460; }
        .notice { margin-top: 10px; font-size: 0.9em; }
        .notice-unavailable { color: orange; }
        .notice-nodata, .notice-error { color: #f87171; }
        #tooltip { position: absolute; background: #16213e; border: 1px solid #0f3460; padding: 8px 12px; border-radius: 6px; font-size: 0.85em; pointer-events: none; }
        #tooltip ul { margin: 4px 0 0 16px; padding: 0; }
        .hidden { display: none; }
    </style>
"##;

const PAGE_SCRIPT: &str = r##"<script>
document.addEventListener('DOMContentLoaded', () => {
    const tooltip = document.getElementById('tooltip');
    const offset = Number(tooltip.dataset.offset);
    document.querySelectorAll('#response-output .token').forEach(span => {
        span.addEventListener('mousemove', (e) => {
            tooltip.innerHTML = span.dataset.tooltip;
            tooltip.classList.remove('hidden');
            tooltip.style.left = `${e.pageX + offset}px`;
            tooltip.style.top = `${e.pageY + offset}px`;
        });
        span.addEventListener('mouseout', () => tooltip.classList.add('hidden'));
    });
});
</script>
"##;

fn notice_class(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::ProbabilitiesUnavailable => "notice notice-unavailable",
        NoticeKind::NoData => "notice notice-nodata",
        NoticeKind::Error => "notice notice-error",
    }
}

/// Markup for the children of the output container
pub fn render_output(nodes: &[OutputNode]) -> String {
    let mut html = String::new();
    for node in nodes {
        match node {
            OutputNode::Token(token) => {
                let tooltip = TooltipContent::for_record(&token.record);
                html.push_str(&format!(
                    r#"<span class="token" data-index="{}" data-probability="{}" data-tooltip="{}">{}</span>"#,
                    token.index,
                    tooltip.probability,
                    html_escape(&tooltip.to_html()),
                    html_escape(token.text()),
                ));
            }
            OutputNode::Text(text) => {
                html.push_str(&format!("<p>{}</p>", html_escape(text)));
            }
            OutputNode::Notice { kind, message } => {
                html.push_str(&format!(
                    r#"<p class="{}">{}</p>"#,
                    notice_class(*kind),
                    html_escape(message)
                ));
            }
        }
    }
    html
}

/// A complete page showing `nodes` under the given prompt
pub fn render_page(prompt: &str, nodes: &[OutputNode]) -> String {
    let mut page = String::from(PAGE_HEAD);
    page.push_str(&format!("    <title>{}</title>\n</head>\n<body>\n", html_escape(prompt)));
    page.push_str(&format!("<h1>{}</h1>\n", html_escape(prompt)));
    page.push_str(&format!(
        "<div id=\"response-output\">{}</div>\n",
        render_output(nodes)
    ));
    page.push_str(&format!(
        "<div id=\"tooltip\" class=\"hidden\" data-offset=\"{}\"></div>\n",
        TOOLTIP_OFFSET
    ));
    page.push_str(PAGE_SCRIPT);
    page.push_str("</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::TokenRecord;
    use crate::surface::RenderedToken;

    #[test]
    fn test_token_span_carries_tooltip() {
        let record = TokenRecord::new("<The>", 0.9).with_alternative("A", 0.05);
        let nodes = vec![OutputNode::Token(RenderedToken { index: 0, record })];

        let html = render_output(&nodes);

        assert!(html.starts_with(
            r#"<span class="token" data-index="0" data-probability="0.9000""#
        ));
        assert!(html.contains("&lt;strong&gt;Probability:&lt;/strong&gt; 0.9000"));
        assert!(html.contains("&lt;li&gt;A: 0.0500&lt;/li&gt;"));
        assert!(html.ends_with(">&lt;The&gt;</span>"));
    }

    #[test]
    fn test_notices_and_text() {
        let nodes = vec![
            OutputNode::Text("a & b".to_string()),
            OutputNode::notice(NoticeKind::Error, "Error: prompt too long"),
        ];
        assert_eq!(
            render_output(&nodes),
            r#"<p>a &amp; b</p><p class="notice notice-error">Error: prompt too long</p>"#
        );
    }

    #[test]
    fn test_page_wires_tooltip() {
        let page = render_page("The sky is", &[]);
        assert!(page.contains("<title>The sky is</title>"));
        assert!(page.contains(r#"<div id="tooltip" class="hidden" data-offset="10">"#));
        assert!(page.contains("addEventListener('mousemove'"));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
