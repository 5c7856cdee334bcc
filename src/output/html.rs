//! Human readable HTML renderer.

use std::fmt::Write;

use tracing::error;

use super::{Output, RenderContext};
use crate::probe::Status;
use crate::result::{HealthcheckResult, ProbeReport};

const STYLE: &str = "\
body{font-family:-apple-system,BlinkMacSystemFont,\"Segoe UI\",Roboto,sans-serif;margin:0;padding:2rem;background:#f4f5f7 center/cover no-repeat;color:#222}\
main{max-width:56rem;margin:0 auto;background:#fff;border-radius:6px;padding:1.5rem 2rem;box-shadow:0 1px 4px rgba(0,0,0,.15)}\
header{display:flex;align-items:center;gap:1rem}\
header img{max-height:3rem}\
.overall{padding:.75rem 1rem;border-radius:4px;font-weight:600;color:#fff}\
.success{background:#2e7d32}.error{background:#c62828}\
.probe{border-top:1px solid #e0e0e0;padding:1rem 0}\
.probe h2{font-size:1.1rem;margin:0 0 .5rem;display:flex;gap:.5rem;align-items:center}\
.badge{font-size:.75rem;padding:.1rem .5rem;border-radius:3px;color:#fff}\
.paused{background:#757575}\
.duration{font-size:.8rem;color:#757575;font-weight:400}\
ul{margin:0;padding-left:1.25rem}\
li.success{background:none;color:#2e7d32}li.error{background:none;color:#c62828}\
footer{margin-top:1rem;font-size:.8rem;color:#757575}";

/// Single page listing every probe with its messages.
///
/// Timestamp and caller IP are only shown with additional info enabled;
/// logo and background only when configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlOutput;

impl HtmlOutput {
    pub fn new() -> Self {
        Self
    }

    fn render(
        &self,
        result: &HealthcheckResult,
        context: &RenderContext,
    ) -> Result<String, std::fmt::Error> {
        let title = escape_html(&context.site_name);
        let mut out = String::with_capacity(4096);

        write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <meta name=\"robots\" content=\"noindex, nofollow\">\n\
             <title>{}</title>\n<style>{}</style>\n</head>\n",
            title, STYLE
        )?;

        match &context.background {
            Some(url) => writeln!(
                out,
                "<body style=\"background-image:url('{}')\">",
                escape_html(url)
            )?,
            None => writeln!(out, "<body>")?,
        }

        writeln!(out, "<main>\n<header>")?;
        if let Some(logo) = &context.logo {
            writeln!(out, "<img src=\"{}\" alt=\"\">", escape_html(logo))?;
        }
        writeln!(out, "<h1>{}</h1>\n</header>", title)?;

        let overall = match result.status() {
            Status::Success => "All probes are healthy",
            Status::Error => "At least one probe reported an error",
        };
        writeln!(
            out,
            "<p class=\"overall {}\">{}</p>",
            result.status(),
            overall
        )?;

        for report in result.probes() {
            render_probe(&mut out, report)?;
        }

        if context.additional_info {
            let mut details = Vec::new();
            if let Some(at) = context.generated_at {
                details.push(format!("Generated {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
            }
            if let Some(ip) = context.client_ip {
                details.push(escape_html(&format!("Requested from {}", ip)));
            }
            if !details.is_empty() {
                writeln!(out, "<footer>{}</footer>", details.join(" &middot; "))?;
            }
        }

        writeln!(out, "</main>\n</body>\n</html>")?;
        Ok(out)
    }
}

fn render_probe(out: &mut String, report: &ProbeReport) -> std::fmt::Result {
    let status = report.result.status();

    writeln!(out, "<section class=\"probe\">")?;
    write!(
        out,
        "<h2><span class=\"badge {}\">{}</span>{}",
        status,
        status,
        escape_html(&report.title)
    )?;
    if report.paused {
        write!(out, "<span class=\"badge paused\">paused</span>")?;
    }
    if let Some(duration) = report.duration() {
        write!(out, "<span class=\"duration\">{:.4}s</span>", duration)?;
    }
    writeln!(out, "</h2>")?;

    if !report.result.messages().is_empty() {
        writeln!(out, "<ul>")?;
        for message in report.result.messages() {
            writeln!(
                out,
                "<li class=\"{}\">{}</li>",
                message.status(),
                escape_html(message.text())
            )?;
        }
        writeln!(out, "</ul>")?;
    }

    writeln!(out, "</section>")
}

/// Escape text for use in HTML content and quoted attributes.
pub(crate) fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Output for HtmlOutput {
    fn content_type(&self) -> &str {
        "text/html; charset=utf-8"
    }

    fn content(&self, result: &HealthcheckResult, context: &RenderContext) -> String {
        self.render(result, context).unwrap_or_else(|e| {
            error!(error = %e, "Failed to render HTML output");
            format!(
                "<!DOCTYPE html>\n<html><body><p>{}</p></body></html>\n",
                result.status()
            )
        })
    }
}
