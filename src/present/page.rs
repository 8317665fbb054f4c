// src/present/page.rs

use std::fmt::Write;

use super::{Layout, PageOptions};
use crate::table::{Indicator, IndicatorTable};

const PAGE_HTML: &str = r#"<!doctype html>
<html lang="zh-Hant">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{TITLE}}</title>
    <link rel="icon" href="data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>{{ICON}}</text></svg>" />
    <script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
    <script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
    <script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>
    <style>
      :root {
        --bg: #ffffff;
        --text: #31333f;
        --muted: #808495;
        --border: #e6e9ef;
        --warn-bg: #fffce7;
        --warn-text: #926c05;
        --error-bg: #ffecec;
        --error-text: #7d353b;
      }
      body { font-family: "Source Sans Pro", system-ui, sans-serif; margin: 0; background: var(--bg); color: var(--text); }
      main { padding: 3rem 1rem 6rem; margin: 0 auto; }
      main.wide { max-width: none; padding-left: 5rem; padding-right: 5rem; }
      main.centered { max-width: 46rem; }
      h1 { font-size: 2.75rem; font-weight: 700; }
      h3 { font-size: 1.75rem; font-weight: 600; margin-top: 2rem; }
      .banner { border-radius: 0.5rem; padding: 1rem; margin: 1rem 0; }
      .banner.warning { background: var(--warn-bg); color: var(--warn-text); }
      .banner.error { background: var(--error-bg); color: var(--error-text); }
      .table-wrap { max-height: 26rem; overflow: auto; border: 1px solid var(--border); }
      table { border-collapse: collapse; font-size: 0.875rem; white-space: nowrap; }
      th, td { border-bottom: 1px solid var(--border); padding: 0.25rem 0.75rem; text-align: right; }
      th { position: sticky; top: 0; background: #fafafa; color: var(--muted); font-weight: 400; }
      td.date, th.date { text-align: left; }
    </style>
  </head>
  <body>
    <main class="{{LAYOUT}}">
      <h1>{{TITLE}}</h1>
{{BODY}}
    </main>
{{SCRIPTS}}
  </body>
</html>
"#;

pub(crate) fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON placed inside `<script>` must not be able to close the element.
pub(crate) fn escape_script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

pub(crate) fn banner(class: &str, message: &str) -> String {
    format!(
        "      <div class=\"banner {class}\" role=\"alert\">{}</div>\n",
        escape_text(message)
    )
}

pub(crate) fn heading(text: &str) -> String {
    format!("      <h3>{}</h3>\n", escape_text(text))
}

fn format_value(v: Option<f64>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Full table as an HTML `<table>`: date column, then every indicator.
pub(crate) fn table_view(table: &IndicatorTable) -> String {
    let mut out = String::from("      <div class=\"table-wrap\"><table>\n        <thead><tr>");
    out.push_str("<th class=\"date\"></th>");
    for ind in Indicator::ALL {
        let _ = write!(out, "<th>{}</th>", escape_text(ind.name()));
    }
    out.push_str("</tr></thead>\n        <tbody>\n");
    for (row, date) in table.dates().iter().enumerate() {
        let _ = write!(out, "          <tr><td class=\"date\">{}</td>", date.format("%Y-%m-%d"));
        for ind in Indicator::ALL {
            let _ = write!(out, "<td>{}</td>", format_value(table.value(row, ind)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("        </tbody>\n      </table></div>\n");
    out
}

pub(crate) fn chart_slot(id: &str) -> String {
    format!("      <div id=\"{id}\"></div>\n")
}

pub(crate) fn embed_script(id: &str, spec_json: &str) -> String {
    format!(
        "    <script>vegaEmbed(\"#{id}\", {}, {{ actions: false }});</script>\n",
        escape_script_json(spec_json)
    )
}

/// Icon text for the `data:` URL of the favicon.
fn icon_data(icon: &str) -> String {
    url::form_urlencoded::byte_serialize(icon.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Fill `{{NAME}}` slots in one pass, so filled text is never rescanned.
fn fill(template: &str, value: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}").and_then(|close| Some((close, value(&after[..close])?))) {
            Some((close, filled)) => {
                out.push_str(&filled);
                rest = &after[close + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub(crate) fn assemble(page: &PageOptions, body: &str, scripts: &str) -> String {
    let layout = match page.layout {
        Layout::Wide => "wide",
        Layout::Centered => "centered",
    };
    fill(PAGE_HTML, |slot| match slot {
        "TITLE" => Some(escape_text(&page.title)),
        "ICON" => Some(icon_data(&page.icon)),
        "LAYOUT" => Some(layout.to_string()),
        "BODY" => Some(body.to_string()),
        "SCRIPTS" => Some(scripts.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_text(r#"<b>"A&B"</b>"#),
            "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;"
        );
        assert_eq!(
            escape_script_json(r#"{"t":"</script><script>"}"#),
            r#"{"t":"<\/script><script>"}"#
        );
    }

    #[test]
    fn values_print_without_trailing_zeros() {
        assert_eq!(format_value(Some(23588597.0)), "23588597");
        assert_eq!(format_value(Some(0.08)), "0.08");
        assert_eq!(format_value(None), "");
    }

    #[test]
    fn assemble_fills_every_placeholder() {
        let page = PageOptions::default();
        let html = assemble(&page, "<p>body</p>", "");
        assert!(!html.contains("{{"));
        assert!(html.contains("<title>台灣人口指數資料</title>"));
        assert!(html.contains("<main class=\"wide\">"));
        assert!(html.contains("%F0%9F%93%8A"));
    }

    #[test]
    fn placeholders_in_user_text_stay_literal() {
        let page = PageOptions {
            title: "{{BODY}} & {{SCRIPTS}}".into(),
            ..PageOptions::default()
        };
        let html = assemble(&page, "<p>body</p>", "<script>s()</script>");
        assert!(html.contains("<title>{{BODY}} &amp; {{SCRIPTS}}</title>"));
        assert_eq!(html.matches("<p>body</p>").count(), 1);
        assert_eq!(html.matches("<script>s()</script>").count(), 1);
    }

    #[test]
    fn icon_is_percent_encoded_in_favicon_url() {
        let page = PageOptions {
            icon: "\"><b>#".into(),
            ..PageOptions::default()
        };
        let html = assemble(&page, "", "");
        assert!(html.contains("font-size=%2290%22>%22%3E%3Cb%3E%23</text>"));
        assert!(!html.contains("<b>"));

        let html = assemble(&PageOptions::default(), "", "");
        assert!(html.contains(">%F0%9F%93%8A</text>"));
    }
}
