// src/dashboard/render.rs
use std::fmt::Write;

use crate::dashboard::page::{Cell, Page};

const SPINNER: &str = r#"<svg class="spinner" xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 24 24" width="14" height="14"><circle cx="12" cy="12" r="10" stroke="currentColor" stroke-width="4" opacity="0.25"></circle><path fill="currentColor" opacity="0.75" d="M4 12a8 8 0 018-8V0C5.373 0 0 5.373 0 12h4z"></path></svg>"#;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem}\
table{border-collapse:collapse;width:100%;margin-bottom:2rem}\
th,td{text-align:left;padding:.35rem .6rem;border-bottom:1px solid #ddd;vertical-align:top}\
th{width:40%;font-weight:normal}\
.ok{color:#1a7f37}.fail{color:#cf222e}\
.spinner{animation:spin 1s linear infinite;vertical-align:middle}\
@keyframes spin{to{transform:rotate(360deg)}}";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_cell(out: &mut String, cell: &Cell) {
    match cell {
        Cell::Text(text) => {
            let _ = write!(out, "<td>{}</td>", escape_html(text));
        }
        Cell::Lines(lines) => {
            let joined: Vec<String> = lines.iter().map(|l| escape_html(l)).collect();
            let _ = write!(out, "<td>{}</td>", joined.join("<br>"));
        }
        Cell::Flag { text, ok } => {
            let class = if *ok { "ok" } else { "fail" };
            let _ = write!(out, "<td class=\"{class}\">{}</td>", escape_html(text));
        }
        Cell::Pending { path } => {
            let _ = write!(
                out,
                "<td><span class=\"dir-size\" data-path=\"{}\">{SPINNER} Computing...</span></td>",
                escape_html(path)
            );
        }
    }
}

/// Renders the whole dashboard. `size_url` is handed to the browser script,
/// which resolves every `.dir-size` placeholder against it.
pub fn render_page(page: &Page, script_url: &str, size_url: &str) -> String {
    let mut out = String::with_capacity(8 * 1024);
    let _ = write!(
        out,
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>System status</title><style>{STYLE}</style></head><body>\
         <h1>System status</h1>"
    );

    for section in page.sections() {
        let _ = write!(
            out,
            "<section><h2>{}</h2><table><tbody>",
            escape_html(&section.title)
        );
        for row in &section.rows {
            let _ = write!(out, "<tr><th>{}</th>", escape_html(&row.title));
            render_cell(&mut out, &row.value);
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table></section>");
    }

    let _ = write!(
        out,
        "<script>window.statusBoard={{dirSizeUrl:\"{}\"}};</script>\
         <script src=\"{}\" defer></script></body></html>",
        escape_html(size_url),
        escape_html(script_url)
    );
    out
}
