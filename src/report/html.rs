//! Report page assembly: one self-contained HTML document with every chart
//! inlined, a pointer-following tooltip layer over the SVG marks, and the
//! median ranking embedded as a JSON payload rendered into a table.

use std::fmt::Write as _;

use crate::report::chart::Chart;
use crate::report::svg::escape_xml;

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; max-width: 920px; margin: 24px auto; padding: 0 12px; color: #222; }
    h1 { margin-bottom: 4px; }
    .meta { color: #666; margin-top: 0; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    .card h2 { margin: 0 0 10px; font-size: 1.05rem; }
    svg { display: block; }
    svg .lbl { font-size: 10px; fill: #555; }
    svg .panel-title { font-size: 11px; font-weight: 600; fill: #333; }
    svg .grid { stroke: #eee; }
    svg .axis { stroke: #999; }
    svg .tick { stroke: #999; }
    svg .panel { fill: none; stroke: #ddd; }
    svg .mark { cursor: pointer; }
    svg .mark:hover { opacity: 0.75; }
    table { border-collapse: collapse; width: 100%; }
    th, td { border-bottom: 1px solid #eee; padding: 4px 8px; text-align: left; font-size: 0.9rem; }
    th { color: #666; }
    #tooltip { display: none; position: absolute; background: #111; color: #aef2ae;
               padding: 8px 10px; border-radius: 6px; font-size: 12px; white-space: pre;
               pointer-events: none; z-index: 10; }
"#;

const SCRIPT: &str = r#"
    const tooltip = document.getElementById('tooltip');
    document.querySelectorAll('.mark').forEach(el => {
      el.addEventListener('mousemove', evt => {
        tooltip.textContent = el.getAttribute('data-tip') || '';
        tooltip.style.display = 'block';
        tooltip.style.left = (evt.pageX + 14) + 'px';
        tooltip.style.top = (evt.pageY + 14) + 'px';
      });
      el.addEventListener('mouseleave', () => { tooltip.style.display = 'none'; });
    });

    const ranking = JSON.parse(document.getElementById('ranking-data').textContent);
    const table = document.getElementById('ranking-table');
    const head = document.createElement('tr');
    head.innerHTML = '<th>#</th><th>Country</th><th>Median coverage</th>';
    table.appendChild(head);
    ranking.forEach((entry, i) => {
      const row = document.createElement('tr');
      [String(i + 1), entry.country, entry.statistic.toFixed(1)].forEach(text => {
        const cell = document.createElement('td');
        cell.textContent = text;
        row.appendChild(cell);
      });
      table.appendChild(row);
    });
"#;

/// Assemble the full report page. `ranking_json` is the serialized median
/// ranking embedded for the table at the bottom of the page.
pub fn report_page(
    title: &str,
    source: &str,
    generated: &str,
    charts: &[Chart],
    ranking_json: &str,
) -> String {
    let mut out = String::with_capacity(64 * 1024);
    let _ = write!(
        out,
        "<!doctype html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\" />\n  \
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\" />\n  \
         <title>{title}</title>\n  <style>{STYLE}</style>\n</head>\n<body>\n  \
         <h1>{title}</h1>\n  <p class=\"meta\">Source: {source} &middot; Generated {generated}</p>\n",
        title = escape_xml(title),
        source = escape_xml(source),
        generated = escape_xml(generated),
    );

    for chart in charts {
        let _ = write!(
            out,
            "\n  <section class=\"card\">\n    <h2>{title}</h2>\n    {svg}\n  </section>\n",
            title = escape_xml(&chart.title),
            svg = chart.svg,
        );
    }

    let _ = write!(
        out,
        "\n  <section class=\"card\">\n    <h2>Countries ranked by median coverage</h2>\n    \
         <table id=\"ranking-table\"></table>\n  </section>\n\n  <div id=\"tooltip\"></div>\n  \
         <script id=\"ranking-data\" type=\"application/json\">{json}</script>\n  \
         <script>{SCRIPT}</script>\n</body>\n</html>\n",
        json = ranking_json.replace("</", "<\\/"),
    );

    out
}
