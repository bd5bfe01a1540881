//! HTML slide deck with inline SVG charts

use super::{Deck, GapPanes};
use crate::chart::draw::escape_xml;
use crate::config::DeckConfig;
use crate::slides::{Block, SlideOutput};
use std::io::{self, Write};

/// How the gap view gets its panes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controls {
    /// Every pane is embedded; the script only toggles visibility
    Static,
    /// Panes come from the local server's `/gaps` endpoint
    Live,
}

/// Self-contained deck for opening straight from disk
pub fn write<W: Write>(writer: &mut W, deck: &Deck, config: &DeckConfig) -> io::Result<()> {
    write_deck(writer, deck, config, Controls::Static)
}

pub fn write_deck<W: Write>(writer: &mut W, deck: &Deck, config: &DeckConfig, controls: Controls) -> io::Result<()> {
    let title = escape_xml(&deck.title);
    let summary = &deck.summary;

    write!(writer, r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        :root {{
            --bg: #F3F6F9;
            --card: #FFFFFF;
            --border: #E5E7EB;
            --text: #2c3e50;
            --dim: #6B7280;
            --muted: #9CA3AF;
            --accent: #2C90C4;
            --light: #70C3E9;
            --positive: #059669;
            --negative: #DC2626;
            --error: #EF4444;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: '{font}', -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; padding: 2rem; }}

        /* Header */
        .header {{
            display: flex;
            justify-content: space-between;
            align-items: flex-end;
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 2px solid var(--accent);
        }}
        .logo {{ font-size: 2.25rem; font-weight: 800; color: var(--accent); }}
        .subtitle {{ color: var(--dim); }}
        .stats {{ display: flex; gap: 1.5rem; }}
        .stat {{ text-align: right; }}
        .stat-value {{ font-size: 1.75rem; font-weight: 700; line-height: 1; }}
        .stat-label {{ color: var(--dim); font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em; }}

        /* Slides */
        .slide {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 2rem;
            margin-bottom: 2rem;
        }}
        .slide h2 {{ font-size: 1.4rem; margin-bottom: 1.25rem; }}
        .charts {{ display: flex; flex-wrap: wrap; gap: 1.5rem; }}
        .chart-card {{ flex: 1 1 100%; overflow-x: auto; }}
        .chart-card.doughnut {{ flex: 1 1 340px; }}
        svg.chart {{ max-width: 100%; height: auto; }}
        .placeholder {{
            flex: 1 1 100%;
            padding: 40px;
            text-align: center;
            color: var(--muted);
            font-size: 0.95em;
        }}
        .placeholder.error {{ color: var(--error); }}
        svg.chart .legend-item {{ cursor: pointer; }}
        svg.chart .legend-item.off {{ opacity: 0.5; }}
        .segment-legend {{ display: flex; gap: 1.25rem; flex: 1 1 100%; font-size: 0.85rem; font-weight: 600; }}
        .segment i {{ display: inline-block; width: 14px; height: 14px; border: 1.5px solid; border-radius: 3px; margin-right: 6px; vertical-align: -2px; }}

        /* Warnings */
        .warnings {{ background: #FFFBEB; border-color: #FCD34D; }}
        .warnings li {{ margin-left: 1.25rem; font-size: 0.875rem; }}
        .warnings code {{ font-family: 'SF Mono', 'Fira Code', monospace; }}

        /* Gap view */
        .view-toggle {{ display: flex; gap: 0.5rem; margin-bottom: 1rem; }}
        .view-btn {{
            border: 1px solid var(--accent);
            background: none;
            color: var(--accent);
            border-radius: 20px;
            padding: 0.4rem 1.1rem;
            font-weight: 600;
            cursor: pointer;
        }}
        .view-btn.active {{ background: var(--accent); color: #fff; }}
        .dimension-selector {{ display: none; margin-bottom: 1rem; }}
        .dimension-selector.active {{ display: block; }}
        .dimension-selector select {{ padding: 0.4rem 0.75rem; border-radius: 6px; border: 1px solid var(--border); font: inherit; }}
        .instructions {{ color: var(--dim); font-size: 0.85rem; margin-top: 0.4rem; }}

        /* Tables */
        .stats-table {{ width: 100%; border-collapse: collapse; margin-top: 1rem; font-size: 0.875rem; }}
        .stats-table th, .stats-table td {{ padding: 0.6rem 0.75rem; text-align: left; border-bottom: 1px solid var(--border); }}
        .stats-table th {{
            font-size: 0.72rem;
            text-transform: uppercase;
            letter-spacing: 0.05em;
            color: var(--dim);
        }}
        .stats-table .num {{ text-align: center; font-weight: 600; }}
        .stats-table .pct {{ color: var(--accent); font-weight: 700; }}
        .dimension-badge {{
            background: rgba(112,195,233,0.15);
            color: var(--accent);
            padding: 0.15rem 0.6rem;
            border-radius: 12px;
            font-size: 0.75rem;
            font-weight: 600;
        }}
        .gap-positive {{ color: var(--positive); font-weight: 700; }}
        .gap-negative {{ color: var(--negative); font-weight: 700; }}
        .gap-neutral {{ color: var(--dim); font-weight: 600; }}

        /* Footer */
        .footer {{
            margin-top: 2rem;
            padding-top: 1rem;
            border-top: 1px solid var(--border);
            color: var(--dim);
            font-size: 0.875rem;
            text-align: center;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div>
                <div class="logo">{title}</div>
                <div class="subtitle">Survey Results Deck</div>
            </div>
            <div class="stats">
                <div class="stat"><div class="stat-value">{rendered}</div><div class="stat-label">Charts</div></div>
                <div class="stat"><div class="stat-value">{skipped}</div><div class="stat-label">Skipped</div></div>
                <div class="stat"><div class="stat-value">{warnings}</div><div class="stat-label">Warnings</div></div>
            </div>
        </div>
"#,
        title = title,
        font = escape_xml(&config.chart.font),
        rendered = summary.charts_rendered,
        skipped = summary.charts_skipped,
        warnings = summary.warnings,
    )?;

    if !deck.warnings.is_empty() {
        writeln!(writer, r#"        <section class="slide warnings" id="data-warnings"><h2>Data warnings</h2><ul>"#)?;
        for w in &deck.warnings {
            writeln!(
                writer,
                "            <li><code>{}</code>: {}</li>",
                escape_xml(&w.field),
                escape_xml(&w.message)
            )?;
        }
        writeln!(writer, "        </ul></section>")?;
    }

    // The gap view sits between the alignment slides and consensus
    let (before, after): (Vec<&SlideOutput>, Vec<&SlideOutput>) =
        deck.slides.iter().partition(|s| s.id.as_str() < "slide-08");
    for slide in before {
        write_slide(writer, slide)?;
    }
    write_gap_view(writer, &deck.gaps, controls)?;
    for slide in after {
        write_slide(writer, slide)?;
    }

    write!(writer, r#"
        <div class="footer">Generated by surveydeck {version}</div>
    </div>
    <script>
{script}
    </script>
</body>
</html>
"#,
        version = env!("CARGO_PKG_VERSION"),
        script = script(controls),
    )?;

    Ok(())
}

fn write_slide<W: Write>(writer: &mut W, slide: &SlideOutput) -> io::Result<()> {
    writeln!(
        writer,
        r#"        <section class="slide" id="{}"><h2>{}</h2><div class="charts">"#,
        escape_xml(&slide.id),
        escape_xml(&slide.title)
    )?;
    for block in &slide.blocks {
        match block {
            Block::Chart(chart) => {
                let class = if chart.svg.contains("<path") { "chart-card doughnut" } else { "chart-card" };
                writeln!(
                    writer,
                    r#"            <figure class="{}" data-canvas="{}">{}</figure>"#,
                    class,
                    escape_xml(&chart.canvas),
                    chart.svg
                )?;
            }
            Block::Html(html) => writeln!(writer, "            {}", html)?,
            Block::Placeholder(text) => {
                writeln!(writer, r#"            <div class="placeholder">{}</div>"#, escape_xml(text))?
            }
        }
    }
    writeln!(writer, "        </div></section>")
}

fn write_gap_view<W: Write>(writer: &mut W, gaps: &GapPanes, controls: Controls) -> io::Result<()> {
    write!(writer, r#"        <section class="slide" id="slide-08"><h2>Opportunity Gaps</h2>
            <div class="view-toggle">
                <button class="view-btn active" data-view="overview" onclick="showView('overview', this)">Top Gaps</button>
                <button class="view-btn" data-view="dimension" onclick="showView('dimension', this)">By Dimension</button>
            </div>
            <div class="dimension-selector" id="dimensionSelector">
                <select id="dimensionSelect" onchange="showDimension()">
                    <option value="">Choose a dimension...</option>
"#)?;
    for option in &gaps.options {
        writeln!(
            writer,
            r#"                    <option value="{}">{}</option>"#,
            escape_xml(&option.id),
            escape_xml(&option.name)
        )?;
    }
    write!(writer, r#"                </select>
                <div class="instructions" id="dimensionInstructions">Pick a dimension to see every opportunity it contains.</div>
            </div>
            <div id="mainContent">
"#)?;

    match controls {
        Controls::Static => {
            writeln!(writer, r#"                <div class="gap-pane" data-pane="overview">{}</div>"#, gaps.overview)?;
            writeln!(writer, r#"                <div class="gap-pane" data-pane="prompt" hidden>{}</div>"#, gaps.prompt)?;
            writeln!(writer, r#"                <div class="gap-pane" data-pane="cleared" hidden>{}</div>"#, gaps.cleared)?;
            for (id, pane) in &gaps.dimensions {
                writeln!(
                    writer,
                    r#"                <div class="gap-pane" data-pane="dim-{}" hidden>{}</div>"#,
                    escape_xml(id),
                    pane
                )?;
            }
        }
        Controls::Live => writeln!(writer, "                {}", gaps.overview)?,
    }

    writeln!(writer, "            </div>\n        </section>")
}

const TOGGLE_SCRIPT: &str = r#"
        function setActive(view, button) {
            document.querySelectorAll('.view-btn').forEach(b => b.classList.toggle('active', b === button || b.dataset.view === view));
            const selector = document.getElementById('dimensionSelector');
            selector.classList.toggle('active', view === 'dimension');
        }
        document.addEventListener('click', e => {
            const item = e.target.closest('svg.chart .legend-item');
            if (!item) return;
            const off = item.classList.toggle('off');
            item.closest('svg').querySelectorAll('.series[data-dataset="' + item.dataset.dataset + '"]')
                .forEach(g => { g.style.display = off ? 'none' : ''; });
        });
"#;

const STATIC_SCRIPT: &str = r#"
        function showPane(name) {
            const panes = document.querySelectorAll('.gap-pane');
            const known = Array.from(panes).some(p => p.dataset.pane === name);
            panes.forEach(p => { p.hidden = p.dataset.pane !== (known ? name : 'cleared'); });
        }
        function showView(view, button) {
            setActive(view, button);
            const select = document.getElementById('dimensionSelect');
            if (view === 'dimension') {
                showPane(select.value ? 'dim-' + select.value : 'prompt');
            } else {
                select.value = '';
                showPane('overview');
            }
        }
        function showDimension() {
            const select = document.getElementById('dimensionSelect');
            showPane(select.value ? 'dim-' + select.value : 'cleared');
        }
"#;

const LIVE_SCRIPT: &str = r#"
        function load(query) {
            fetch('/gaps?' + query)
                .then(r => r.text())
                .then(html => { document.getElementById('mainContent').innerHTML = html; })
                .catch(() => {
                    document.getElementById('mainContent').innerHTML =
                        '<div class="placeholder error">Chart data not loaded.</div>';
                });
        }
        function showView(view, button) {
            setActive(view, button);
            const select = document.getElementById('dimensionSelect');
            if (view !== 'dimension') select.value = '';
            load('view=' + view);
        }
        function showDimension() {
            const select = document.getElementById('dimensionSelect');
            load('view=dimension&dim=' + encodeURIComponent(select.value));
        }
"#;

fn script(controls: Controls) -> String {
    let body = match controls {
        Controls::Static => STATIC_SCRIPT,
        Controls::Live => LIVE_SCRIPT,
    };
    format!("{}{}", TOGGLE_SCRIPT, body)
}
