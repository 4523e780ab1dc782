//! SVG rendering of a shelf layout.

use crate::geometry::ShelfLayout;
use crate::model::Shelf;

/// Fill colors cycled through by game position.
const PALETTE: [&str; 12] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac", "#86bcb6", "#d37295",
];

/// Output settings for `render_svg`.
#[derive(Clone, Debug)]
pub struct SvgOptions {
    /// Pixels per shelf unit
    pub scale: f64,
    pub font_size: f64,
    pub title: String,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            scale: 40.0,
            font_size: 12.0,
            title: "Board Game Shelf Visualization".to_string(),
        }
    }
}

/// Draws the layout as a standalone SVG document.
///
/// The layout's y axis points up; SVG's points down, so everything is
/// mirrored around the layout bounds.
pub fn render_svg(layout: &ShelfLayout, options: &SvgOptions) -> String {
    let scale = options.scale;
    let title_band = options.font_size * 3.0;
    let width = layout.bounds.x * scale;
    let height = layout.bounds.y * scale + title_band;
    let flip = |y: f64| title_band + (layout.bounds.y - y) * scale;

    let mut svg = String::new();
    push_line(
        &mut svg,
        &format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.1}" height="{h:.1}" viewBox="0 0 {w:.1} {h:.1}">"#,
            w = width,
            h = height
        ),
    );
    push_line(
        &mut svg,
        &format!(
            r#"  <rect x="0" y="0" width="{:.1}" height="{:.1}" fill="white"/>"#,
            width, height
        ),
    );
    push_line(
        &mut svg,
        &format!(
            r#"  <text x="{:.1}" y="{:.1}" font-size="{:.1}" text-anchor="middle" font-family="sans-serif">{}</text>"#,
            width / 2.0,
            options.font_size * 2.0,
            options.font_size * 1.5,
            escape_xml(&options.title)
        ),
    );

    for baseline in &layout.baselines {
        let y = flip(baseline.y);
        push_line(
            &mut svg,
            &format!(
                r#"  <line class="shelf" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="black" stroke-width="2"/>"#,
                baseline.x_start * scale,
                y,
                baseline.x_end * scale,
                y
            ),
        );
    }

    for (idx, game) in layout.games.iter().enumerate() {
        let size = game.rect.size();
        let center = game.rect.center();
        push_line(
            &mut svg,
            &format!(
                r#"  <rect class="game" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="black"><title>{}</title></rect>"#,
                game.rect.min.x * scale,
                flip(game.rect.max.y),
                size.x * scale,
                size.y * scale,
                PALETTE[idx % PALETTE.len()],
                escape_xml(&game.name)
            ),
        );
        push_line(
            &mut svg,
            &format!(
                r#"  <text x="{:.2}" y="{:.2}" font-size="{:.1}" text-anchor="middle" dominant-baseline="middle" font-family="sans-serif">{}</text>"#,
                center.x * scale,
                flip(center.y),
                options.font_size,
                escape_xml(&game.name)
            ),
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Lays out the shelves and renders them in one step.
pub fn render_shelves(shelves: &[Shelf], options: &SvgOptions) -> String {
    render_svg(&crate::geometry::layout(shelves), options)
}

fn push_line(svg: &mut String, line: &str) {
    svg.push_str(line);
    svg.push('\n');
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
