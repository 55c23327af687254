//! SVG waveform rendering with keyword intervals highlighted.

use crate::audio::AudioClip;
use crate::error::Result;
use crate::timeline::TimeInterval;
use std::path::Path;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const X_TICKS: usize = 10;

#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            title: "Waveform with Keyword Intervals".to_string(),
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Min/max of each of `columns` equal slices of a mono signal
fn envelope(samples: &[f32], columns: usize) -> Vec<(f32, f32)> {
    if samples.is_empty() || columns == 0 {
        return Vec::new();
    }
    (0..columns)
        .filter_map(|col| {
            let start = col * samples.len() / columns;
            let end = ((col + 1) * samples.len() / columns).max(start + 1).min(samples.len());
            let slice = samples.get(start..end)?;
            let min = slice.iter().copied().fold(f32::INFINITY, f32::min);
            let max = slice.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            Some((min, max))
        })
        .collect()
}

/// Render the clip's waveform as an SVG document
pub fn render_waveform_svg(clip: &AudioClip, intervals: &[TimeInterval], config: &PlotConfig) -> String {
    let width = config.width as f64;
    let height = config.height as f64;
    let plot_w = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
    let plot_h = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
    let bottom = MARGIN_TOP + plot_h;

    let duration = clip.duration_secs();
    let axis_duration = if duration > 0.0 { duration } else { 1.0 };
    let x_of = |t: f64| MARGIN_LEFT + (t / axis_duration).clamp(0.0, 1.0) * plot_w;
    let y_of = |a: f64| MARGIN_TOP + (1.0 - (a.clamp(-1.0, 1.0) + 1.0) / 2.0) * plot_h;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = config.width,
        h = config.height
    ));
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"20\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>\n",
        MARGIN_LEFT + plot_w / 2.0,
        MARGIN_TOP / 2.0 + 8.0,
        escape_xml(&config.title)
    ));

    for interval in intervals {
        let x0 = x_of(interval.start_secs);
        let x1 = x_of(interval.end_secs);
        svg.push_str(&format!(
            "<rect class=\"keyword\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"yellow\" fill-opacity=\"0.5\"><title>Keyword: {}</title></rect>\n",
            x0,
            MARGIN_TOP,
            (x1 - x0).max(1.0),
            plot_h,
            escape_xml(&interval.keyword)
        ));
    }

    let mono = crate::audio::downmix_to_mono(&clip.samples, clip.channels);
    let columns = envelope(&mono, plot_w as usize);
    if !columns.is_empty() {
        let step = plot_w / columns.len() as f64;
        let mut path = String::new();
        for (i, (min, max)) in columns.iter().enumerate() {
            let x = MARGIN_LEFT + (i as f64 + 0.5) * step;
            path.push_str(&format!(
                "M{:.2} {:.2}L{:.2} {:.2}",
                x,
                y_of(*max as f64),
                x,
                y_of(*min as f64)
            ));
        }
        svg.push_str(&format!(
            "<path class=\"waveform\" d=\"{}\" stroke=\"blue\" stroke-width=\"1\" fill=\"none\"/>\n",
            path
        ));
    }

    // Axes
    svg.push_str(&format!(
        "<path d=\"M{l:.1} {t:.1}V{b:.1}H{r:.1}\" stroke=\"black\" fill=\"none\"/>\n",
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = bottom,
        r = MARGIN_LEFT + plot_w
    ));
    for i in 0..=X_TICKS {
        let t = axis_duration * i as f64 / X_TICKS as f64;
        let x = x_of(t);
        svg.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"{b:.2}\" x2=\"{x:.2}\" y2=\"{b2:.2}\" stroke=\"black\"/><text x=\"{x:.2}\" y=\"{ty:.2}\" font-size=\"12\" text-anchor=\"middle\" font-family=\"sans-serif\">{t:.2}</text>\n",
            b = bottom,
            b2 = bottom + 5.0,
            ty = bottom + 20.0,
        ));
    }
    for amplitude in [-1.0, -0.5, 0.0, 0.5, 1.0] {
        let y = y_of(amplitude);
        svg.push_str(&format!(
            "<line x1=\"{l2:.2}\" y1=\"{y:.2}\" x2=\"{l:.2}\" y2=\"{y:.2}\" stroke=\"black\"/><text x=\"{tx:.2}\" y=\"{ty:.2}\" font-size=\"12\" text-anchor=\"end\" font-family=\"sans-serif\">{amplitude:.1}</text>\n",
            l = MARGIN_LEFT,
            l2 = MARGIN_LEFT - 5.0,
            tx = MARGIN_LEFT - 8.0,
            ty = y + 4.0,
        ));
    }
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"14\" text-anchor=\"middle\" font-family=\"sans-serif\">Time (s)</text>\n",
        MARGIN_LEFT + plot_w / 2.0,
        height - 20.0
    ));
    svg.push_str(&format!(
        "<text x=\"20\" y=\"{y:.1}\" font-size=\"14\" text-anchor=\"middle\" font-family=\"sans-serif\" transform=\"rotate(-90 20 {y:.1})\">Amplitude</text>\n",
        y = MARGIN_TOP + plot_h / 2.0
    ));

    // Legend, one entry per distinct keyword
    let mut labels: Vec<&str> = Vec::new();
    for interval in intervals {
        if !labels.contains(&interval.keyword.as_str()) {
            labels.push(&interval.keyword);
        }
    }
    let legend_x = MARGIN_LEFT + plot_w - 220.0;
    for (i, keyword) in std::iter::once("Waveform").chain(labels.iter().copied()).enumerate() {
        let y = MARGIN_TOP + 15.0 + i as f64 * 20.0;
        let (swatch, label) = if i == 0 {
            ("fill=\"blue\"".to_string(), keyword.to_string())
        } else {
            (
                "fill=\"yellow\" fill-opacity=\"0.5\"".to_string(),
                format!("Keyword: {}", escape_xml(keyword)),
            )
        };
        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"16\" height=\"10\" {}/><text class=\"legend\" x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" font-family=\"sans-serif\">{}</text>\n",
            legend_x,
            y - 9.0,
            swatch,
            legend_x + 22.0,
            y,
            label
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render and write the waveform plot to `path`
pub fn write_waveform_svg<P: AsRef<Path>>(
    path: P,
    clip: &AudioClip,
    intervals: &[TimeInterval],
    config: &PlotConfig,
) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_waveform_svg(clip, intervals, config))?;
    log::info!("Waveform plot written to {}", path.display());
    Ok(())
}
