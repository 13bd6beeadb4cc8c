//! Low-level SVG building blocks shared by the chart kinds: linear scales,
//! tick generation, the categorical palette, and XML escaping.

/// Categorical palette, one slot per vaccine code at most.
pub const PALETTE: [&str; 14] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1",
    "#ff9da7", "#9c755f", "#bab0ac", "#1f77b4", "#8c564b", "#2ca02c", "#17becf",
];

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Maps a data domain onto a pixel range. A degenerate domain is padded so
/// single-valued series still land mid-range.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (mut d0, mut d1) = domain;
        if d1 == d0 {
            d0 -= 0.5;
            d1 += 0.5;
        }
        Self {
            d0,
            d1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn scale(&self, value: f64) -> f64 {
        self.r0 + (value - self.d0) / (self.d1 - self.d0) * (self.r1 - self.r0)
    }
}

/// Round tick positions covering [min, max] at a 1/2/5 step, at most a few
/// more than `target` ticks.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(max > min) {
        return vec![min];
    }
    let raw_step = (max - min) / target.max(1) as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    let step = factor * magnitude;

    let mut ticks = Vec::new();
    let mut tick = (min / step).ceil() * step;
    while tick <= max + step * 1e-6 {
        ticks.push(tick);
        tick += step;
    }
    ticks
}

/// Number formatting for axis labels and tooltips: integers stay integers,
/// everything else gets one decimal.
pub fn fmt_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}

pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("&#10;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_maps_domain_ends_onto_range_ends() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 800.0));
        assert_eq!(scale.scale(0.0), 0.0);
        assert_eq!(scale.scale(100.0), 800.0);
        assert_eq!(scale.scale(50.0), 400.0);
    }

    #[test]
    fn degenerate_domain_is_padded() {
        let scale = LinearScale::new((2020.0, 2020.0), (0.0, 100.0));
        assert_eq!(scale.scale(2020.0), 50.0);
    }

    #[test]
    fn ticks_use_round_steps_inside_the_domain() {
        let ticks = nice_ticks(0.0, 100.0, 5);
        assert_eq!(ticks, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        let ticks = nice_ticks(2019.0, 2021.0, 5);
        assert!(ticks.contains(&2019.0) && ticks.contains(&2021.0));
    }

    #[test]
    fn numbers_format_without_noise() {
        assert_eq!(fmt_number(2019.0), "2019");
        assert_eq!(fmt_number(55.25), "55.2");
        assert_eq!(fmt_number(0.0), "0");
    }

    #[test]
    fn xml_escaping_covers_attribute_text() {
        assert_eq!(
            escape_xml("a<b & \"c\"\nd"),
            "a&lt;b &amp; &quot;c&quot;&#10;d"
        );
    }
}
