//! Formatting helpers for presenting report figures.

pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Percentage with two decimals, e.g. `63.16%`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Percentage as the backend reported it; whole values drop the fraction.
pub fn format_percent_kept(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}%")
    } else {
        format!("{value}%")
    }
}

pub fn format_mean(value: f64) -> String {
    format!("{value:.2}")
}

/// Maximum values are usually whole counts; keep them unadorned when they are.
pub fn format_max(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_progress(value: f64) -> String {
    format!("{}%", value.round() as u32)
}
