use crate::overview::Currency;

/// Humanizes a millisecond duration as `45s`, `3m` or `3m 45s`.
pub fn humanize_duration(duration_ms: u64) -> String {
    let minutes = duration_ms / 60_000;
    let seconds = (duration_ms % 60_000) / 1_000;

    if minutes == 0 {
        format!("{seconds}s")
    } else if seconds == 0 {
        format!("{minutes}m")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats a currency amount in whole units, e.g. `$12,346` or `-€5`.
#[allow(clippy::cast_possible_truncation)]
pub fn format_currency(value: f64, currency: Currency) -> String {
    let rounded = value.round() as i64;
    let sign = if rounded < 0 { "-" } else { "" };
    let digits = group_thousands(&rounded.unsigned_abs().to_string());
    format!("{sign}{}{digits}", currency.symbol())
}
