// Number formatting for the metric cards
//
// Two tiers with two decimals ("" and "mil"), then "milhões" with three
// significant digits. Spacing is kept exactly as displayed, so an empty
// prefix or unit leaves a blank on that side: " 5.00 ".

const UNITS: [&str; 2] = ["", "mil"];

pub fn format_number(value: f64, prefix: &str) -> String {
    // -0.0 prints as "-0.00"
    let mut value = if value == 0.0 { 0.0 } else { value };
    for unit in UNITS {
        if value < 1000.0 {
            return format!("{} {:.2} {}", prefix, value, unit);
        }
        value /= 1000.0;
    }
    format!("{} {} milhões", prefix, significant3(value))
}

/// Three significant digits: fixed notation for exponents in -4..2 with at
/// least one decimal, scientific otherwise, trailing zeros removed.
fn significant3(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }

    // Round first so 999.5 is seen as 1.00e3
    let sci = format!("{:.2e}", value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return sci,
    };

    if (-4..2).contains(&exponent) {
        let decimals = (2 - exponent) as usize;
        let fixed = format!("{:.*}", decimals, value);
        let trimmed = fixed.trim_end_matches('0');
        if trimmed.ends_with('.') {
            format!("{}0", trimmed)
        } else {
            trimmed.to_string()
        }
    } else {
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}
