//! Number formatting shared by `Display` and the code printer.

/// Format a real number the way results are echoed: integral values
/// without a fraction, everything else with four decimals.
pub(crate) fn number(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Inf" } else { "-Inf" }.to_string()
    } else if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{x:.0}")
    } else {
        format!("{x:.4}")
    }
}

/// Format numbers for source-level printing: shortest round-trip form.
pub(crate) fn code_number(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Inf" } else { "-Inf" }.to_string()
    } else {
        format!("{x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_have_no_fraction() {
        assert_eq!(number(3.0), "3");
        assert_eq!(number(-12.0), "-12");
        assert_eq!(number(0.25), "0.2500");
        assert_eq!(number(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn code_numbers_round_trip() {
        assert_eq!(code_number(0.1), "0.1");
        assert_eq!(code_number(2.0), "2");
    }
}
