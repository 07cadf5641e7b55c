// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write;

use num_format::{Locale, ToFormattedString};

use crate::stats::Summary;

const ORDINALS: [&str; 3] = ["first", "second", "third"];

/// Format a number with commas and two decimals
pub fn format_with_commas(value: f64) -> String {
    if value.is_nan() || value.is_infinite() {
        return format!("{:.2}", value);
    }

    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));
    // Beyond u128 there is nothing sensible to group; print it plainly.
    let int_part = match int_part.parse::<u128>() {
        Ok(int) => int.to_formatted_string(&Locale::en),
        Err(_) => return format!("{:.2}", value),
    };

    // -0.001 rounds to 0.00 and should not print as negative
    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };

    format!("{}{}.{}", sign, int_part, frac_part)
}

/// Format integer with commas
pub fn format_int_with_commas(value: usize) -> String {
    value.to_formatted_string(&Locale::en)
}

/// Build the textual summary. `label` names the complaints, e.g. "plumbing".
pub fn render_report(summary: &Summary, label: &str) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        "Response times computed for {} {} complaints.",
        format_int_with_commas(summary.count),
        label
    );
    let _ = writeln!(out, "The different lines drawn on the histogram are:");
    let _ = writeln!(
        out,
        "\t(black) The median response time to {} complaints is {} days.",
        label,
        format_with_commas(summary.median)
    );
    let _ = writeln!(
        out,
        "\t(black) The 25th and 75th quartiles for the data are {} and {} days respectively.",
        format_with_commas(summary.p25),
        format_with_commas(summary.p75)
    );
    let _ = writeln!(
        out,
        "\t(black) The lower and upper bounds are {} and {} days.",
        format_with_commas(summary.lower_fence),
        format_with_commas(summary.upper_fence)
    );
    let _ = writeln!(
        out,
        "\t(red) The mean response time to {} complaints is {} days.",
        label,
        format_with_commas(summary.mean)
    );
    for (band, ordinal) in summary.sigma_bands.iter().zip(ORDINALS) {
        let _ = writeln!(
            out,
            "\t(red) The {} std deviation from the mean is ({}, {})",
            ordinal,
            format_with_commas(band.lower),
            format_with_commas(band.upper)
        );
    }
    let _ = writeln!(
        out,
        "\tThe standard deviation for the data is {}",
        format_with_commas(summary.std_dev)
    );

    out
}

/// Print the summary to stdout
pub fn print_report(summary: &Summary, label: &str) {
    print!("{}", render_report(summary, label));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize;
    use crate::types::FenceMode;
    use pretty_assertions::assert_eq;

    #[test]
    fn commas_and_two_decimals() {
        assert_eq!(format_with_commas(1234567.891), "1,234,567.89");
        assert_eq!(format_with_commas(5.5), "5.50");
        assert_eq!(format_with_commas(0.999), "1.00");
        assert_eq!(format_with_commas(-1234.5), "-1,234.50");
        assert_eq!(format_with_commas(-0.24), "-0.24");
        assert_eq!(format_with_commas(-0.001), "0.00");
        assert_eq!(format_with_commas(f64::NAN), "NaN");
        assert_eq!(format_int_with_commas(1500), "1,500");
    }

    #[test]
    fn huge_values_keep_their_integer_part() {
        assert_eq!(format_with_commas(1e20), "100,000,000,000,000,000,000.00");
        assert_eq!(format_with_commas(-1e20), "-100,000,000,000,000,000,000.00");
        assert_eq!(format_with_commas(1e300), format!("{:.2}", 1e300));
    }

    #[test]
    fn report_layout() {
        let samples: Vec<f64> = (1..=10).map(f64::from).collect();
        let summary = summarize(&samples, FenceMode::UpperQuartile).unwrap();

        let expected = "\
Response times computed for 10 plumbing complaints.
The different lines drawn on the histogram are:
\t(black) The median response time to plumbing complaints is 5.50 days.
\t(black) The 25th and 75th quartiles for the data are 3.25 and 7.75 days respectively.
\t(black) The lower and upper bounds are 1.00 and 14.50 days.
\t(red) The mean response time to plumbing complaints is 5.50 days.
\t(red) The first std deviation from the mean is (2.63, 8.37)
\t(red) The second std deviation from the mean is (-0.24, 11.24)
\t(red) The third std deviation from the mean is (-3.12, 14.12)
\tThe standard deviation for the data is 2.87
";
        assert_eq!(render_report(&summary, "plumbing"), expected);
    }
}
