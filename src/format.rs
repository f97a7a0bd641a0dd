//! Currency rendering for forecast output.
//!
//! Formatting is a presentation layer only: every entry keeps its numeric
//! amount, and the formatted strings are derived from it through whichever
//! [`CurrencyFormatter`] the engine was built with.

/// Renders a monetary amount as display text.
pub trait CurrencyFormatter: Send + Sync {
    fn format(&self, amount: f64) -> String;
}

impl<F> CurrencyFormatter for F
where
    F: Fn(f64) -> String + Send + Sync,
{
    fn format(&self, amount: f64) -> String {
        self(amount)
    }
}

/// German euro notation: `1.234,56 €` with a no-break space before the symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuroFormatter;

impl CurrencyFormatter for EuroFormatter {
    fn format(&self, amount: f64) -> String {
        let cents = (amount.abs() * 100.0).round() as u64;
        let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

        format!(
            "{}{},{:02}\u{a0}€",
            sign,
            group_thousands(cents / 100, '.'),
            cents % 100
        )
    }
}

/// Two decimals, no grouping, no symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl CurrencyFormatter for PlainFormatter {
    fn format(&self, amount: f64) -> String {
        format!("{:.2}", amount)
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }

    grouped
}
