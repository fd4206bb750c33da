//! Output helpers shared by the CLI subcommands.
//!
//! Global flags are carried in environment variables set by `main` so every
//! module can check them without threading a context struct around.

use rust_decimal::Decimal;

pub fn is_json() -> bool {
    std::env::var("PRICEWATCH_JSON").is_ok()
}

pub fn is_quiet() -> bool {
    std::env::var("PRICEWATCH_QUIET").is_ok()
}

pub fn no_color() -> bool {
    std::env::var("PRICEWATCH_NO_COLOR").is_ok() || std::env::var("NO_COLOR").is_ok()
}

pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Status symbols, degraded when color is off.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self { color: !no_color() }
    }

    pub fn ok_sym(&self) -> &'static str {
        if self.color {
            "\x1b[32m✓\x1b[0m"
        } else {
            "OK"
        }
    }

    pub fn warn_sym(&self) -> &'static str {
        if self.color {
            "\x1b[33m!\x1b[0m"
        } else {
            "!"
        }
    }

    pub fn fail_sym(&self) -> &'static str {
        if self.color {
            "\x1b[31m✗\x1b[0m"
        } else {
            "X"
        }
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a price in Brazilian currency style: `R$ 1.234,56`.
pub fn format_brl(value: Option<Decimal>) -> String {
    let Some(v) = value else {
        return "R$ --".to_string();
    };
    let text = format!("{:.2}", v.round_dp(2));
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.to_string()),
        None => (false, text),
    };
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("R$ {sign}{grouped},{frac_part}")
}

/// Truncate with an ellipsis suffix; `max` includes the suffix.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(Some(dec("1234.56"))), "R$ 1.234,56");
        assert_eq!(format_brl(Some(dec("39.6"))), "R$ 39,60");
        assert_eq!(format_brl(Some(dec("1234567.89"))), "R$ 1.234.567,89");
        assert_eq!(format_brl(Some(dec("5"))), "R$ 5,00");
        assert_eq!(format_brl(None), "R$ --");
    }

    #[test]
    fn test_format_brl_negative() {
        assert_eq!(format_brl(Some(dec("-12.50"))), "R$ -12,50");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long product title", 10), "a very ...");
    }
}
