use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyStyle {
    /// pt-BR conventions: `R$ 1.500,50`.
    #[default]
    BrazilianLocale,
    /// Fixed two decimals with a comma separator and no grouping: `R$ 1500,50`.
    Manual,
}

impl FromStr for CurrencyStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "locale" | "pt_br" | "pt-br" => Ok(CurrencyStyle::BrazilianLocale),
            "manual" => Ok(CurrencyStyle::Manual),
            other => Err(format!("unknown currency style: {}", other)),
        }
    }
}

pub fn format_currency(amount: Decimal, style: CurrencyStyle) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);

    let text = rounded.abs().to_string();
    let (integer, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let integer = match style {
        CurrencyStyle::BrazilianLocale => group_thousands(integer),
        CurrencyStyle::Manual => integer.to_string(),
    };

    format!("R$ {}{},{}", sign, integer, cents)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

/// Parses free-text search input into a draw number. Only positive integers qualify.
pub fn parse_draw_number(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

pub fn not_found_message(number: Option<u32>) -> String {
    match number {
        Some(n) => format!("Resultado do concurso {} não encontrado.", n),
        None => "Não foi possível obter o resultado mais recente da Lotofácil.".to_string(),
    }
}

pub fn invalid_search_message(input: &str) -> String {
    format!("\"{}\" não é um número de concurso válido.", input.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_locale_currency() {
        assert_eq!(format_currency(dec!(1500.50), CurrencyStyle::BrazilianLocale), "R$ 1.500,50");
        assert_eq!(format_currency(dec!(1700000), CurrencyStyle::BrazilianLocale), "R$ 1.700.000,00");
        assert_eq!(format_currency(dec!(999.999), CurrencyStyle::BrazilianLocale), "R$ 1.000,00");
        assert_eq!(format_currency(Decimal::ZERO, CurrencyStyle::BrazilianLocale), "R$ 0,00");
    }

    #[test]
    fn test_manual_currency() {
        assert_eq!(format_currency(dec!(1500.5), CurrencyStyle::Manual), "R$ 1500,50");
        assert_eq!(format_currency(dec!(7.005), CurrencyStyle::Manual), "R$ 7,01");
        assert_eq!(format_currency(dec!(1234567.891), CurrencyStyle::Manual), "R$ 1234567,89");
    }

    #[test]
    fn test_currency_style_from_str() {
        assert_eq!("locale".parse::<CurrencyStyle>(), Ok(CurrencyStyle::BrazilianLocale));
        assert_eq!(" Manual ".parse::<CurrencyStyle>(), Ok(CurrencyStyle::Manual));
        assert!("fr_FR".parse::<CurrencyStyle>().is_err());
    }

    #[test]
    fn test_parse_draw_number() {
        assert_eq!(parse_draw_number(" 3040 "), Some(3040));
        assert_eq!(parse_draw_number("0"), None);
        assert_eq!(parse_draw_number("-3"), None);
        assert_eq!(parse_draw_number("abc"), None);
        assert_eq!(parse_draw_number(""), None);
    }

    #[test]
    fn test_not_found_messages() {
        assert!(not_found_message(Some(42)).contains("42"));
        assert!(not_found_message(None).contains("mais recente"));
    }
}
