//! Coercion of a canonical [`Draw`] into the presentation shape.
//!
//! Every function here is total: bad input degrades to a default value or an
//! alternate ordering, never to an error.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

use crate::types::{Draw, DrawnNumbers, PrizeTier, ResolvedDraw, ResolvedPrizeTier};
use crate::utils::{CurrencyStyle, format_currency};

pub fn normalize_draw(draw: &Draw, style: CurrencyStyle) -> ResolvedDraw {
    let next_prize = draw
        .next_draw_estimated_prize
        .as_deref()
        .and_then(parse_amount);

    ResolvedDraw {
        number: draw.number,
        drawn_at: draw.drawn_at.clone(),
        numbers: sort_numbers(&draw.numbers),
        rolled_over: draw.rolled_over,
        next_draw_date: draw.next_draw_date.clone(),
        next_draw_estimated_prize: next_prize,
        next_draw_estimated_prize_display: next_prize.map(|p| format_currency(p, style)),
        prize_tiers: draw
            .prize_tiers
            .iter()
            .map(|tier| normalize_tier(tier, style))
            .collect(),
    }
}

pub fn normalize_tier(tier: &PrizeTier, style: CurrencyStyle) -> ResolvedPrizeTier {
    let prize_amount = coerce_prize_amount(tier.prize_amount.as_deref());

    ResolvedPrizeTier {
        tier: tier.tier,
        description: tier.description.clone(),
        winner_count: coerce_winner_count(tier.winner_count.as_deref()),
        prize_amount,
        prize_display: format_currency(prize_amount, style),
    }
}

/// Ascending numeric order if every value is an integer, lexical order of
/// the raw strings otherwise.
pub fn sort_numbers(raw: &[String]) -> DrawnNumbers {
    let parsed: Result<Vec<i64>, _> = raw.iter().map(|n| n.trim().parse::<i64>()).collect();

    match parsed {
        Ok(mut numbers) => {
            numbers.sort_unstable();
            DrawnNumbers::Numeric(numbers)
        }
        Err(_) => {
            let mut lexical = raw.to_vec();
            lexical.sort();
            DrawnNumbers::Lexical(lexical)
        }
    }
}

pub fn coerce_winner_count(raw: Option<&str>) -> u64 {
    let Some(text) = raw.map(str::trim) else {
        return 0;
    };

    if let Ok(count) = text.parse::<u64>() {
        return count;
    }

    // "12.0" style counts
    parse_amount(text)
        .filter(|d| d.fract().is_zero())
        .and_then(|d| d.to_u64())
        .unwrap_or(0)
}

pub fn coerce_prize_amount(raw: Option<&str>) -> Decimal {
    raw.and_then(parse_amount).unwrap_or(Decimal::ZERO)
}

/// Non-negative decimal from plain or scientific notation.
fn parse_amount(raw: &str) -> Option<Decimal> {
    let text = raw.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
        .filter(|d| !d.is_sign_negative())
}
