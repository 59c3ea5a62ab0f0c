use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CacheError, CacheResult, FetchError};
use crate::utils::parse_draw_number;

// ----- results API payload -----

/// Raw draw as served by the results API.
///
/// The API is loose about scalar types, so every field is read as a JSON
/// value and coerced field by field. Only `numero` decides whether the
/// payload is usable.
#[derive(Deserialize, Debug)]
pub struct ApiDraw {
    #[serde(rename = "numero")]
    pub number: Value,
    #[serde(rename = "dataApuracao")]
    pub drawn_at: Option<Value>,
    #[serde(rename = "listaDezenas")]
    pub numbers: Option<Value>,
    #[serde(rename = "acumulado")]
    pub rolled_over: Option<Value>,
    #[serde(rename = "dataProximoConcurso")]
    pub next_draw_date: Option<Value>,
    #[serde(rename = "valorEstimadoProximoConcurso")]
    pub next_draw_estimated_prize: Option<Value>,
    #[serde(rename = "listaRateioPremio")]
    pub prize_tiers: Option<Value>,
}

#[derive(Deserialize, Debug)]
pub struct ApiPrizeTier {
    #[serde(rename = "faixa")]
    pub tier: Option<Value>,
    #[serde(rename = "descricaoFaixa")]
    pub description: Option<Value>,
    #[serde(rename = "numeroDeGanhadores")]
    pub winner_count: Option<Value>,
    #[serde(rename = "valorPremio")]
    pub prize_amount: Option<Value>,
}

// ----- canonical draw -----

/// One contest as fetched from the API or read back from the cache.
///
/// Scalars the API is loose about (drawn numbers, winner counts, amounts)
/// are kept as their raw text; coercion happens in [`crate::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub number: u32,
    pub drawn_at: String,
    pub numbers: Vec<String>,
    pub rolled_over: bool,
    pub next_draw_date: Option<String>,
    pub next_draw_estimated_prize: Option<String>,
    pub prize_tiers: Vec<PrizeTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTier {
    pub tier: i64,
    pub description: String,
    pub winner_count: Option<String>,
    pub prize_amount: Option<String>,
}

/// Strings verbatim, numbers and booleans as their JSON text. Null, arrays
/// and objects have no scalar text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    value.and_then(scalar_text)
}

/// `3040` or `"3040"`; zero, negatives and anything else are unusable.
fn draw_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).filter(|n| *n > 0),
        Value::String(s) => parse_draw_number(s),
        _ => None,
    }
}

fn tier_rank(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

impl TryFrom<ApiDraw> for Draw {
    type Error = FetchError;

    fn try_from(api: ApiDraw) -> Result<Self, Self::Error> {
        let number = draw_number(&api.number).ok_or_else(|| {
            FetchError::MalformedPayload(format!("unusable draw number: {}", api.number))
        })?;

        let numbers = match api.numbers {
            Some(Value::Array(values)) => values
                .iter()
                .map(|n| scalar_text(n).unwrap_or_default())
                .collect(),
            _ => Vec::new(),
        };

        let prize_tiers = match api.prize_tiers {
            Some(Value::Array(tiers)) => tiers
                .iter()
                .enumerate()
                // entries that are not objects are dropped; the rest keep their position
                .filter_map(|(position, value)| {
                    ApiPrizeTier::deserialize(value)
                        .ok()
                        .map(|tier| (position, tier))
                })
                .map(|(position, tier)| PrizeTier {
                    tier: tier
                        .tier
                        .as_ref()
                        .and_then(tier_rank)
                        .unwrap_or(position as i64 + 1),
                    description: optional_text(tier.description.as_ref()).unwrap_or_default(),
                    winner_count: optional_text(tier.winner_count.as_ref()),
                    prize_amount: optional_text(tier.prize_amount.as_ref()),
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(Draw {
            number,
            drawn_at: optional_text(api.drawn_at.as_ref()).unwrap_or_default(),
            numbers,
            rolled_over: api.rolled_over.as_ref().is_some_and(flag),
            next_draw_date: optional_text(api.next_draw_date.as_ref()),
            next_draw_estimated_prize: optional_text(api.next_draw_estimated_prize.as_ref()),
            prize_tiers,
        })
    }
}

// ----- cache rows -----

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawRow {
    pub number: u32,
    pub drawn_at: String,
    /// JSON array of the drawn numbers, in fetch order.
    pub numbers: String,
    pub rolled_over: bool,
    pub next_draw_date: Option<String>,
    pub next_draw_estimated_prize: Option<String>,
    pub cached_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrizeTierRow {
    pub draw_number: u32,
    pub tier: i64,
    pub description: String,
    pub winner_count: Option<String>,
    pub prize_amount: Option<String>,
}

/// A draw header together with its prize-tier rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    pub header: DrawRow,
    pub tiers: Vec<PrizeTierRow>,
}

impl From<&Draw> for DrawRecord {
    fn from(draw: &Draw) -> Self {
        let header = DrawRow {
            number: draw.number,
            drawn_at: draw.drawn_at.clone(),
            numbers: Value::from(draw.numbers.clone()).to_string(),
            rolled_over: draw.rolled_over,
            next_draw_date: draw.next_draw_date.clone(),
            next_draw_estimated_prize: draw.next_draw_estimated_prize.clone(),
            cached_at: None,
        };

        let tiers = draw
            .prize_tiers
            .iter()
            .map(|tier| PrizeTierRow {
                draw_number: draw.number,
                tier: tier.tier,
                description: tier.description.clone(),
                winner_count: tier.winner_count.clone(),
                prize_amount: tier.prize_amount.clone(),
            })
            .collect();

        DrawRecord { header, tiers }
    }
}

impl DrawRecord {
    pub fn into_draw(self) -> CacheResult<Draw> {
        let number = self.header.number;
        let numbers: Vec<String> =
            serde_json::from_str(&self.header.numbers).map_err(|e| CacheError::Corrupt {
                number,
                reason: format!("numbers column is not a JSON string array: {}", e),
            })?;

        Ok(Draw {
            number,
            drawn_at: self.header.drawn_at,
            numbers,
            rolled_over: self.header.rolled_over,
            next_draw_date: self.header.next_draw_date,
            next_draw_estimated_prize: self.header.next_draw_estimated_prize,
            prize_tiers: self
                .tiers
                .into_iter()
                .map(|row| PrizeTier {
                    tier: row.tier,
                    description: row.description,
                    winner_count: row.winner_count,
                    prize_amount: row.prize_amount,
                })
                .collect(),
        })
    }
}

// ----- presentation shape -----

/// Drawn numbers as presented: numerically sorted when every value is an
/// integer, otherwise the raw values in lexical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DrawnNumbers {
    Numeric(Vec<i64>),
    Lexical(Vec<String>),
}

impl Default for DrawnNumbers {
    fn default() -> Self {
        DrawnNumbers::Numeric(Vec::new())
    }
}

impl DrawnNumbers {
    pub fn len(&self) -> usize {
        match self {
            DrawnNumbers::Numeric(n) => n.len(),
            DrawnNumbers::Lexical(n) => n.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ball labels, zero-padded to two digits when numeric.
    pub fn labels(&self) -> Vec<String> {
        match self {
            DrawnNumbers::Numeric(n) => n.iter().map(|v| format!("{:02}", v)).collect(),
            DrawnNumbers::Lexical(n) => n.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDraw {
    pub number: u32,
    pub drawn_at: String,
    pub numbers: DrawnNumbers,
    pub rolled_over: bool,
    pub next_draw_date: Option<String>,
    pub next_draw_estimated_prize: Option<Decimal>,
    pub next_draw_estimated_prize_display: Option<String>,
    pub prize_tiers: Vec<ResolvedPrizeTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPrizeTier {
    pub tier: i64,
    pub description: String,
    pub winner_count: u64,
    pub prize_amount: Decimal,
    pub prize_display: String,
}
