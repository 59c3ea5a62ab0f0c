use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lotofacil::reports;
use lotofacil::utils::parse_draw_number;
use lotofacil::{DrawPage, Resolver};

const PREFETCH_DELAY: Duration = Duration::from_secs(1);
const MAX_PREFETCH: u32 = 100;

/// Reads a draw number given either as a JSON integer or a numeric string.
fn number_arg(arguments: &HashMap<String, Value>, key: &str) -> Result<Option<u32>> {
    let Some(value) = arguments.get(key) else {
        return Ok(None);
    };

    let number = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).filter(|n| *n > 0),
        Value::String(s) => parse_draw_number(s),
        _ => None,
    };

    number
        .map(Some)
        .ok_or_else(|| anyhow::anyhow!("Invalid {} parameter: {}", key, value))
}

fn required_number(arguments: &HashMap<String, Value>, key: &str) -> Result<u32> {
    number_arg(arguments, key)?.ok_or_else(|| anyhow::anyhow!("Missing {} parameter", key))
}

fn page_json(page: &DrawPage) -> String {
    json!({
        "success": page.is_found(),
        "draw": page.draw,
        "message": page.message
    })
    .to_string()
}

pub struct DrawUseCase {
    resolver: Arc<Resolver>,
}

impl DrawUseCase {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }

    pub async fn show_latest(&self, _arguments: &HashMap<String, Value>) -> Result<String> {
        let page = self.resolver.show_latest().await;
        Ok(page_json(&page))
    }

    pub async fn show_draw(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let number = required_number(arguments, "number")?;
        let page = self.resolver.show_by_number(number).await;
        Ok(page_json(&page))
    }

    pub async fn search_draw(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let query = match arguments.get("query") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(anyhow::anyhow!("Missing query parameter")),
        };

        let page = self.resolver.search(&query).await;
        Ok(page_json(&page))
    }

    pub async fn list_cached_draws(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let limit = arguments
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|l| l.min(u32::MAX as u64) as u32)
            .unwrap_or(10);

        let results = self.resolver.cache().list(limit)?;

        Ok(json!({
            "success": true,
            "results": results
        })
        .to_string())
    }

    pub async fn prefetch_draws(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let from = required_number(arguments, "from")?;
        let to = required_number(arguments, "to")?;

        if from > to {
            return Err(anyhow::anyhow!("from ({}) is greater than to ({})", from, to));
        }
        if to - from >= MAX_PREFETCH {
            return Err(anyhow::anyhow!(
                "at most {} draws can be prefetched at once",
                MAX_PREFETCH
            ));
        }

        let numbers: Vec<u32> = (from..=to).collect();
        let summary = self.resolver.prefetch(&numbers, PREFETCH_DELAY).await;

        Ok(json!({
            "success": summary.failed.is_empty(),
            "summary": summary
        })
        .to_string())
    }
}

pub struct ReportUseCase {
    resolver: Arc<Resolver>,
    report_path: PathBuf,
}

impl ReportUseCase {
    pub fn new(resolver: Arc<Resolver>, report_path: PathBuf) -> Self {
        Self {
            resolver,
            report_path,
        }
    }

    pub async fn generate_report(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let page = match number_arg(arguments, "number")? {
            Some(number) => self.resolver.show_by_number(number).await,
            None => self.resolver.show_latest().await,
        };

        let path = reports::generate_and_save_report(&page, &self.report_path)
            .map_err(|e| anyhow::anyhow!("Report generation error: {}", e))?;

        Ok(json!({
            "success": page.is_found(),
            "path": path.display().to_string(),
            "message": page.message
        })
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_number_arg_accepts_integers_and_strings() {
        assert_eq!(number_arg(&args(&[("number", json!(3040))]), "number").unwrap(), Some(3040));
        assert_eq!(number_arg(&args(&[("number", json!("12"))]), "number").unwrap(), Some(12));
        assert_eq!(number_arg(&args(&[]), "number").unwrap(), None);
        assert_eq!(number_arg(&args(&[("number", Value::Null)]), "number").unwrap(), None);
    }

    #[test]
    fn test_number_arg_rejects_bad_values() {
        assert!(number_arg(&args(&[("number", json!(0))]), "number").is_err());
        assert!(number_arg(&args(&[("number", json!(-4))]), "number").is_err());
        assert!(number_arg(&args(&[("number", json!("abc"))]), "number").is_err());
        assert!(number_arg(&args(&[("number", json!([1]))]), "number").is_err());
        assert!(required_number(&args(&[]), "number").is_err());
    }
}
