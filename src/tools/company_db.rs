//! Company database search tool.
//!
//! Ships a small built-in dataset matching the production database schema;
//! the tool boundary (arguments in, JSON array out) is identical to the
//! backed version, so swapping in a real database changes nothing upstream.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use super::Tool;

#[derive(Debug, Clone, Serialize)]
struct CompanyRecord {
    id: u32,
    name: &'static str,
    ticker_symbol: &'static str,
    industry: &'static str,
    sector: &'static str,
    market_cap: u64,
    employees: u32,
    founded_year: u32,
    headquarters: &'static str,
    website: &'static str,
    description: &'static str,
}

const COMPANIES: &[CompanyRecord] = &[
    CompanyRecord {
        id: 1,
        name: "Apple Inc.",
        ticker_symbol: "AAPL",
        industry: "Consumer Electronics",
        sector: "Technology",
        market_cap: 3_000_000_000_000,
        employees: 164_000,
        founded_year: 1976,
        headquarters: "Cupertino, CA",
        website: "https://www.apple.com",
        description: "Apple Inc. is an American multinational technology company specializing in consumer electronics, software, and online services.",
    },
    CompanyRecord {
        id: 2,
        name: "Microsoft Corporation",
        ticker_symbol: "MSFT",
        industry: "Software",
        sector: "Technology",
        market_cap: 2_800_000_000_000,
        employees: 221_000,
        founded_year: 1975,
        headquarters: "Redmond, WA",
        website: "https://www.microsoft.com",
        description: "Microsoft Corporation is an American multinational technology corporation.",
    },
    CompanyRecord {
        id: 3,
        name: "Tesla Inc.",
        ticker_symbol: "TSLA",
        industry: "Electric Vehicles",
        sector: "Consumer Discretionary",
        market_cap: 800_000_000_000,
        employees: 140_000,
        founded_year: 2003,
        headquarters: "Austin, TX",
        website: "https://www.tesla.com",
        description: "Tesla, Inc. is an American electric vehicle and clean energy company.",
    },
];

/// Search the company database by name or ticker symbol.
pub struct CompanyDbSearch;

#[async_trait]
impl Tool for CompanyDbSearch {
    fn name(&self) -> &str {
        "search_companies_db"
    }

    fn description(&self) -> &str {
        "Search for companies in the database by name or ticker symbol. Returns a JSON array of company records with industry, market cap, headquarters and more."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Company name or ticker symbol to search for"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 10)"
                }
            },
            "required": ["query"]
        })
    }

    fn describe_call(&self, args: &Value) -> String {
        let query = args["query"].as_str().unwrap_or("");
        format!("Search database for companies matching: '{query}'")
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;
        let limit = args["limit"].as_u64().unwrap_or(10) as usize;

        let query_lower = query.to_lowercase();
        let query_upper = query.to_uppercase();

        let matches: Vec<&CompanyRecord> = COMPANIES
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&query_lower)
                    || c.ticker_symbol.contains(&query_upper)
            })
            .take(limit)
            .collect();

        tracing::debug!("company db search '{}' matched {} records", query, matches.len());
        Ok(serde_json::to_string_pretty(&matches)?)
    }
}
