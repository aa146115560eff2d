//! LLM-powered company research tools.
//!
//! All four tools delegate to a shared [`CompanyResearchClient`] that prompts
//! the same chat backend the orchestrator uses. Results are wrapped in a
//! `{"company_name", "content", "source"}` envelope.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;
use crate::llm::{ChatMessage, LlmClient};

const RESEARCH_SYSTEM_PROMPT: &str = "You are a helpful assistant that provides accurate information about companies. Focus on factual data including business overview, recent developments, financial information, and market analysis. Be comprehensive but concise.";

const COMPARISON_SYSTEM_PROMPT: &str = "You are a helpful assistant that provides detailed comparisons between companies. Focus on factual data and objective analysis.";

/// Client for LLM-backed company research prompts.
#[derive(Clone)]
pub struct CompanyResearchClient {
    llm: Arc<dyn LlmClient>,
}

impl CompanyResearchClient {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Research a company, optionally focusing on a specific aspect.
    pub async fn search_company_info(
        &self,
        company_name: &str,
        specific_info: Option<&str>,
    ) -> anyhow::Result<Value> {
        let prompt = match specific_info {
            Some(focus) => format!(
                "Provide comprehensive information about {company_name} company, focusing on: {focus}.\n\n\
                 Include the business overview, recent developments, financial indicators, \
                 market position, and key leadership. Format the response as detailed, factual \
                 information useful for business research."
            ),
            None => format!(
                "Provide comprehensive information about {company_name} company.\n\n\
                 Include the business overview and key products, recent news from the last six \
                 months, financial performance, market position, leadership, and strategic \
                 outlook. Format the response as detailed, factual information useful for \
                 business research."
            ),
        };

        self.run_prompt(RESEARCH_SYSTEM_PROMPT, &prompt, company_name).await
    }

    /// Recent news over a lookback window.
    pub async fn get_company_news(&self, company_name: &str, days: u64) -> anyhow::Result<Value> {
        self.search_company_info(
            company_name,
            Some(&format!(
                "recent news and developments in the last {days} days"
            )),
        )
        .await
    }

    /// Financial performance summary.
    pub async fn get_company_financials(&self, company_name: &str) -> anyhow::Result<Value> {
        self.search_company_info(
            company_name,
            Some("financial performance, revenue, profits, stock price, and market cap"),
        )
        .await
    }

    /// Side-by-side comparison of two companies.
    pub async fn compare_companies(
        &self,
        company1: &str,
        company2: &str,
    ) -> anyhow::Result<Value> {
        let prompt = format!(
            "Compare {company1} and {company2} companies in detail.\n\n\
             Cover business models, financial performance and market capitalization, \
             competitive advantages, revenue streams, growth strategies, and the strengths \
             and weaknesses of each. Format the response as a detailed comparative analysis."
        );
        self.run_prompt(
            COMPARISON_SYSTEM_PROMPT,
            &prompt,
            &format!("{company1} vs {company2}"),
        )
        .await
    }

    async fn run_prompt(
        &self,
        system: &str,
        prompt: &str,
        subject: &str,
    ) -> anyhow::Result<Value> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(prompt)];
        let response = self
            .llm
            .chat(&messages, &[])
            .await
            .map_err(|e| anyhow::anyhow!("research request failed: {e}"))?;

        let content = response
            .content
            .ok_or_else(|| anyhow::anyhow!("research request returned no content"))?;

        Ok(json!({
            "company_name": subject,
            "content": content,
            "source": "llm_research",
        }))
    }
}

/// Detailed business analysis for one company.
pub struct CompanyResearch {
    client: CompanyResearchClient,
}

impl CompanyResearch {
    pub fn new(client: CompanyResearchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CompanyResearch {
    fn name(&self) -> &str {
        "search_company_openai"
    }

    fn description(&self) -> &str {
        "Research a company with the AI backend. Optionally focus on a specific aspect such as 'recent news' or 'financial performance'. Returns a JSON document with the analysis."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "company_name": {
                    "type": "string",
                    "description": "Name of the company to research"
                },
                "specific_info": {
                    "type": "string",
                    "description": "Optional: specific information to look for"
                }
            },
            "required": ["company_name"]
        })
    }

    fn describe_call(&self, args: &Value) -> String {
        let name = args["company_name"].as_str().unwrap_or("");
        format!("Get AI analysis for company: '{name}'")
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let company_name = args["company_name"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'company_name' argument"))?;
        let specific_info = args["specific_info"].as_str();

        let result = self
            .client
            .search_company_info(company_name, specific_info)
            .await?;
        Ok(serde_json::to_string_pretty(&result)?)
    }
}

/// Recent news lookup for one company.
pub struct CompanyNews {
    client: CompanyResearchClient,
}

impl CompanyNews {
    pub fn new(client: CompanyResearchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CompanyNews {
    fn name(&self) -> &str {
        "get_company_news"
    }

    fn description(&self) -> &str {
        "Get recent news about a company. Looks back a configurable number of days (default 7)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "company_name": {
                    "type": "string",
                    "description": "Name of the company"
                },
                "days": {
                    "type": "integer",
                    "description": "Number of days to look back (default: 7)"
                }
            },
            "required": ["company_name"]
        })
    }

    fn describe_call(&self, args: &Value) -> String {
        let name = args["company_name"].as_str().unwrap_or("");
        format!("Get recent news for company: '{name}'")
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let company_name = args["company_name"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'company_name' argument"))?;
        let days = args["days"].as_u64().unwrap_or(7);

        let result = self.client.get_company_news(company_name, days).await?;
        Ok(serde_json::to_string_pretty(&result)?)
    }
}

/// Financial summary for one company.
pub struct CompanyFinancials {
    client: CompanyResearchClient,
}

impl CompanyFinancials {
    pub fn new(client: CompanyResearchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CompanyFinancials {
    fn name(&self) -> &str {
        "get_company_financials"
    }

    fn description(&self) -> &str {
        "Get financial information about a company: revenue, profits, stock price, market cap."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "company_name": {
                    "type": "string",
                    "description": "Name of the company"
                }
            },
            "required": ["company_name"]
        })
    }

    fn describe_call(&self, args: &Value) -> String {
        let name = args["company_name"].as_str().unwrap_or("");
        format!("Get financial data for company: '{name}'")
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let company_name = args["company_name"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'company_name' argument"))?;

        let result = self.client.get_company_financials(company_name).await?;
        Ok(serde_json::to_string_pretty(&result)?)
    }
}

/// Comparison of two companies.
pub struct CompanyComparison {
    client: CompanyResearchClient,
}

impl CompanyComparison {
    pub fn new(client: CompanyResearchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CompanyComparison {
    fn name(&self) -> &str {
        "compare_companies"
    }

    fn description(&self) -> &str {
        "Compare two companies: business models, financials, market position, strengths and weaknesses."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "company1": {
                    "type": "string",
                    "description": "Name of the first company"
                },
                "company2": {
                    "type": "string",
                    "description": "Name of the second company"
                }
            },
            "required": ["company1", "company2"]
        })
    }

    fn describe_call(&self, args: &Value) -> String {
        let a = args["company1"].as_str().unwrap_or("");
        let b = args["company2"].as_str().unwrap_or("");
        format!("Compare companies: '{a}' vs '{b}'")
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let company1 = args["company1"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'company1' argument"))?;
        let company2 = args["company2"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'company2' argument"))?;

        let result = self.client.compare_companies(company1, company2).await?;
        Ok(serde_json::to_string_pretty(&result)?)
    }
}
