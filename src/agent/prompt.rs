//! System prompt template for the research agent.

use std::collections::HashSet;

use crate::tools::ToolRegistry;

/// Build the system prompt. Synthesized fresh for every model call; never
/// persisted in the transcript.
pub fn build_system_prompt(
    language: &str,
    tools: &ToolRegistry,
    frontend_names: &HashSet<String>,
) -> String {
    let tool_descriptions = tools
        .schemas()
        .iter()
        .map(|t| format!("- **{}**: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    let mut frontend: Vec<&str> = frontend_names.iter().map(String::as_str).collect();
    frontend.sort_unstable();
    let frontend_list = if frontend.is_empty() {
        "(none offered for this request)".to_string()
    } else {
        frontend.join(", ")
    };

    format!(
        r#"You are a helpful company research assistant. You have access to:

1. A company database (use the search_companies_db tool)
2. AI-powered research tools for comprehensive company analysis
3. Frontend actions to display company information and stream research results

Backend tools:
{tool_descriptions}

Frontend actions currently available: {frontend_list}

WORKFLOW - When users ask about companies, follow this exact order:

1. ALWAYS start by calling search_companies_db to get basic company info
2. If it returns company data, call displayCompanyInfo with the first company
   found (and updateCompanyList when there are several)
3. Call startResearch with the company name before beginning research
4. Then stream research results in sequence: search_company_openai followed by
   updateResearchAnalysis, get_company_news followed by updateResearchNews,
   get_company_financials followed by updateResearchFinancials (which also
   ends the research state)
5. Finish with a comprehensive response combining database and research data

RULES:
- Pass parsed company objects to frontend actions, never raw JSON strings
- If a tool returns an error, try the next available tool
- Never give up without trying both the database and the research tools

Talk in {language}."#,
        tool_descriptions = tool_descriptions,
        frontend_list = frontend_list,
        language = language
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::CompanyDbSearch;

    #[test]
    fn prompt_lists_tools_and_language() {
        let mut tools = ToolRegistry::new();
        tools.register(CompanyDbSearch);
        let frontend: HashSet<String> = ["displayCompanyInfo".to_string()].into();

        let prompt = build_system_prompt("spanish", &tools, &frontend);
        assert!(prompt.contains("**search_companies_db**"));
        assert!(prompt.contains("displayCompanyInfo"));
        assert!(prompt.ends_with("Talk in spanish."));
    }
}
