// Industry insight prompt templates.

pub const INDUSTRY_INSIGHT_PROMPT: &str = r#"Analyze the current state of the {industry} industry and provide insights as a single JSON object.

OUTPUT SCHEMA (return exactly this structure):
{
  "salaryRanges": [
    { "role": "string", "min": number, "max": number, "median": number, "location": "string" }
  ],
  "growthRate": number,
  "demandLevel": "High" | "Medium" | "Low",
  "topSkills": ["string"],
  "marketOutlook": "Positive" | "Neutral" | "Negative",
  "keyTrends": ["string"],
  "recommendedSkills": ["string"]
}

RULES:
1. Include at least 5 common roles in salaryRanges.
2. growthRate is a percentage expressed as a plain number (e.g. 7.5).
3. Include at least 5 entries in topSkills, keyTrends and recommendedSkills.
4. Salary amounts are annual figures as plain numbers, no currency symbols.
5. Return ONLY the JSON object — no notes, no explanations, no code fences."#;

/// Renders the insight prompt for one industry.
pub fn industry_insight_prompt(industry: &str) -> String {
    INDUSTRY_INSIGHT_PROMPT.replace("{industry}", industry)
}
