// Prompt constants for per-job fit analysis.

/// System prompt for fit analysis. The JSON-only suffix is appended by the analyzer.
pub const ANALYSIS_SYSTEM: &str = "You are a helpful career advisor analyzing how well a \
    candidate fits one job and giving actionable, honest advice.";

/// Fit analysis prompt. Placeholders: `{max_skills}`, `{job_title}`,
/// `{job_description}`, `{no_fabrication}` and `{resume_text}`, filled in one pass.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the alignment between the User Profile (resume) and the Job Description below.
Identify skill gaps and provide resume tailoring suggestions.

Job Description for "{job_title}" (truncated):
```
{job_description}
```

Tasks:

1. Missing skills: list the top {max_skills} most important skills or qualifications required by the
   Job Description that are NOT present in the User Profile. The profile may state a skill through an
   abbreviation, a synonym, or its constituent parts. For example, a profile listing Elasticsearch,
   Logstash and Kibana already satisfies an "ELK stack" requirement. Check carefully and never list a
   skill the profile already covers.

2. Learning time: for EACH missing skill, estimate how long THIS user, given their existing background,
   needs to learn it well enough to finish a relevant project or earn a certification. State it clearly,
   e.g. "2-4 weeks, 2 hours per day (project focus)", and include one short example project or
   certification.

3. Resume tailoring:
   - highlight: 2-3 skills or experiences ALREADY in the profile that are relevant to this job but
     under-emphasized. Skip anything already emphasized enough. If an item is poorly written, say how
     to write it better.
   - consider_removing: 1-2 items in the profile that are LEAST relevant to this job and could make room
     for more relevant points. Phrase these as suggestions.

{no_fabrication}

Respond ONLY with a JSON object with exactly this structure and these two top-level keys:
{
  "missing_skills": [
    {"skill": "Skill name", "learn_time_estimate": "Estimate with an example project or certification"}
  ],
  "resume_suggestions": {
    "highlight": ["Suggestion"],
    "consider_removing": ["Suggestion"]
  }
}

User Profile (resume text, truncated):
```
{resume_text}
```"#;
