// Prompt constants for optimized-query generation.

/// System prompt for the query optimizer. Plain text output, not JSON.
pub const QUERY_SYSTEM: &str =
    "You are a job search expert that creates optimized search queries for semantic retrieval. \
    Respond with the query text only, on a single line, without quotes or commentary.";

/// Query prompt template, filled in one pass.
pub const QUERY_PROMPT_TEMPLATE: &str = r#"Given a job seeker's resume and preferences, create an optimized search query.

Job preferences:
- Target roles: {target_roles}
- Primary skills: {primary_skills}
- Location: {location}
- Job type: {job_types}
- Additional preferences: {additional_preferences}

Resume text (truncated):
```
{resume_text}
```

Create a concise, dense search query that captures the essential requirements and preferences.
Focus on key skills, experience level, and job requirements that match the resume.
Do not repeat the resume verbatim."#;
