// Prompt constants for cross-job skill-gap consolidation.

pub const CONSOLIDATION_SYSTEM: &str = "You are an expert career advisor synthesizing the skill \
    gaps found across several job analyses into a short, prioritized learning plan. Address the \
    user directly using \"you\" and \"your\".";

/// Placeholders: `{max_gaps}`, `{candidate_gaps}`, `{no_fabrication}` and
/// `{resume_text}`, filled in one pass.
pub const CONSOLIDATION_PROMPT_TEMPLATE: &str = r#"Below are the missing skills identified while comparing your profile against several job descriptions.
Each line shows the skill, how many of the analyzed jobs flagged it, and one earlier learning estimate.

Candidate skill gaps:
{candidate_gaps}

Task:
Select AT MOST {max_gaps} skills you should focus on. Prioritize skills that recur across several jobs first,
then the ones with the greatest impact on your target roles. Merge entries that name the same skill in
different words. If fewer than {max_gaps} gaps are significant, return fewer; never pad the list.

For each selected skill, write a NEW learn_time_estimate (do not copy the earlier ones) that accounts for
your existing background, e.g. "3-5 weeks, 1 hour per day", and include one short project or
certification idea.

{no_fabrication}

Respond ONLY with a JSON object with exactly this structure:
{
  "top_gaps": [
    {"skill": "Skill name", "learn_time_estimate": "Personalized estimate with a project or certification idea"}
  ]
}

Your profile (resume text, truncated):
```
{resume_text}
```"#;
