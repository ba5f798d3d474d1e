// Enrichment prompt templates. One prompt per derived entry field.
// `{text}` is replaced with the raw entry content.

pub const TYPE_PROMPT: &str = "\
Classify the type of achievement described below in one to three words \
(for example: Hackathon win, Team leadership, Research milestone).

ACHIEVEMENT:
{text}";

pub const TITLE_PROMPT: &str = "\
Write a short, specific title (at most six words) for the achievement described below.

ACHIEVEMENT:
{text}";

pub const SUMMARY_PROMPT: &str = "\
Summarize the achievement described below in two to four bullet points \
that a recruiter could skim.

ACHIEVEMENT:
{text}";

pub const HARD_SKILLS_PROMPT: &str = "\
List the hard (technical or domain) skills demonstrated in the achievement described below. \
Use short skill names only, at most six items.

ACHIEVEMENT:
{text}";

pub const SOFT_SKILLS_PROMPT: &str = "\
List the soft (interpersonal) skills demonstrated in the achievement described below. \
Use short skill names only, at most six items.

ACHIEVEMENT:
{text}";

pub const REFLECTION_PROMPT: &str = "\
Write one paragraph, in the first person, that the user could say in an interview \
to reflect on the achievement described below: the situation, what they did, \
the result and what they learned.

ACHIEVEMENT:
{text}";

/// `{categories}` is replaced with the comma-separated enumeration.
pub const CATEGORIES_PROMPT: &str = "\
Choose the categories that fit the achievement described below. \
Only use labels from this list: {categories}. \
Respond with a comma-separated list of labels and nothing else.

ACHIEVEMENT:
{text}";

pub const SHORT_SUMMARY_PROMPT: &str = "\
Summarize the achievement described below in exactly one sentence written in the first person.

ACHIEVEMENT:
{text}";
