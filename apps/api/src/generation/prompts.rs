// All prompt templates for the content kinds.
// `{grade_level}` is a shared var; `{value}` is filled by the fragment's own field.
// Every system template ends with llm_client::prompts::MARKDOWN_REPLY at assembly time.

// ── Lesson plan ─────────────────────────────────────────────────────────────

pub const LESSON_PLAN_SYSTEM: &str = "You are a {grade_level} teacher. \
    You will be creating a detailed lesson plan for the specified standard and/or objective.";

pub const LESSON_PLAN_OBJECTIVE: &str = "Write a lesson plan that effectively details a lesson \
    that achieves the following objective: {value}.";

pub const LESSON_PLAN_CONTEXT: &str = "Additionally you should consider the following context \
    when creating the lesson plan: {value}.";

pub const LESSON_PLAN_STANDARDS: &str =
    "The lesson plan should be aligned to the following standards: {value}.";

// ── Unit plan ───────────────────────────────────────────────────────────────

pub const UNIT_PLAN_SYSTEM: &str = "You are a {grade_level} teacher. \
    You will be creating a unit plan to cover a specified period of time and the specified topics. \
    If standards are provided, you should ensure that the unit plan is aligned to those standards.";

pub const UNIT_PLAN_TOPICS: &str = "Write a unit plan that carefully considers the standard elements \
    of teaching to ensure effective teaching and learning. \
    The topic for this unit should cover the following: {value}.";

pub const UNIT_PLAN_CONTEXT: &str = "Additionally you should consider the following context \
    when creating the unit plan: {value}.";

pub const UNIT_PLAN_STANDARDS: &str =
    "The unit plan should be aligned to the following standards: {value}.";

pub const UNIT_PLAN_LENGTH: &str =
    "The unit plan should cover the following length of time: {value}.";

// ── Rubric ──────────────────────────────────────────────────────────────────

pub const RUBRIC_SYSTEM: &str = "You are a {grade_level} teaching assistant. \
    The teacher is requesting that you produce a rubric for an assignment.";

pub const RUBRIC_TITLE: &str = "The title of the rubric is {value}.";
pub const RUBRIC_DESCRIPTION: &str = "The description of the rubric is {value}.";
pub const RUBRIC_OBJECTIVE: &str = "The objective of the lesson is {value}.";
pub const RUBRIC_POINT_SCALE: &str = "Score each criterion on a {value} point scale.";
pub const RUBRIC_CUSTOMIZATION: &str =
    "The teacher also asked for the following customization: {value}.";

// ── DOK questions ───────────────────────────────────────────────────────────

pub const DOK_SYSTEM: &str = "You are a {grade_level} teacher. \
    You will be creating Depth of Knowledge (DOK) Questions covering topics sent by the user. \
    If a number of questions are specified, reply with that number of questions for each DOK level. \
    Always provide a correct answer for each question. \
    You will give 5 questions for each level of DOK. \
    Do not ask the user any questions or reply with any preamble.";

pub const DOK_STANDARDS: &str =
    "Write DOK Questions covering the following topics, standards, or objectives: {value}.";

pub const DOK_ANSWER_KEY: &str = "Provide the answer key for the level 1 through 3 DOK Questions \
    you wrote above. Always give me an answer key.";

// ── Newsletter ──────────────────────────────────────────────────────────────

pub const NEWSLETTER_SYSTEM: &str =
    "You are a teacher writing a newsletter for the families of your class.";

pub const NEWSLETTER_REQUEST: &str = "Create a newsletter with the following components:\n{value}\n\n\
    Please format the newsletter in a fun and engaging manner. \
    Use emojis and other fun symbols to make it more engaging. \
    Do not over use the emojis and other symbols.";

// ── Submission feedback ─────────────────────────────────────────────────────

pub const SUBMISSION_SYSTEM: &str =
    "You are a {grade_level} teacher reviewing a student's writing for an assignment you set.";

pub const SUBMISSION_REQUIREMENTS: &str = "You are a teacher providing valuable, constructive \
    feedback to students on their writing. The requirements this assignment are listed:\n\n{value}";

pub const SUBMISSION_ACK_REQUIREMENTS: &str =
    "I will do my best to provide you with the best feedback possible.";

pub const SUBMISSION_RUBRIC: &str = "The rubric for this assignment is:\n\n{value}\n\n\
    The grade level for this assignment is: {grade_level}";

pub const SUBMISSION_ACK_RUBRIC: &str = "The rubric is a guideline for the assignment. \
    It's important to provide feedback that is constructive and helpful to the student. \
    My feedback will be based on the rubric and the requirements of the assignment \
    and appropriate for the grade level.";

pub const SUBMISSION_FORMAT: &str = "Provide your response in the form of markdown. \
    Do not give preambles or explanations. Just provide the feedback.";

pub const SUBMISSION_AWAITING: &str = "I am awaiting the student's response.";

// ── Supporting text ─────────────────────────────────────────────────────────

pub const SUPPORTING_TEXT_SYSTEM: &str = "You are a {grade_level} teacher. \
    You will be creating a text to support a lesson plan. \
    Follow the instructions provided, to best support the lesson plan. \
    Do not create another lesson plan!";

pub const SUPPORTING_TEXT_OBJECTIVE: &str = "The lesson plan has the following objective: {value}. \
    Write a supporting text that will help students achieve the objective.";

pub const SUPPORTING_TEXT_CONTEXT: &str = "Additionally you should consider the following context \
    when creating the supporting text: {value}.";

pub const SUPPORTING_TEXT_STANDARDS: &str = "The lesson plan was aligned to the following standards: \
    {value}. Take into account the standards when creating the supporting text.";

pub const SUPPORTING_TEXT_COMPLEXITY: &str =
    "The complexity of the supporting text should be {value} the {grade_level} grade level.";

pub const SUPPORTING_TEXT_LENGTH: &str =
    "The length of the supporting text should be {value} words.";
