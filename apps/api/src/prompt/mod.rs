//! Prompt assembly: turns validated form values into an ordered list of
//! role-tagged messages for the text generation provider.
//!
//! Every content kind describes its prompt as a system template plus an
//! ordered list of [`Fragment`]s. [`assemble`] is a pure function: the same
//! inputs always produce the same messages, the system message always comes
//! first, and optional fragments whose value is absent or blank are dropped
//! without disturbing the relative order of the rest.

use serde::{Deserialize, Serialize};

/// Name of the placeholder filled by a fragment's own slot value.
const VALUE_VAR: &str = "value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Decides whether a fragment is emitted and what fills its `{value}`.
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    /// Emitted unconditionally; the template has no `{value}`.
    Always,
    /// Emitted unconditionally with `{value}` filled.
    Required(&'a str),
    /// Emitted only when the value is present and not blank.
    Optional(Option<&'a str>),
}

#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    pub role: Role,
    pub template: &'a str,
    pub slot: Slot<'a>,
}

impl<'a> Fragment<'a> {
    pub fn user(template: &'a str) -> Self {
        Self {
            role: Role::User,
            template,
            slot: Slot::Always,
        }
    }

    pub fn assistant(template: &'a str) -> Self {
        Self {
            role: Role::Assistant,
            template,
            slot: Slot::Always,
        }
    }

    pub fn user_with(template: &'a str, value: &'a str) -> Self {
        Self {
            role: Role::User,
            template,
            slot: Slot::Required(value),
        }
    }

    pub fn user_if(template: &'a str, value: Option<&'a str>) -> Self {
        Self {
            role: Role::User,
            template,
            slot: Slot::Optional(value),
        }
    }

    fn render(&self, vars: &[(&str, &str)]) -> Option<String> {
        let value = match self.slot {
            Slot::Always => None,
            Slot::Required(value) => Some(value),
            Slot::Optional(Some(value)) if !value.trim().is_empty() => Some(value),
            Slot::Optional(_) => return None,
        };
        Some(substitute(self.template, |name| match value {
            Some(value) if name == VALUE_VAR => Some(value),
            _ => lookup(vars, name),
        }))
    }
}

/// Builds the message list: one system message, then each emitted fragment
/// in declaration order. `vars` are `{name}` substitutions shared by the
/// system template and every fragment.
pub fn assemble(
    system_template: &str,
    vars: &[(&str, &str)],
    fragments: &[Fragment<'_>],
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(fragments.len() + 1);
    messages.push(ChatMessage::system(fill(system_template, vars)));
    messages.extend(fragments.iter().filter_map(|fragment| {
        fragment.render(vars).map(|content| ChatMessage {
            role: fragment.role,
            content,
        })
    }));
    messages
}

/// Replaces every `{name}` in `template` with its value from `vars`.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    substitute(template, |name| lookup(vars, name))
}

fn lookup<'v>(vars: &[(&str, &'v str)], name: &str) -> Option<&'v str> {
    vars.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// Single left-to-right pass over `template`. Substituted text is never
/// rescanned, so user input containing `{...}` is copied verbatim.
/// Unknown placeholders are left as written.
fn substitute<'v>(template: &str, resolve: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let resolved = after
            .find('}')
            .and_then(|close| resolve(&after[..close]).map(|value| (value, close)));
        match resolved {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM: &str = "You are a {grade_level} teacher.";

    #[test]
    fn test_system_message_comes_first() {
        let messages = assemble(SYSTEM, &[("grade_level", "5th")], &[Fragment::user("Hi")]);
        assert_eq!(messages[0], ChatMessage::system("You are a 5th teacher."));
        assert_eq!(messages[1], ChatMessage::user("Hi"));
    }

    #[test]
    fn test_absent_optional_fragments_are_dropped() {
        let messages = assemble(
            SYSTEM,
            &[("grade_level", "5th")],
            &[
                Fragment::user_with("Objective: {value}.", "photosynthesis"),
                Fragment::user_if("Context: {value}.", None),
                Fragment::user_if("Standards: {value}.", Some("   ")),
            ],
        );
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "Objective: photosynthesis.");
    }

    #[test]
    fn test_present_fragments_keep_declared_order() {
        let messages = assemble(
            SYSTEM,
            &[("grade_level", "5th")],
            &[
                Fragment::user_with("A {value}", "1"),
                Fragment::user_if("B {value}", Some("2")),
                Fragment::user_if("C {value}", Some("3")),
            ],
        );
        let contents: Vec<_> = messages.iter().skip(1).map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["A 1", "B 2", "C 3"]);
    }

    #[test]
    fn test_vars_fill_fragments_too() {
        let messages = assemble(
            "System",
            &[("grade_level", "7th")],
            &[Fragment::user("Write for {grade_level} graders.")],
        );
        assert_eq!(messages[1].content, "Write for 7th graders.");
    }

    #[test]
    fn test_assistant_fragments_keep_role() {
        let messages = assemble("System", &[], &[Fragment::assistant("Understood.")]);
        assert_eq!(messages[1].role, Role::Assistant);
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let fragments = [
            Fragment::user_with("Objective: {value}", "fractions"),
            Fragment::user_if("Standards: {value}", Some("CCSS.MATH.3.NF.A.1")),
        ];
        let a = assemble(SYSTEM, &[("grade_level", "3rd")], &fragments);
        let b = assemble(SYSTEM, &[("grade_level", "3rd")], &fragments);
        assert_eq!(a, b);
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        let messages = assemble(
            "Grade {grade_level}",
            &[("grade_level", "{value}")],
            &[
                Fragment::user_with("Level {grade_level}: {value}", "fractions"),
                Fragment::user_with("Response: {value}", "I wrote {grade_level} here"),
            ],
        );
        assert_eq!(messages[0].content, "Grade {value}");
        assert_eq!(messages[1].content, "Level {value}: fractions");
        assert_eq!(messages[2].content, "Response: I wrote {grade_level} here");
    }

    #[test]
    fn test_lone_braces_survive() {
        assert_eq!(fill("a { b } {", &[("b", "x")]), "a { b } {");
        assert_eq!(fill("{{grade_level}}", &[("grade_level", "5th")]), "{5th}");
    }

    #[test]
    fn test_unknown_placeholders_are_left_untouched() {
        assert_eq!(fill("Hello {name}", &[("other", "x")]), "Hello {name}");
    }
}
