//! One module per content kind: validated input, prompt and follow-ups.

pub mod assignment;
pub mod dok;
pub mod feedback;
pub mod lesson_plan;
pub mod newsletter;
pub mod rubric;
pub mod submission;
pub mod supporting_text;
pub mod unit_plan;

pub use assignment::Assignment;
pub use dok::Dok;
pub use feedback::Feedback;
pub use lesson_plan::LessonPlan;
pub use newsletter::Newsletter;
pub use rubric::Rubric;
pub use unit_plan::UnitPlan;

#[cfg(test)]
pub(crate) fn form(pairs: &[(&str, &str)]) -> crate::forms::RawForm {
    crate::forms::RawForm::new(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}
