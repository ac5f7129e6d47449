use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Every kind of generated-content record. The tag doubles as the
/// `content_type` key of summaries and formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    LessonPlan,
    UnitPlan,
    Rubric,
    Dok,
    Newsletter,
    Feedback,
    Assignment,
    Submission,
    SupportingText,
}

impl ContentKind {
    pub const ALL: [ContentKind; 9] = [
        ContentKind::LessonPlan,
        ContentKind::UnitPlan,
        ContentKind::Rubric,
        ContentKind::Dok,
        ContentKind::Newsletter,
        ContentKind::Feedback,
        ContentKind::Assignment,
        ContentKind::Submission,
        ContentKind::SupportingText,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ContentKind::LessonPlan => "lesson_plan",
            ContentKind::UnitPlan => "unit_plan",
            ContentKind::Rubric => "rubric",
            ContentKind::Dok => "dok",
            ContentKind::Newsletter => "newsletter",
            ContentKind::Feedback => "feedback",
            ContentKind::Assignment => "assignment",
            ContentKind::Submission => "submission",
            ContentKind::SupportingText => "supporting_text",
        }
    }

    /// Backing table. Only ever interpolated from this fixed set.
    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::LessonPlan => "lesson_plans",
            ContentKind::UnitPlan => "unit_plans",
            ContentKind::Rubric => "rubrics",
            ContentKind::Dok => "doks",
            ContentKind::Newsletter => "newsletters",
            ContentKind::Feedback => "feedback",
            ContentKind::Assignment => "assignments",
            ContentKind::Submission => "submissions",
            ContentKind::SupportingText => "supporting_texts",
        }
    }

    /// Detail route of a record. Child kinds live under their parent.
    pub fn detail_path(&self, id: Uuid, parent_id: Option<Uuid>) -> String {
        match (self, parent_id) {
            (ContentKind::Submission, Some(parent)) => {
                format!("/api/v1/assignments/{parent}/submissions/{id}")
            }
            (ContentKind::SupportingText, Some(parent)) => {
                format!("/api/v1/lesson-plans/{parent}/supporting-texts/{id}")
            }
            _ => format!("/api/v1/{}/{id}", self.route_segment()),
        }
    }

    fn route_segment(&self) -> &'static str {
        match self {
            ContentKind::LessonPlan => "lesson-plans",
            ContentKind::UnitPlan => "unit-plans",
            ContentKind::Rubric => "rubrics",
            ContentKind::Dok => "doks",
            ContentKind::Newsletter => "newsletters",
            ContentKind::Feedback => "feedback",
            ContentKind::Assignment => "assignments",
            ContentKind::Submission => "submissions",
            ContentKind::SupportingText => "supporting-texts",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|k| k.tag() == s)
            .ok_or_else(|| format!("unknown content type '{s}'"))
    }
}

/// A raw input field of a record that can receive a Markdown rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubField {
    StudentResponse,
    Rubric,
    Requirements,
}

impl SubField {
    pub const ALL: [SubField; 3] = [
        SubField::StudentResponse,
        SubField::Rubric,
        SubField::Requirements,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            SubField::StudentResponse => "student_response",
            SubField::Rubric => "rubric",
            SubField::Requirements => "requirements",
        }
    }
}

impl fmt::Display for SubField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SubField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubField::ALL
            .into_iter()
            .find(|f| f.tag() == s)
            .ok_or_else(|| format!("unknown sub-field '{s}'"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub inputs: Value,
    pub output: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields of a record at creation time. Generated kinds start with an empty
/// output; uploaded rubrics carry their extracted text.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub kind: ContentKind,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub inputs: Value,
    pub output: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SummaryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_type: String,
    pub instance_id: Uuid,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FormatRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_type: String,
    pub sub_field: String,
    pub instance_id: Uuid,
    /// Hex SHA-256 of the raw text that produced `output`.
    pub input_hash: String,
    pub output: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Records created on the same UTC day, for list views.
#[derive(Debug, Clone, Serialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub records: Vec<RecordRow>,
}

/// Groups records by creation date, newest day first. Order inside a day is
/// preserved from the input.
pub fn group_by_date(records: Vec<RecordRow>) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();
    for record in records {
        let date = record.created_at.date_naive();
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.records.push(record),
            None => groups.push(DateGroup {
                date,
                records: vec![record],
            }),
        }
    }
    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(y: i32, m: u32, d: u32, h: u32) -> RecordRow {
        RecordRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            parent_id: None,
            inputs: Value::Null,
            output: String::new(),
            is_public: false,
            created_at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_tags_round_trip_through_from_str() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.tag().parse::<ContentKind>().unwrap(), kind);
        }
        for field in SubField::ALL {
            assert_eq!(field.tag().parse::<SubField>().unwrap(), field);
        }
        assert!("lessonPlan".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_detail_paths() {
        let id = Uuid::nil();
        assert_eq!(
            ContentKind::LessonPlan.detail_path(id, None),
            format!("/api/v1/lesson-plans/{id}")
        );
        let parent = Uuid::new_v4();
        assert_eq!(
            ContentKind::Submission.detail_path(id, Some(parent)),
            format!("/api/v1/assignments/{parent}/submissions/{id}")
        );
    }

    #[test]
    fn test_group_by_date_newest_first() {
        let records = vec![
            record_at(2024, 3, 2, 15),
            record_at(2024, 3, 2, 9),
            record_at(2024, 3, 1, 12),
            record_at(2024, 3, 5, 8),
        ];
        let groups = group_by_date(records);
        let dates: Vec<_> = groups.iter().map(|g| g.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-05", "2024-03-02", "2024-03-01"]);
        assert_eq!(groups[1].records.len(), 2);
    }

    #[test]
    fn test_group_by_date_empty() {
        assert!(group_by_date(vec![]).is_empty());
    }
}
