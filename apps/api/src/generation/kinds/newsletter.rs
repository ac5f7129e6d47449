use serde::{Deserialize, Serialize};

use crate::auth::Access;
use crate::forms::{FormRejection, RawForm, Validator};
use crate::generation::prompts::{NEWSLETTER_REQUEST, NEWSLETTER_SYSTEM};
use crate::generation::{markdown_system, Artifact, ContentType};
use crate::models::record::ContentKind;
use crate::prompt::{assemble, ChatMessage, Fragment};

const MAX_ITEM_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Newsletter {
    pub title: String,
    pub events: Vec<String>,
    pub reminders: Vec<String>,
    pub news: Vec<String>,
}

impl Newsletter {
    /// One line per component; empty lists are left out.
    fn components(&self) -> String {
        let mut lines = vec![format!("Title: {}", self.title)];
        for (label, items) in [
            ("Events", &self.events),
            ("Reminders", &self.reminders),
            ("News", &self.news),
        ] {
            if !items.is_empty() {
                lines.push(format!("{label}: {}", items.join(", ")));
            }
        }
        lines.join("\n")
    }
}

impl ContentType for Newsletter {
    const KIND: ContentKind = ContentKind::Newsletter;
    const ACCESS: Access = Access::ValidSubscription;
}

impl Artifact for Newsletter {
    fn from_form(form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let title = v.text("title", 3, Some(255));
        let events = v.list("events", MAX_ITEM_CHARS);
        let reminders = v.list("reminders", MAX_ITEM_CHARS);
        let news = v.list("news", MAX_ITEM_CHARS);
        v.finish(|| Newsletter {
            title,
            events,
            reminders,
            news,
        })
    }

    fn messages(&self) -> Vec<ChatMessage> {
        let components = self.components();
        assemble(
            &markdown_system(NEWSLETTER_SYSTEM),
            &[],
            &[Fragment::user_with(NEWSLETTER_REQUEST, &components)],
        )
    }
}
