use chrono::{Duration, NaiveDate};

use crate::models::{Comment, Event, EventDraft, IdeaDraft, Ticket};
use crate::utils;

/// Author id the API stamps on comments written by the assistant.
pub const AI_RESPONDER_ID: &str = "user-ai-responder";

const IDEA_LEAD_DAYS: i64 = 30;
const IDEA_START_TIME: &str = "18:00";

/// True when the thread ends in a human comment, i.e. the assistant has not
/// answered the latest message yet.
pub fn needs_ai_reply(event: &Event) -> bool {
    thread_needs_reply(&event.comments)
}

pub fn thread_needs_reply(comments: &[Comment]) -> bool {
    comments
        .last()
        .map(|comment| comment.user.id != AI_RESPONDER_ID)
        .unwrap_or(false)
}

/// True when the thread ends in a comment written by `user_id`.
pub fn awaits_ai_reply_for(event: &Event, user_id: &str) -> bool {
    user_id != AI_RESPONDER_ID
        && event
            .last_comment()
            .map(|comment| comment.user.id == user_id)
            .unwrap_or(false)
}

pub fn image_url_for(seed: &str) -> String {
    format!("https://picsum.photos/seed/{}/1200/600", utils::slug(seed))
}

pub fn draft_from_idea(idea: &IdeaDraft, today: NaiveDate) -> EventDraft {
    let title = non_blank(&idea.title).unwrap_or_else(|| "Untitled AI Event".to_string());
    let description =
        non_blank(&idea.description).unwrap_or_else(|| "No description provided.".to_string());
    let location = non_blank(&idea.location).unwrap_or_else(|| "To be determined".to_string());
    let date = today + Duration::days(IDEA_LEAD_DAYS);

    EventDraft {
        image_url: image_url_for(&title),
        title,
        description,
        date: date.format("%Y-%m-%d").to_string(),
        time: IDEA_START_TIME.to_string(),
        location,
        tickets: vec![Ticket::general_admission(0.0)],
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
