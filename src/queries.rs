use chrono::NaiveDate;

use crate::models::Event;

/// Case-insensitive match on title, description or location.
pub fn search<'a>(events: &'a [Event], term: &str) -> Vec<&'a Event> {
    let needle = term.trim().to_lowercase();
    events
        .iter()
        .filter(|event| {
            needle.is_empty()
                || [&event.title, &event.description, &event.location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

pub fn is_registered(event: &Event, user_id: &str) -> bool {
    event.attendees.iter().any(|attendee| attendee.id == user_id)
}

pub fn booked_by<'a>(events: &'a [Event], user_id: &str) -> Vec<&'a Event> {
    events
        .iter()
        .filter(|event| is_registered(event, user_id))
        .collect()
}

pub fn created_by<'a>(events: &'a [Event], user_id: &str) -> Vec<&'a Event> {
    events
        .iter()
        .filter(|event| event.creator.id == user_id)
        .collect()
}

/// Events on or after `today`, soonest first. Undated events are skipped.
pub fn upcoming(events: &[Event], today: NaiveDate) -> Vec<&Event> {
    let mut dated: Vec<(NaiveDate, &Event)> = events
        .iter()
        .filter_map(|event| {
            NaiveDate::parse_from_str(&event.date, "%Y-%m-%d")
                .ok()
                .map(|date| (date, event))
        })
        .filter(|(date, _)| *date >= today)
        .collect();
    dated.sort_by(|(a_date, a), (b_date, b)| a_date.cmp(b_date).then_with(|| a.time.cmp(&b.time)));
    dated.into_iter().map(|(_, event)| event).collect()
}
