//! HTML rendering for the calendar view.

use serde::Serialize;
use tera::{Context, Tera};

use oauthflow_core::DateWindow;
use oauthflow_providers::google::CalendarEvent;

use crate::error::AppResult;

const EVENTS_TEMPLATE_NAME: &str = "events.html";

const EVENTS_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Upcoming events</title></head>
<body>
<h1>Events {{ window }}</h1>
{% if events | length == 0 %}<p>No events.</p>
{% else %}{% for event in events %}<div class="event">
<h3>{% if event.link %}<a href="{{ event.link }}">{{ event.summary }}</a>{% else %}{{ event.summary }}{% endif %}</h3>
<p>{{ event.start }}{% if event.all_day %} (all day){% endif %}</p>
</div>
{% endfor %}{% endif %}</body>
</html>
"#;

/// What the template sees for one event.
#[derive(Debug, Serialize)]
struct EventView<'a> {
    summary: &'a str,
    start: &'a str,
    all_day: bool,
    link: Option<&'a str>,
}

impl<'a> From<&'a CalendarEvent> for EventView<'a> {
    fn from(event: &'a CalendarEvent) -> Self {
        let summary = if event.summary.is_empty() {
            "(no title)"
        } else {
            event.summary.as_str()
        };
        Self {
            summary,
            start: event.start.display(),
            all_day: event.start.is_all_day(),
            link: event.html_link.as_deref(),
        }
    }
}

/// Compiled page templates.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Compiles the built-in templates with HTML autoescaping.
    pub fn new() -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_template(EVENTS_TEMPLATE_NAME, EVENTS_TEMPLATE)?;
        Ok(Self { tera })
    }

    /// Renders the event list for `window`.
    pub fn render_events(&self, window: &DateWindow, events: &[CalendarEvent]) -> AppResult<String> {
        let views: Vec<EventView<'_>> = events.iter().map(EventView::from).collect();

        let mut context = Context::new();
        context.insert("window", &window.to_string());
        context.insert("events", &views);

        Ok(self.tera.render(EVENTS_TEMPLATE_NAME, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use oauthflow_providers::google::EventDateTime;

    use super::*;

    fn window() -> DateWindow {
        DateWindow::single_day(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    fn event(summary: &str, start: &str) -> CalendarEvent {
        CalendarEvent {
            id: None,
            summary: summary.to_string(),
            start: EventDateTime {
                date_time: Some(start.to_string()),
                ..Default::default()
            },
            end: EventDateTime::default(),
            html_link: None,
            status: None,
        }
    }

    #[test]
    fn empty_list() {
        let html = Templates::new().unwrap().render_events(&window(), &[]).unwrap();
        assert!(html.contains("No events."));
        assert!(!html.contains("<h3>"));
    }

    #[test]
    fn one_heading_per_event() {
        let events = vec![
            event("Standup", "2024-01-01T09:00:00Z"),
            event("Lunch", "2024-01-01T12:00:00Z"),
        ];
        let html = Templates::new()
            .unwrap()
            .render_events(&window(), &events)
            .unwrap();

        assert_eq!(html.matches("<h3>").count(), 2);
        assert!(html.contains("<h3>Standup</h3>"));
        assert!(html.contains("2024-01-01T12:00:00Z"));
        assert!(!html.contains("No events."));
    }

    #[test]
    fn all_day_and_untitled_events() {
        let mut holiday = event("", "");
        holiday.start = EventDateTime {
            date: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        let html = Templates::new()
            .unwrap()
            .render_events(&window(), &[holiday])
            .unwrap();

        assert!(html.contains("(no title)"));
        assert!(html.contains("2024-01-01 (all day)"));
    }

    #[test]
    fn summaries_are_escaped() {
        let events = vec![event("<script>alert(1)</script>", "2024-01-01T09:00:00Z")];
        let html = Templates::new()
            .unwrap()
            .render_events(&window(), &events)
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
