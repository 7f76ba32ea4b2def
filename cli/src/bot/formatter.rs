//! # HTML Formatter
//!
//! File: cli/src/bot/formatter.rs
//!
//! ## Overview
//!
//! Small widget builders (cards, tables, timelines and so on) used to
//! compose chat answers. Each widget is a Tera template from
//! `core::templating`, rendered with a typed context. Plain-text arguments
//! are escaped by Tera; arguments named `content` or `items` in a grid are
//! HTML fragments and are inserted verbatim.
//!
//! Colours are referenced by palette name. Unknown names fall back to the
//! primary colour rather than failing.
//!
use crate::core::error::Result;
use crate::core::templating::TemplateRegistry;
use serde::Serialize;
use std::sync::Arc;

/// Named colours and gradients.
pub const PALETTE: &[(&str, &str)] = &[
    ("primary", "#6366f1"),
    ("success", "#10b981"),
    ("warning", "#f59e0b"),
    ("danger", "#ef4444"),
    ("info", "#3b82f6"),
    ("purple", "#a855f7"),
    ("pink", "#ec4899"),
    ("gradient_blue", "linear-gradient(135deg, #667eea 0%, #764ba2 100%)"),
    ("gradient_green", "linear-gradient(135deg, #667eea 0%, #10b981 100%)"),
    ("gradient_orange", "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)"),
    ("gradient_purple", "linear-gradient(135deg, #a855f7 0%, #ec4899 100%)"),
];

const PRIMARY: &str = "#6366f1";

/// Resolves a palette name, falling back to primary.
pub fn color(name: &str) -> &'static str {
    lookup(name).unwrap_or(PRIMARY)
}

fn lookup(name: &str) -> Option<&'static str> {
    PALETTE.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Success,
    Warning,
    Danger,
}

impl AlertKind {
    /// `(border, background, icon)`
    fn style(self) -> (&'static str, &'static str, &'static str) {
        match self {
            AlertKind::Info => ("#3b82f6", "#dbeafe", "ℹ️"),
            AlertKind::Success => ("#10b981", "#d1fae5", "✅"),
            AlertKind::Warning => ("#f59e0b", "#fef3c7", "⚠️"),
            AlertKind::Danger => ("#ef4444", "#fee2e2", "❌"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Solid,
    Outline,
}

#[derive(Serialize)]
struct Pair<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct TimelineEvent<'a> {
    title: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct Rating {
    value: u8,
    stars: String,
}

/// Renders the chat widgets. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HtmlFormatter {
    templates: Arc<TemplateRegistry>,
}

impl HtmlFormatter {
    pub fn new(templates: Arc<TemplateRegistry>) -> Self {
        Self { templates }
    }

    /// Banner with a solid colour, or the matching gradient when `gradient` is set and one exists.
    pub fn header(&self, text: &str, color_name: &str, gradient: bool) -> Result<String> {
        let background = if gradient {
            lookup(&format!("gradient_{}", color_name)).unwrap_or_else(|| color(color_name))
        } else {
            color(color_name)
        };
        self.templates.render(
            "header.html",
            &serde_json::json!({ "text": text, "background": background }),
        )
    }

    pub fn card(&self, title: &str, content: &str, icon: Option<&str>, color_name: &str) -> Result<String> {
        self.templates.render(
            "card.html",
            &serde_json::json!({
                "title": title,
                "content": content,
                "icon": icon,
                "color": color(color_name),
            }),
        )
    }

    pub fn list<S: AsRef<str>>(&self, items: &[S], ordered: bool) -> Result<String> {
        let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
        let (tag, list_style) = if ordered { ("ol", "decimal") } else { ("ul", "disc") };
        self.templates.render(
            "list.html",
            &serde_json::json!({ "tag": tag, "list_style": list_style, "items": items }),
        )
    }

    pub fn table<H: AsRef<str>>(&self, headers: &[H], rows: &[Vec<String>], striped: bool) -> Result<String> {
        let headers: Vec<&str> = headers.iter().map(AsRef::as_ref).collect();
        self.templates.render(
            "table.html",
            &serde_json::json!({ "headers": headers, "rows": rows, "striped": striped }),
        )
    }

    pub fn key_value<K: AsRef<str>, V: AsRef<str>>(&self, pairs: &[(K, V)]) -> Result<String> {
        let pairs: Vec<Pair> = pairs
            .iter()
            .map(|(k, v)| Pair {
                key: k.as_ref(),
                value: v.as_ref(),
            })
            .collect();
        self.templates
            .render("key_value.html", &serde_json::json!({ "pairs": pairs }))
    }

    pub fn badge(&self, text: &str, color_name: &str) -> Result<String> {
        self.templates.render(
            "badge.html",
            &serde_json::json!({ "text": text, "color": color(color_name) }),
        )
    }

    pub fn alert(&self, message: &str, kind: AlertKind) -> Result<String> {
        let (border, background, icon) = kind.style();
        self.templates.render(
            "alert.html",
            &serde_json::json!({
                "message": message,
                "border": border,
                "background": background,
                "icon": icon,
            }),
        )
    }

    /// Progress bar; the percentage is clamped to `0..=100`.
    pub fn progress(&self, percentage: i64, label: &str, color_name: &str) -> Result<String> {
        self.templates.render(
            "progress.html",
            &serde_json::json!({
                "percentage": percentage.clamp(0, 100),
                "label": label,
                "color": color(color_name),
            }),
        )
    }

    /// Numbered timeline of `(title, description)` events.
    pub fn timeline<T: AsRef<str>, D: AsRef<str>>(&self, events: &[(T, D)]) -> Result<String> {
        let events: Vec<TimelineEvent> = events
            .iter()
            .map(|(t, d)| TimelineEvent {
                title: t.as_ref(),
                description: d.as_ref(),
            })
            .collect();
        self.templates
            .render("timeline.html", &serde_json::json!({ "events": events }))
    }

    /// Grid of pre-rendered HTML items.
    pub fn grid<S: AsRef<str>>(&self, items: &[S], columns: usize) -> Result<String> {
        let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
        self.templates.render(
            "grid.html",
            &serde_json::json!({ "items": items, "columns": columns.max(1) }),
        )
    }

    pub fn stats_card(&self, value: &str, label: &str, icon: Option<&str>, color_name: &str) -> Result<String> {
        self.templates.render(
            "stats_card.html",
            &serde_json::json!({
                "value": value,
                "label": label,
                "icon": icon,
                "color": color(color_name),
            }),
        )
    }

    pub fn collapsible(&self, title: &str, content: &str, expanded: bool, icon: Option<&str>) -> Result<String> {
        self.templates.render(
            "collapsible.html",
            &serde_json::json!({
                "title": title,
                "content": content,
                "expanded": expanded,
                "icon": icon,
            }),
        )
    }

    pub fn button(&self, text: &str, url: &str, color_name: &str, style: ButtonStyle) -> Result<String> {
        let c = color(color_name);
        let styles = match style {
            ButtonStyle::Outline => format!("border: 2px solid {c}; color: {c}; background: transparent;"),
            ButtonStyle::Solid => format!("background: {c}; color: white; border: none;"),
        };
        self.templates.render(
            "button.html",
            &serde_json::json!({ "text": text, "url": url, "styles": styles }),
        )
    }

    /// Titled section; rendered as a closed `<details>` block when `collapsible`.
    pub fn section(&self, title: &str, content: &str, icon: Option<&str>, collapsible: bool) -> Result<String> {
        if collapsible {
            return self.collapsible(title, content, false, icon);
        }
        self.templates.render(
            "section.html",
            &serde_json::json!({ "title": title, "content": content, "icon": icon }),
        )
    }

    /// Five-button rating prompt.
    pub fn feedback_widget(&self) -> Result<String> {
        let ratings: Vec<Rating> = (1..=5)
            .rev()
            .map(|value| Rating {
                value,
                stars: "⭐".repeat(value as usize),
            })
            .collect();
        self.templates
            .render("feedback.html", &serde_json::json!({ "ratings": ratings }))
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }
}
