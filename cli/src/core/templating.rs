//! # EduBot Template System
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! Every piece of HTML EduBot produces (answer widgets, the feedback prompt,
//! the chat and about pages) is a named Tera template compiled once into a
//! `TemplateRegistry`. Callers render a template by name with any
//! `Serialize` context.
//!
//! Template names end in `.html`, so Tera autoescaping is active: plain values
//! are escaped and values that are already HTML must be piped through `safe`
//! inside the template.
//!
//! ## Examples
//!
//! ```rust
//! let registry = TemplateRegistry::new()?;
//! let html = registry.render("badge.html", &serde_json::json!({
//!     "text": "NAAC A+",
//!     "color": "#10b981",
//! }))?;
//! ```
//!
use crate::core::error::{EdubotError, Result};
use anyhow::{anyhow, Context};
use serde::Serialize;
use tera::Tera;
use tracing::debug;

const HEADER: &str = r#"<div style="background: {{ background | safe }}; color: white; padding: 1rem 1.5rem; border-radius: 12px; margin: 1rem 0; box-shadow: 0 4px 6px rgba(0,0,0,0.1); font-weight: 600;">{{ text }}</div>"#;

const CARD: &str = r#"<div style="border-left: 4px solid {{ color | safe }}; padding: 1rem; background: #f9fafb; border-radius: 8px; margin: 1rem 0;">
<div style="font-weight: 600; color: {{ color | safe }}; margin-bottom: 0.5rem; font-size: 1.1rem;">{% if icon %}<span style="font-size: 1.5rem; margin-right: 0.5rem;">{{ icon }}</span>{% endif %}{{ title }}</div>
<div style="color: #374151; line-height: 1.6;">{{ content | safe }}</div>
</div>"#;

const LIST: &str = r#"<{{ tag }} style="list-style-type: {{ list_style }}; padding-left: 1.5rem; color: #374151; margin: 0.5rem 0;">{% for item in items %}<li style="margin-bottom: 0.5rem; line-height: 1.6;">{{ item }}</li>{% endfor %}</{{ tag }}>"#;

const TABLE: &str = r#"<table style="width: 100%; border-collapse: collapse; margin: 1rem 0; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
<thead><tr>{% for h in headers %}<th style="padding: 0.75rem; text-align: left; background: #6366f1; color: white; font-weight: 600;">{{ h }}</th>{% endfor %}</tr></thead>
<tbody>{% for row in rows %}<tr style="background: {% if striped and loop.index0 % 2 == 0 %}#f9fafb{% else %}white{% endif %};">{% for cell in row %}<td style="padding: 0.75rem; border-bottom: 1px solid #e5e7eb;">{{ cell }}</td>{% endfor %}</tr>{% endfor %}</tbody>
</table>"#;

const KEY_VALUE: &str = r#"<div style="background: white; border-radius: 8px; padding: 1rem; box-shadow: 0 2px 4px rgba(0,0,0,0.1); margin: 1rem 0;">{% for pair in pairs %}
<div style="display: flex; padding: 0.5rem 0; border-bottom: 1px solid #e5e7eb;"><div style="flex: 0 0 40%; font-weight: 600; color: #6366f1;">{{ pair.key }}:</div><div style="flex: 1; color: #374151;">{{ pair.value }}</div></div>{% endfor %}
</div>"#;

const BADGE: &str = r#"<span style="display: inline-block; padding: 0.25rem 0.75rem; background: {{ color | safe }}; color: white; border-radius: 12px; font-size: 0.875rem; font-weight: 500; margin: 0.25rem;">{{ text }}</span>"#;

const ALERT: &str = r#"<div style="border-left: 4px solid {{ border | safe }}; background: {{ background | safe }}; padding: 1rem; border-radius: 8px; margin: 1rem 0; box-shadow: 0 2px 4px rgba(0,0,0,0.1);"><span style="font-size: 1.5rem; margin-right: 0.5rem;">{{ icon }}</span><span style="color: #374151; line-height: 1.6;">{{ message }}</span></div>"#;

const PROGRESS: &str = r#"<div style="margin: 1rem 0;">
<div style="display: flex; justify-content: space-between; margin-bottom: 0.5rem;"><span style="color: #374151; font-weight: 500;">{{ label }}</span><span style="color: {{ color | safe }}; font-weight: 600;">{{ percentage }}%</span></div>
<div style="width: 100%; background: #e5e7eb; border-radius: 12px; overflow: hidden; height: 8px;"><div style="width: {{ percentage }}%; background: {{ color | safe }}; height: 100%; transition: width 0.3s ease;"></div></div>
</div>"#;

const TIMELINE: &str = r#"<div style="padding: 1rem; margin: 1rem 0;">{% for event in events %}
<div style="display: flex; margin-bottom: 0.5rem;"><div style="flex: 0 0 auto; margin-right: 1rem;"><div style="width: 32px; height: 32px; background: #6366f1; border-radius: 50%; display: flex; align-items: center; justify-content: center; color: white; font-weight: 600;">{{ loop.index }}</div></div><div style="flex: 1; padding-bottom: 1rem;"><div style="font-weight: 600; color: #1f2937; margin-bottom: 0.25rem;">{{ event.title }}</div><div style="color: #6b7280; font-size: 0.9rem;">{{ event.description }}</div></div></div>{% if not loop.last %}
<div class="timeline-connector" style="width: 2px; height: 40px; background: #e5e7eb; margin-left: 15px;"></div>{% endif %}{% endfor %}
</div>"#;

const GRID: &str = r#"<div style="display: grid; grid-template-columns: repeat({{ columns }}, 1fr); gap: 1rem; margin: 1rem 0;">{% for item in items %}<div style="padding: 1rem; background: white; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">{{ item | safe }}</div>{% endfor %}</div>"#;

const STATS_CARD: &str = r#"<div style="padding: 1.5rem; background: white; border-radius: 12px; text-align: center; box-shadow: 0 4px 6px rgba(0,0,0,0.1);">{% if icon %}<div style="font-size: 2rem; margin-bottom: 0.5rem;">{{ icon }}</div>{% endif %}<div style="font-size: 2rem; font-weight: 700; color: {{ color | safe }}; margin-bottom: 0.25rem;">{{ value }}</div><div style="color: #6b7280; font-size: 0.9rem;">{{ label }}</div></div>"#;

const COLLAPSIBLE: &str = r#"<details style="margin: 1rem 0; border: 1px solid #e5e7eb; border-radius: 8px; padding: 1rem;"{% if expanded %} open{% endif %}><summary style="cursor: pointer; font-weight: 600; color: #6366f1; margin-bottom: 0.5rem;">{% if icon %}<span style="margin-right: 0.5rem;">{{ icon }}</span>{% endif %}{{ title }}</summary><div style="margin-top: 0.5rem; color: #374151; line-height: 1.6;">{{ content | safe }}</div></details>"#;

const BUTTON: &str = r#"<a href="{{ url }}" style="display: inline-block; padding: 0.75rem 1.5rem; {{ styles | safe }} border-radius: 8px; text-decoration: none; font-weight: 600; margin: 0.5rem 0.5rem 0.5rem 0; box-shadow: 0 2px 4px rgba(0,0,0,0.1); transition: transform 0.2s;">{{ text }}</a>"#;

const SECTION: &str = r#"<div style="margin: 1.5rem 0;"><h3 style="color: #1f2937; font-size: 1.25rem; font-weight: 600; margin-bottom: 1rem; border-bottom: 2px solid #e5e7eb; padding-bottom: 0.5rem;">{% if icon %}<span style="margin-right: 0.5rem;">{{ icon }}</span>{% endif %}{{ title }}</h3><div style="color: #374151; line-height: 1.6;">{{ content | safe }}</div></div>"#;

const FEEDBACK: &str = r#"<div class="feedback-request" style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 25px; border-radius: 15px; text-align: center; box-shadow: 0 4px 15px rgba(0,0,0,0.2);">
<h2 style="margin: 0 0 15px 0;">💬 How was my response?</h2>
<p style="margin: 0 0 20px 0; font-size: 16px; opacity: 0.95;">Your feedback helps me serve you better!</p>
<div style="display: flex; justify-content: center; gap: 10px; margin-bottom: 20px;">{% for rating in ratings %}
<button onclick="submitFeedback({{ rating.value }})" style="background: white; color: #667eea; border: none; padding: 12px 20px; border-radius: 8px; cursor: pointer; font-size: 24px; transition: transform 0.2s;">{{ rating.stars }}</button>{% endfor %}
</div>
<p style="margin: 0; font-size: 14px; opacity: 0.85;">Click to rate (5 = Excellent, 3 = Good)</p>
</div>"#;

const CHAT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ title }}</title>
</head>
<body style="font-family: system-ui, sans-serif; background: #f3f4f6; margin: 0;">
<main style="max-width: 760px; margin: 2rem auto; background: white; border-radius: 12px; padding: 1.5rem; box-shadow: 0 4px 6px rgba(0,0,0,0.1);">
<h1 style="color: #6366f1; margin-top: 0;">{{ title }}</h1>
<p style="color: #6b7280;">{{ tagline }}</p>
<div id="log"></div>
<form id="chat-form" style="display: flex; gap: 0.5rem; margin-top: 1rem;">
<input id="message" autocomplete="off" placeholder="Ask about admissions, placements, courses or campus life" style="flex: 1; padding: 0.75rem; border: 1px solid #e5e7eb; border-radius: 8px;">
<button type="submit" style="background: #6366f1; color: white; border: none; padding: 0.75rem 1.5rem; border-radius: 8px;">Send</button>
</form>
</main>
<script>
{% raw %}
const sessionId = "web-" + Math.random().toString(36).slice(2);
const log = document.getElementById("log");
async function send(text) {
  const res = await fetch("/api/chat", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ message: text, session_id: sessionId })
  });
  const body = await res.json();
  const entry = document.createElement("div");
  entry.innerHTML = body.data ? body.data.response : body.message;
  log.appendChild(entry);
}
async function submitFeedback(rating) {
  await fetch("/api/feedback", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ session_id: sessionId, rating: rating })
  });
}
document.getElementById("chat-form").addEventListener("submit", (e) => {
  e.preventDefault();
  const input = document.getElementById("message");
  if (input.value.trim()) { send(input.value.trim()); input.value = ""; }
});
{% endraw %}
</script>
</body>
</html>"#;

const ABOUT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>About {{ name }}</title>
</head>
<body style="font-family: system-ui, sans-serif; background: #f3f4f6; margin: 0;">
<main style="max-width: 760px; margin: 2rem auto; background: white; border-radius: 12px; padding: 1.5rem;">
<h1 style="color: #6366f1; margin-top: 0;">{{ name }}</h1>
{{ body | safe }}
</main>
</body>
</html>"#;

/// Built-in templates as `(name, source)` pairs.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("header.html", HEADER),
    ("card.html", CARD),
    ("list.html", LIST),
    ("table.html", TABLE),
    ("key_value.html", KEY_VALUE),
    ("badge.html", BADGE),
    ("alert.html", ALERT),
    ("progress.html", PROGRESS),
    ("timeline.html", TIMELINE),
    ("grid.html", GRID),
    ("stats_card.html", STATS_CARD),
    ("collapsible.html", COLLAPSIBLE),
    ("button.html", BUTTON),
    ("section.html", SECTION),
    ("feedback.html", FEEDBACK),
    ("chat_page.html", CHAT_PAGE),
    ("about_page.html", ABOUT_PAGE),
];

/// Compiled set of EduBot's HTML templates.
#[derive(Debug)]
pub struct TemplateRegistry {
    tera: Tera,
}

impl TemplateRegistry {
    /// Compiles all built-in templates. Fails if any template has a syntax error.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_TEMPLATES.iter().copied())
            .map_err(|e| {
                anyhow!(EdubotError::Template { source: e })
                    .context("Failed to compile built-in templates")
            })?;
        debug!("Compiled {} built-in templates", BUILTIN_TEMPLATES.len());
        Ok(Self { tera })
    }

    /// Renders the template `name` with a serializable context.
    pub fn render<C: Serialize>(&self, name: &str, context: &C) -> Result<String> {
        let tera_context = tera::Context::from_serialize(context).map_err(|e| {
            anyhow!(EdubotError::Template { source: e })
                .context(format!("Failed to build context for template '{}'", name))
        })?;
        self.tera
            .render(name, &tera_context)
            .map_err(|e| anyhow!(EdubotError::Template { source: e }))
            .with_context(|| format!("Tera rendering failed for template '{}'", name))
    }

    /// Names of all registered templates, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }
}
