//! # Responder
//!
//! File: cli/src/bot/responder.rs
//!
//! ## Overview
//!
//! Turns a conversation step into the answer a user sees. The conversation
//! manager decides *what stage* the dialogue is in; the responder looks at
//! the words in the message and attaches the matching slice of the knowledge
//! base as HTML widgets.
//!
//! A composed answer is laid out as:
//!
//! 1. A header carrying the flow text.
//! 2. At most one knowledge block, chosen by the first matching [`Intent`].
//! 3. The follow-up suggestions, if any.
//! 4. The feedback widget when the flow asks for a rating.
//!
//! ## Keyword matching
//!
//! Keywords are matched against whole words of the lower-cased message, so
//! "lab" does not fire on "available". A trailing `*` makes a keyword a
//! prefix ("eligib*" matches "eligibility"), a keyword containing a space is
//! a phrase, and a plain keyword also matches its plural.
//!
use crate::bot::conversation::FlowReply;
use crate::bot::formatter::{AlertKind, ButtonStyle, HtmlFormatter};
use crate::bot::knowledge::{
    Keyed, ADMISSIONS, ALUMNI_SUCCESS, COLLEGE_INFO, DEPARTMENTS, DINING_FACILITIES,
    EVENTS_CALENDAR, FACILITIES, FACULTY_INFO, INNOVATION_HUB, PLACEMENT, STUDENT_WELFARE,
    TRANSPORTATION,
};
use crate::bot::topics::{keyword_matches, words, Topic};
use crate::core::error::Result;
use serde::Serialize;
use tracing::debug;

/// Knowledge blocks the responder can attach to an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Fees,
    Eligibility,
    Documents,
    Scholarships,
    Dates,
    Process,
    Internships,
    Recruiters,
    PlacementStats,
    Departments,
    Hostel,
    Dining,
    Sports,
    Clubs,
    Facilities,
    Transport,
    Faculty,
    Events,
    Alumni,
    Research,
    Welfare,
    Contact,
}

/// Checked in order; the first hit wins.
const INTENTS: &[(Intent, &[&str])] = &[
    (Intent::Fees, &["fee", "cost*", "tuition"]),
    (Intent::Eligibility, &["eligib*", "criteria", "qualification"]),
    (Intent::Documents, &["document", "certificate"]),
    (Intent::Scholarships, &["scholarship"]),
    (Intent::Dates, &["date", "deadline", "when do"]),
    (Intent::Process, &["apply", "application", "process", "procedure", "how to join"]),
    (Intent::Internships, &["internship", "stipend", "ppo"]),
    (Intent::Recruiters, &["compan*", "recruit*"]),
    (Intent::PlacementStats, &["placement", "package", "salary", "salaries", "statistic"]),
    (Intent::Departments, &["department", "course", "program", "programme", "branch", "branches", "specialization"]),
    (Intent::Hostel, &["hostel", "accommodation", "room"]),
    (Intent::Dining, &["food", "canteen", "mess", "dining", "cafeteria"]),
    (Intent::Sports, &["sport", "gym", "gymnasium", "cricket", "football"]),
    (Intent::Clubs, &["club", "activity", "activities"]),
    (Intent::Facilities, &["facility", "facilities", "library", "libraries", "lab", "laborator*", "wifi"]),
    (Intent::Transport, &["transport*", "bus", "buses", "airport", "railway"]),
    (Intent::Faculty, &["faculty", "teacher", "professor"]),
    (Intent::Events, &["event", "fest", "festival"]),
    (Intent::Alumni, &["alumni", "alumnus"]),
    (Intent::Research, &["research", "innovation", "patent"]),
    (Intent::Welfare, &["counsel*", "ragging", "health", "medical", "grievance"]),
    (Intent::Contact, &["contact", "address", "phone", "email", "location"]),
];

/// An answer ready to send to the browser.
#[derive(Debug, Clone, Serialize)]
pub struct ComposedReply {
    pub html: String,
    pub intent: Option<Intent>,
}

/// Detects which knowledge block (if any) a message asks for.
pub fn detect_intent(message: &str) -> Option<Intent> {
    let lowered = message.to_lowercase();
    let words = words(&lowered);
    INTENTS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| keyword_matches(&lowered, &words, k)))
        .map(|(intent, _)| *intent)
}

/// Builds the HTML answer for one conversation step.
pub fn compose_reply(formatter: &HtmlFormatter, message: &str, flow: &FlowReply) -> Result<ComposedReply> {
    let intent = detect_intent(message);
    debug!("Composing reply for topic {} with intent {:?}", flow.topic, intent);

    let mut parts = vec![formatter.header(&flow.response.text, topic_color(flow.topic), true)?];
    if let Some(intent) = intent {
        parts.push(knowledge_block(formatter, intent)?);
    }
    if !flow.response.follow_up_questions.is_empty() {
        let suggestions = formatter.list(&flow.response.follow_up_questions, false)?;
        parts.push(formatter.section("You might also ask", &suggestions, Some("💡"), false)?);
    }
    if flow.response.requires_feedback {
        parts.push(formatter.feedback_widget()?);
    }

    Ok(ComposedReply {
        html: parts.join("\n"),
        intent,
    })
}

/// A reply counts as unanswered when the message matched no topic and no knowledge block.
pub fn is_unanswered(flow: &FlowReply, reply: &ComposedReply) -> bool {
    flow.topic == Topic::General && reply.intent.is_none()
}

/// Terminal rendering: flow text followed by numbered suggestions.
pub fn render_plain(flow: &FlowReply) -> String {
    let mut out = flow.response.text.clone();
    for (i, question) in flow.response.follow_up_questions.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, question));
    }
    if flow.response.requires_feedback {
        out.push_str("\n\nHow was my response? Type `rate 1-5` to let me know.");
    }
    out
}

fn topic_color(topic: Topic) -> &'static str {
    match topic {
        Topic::NalandaInfo => "blue",
        Topic::Admissions => "green",
        Topic::Placements => "orange",
        Topic::Courses => "purple",
        Topic::CampusLife => "green",
        Topic::General => "primary",
    }
}

/// `"B.Tech_per_year"` -> `"B.Tech per year"`, `"placement_rate"` -> `"Placement rate"`.
fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn humanized_pairs(group: &Keyed<&'static str>) -> Vec<(String, &'static str)> {
    group.iter().map(|(k, v)| (humanize(k), *v)).collect()
}

/// First run of digits in `text`, e.g. 85 for "85-90% annually".
fn leading_number(text: &str) -> Option<i64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn knowledge_block(f: &HtmlFormatter, intent: Intent) -> Result<String> {
    match intent {
        Intent::Fees => {
            let fees = f.key_value(&humanized_pairs(&ADMISSIONS.fee_structure))?;
            f.section("Fee Structure", &fees, Some("💰"), false)
        }
        Intent::Eligibility => {
            let rows: Vec<Vec<String>> = ADMISSIONS
                .eligibility
                .iter()
                .map(|(program, e)| {
                    vec![
                        program.to_string(),
                        e.qualification.to_string(),
                        e.minimum_marks.to_string(),
                        e.entrance_exam.to_string(),
                        e.age_limit.to_string(),
                    ]
                })
                .collect();
            let table = f.table(
                &["Program", "Qualification", "Minimum Marks", "Entrance Exam", "Age Limit"],
                &rows,
                true,
            )?;
            f.section("Eligibility Criteria", &table, Some("🎓"), false)
        }
        Intent::Documents => {
            let list = f.list(ADMISSIONS.documents_required, true)?;
            f.card("Documents Required", &list, Some("📄"), "info")
        }
        Intent::Scholarships => {
            let list = f.list(ADMISSIONS.scholarships_available, false)?;
            f.card("Scholarships Available", &list, Some("🏅"), "success")
        }
        Intent::Dates => {
            let dates = f.key_value(&humanized_pairs(&ADMISSIONS.important_dates))?;
            f.section("Important Dates", &dates, Some("📅"), false)
        }
        Intent::Process => {
            let steps: Vec<(&str, &str)> = ADMISSIONS
                .process
                .iter()
                .map(|step| step.split_once(": ").unwrap_or((*step, "")))
                .collect();
            let timeline = f.timeline(&steps)?;
            let apply = ADMISSIONS
                .important_pages
                .iter()
                .find_map(|page| page.strip_prefix("Admissions: "))
                .map(|url| f.button("Apply Online", url, "primary", ButtonStyle::Solid))
                .transpose()?
                .unwrap_or_default();
            f.section("Admission Process", &format!("{}{}", timeline, apply), Some("📝"), false)
        }
        Intent::Internships => {
            let details = f.key_value(&humanized_pairs(&PLACEMENT.internship_programs))?;
            f.card("Internship Programs", &details, Some("💼"), "info")
        }
        Intent::Recruiters => recruiters(f),
        Intent::PlacementStats => {
            let cards = PLACEMENT
                .statistics
                .iter()
                .map(|(k, v)| f.stats_card(v, &humanize(k), None, "success"))
                .collect::<Result<Vec<_>>>()?;
            let grid = f.grid(&cards, 2)?;
            let rate = PLACEMENT
                .statistics
                .iter()
                .find(|(k, _)| *k == "placement_rate")
                .and_then(|(_, v)| leading_number(v))
                .map(|pct| f.progress(pct, "Placement Rate", "success"))
                .transpose()?
                .unwrap_or_default();
            Ok(format!("{}\n{}{}", grid, rate, recruiters(f)?))
        }
        Intent::Departments => {
            let rows: Vec<Vec<String>> = DEPARTMENTS
                .iter()
                .map(|d| {
                    vec![
                        d.name.to_string(),
                        d.programs.join(", "),
                        d.specializations.join(", "),
                    ]
                })
                .collect();
            let table = f.table(&["Department", "Programs", "Specializations"], &rows, true)?;
            f.section("Departments & Programs", &table, Some("🏛️"), false)
        }
        Intent::Hostel => {
            let list = f.list(FACILITIES.campus_life, false)?;
            let fee = ADMISSIONS.fee_structure.get("hostel_per_year").copied().unwrap_or("");
            let note = f.alert(&format!("Hostel fee: {}", fee), AlertKind::Info)?;
            Ok(format!("{}\n{}", f.section("Hostel & Campus Life", &list, Some("🏠"), false)?, note))
        }
        Intent::Dining => {
            let mess = f.key_value(&humanized_pairs(&DINING_FACILITIES.mess))?;
            let cafeteria = f.list(DINING_FACILITIES.cafeteria, false)?;
            let night = f.key_value(&humanized_pairs(&DINING_FACILITIES.night_canteen))?;
            Ok([
                f.section("Mess", &mess, Some("🍽️"), false)?,
                f.section("Cafeteria", &cafeteria, None, false)?,
                f.section("Night Canteen", &night, Some("🌙"), true)?,
            ]
            .join("\n"))
        }
        Intent::Sports => {
            let list = f.list(FACILITIES.sports, false)?;
            f.card("Sports Facilities", &list, Some("⚽"), "success")
        }
        Intent::Clubs => {
            let list = f.list(FACILITIES.student_activities, false)?;
            f.card("Clubs & Student Activities", &list, Some("🎭"), "pink")
        }
        Intent::Facilities => {
            let academic = f.list(FACILITIES.academic, false)?;
            let technology = f.list(FACILITIES.technology, false)?;
            Ok(format!(
                "{}\n{}",
                f.section("Academic Facilities", &academic, Some("📚"), false)?,
                f.section("Technology", &technology, Some("💻"), true)?
            ))
        }
        Intent::Transport => nested_groups(f, &TRANSPORTATION, "🚌"),
        Intent::Faculty => {
            let pairs = [
                ("Total faculty", FACULTY_INFO.total_faculty),
                ("PhD holders", FACULTY_INFO.phd_holders),
                ("Experience", FACULTY_INFO.experience),
                ("Publications", FACULTY_INFO.publications),
                ("Student-faculty ratio", FACULTY_INFO.student_faculty_ratio),
            ];
            let details = f.key_value(&pairs)?;
            let development = f.list(FACULTY_INFO.faculty_development, false)?;
            Ok(format!(
                "{}\n{}",
                f.section("Our Faculty", &details, Some("👩‍🏫"), false)?,
                f.section("Faculty Development", &development, None, true)?
            ))
        }
        Intent::Events => {
            let events: Vec<(String, String)> = EVENTS_CALENDAR
                .iter()
                .map(|(_, e)| (format!("{} ({})", e.name, e.month), e.events.join(", ")))
                .collect();
            let timeline = f.timeline(&events)?;
            f.section("Events Calendar", &timeline, Some("🎉"), false)
        }
        Intent::Alumni => {
            let pairs = [
                ("Network", ALUMNI_SUCCESS.network_size),
                ("Entrepreneurs", ALUMNI_SUCCESS.entrepreneurs),
                ("Mentorship", ALUMNI_SUCCESS.mentorship),
            ];
            let details = f.key_value(&pairs)?;
            let badges = ALUMNI_SUCCESS
                .placement_companies
                .iter()
                .map(|c| f.badge(c, "purple"))
                .collect::<Result<Vec<_>>>()?
                .join("");
            f.card("Alumni Network", &format!("{}\n{}", details, badges), Some("🎓"), "purple")
        }
        Intent::Research => {
            let centers = f.list(INNOVATION_HUB.research_centers, false)?;
            let pairs = [
                ("Patents", INNOVATION_HUB.patents_filed),
                ("Grants", INNOVATION_HUB.research_grants),
                ("Publications", INNOVATION_HUB.publications),
            ];
            let details = f.key_value(&pairs)?;
            f.card("Research & Innovation", &format!("{}\n{}", centers, details), Some("🔬"), "info")
        }
        Intent::Welfare => nested_groups(f, &STUDENT_WELFARE, "🛡️"),
        Intent::Contact => {
            let mut pairs = humanized_pairs(&COLLEGE_INFO.contact);
            if let Some(address) = COLLEGE_INFO.location.get("address") {
                pairs.push(("Address".to_string(), *address));
            }
            let details = f.key_value(&pairs)?;
            f.card("Contact Us", &details, Some("📞"), "primary")
        }
    }
}

fn recruiters(f: &HtmlFormatter) -> Result<String> {
    let list = f.list(PLACEMENT.top_recruiters, false)?;
    f.card("Top Recruiters", &list, Some("🏢"), "warning")
}

fn nested_groups(f: &HtmlFormatter, groups: &Keyed<Keyed<&'static str>>, icon: &str) -> Result<String> {
    let sections = groups
        .iter()
        .map(|(name, group)| {
            let details = f.key_value(&humanized_pairs(group))?;
            f.section(&humanize(name), &details, Some(icon), false)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(sections.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::conversation::FlowResponse;
    use crate::core::templating::TemplateRegistry;
    use std::sync::Arc;

    fn formatter() -> HtmlFormatter {
        HtmlFormatter::new(Arc::new(TemplateRegistry::new().unwrap()))
    }

    fn flow(topic: Topic, follow_ups: &[&str], requires_feedback: bool) -> FlowReply {
        FlowReply {
            topic,
            step: 1,
            response: FlowResponse {
                text: "Here you go".to_string(),
                follow_up_questions: follow_ups.iter().map(|s| s.to_string()).collect(),
                requires_feedback,
            },
        }
    }

    #[test]
    fn test_detect_intent_word_boundaries() {
        assert_eq!(detect_intent("What is the fee?"), Some(Intent::Fees));
        assert_eq!(detect_intent("Tell me the fees"), Some(Intent::Fees));
        assert_eq!(detect_intent("Is feedback available?"), None);
        assert_eq!(detect_intent("Any labs?"), Some(Intent::Facilities));
        assert_eq!(detect_intent("I sent a message"), None);
    }

    #[test]
    fn test_detect_intent_order() {
        assert_eq!(
            detect_intent("Which companies visit for placements?"),
            Some(Intent::Recruiters)
        );
        assert_eq!(detect_intent("What is the average package?"), Some(Intent::PlacementStats));
        assert_eq!(detect_intent("What are the eligibility criteria?"), Some(Intent::Eligibility));
        assert_eq!(detect_intent("How to apply online?"), Some(Intent::Process));
        assert_eq!(detect_intent("What is the application fee?"), Some(Intent::Fees));
        assert_eq!(detect_intent("When do admissions open?"), Some(Intent::Dates));
    }

    #[test]
    fn test_compose_reply_layout() {
        let f = formatter();
        let reply = compose_reply(
            &f,
            "What documents are needed?",
            &flow(Topic::Admissions, &["Important dates?"], false),
        )
        .unwrap();
        assert_eq!(reply.intent, Some(Intent::Documents));
        assert!(reply.html.contains("Here you go"));
        assert!(reply.html.contains("Documents Required"));
        assert!(reply.html.contains("Aadhar card copy"));
        assert!(reply.html.contains("You might also ask"));
        assert!(!reply.html.contains("feedback-request"));
    }

    #[test]
    fn test_compose_reply_feedback_and_no_block() {
        let f = formatter();
        let reply = compose_reply(&f, "thanks", &flow(Topic::Placements, &[], true)).unwrap();
        assert!(reply.intent.is_none());
        assert!(reply.html.contains("feedback-request"));
        assert!(!reply.html.contains("You might also ask"));
    }

    #[test]
    fn test_every_intent_renders() {
        let f = formatter();
        for (intent, _) in INTENTS {
            let html = knowledge_block(&f, *intent).unwrap();
            assert!(!html.is_empty(), "{:?} rendered nothing", intent);
        }
    }

    #[test]
    fn test_placement_stats_block() {
        let f = formatter();
        let html = knowledge_block(&f, Intent::PlacementStats).unwrap();
        assert!(html.contains("Placement rate"));
        assert!(html.contains("85-90% annually"));
        assert!(html.contains("Top Recruiters"));
        assert!(html.contains("width: 85%"));
    }

    #[test]
    fn test_process_block_links_admissions_page() {
        let f = formatter();
        let html = knowledge_block(&f, Intent::Process).unwrap();
        assert!(html.contains("Apply Online"));
        assert!(html.contains("admissions"));
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("85-90% annually"), Some(85));
        assert_eq!(leading_number("INR 4.5 LPA"), Some(4));
        assert_eq!(leading_number("Not specified"), None);
    }

    #[test]
    fn test_is_unanswered() {
        let f = formatter();
        let general = flow(Topic::General, &[], false);
        let reply = compose_reply(&f, "what is the meaning of life", &general).unwrap();
        assert!(is_unanswered(&general, &reply));

        let with_block = compose_reply(&f, "hostel please", &general).unwrap();
        assert!(!is_unanswered(&general, &with_block));

        let topical = flow(Topic::Courses, &[], false);
        let reply = compose_reply(&f, "hmm", &topical).unwrap();
        assert!(!is_unanswered(&topical, &reply));
    }

    #[test]
    fn test_render_plain() {
        let text = render_plain(&flow(Topic::General, &["A", "B"], true));
        assert!(text.starts_with("Here you go\n  1. A\n  2. B"));
        assert!(text.contains("rate 1-5"));
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("placement_rate"), "Placement rate");
        assert_eq!(humanize("B.Tech_per_year"), "B.Tech per year");
        assert_eq!(humanize(""), "");
    }
}
