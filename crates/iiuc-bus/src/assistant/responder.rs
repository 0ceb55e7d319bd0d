//! Rule-based replies for the bus assistant.
//!
//! `generate_response` walks an ordered list of keyword rules and answers with
//! the first one that applies. Rules are checked on the lowercased message and
//! nothing is remembered between messages. The order of the rules decides
//! overlapping cases: "female" hits the female rule before the male one, and
//! any message containing "ac" (including "contact" and "back") is answered by
//! the AC rule before the contact or return rules are reached.

use crate::schedule::{Direction, Gender, ScheduleRecord, ScheduleType};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]{1,2}):?([0-9]{0,2})\s*(am|pm)?").unwrap());

/// Place names the route rule looks for, in priority order.
const ROUTE_KEYWORDS: [&str; 13] = [
    "bot",
    "agrabad",
    "chatteswari",
    "baroyarhat",
    "hathazari",
    "kotowali",
    "cuet",
    "gec",
    "oxygen",
    "navy hospital",
    "lucky plaza",
    "kaptai",
    "shah amanath",
];

pub const DEVELOPER_BIO: &str =
    "Anamul Haque is the developer of this website and he is a CS engineer & UI/UX designer.";
const DEVELOPER_PHONE: &str = "+880 1680-478706";
const DEVELOPER_EMAIL: &str = "anamulshakib6450@gmail.com";
const DEVELOPER_LINKEDIN: &str = "https://www.linkedin.com/in/md-anamul-haque-shakib/";
const DEVELOPER_BEHANCE: &str = "https://www.behance.net/mdanamulhaque6";
const DEVELOPER_GITHUB: &str = "https://github.com/Anamulc211001";

const GREETING: &str = "👋 Hi! I'm your IIUC Smart Bus Assistant! I can help you find specific bus schedules, routes, timings, and answer any transport-related questions. Ask me anything about IIUC buses! 🚌✨";

const HELLO: &str = "Hello! 👋 I'm your smart IIUC bus assistant. I can help you find specific bus schedules, routes, and timings. Try asking me:\n\n• 'Buses from BOT at 7:00 AM'\n• 'Female buses to IIUC'\n• 'Friday AC bus schedule'\n• 'Return shuttles from IIUC'\n\nWhat would you like to know?";

const TRANSPORT_CONTACT: &str = "📞 IIUC Transport Contact:\n• Phone: +880-31-2510500\n• Email: transport@iiuc.ac.bd\n• Address: Kumira, Chittagong-4318\n• Service Hours: 6:40 AM - 4:35 PM (Regular), 7:30 AM - 6:30 PM (Friday)";

const ROUTE_OVERVIEW: &str = "🗺️ IIUC buses cover 15+ major routes including:\n• Baroyarhat → Mirshorai → Sitakunda → IIUC\n• BOT → Muradpur → Baizid Link → IIUC\n• Agrabad → Boropool → AK Khan → IIUC\n• Chatteswari → GEC → Khulshi → IIUC\n• Hathazari → Borodighirpar → Baizid Link → IIUC";

const HELP: &str = "🤝 I'm your smart bus assistant! I can help you with:\n\n🚌 **Bus Schedules:**\n• Specific time queries (e.g., '7:00 AM buses')\n• Route-based searches (e.g., 'buses from BOT')\n• Gender-specific buses\n• Friday special schedules\n\n📍 **Route Information:**\n• Detailed route maps\n• Travel times\n• Pickup points\n\n👨‍💻 **Developer Info:**\n• Contact details\n• Social profiles\n\nJust ask me anything!";

const FALLBACK: &str = "🤔 I'd love to help! I'm a smart bus assistant and can answer specific questions like:\n\n• 'Show buses from BOT at 7:00 AM'\n• 'Female buses to IIUC morning'\n• 'Friday AC bus schedule'\n• 'Return shuttles from IIUC'\n• 'Route from Agrabad to IIUC'\n\nWhat specific bus information do you need?";

/// A canned answer plus follow-up prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub suggestions: Vec<String>,
}

impl Reply {
    fn new(text: impl Into<String>, suggestions: &[&str]) -> Self {
        Self {
            text: text.into(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Opening message shown before the user has asked anything.
pub fn greeting() -> Reply {
    Reply::new(
        GREETING,
        &[
            "Show buses from BOT at 7:00 AM",
            "Female buses to IIUC morning",
            "Friday AC bus schedule",
            "Who is Anamul Haque?",
        ],
    )
}

/// Picks the reply for `user_message`.
///
/// # Arguments
/// * `user_message` - Free text typed by the user
/// * `schedules` - Timetable used by the schedule rules
pub fn generate_response(user_message: &str, schedules: &[ScheduleRecord]) -> Reply {
    let message = user_message.to_lowercase();
    let has = |needle: &str| message.contains(needle);
    let about_developer = has("anamul") || has("developer") || has("his");

    if has("who is anamul")
        || has("anamul haque")
        || has("who is the developer")
        || has("who developed")
        || has("who made")
        || has("who created")
        || (has("developer") && !has("bus"))
        || has("creator")
    {
        return Reply::new(
            DEVELOPER_BIO,
            &[
                "Get his phone number",
                "Get his email",
                "View his LinkedIn",
                "View his Behance",
                "Back to bus schedules",
            ],
        );
    }

    if (has("phone") || has("number") || has("mobile") || has("call"))
        && (about_developer || has("contact"))
    {
        return Reply::new(
            DEVELOPER_PHONE,
            &[
                "Call now",
                "Get his email",
                "View LinkedIn",
                "View Behance",
                "Back to schedules",
            ],
        );
    }

    if (has("email") || has("mail")) && about_developer {
        return Reply::new(
            DEVELOPER_EMAIL,
            &[
                "Send email",
                "Get his phone",
                "View LinkedIn",
                "View Behance",
                "Back to schedules",
            ],
        );
    }

    if has("linkedin") && about_developer {
        return Reply::new(
            DEVELOPER_LINKEDIN,
            &[
                "Visit LinkedIn",
                "Get his phone",
                "Get his email",
                "View Behance",
                "Back to schedules",
            ],
        );
    }

    if has("behance") && about_developer {
        return Reply::new(
            DEVELOPER_BEHANCE,
            &[
                "Visit Behance",
                "Get his phone",
                "Get his email",
                "View LinkedIn",
                "Back to schedules",
            ],
        );
    }

    if has("github") && about_developer {
        return Reply::new(
            DEVELOPER_GITHUB,
            &[
                "Visit GitHub",
                "Get his phone",
                "Get his email",
                "View LinkedIn",
                "Back to schedules",
            ],
        );
    }

    if let Some(reply) = time_reply(&message, schedules) {
        return reply;
    }

    if let Some(reply) = route_reply(&message, schedules) {
        return reply;
    }

    if has("female") || has("women") || has("girls") || has("ladies") {
        return female_reply(schedules);
    }

    if has("male") || has("men") || has("boys") {
        return male_reply(schedules);
    }

    if has("friday") {
        return friday_reply(schedules);
    }

    if has("ac") || has("air condition") {
        return ac_reply(schedules);
    }

    if has("morning") || has("early") {
        return morning_reply(schedules);
    }

    if has("return") || has("back") || has("shuttle") || has("iiuc to") {
        return return_reply(schedules);
    }

    if has("hello") || has("hi") || has("hey") {
        return Reply::new(
            HELLO,
            &[
                "Morning buses",
                "Friday schedules",
                "Route information",
                "Who is Anamul Haque?",
            ],
        );
    }

    if has("contact") && !has("developer") {
        return Reply::new(
            TRANSPORT_CONTACT,
            &[
                "Call transport",
                "Email query",
                "Office location",
                "Developer contact",
            ],
        );
    }

    if has("route") || has("path") || has("way") {
        return Reply::new(
            ROUTE_OVERVIEW,
            &[
                "Specific route details",
                "Travel time",
                "Stops information",
                "Alternative routes",
            ],
        );
    }

    if has("help") || has("assist") || has("support") {
        return Reply::new(
            HELP,
            &[
                "Find my bus",
                "Route planner",
                "Contact support",
                "Who is Anamul Haque?",
            ],
        );
    }

    Reply::new(
        FALLBACK,
        &[
            "Morning buses from BOT",
            "Female buses 7:00 AM",
            "Friday AC buses",
            "Who is Anamul Haque?",
        ],
    )
}

/// Trips at a time mentioned in the message, e.g. "7:00 am" or "buses at 8:30".
fn time_reply(message: &str, schedules: &[ScheduleRecord]) -> Option<Reply> {
    let caps = TIME_REGEX.captures(message)?;
    let display_time = caps.get(0)?.as_str();

    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps
        .get(2)
        .map(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .and_then(|m| m.parse().ok())
        .unwrap_or(0);
    let period = caps.get(3).map(|m| m.as_str().to_lowercase());

    match period.as_deref() {
        Some("pm") if hour != 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        _ => {}
    }

    let search_time = format!("{hour}:{minute:02}");
    let display_lower = display_time.to_lowercase();

    let matches: Vec<&ScheduleRecord> = schedules
        .iter()
        .filter(|s| {
            let bus_time = s.time.to_lowercase();
            bus_time.contains(&display_lower) || bus_time.contains(&search_time)
        })
        .collect();

    if matches.is_empty() {
        return None;
    }

    let mut text = format!("🕐 Found {} bus(es) at {}:\n\n", matches.len(), display_time);
    for (index, bus) in matches.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", index + 1, bus.summary()));
        text.push_str(&format!("   Route: {}\n", bus.route));
        if let Some(gender) = bus.gender {
            text.push_str(&format!("   Gender: {gender}\n"));
        }
        text.push_str(&format!("   Schedule: {}\n", bus.schedule_type));
        text.push('\n');
    }

    Some(Reply::new(
        text,
        &[
            "More morning buses",
            "Friday schedules",
            "Return timings",
            "Route details",
        ],
    ))
}

/// Trips touching the first known place named in the message.
fn route_reply(message: &str, schedules: &[ScheduleRecord]) -> Option<Reply> {
    let keyword = ROUTE_KEYWORDS.iter().find(|k| message.contains(*k))?;

    let touches = |s: &&ScheduleRecord| {
        s.starting_point.to_lowercase().contains(keyword)
            || s.route.to_lowercase().contains(keyword)
            || s.end_point.to_lowercase().contains(keyword)
    };
    let matches: Vec<&ScheduleRecord> = schedules.iter().filter(touches).collect();

    if matches.is_empty() {
        return None;
    }

    let mut text = format!(
        "🚌 Found {} bus(es) for {}:\n\n",
        matches.len(),
        keyword.to_uppercase()
    );

    let regular: Vec<_> = matches
        .iter()
        .filter(|b| b.schedule_type == ScheduleType::Regular)
        .collect();
    if !regular.is_empty() {
        text.push_str("📅 REGULAR SCHEDULE (Sat-Wed):\n");
        for bus in regular {
            text.push_str(&format!("• {}", bus.summary()));
            if let Some(gender) = bus.gender {
                text.push_str(&format!(" ({gender})"));
            }
            text.push('\n');
        }
        text.push('\n');
    }

    let friday: Vec<_> = matches
        .iter()
        .filter(|b| b.schedule_type == ScheduleType::Friday)
        .collect();
    if !friday.is_empty() {
        text.push_str("🕌 FRIDAY SCHEDULE:\n");
        for bus in friday {
            text.push_str(&format!("• {}", bus.summary()));
            if let Some(bus_type) = &bus.bus_type {
                text.push_str(&format!(" ({bus_type})"));
            }
            text.push('\n');
        }
    }

    Some(Reply::new(
        text,
        &[
            "Route details",
            "Travel time",
            "Return buses",
            "Alternative routes",
        ],
    ))
}

fn leading_hour_in(schedule: &ScheduleRecord, from: u32, to: u32) -> bool {
    schedule
        .leading_hour()
        .is_some_and(|h| (from..=to).contains(&h))
}

fn female_reply(schedules: &[ScheduleRecord]) -> Reply {
    let female: Vec<_> = schedules
        .iter()
        .filter(|s| s.gender == Some(Gender::Female))
        .collect();

    let mut text = format!("👩 FEMALE BUSES ({} schedules):\n\n", female.len());

    text.push_str("🌅 MORNING BUSES:\n");
    for bus in female.iter().filter(|s| leading_hour_in(s, 6, 9)) {
        text.push_str(&format!("• {}\n", bus.summary()));
    }

    let shuttles: Vec<_> = female
        .iter()
        .filter(|s| s.description.as_deref().is_some_and(|d| d.contains("Shuttle")))
        .collect();
    if !shuttles.is_empty() {
        text.push_str("\n🔄 RETURN SHUTTLES:\n");
        for bus in shuttles {
            text.push_str(&format!("• {}\n", bus.summary()));
        }
    }

    Reply::new(
        text,
        &[
            "Female morning buses",
            "Female return shuttles",
            "Safety features",
            "Pickup points",
        ],
    )
}

fn male_reply(schedules: &[ScheduleRecord]) -> Reply {
    let male: Vec<_> = schedules
        .iter()
        .filter(|s| s.gender == Some(Gender::Male))
        .collect();

    let mut text = format!("👨 MALE BUSES ({} schedules):\n\n", male.len());

    text.push_str("🌅 MORNING BUSES:\n");
    for bus in male.iter().filter(|s| leading_hour_in(s, 8, 10)) {
        text.push_str(&format!("• {}\n", bus.summary()));
    }

    Reply::new(
        text,
        &[
            "Male morning buses",
            "CUET connection",
            "Male return shuttles",
            "Timing details",
        ],
    )
}

fn friday_line(bus: &ScheduleRecord) -> String {
    let mut line = format!("• {}", bus.summary());
    if let Some(bus_type) = &bus.bus_type {
        line.push_str(&format!(" ({bus_type})"));
    }
    if let Some(remarks) = &bus.remarks {
        line.push_str(&format!(" - {remarks}"));
    }
    line.push('\n');
    line
}

fn friday_reply(schedules: &[ScheduleRecord]) -> Reply {
    let friday: Vec<_> = schedules
        .iter()
        .filter(|s| s.schedule_type == ScheduleType::Friday)
        .collect();

    let mut text = format!("🕌 FRIDAY SPECIAL SCHEDULE ({} buses):\n\n", friday.len());

    text.push_str("➡️ TO UNIVERSITY:\n");
    for bus in friday.iter().filter(|s| s.direction == Direction::ToUniversity) {
        text.push_str(&friday_line(bus));
    }

    text.push_str("\n⬅️ FROM UNIVERSITY:\n");
    for bus in friday.iter().filter(|s| s.direction == Direction::FromUniversity) {
        text.push_str(&friday_line(bus));
    }

    Reply::new(
        text,
        &[
            "AC bus timings",
            "Teacher buses",
            "Student buses",
            "Return timings",
        ],
    )
}

fn ac_reply(schedules: &[ScheduleRecord]) -> Reply {
    // "Non-AC Bus" contains "AC" too
    let ac: Vec<_> = schedules
        .iter()
        .filter(|s| s.bus_type.as_deref().is_some_and(|t| t.contains("AC")))
        .collect();

    let mut text = format!("❄️ AC BUSES ({} schedules - Friday only):\n\n", ac.len());
    for bus in ac {
        text.push_str(&format!("• {}\n", bus.summary()));
        text.push_str(&format!("  Route: {}\n", bus.route));
        if let Some(remarks) = &bus.remarks {
            text.push_str(&format!("  For: {remarks}\n"));
        }
        text.push('\n');
    }

    Reply::new(
        text,
        &[
            "AC bus routes",
            "Teacher schedule",
            "Booking info",
            "Friday timings",
        ],
    )
}

fn morning_reply(schedules: &[ScheduleRecord]) -> Reply {
    let morning: Vec<_> = schedules
        .iter()
        .filter(|s| leading_hour_in(s, 6, 9))
        .collect();

    let mut text = format!("🌅 MORNING BUSES ({} schedules):\n\n", morning.len());

    let female: Vec<_> = morning
        .iter()
        .filter(|s| s.gender == Some(Gender::Female))
        .collect();
    if !female.is_empty() {
        text.push_str("👩 FEMALE BUSES:\n");
        for bus in female {
            text.push_str(&format!("• {} - {}\n", bus.time, bus.starting_point));
        }
        text.push('\n');
    }

    let male: Vec<_> = morning
        .iter()
        .filter(|s| s.gender == Some(Gender::Male))
        .collect();
    if !male.is_empty() {
        text.push_str("👨 MALE BUSES:\n");
        for bus in male {
            text.push_str(&format!("• {} - {}\n", bus.time, bus.starting_point));
        }
    }

    Reply::new(
        text,
        &[
            "6:40 AM details",
            "Female morning buses",
            "Male morning buses",
            "Route information",
        ],
    )
}

fn return_reply(schedules: &[ScheduleRecord]) -> Reply {
    let returns: Vec<_> = schedules.iter().filter(|s| s.direction.is_return()).collect();

    let mut text = format!("🔄 RETURN SHUTTLES ({} services):\n\n", returns.len());
    for bus in returns {
        text.push_str(&format!("• {}", bus.summary()));
        if let Some(gender) = bus.gender {
            text.push_str(&format!(" ({gender})"));
        }
        if let Some(description) = &bus.description {
            text.push_str(&format!(" - {description}"));
        }
        text.push('\n');
    }

    Reply::new(
        text,
        &[
            "Shuttle timings",
            "Return routes",
            "Last shuttle",
            "Weekend returns",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleDataset;

    fn ask(message: &str) -> Reply {
        let dataset = ScheduleDataset::bundled().unwrap();
        generate_response(message, dataset.records())
    }

    #[test]
    fn test_developer_question_is_deterministic() {
        let first = ask("Who is Anamul Haque?");
        let second = ask("Who is Anamul Haque?");
        assert_eq!(first.text, DEVELOPER_BIO);
        assert_eq!(first, second);
        assert_eq!(first.suggestions.len(), 5);
    }

    #[test]
    fn test_developer_contact_rules() {
        assert_eq!(ask("what is his phone number").text, DEVELOPER_PHONE);
        assert_eq!(ask("anamul email please").text, DEVELOPER_EMAIL);
        assert_eq!(ask("his linkedin").text, DEVELOPER_LINKEDIN);
        assert_eq!(ask("his behance").text, DEVELOPER_BEHANCE);
        assert_eq!(ask("his github").text, DEVELOPER_GITHUB);
    }

    #[test]
    fn test_developer_bus_question_is_not_bio() {
        // "developer" together with "bus" skips the bio rule
        let reply = ask("developer bus");
        assert_ne!(reply.text, DEVELOPER_BIO);
    }

    #[test]
    fn test_time_query() {
        let reply = ask("buses at 7:00 AM");
        assert!(reply.text.starts_with("🕐 Found 6 bus(es) at 7:00 am"));
        assert!(reply.text.contains("Kaptai Rastar"));
    }

    #[test]
    fn test_pm_time_query_uses_text_match() {
        let reply = ask("anything at 2:40 pm?");
        assert!(reply.text.starts_with("🕐 Found 4 bus(es)"));
    }

    #[test]
    fn test_route_query_groups_by_schedule_type() {
        let reply = ask("buses from agrabad");
        assert!(reply.text.starts_with("🚌 Found"));
        assert!(reply.text.contains("FOR AGRABAD"));
        assert!(reply.text.contains("📅 REGULAR SCHEDULE (Sat-Wed):"));
        assert!(reply.text.contains("🕌 FRIDAY SCHEDULE:"));
    }

    #[test]
    fn test_female_wins_over_male() {
        let reply = ask("female buses");
        assert!(reply.text.starts_with("👩 FEMALE BUSES (19 schedules)"));
        assert!(reply.text.contains("🔄 RETURN SHUTTLES:"));
    }

    #[test]
    fn test_male_query() {
        let reply = ask("buses for boys");
        assert!(reply.text.starts_with("👨 MALE BUSES (15 schedules)"));
    }

    #[test]
    fn test_friday_query() {
        let reply = ask("friday schedule");
        assert!(reply.text.starts_with("🕌 FRIDAY SPECIAL SCHEDULE (25 buses)"));
        assert!(reply.text.contains("➡️ TO UNIVERSITY:"));
        assert!(reply.text.contains("⬅️ FROM UNIVERSITY:"));
    }

    #[test]
    fn test_contact_is_caught_by_ac_rule() {
        let reply = ask("contact");
        assert!(reply.text.starts_with("❄️ AC BUSES (6 schedules"));
    }

    #[test]
    fn test_greeting_and_fallback() {
        assert!(ask("hello").text.starts_with("Hello! 👋"));
        assert_eq!(ask("zzz").text, FALLBACK);
        assert_eq!(greeting().suggestions.len(), 4);
    }

    #[test]
    fn test_help() {
        assert_eq!(ask("i need support").text, HELP);
    }
}
