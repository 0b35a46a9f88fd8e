//! Server-side HTML for the frontend page.

use super::{EntryRole, HistoryEntry};

pub const DOCTOR_SPECIALTIES: &[&str] = &[
    "All Specialties",
    "Cardiology",
    "Dermatology",
    "Pediatrics",
    "Orthopedics",
];
pub const BOOKING_SPECIALTIES: &[&str] = &[
    "Any",
    "Cardiology",
    "Dermatology",
    "Pediatrics",
    "Orthopedics",
];
pub const TIME_PREFERENCES: &[&str] = &["Any Time", "Morning", "Afternoon", "Evening"];

pub const DOCTOR_EXAMPLES: &[&str] = &[
    "list all doctors",
    "find cardiologists",
    "show slots for dr001",
    "what doctors are available?",
];
pub const BOOKING_EXAMPLES: &[&str] = &[
    "book appointment for John Smith with cardiologist",
    "list appointments for Sarah",
    "cancel appointment APT0001",
    "show all scheduled appointments",
];

/// Entries shown on the page, newest first.
pub const VISIBLE_HISTORY: usize = 10;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Framed agent output keeps its layout; anything else is flowed text.
pub fn render_agent_text(content: &str) -> String {
    if content.contains("━━━") {
        format!("<pre>{}</pre>", html_escape(content))
    } else {
        format!("<p>{}</p>", html_escape(content).replace('\n', "<br>"))
    }
}

fn options(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("<option>{}</option>", html_escape(v)))
        .collect::<Vec<_>>()
        .join("")
}

fn status_badge(name: &str, online: bool) -> String {
    let (class, label) = if online {
        ("online", "🟢 Online")
    } else {
        ("offline", "🔴 Offline")
    };
    format!(
        "<li><strong>{}:</strong> <span class=\"{}\">{}</span></li>",
        html_escape(name),
        class,
        label
    )
}

fn render_entry(entry: &HistoryEntry) -> String {
    let ts = html_escape(&entry.timestamp);
    match entry.role {
        EntryRole::User => format!(
            "<div class=\"entry user\"><strong>You ({}):</strong> {}</div>",
            ts,
            html_escape(&entry.content)
        ),
        EntryRole::Agent => format!(
            "<div class=\"entry agent\"><strong>{} ({}):</strong>{}</div>",
            html_escape(entry.agent.as_deref().unwrap_or("Agent")),
            ts,
            render_agent_text(&entry.content)
        ),
        EntryRole::Warning => format!(
            "<div class=\"entry warning\">⚠️ {}</div>",
            html_escape(&entry.content)
        ),
        EntryRole::Error => format!(
            "<div class=\"entry error\"><strong>Error ({}):</strong> ❌ {}</div>",
            ts,
            html_escape(&entry.content)
        ),
    }
}

fn example_buttons(agent: &str, examples: &[&str]) -> String {
    examples
        .iter()
        .map(|e| {
            format!(
                "<form method=\"post\" action=\"/chat\" class=\"inline\">\
                 <input type=\"hidden\" name=\"agent\" value=\"{agent}\">\
                 <input type=\"hidden\" name=\"message\" value=\"{msg}\">\
                 <button>📝 {msg}</button></form>",
                agent = agent,
                msg = html_escape(e)
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:16rem;padding:1rem;background:#f0f2f6;min-height:100vh}\
main{flex:1;padding:1rem 2rem}section{border-bottom:1px solid #ddd;padding:.5rem 0}\
.online{color:#090}.offline{color:#c00}.entry{margin:.5rem 0}.error{color:#c00}\
.warning{color:#a60}pre{background:#f6f6f6;padding:.5rem}form.inline{display:inline}";

pub fn render_page(doctor_online: bool, booking_online: bool, history: &[HistoryEntry]) -> String {
    let entries: String = history
        .iter()
        .rev()
        .take(VISIBLE_HISTORY)
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n");

    let offline_help = if doctor_online && booking_online {
        String::new()
    } else {
        "<section><h3>⚠️ Agents offline</h3><p>Start the agents with \
         <code>clinic-agents both</code> (or <code>clinic-agents doctor</code> / \
         <code>clinic-agents booking</code>).</p></section>"
            .to_string()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>🏥 Medical Appointment System</title><style>{style}</style></head>
<body>
<aside>
<h2>🔧 Agent Status</h2>
<ul>{doctor_badge}{booking_badge}</ul>
<p><a href="/debug">🔍 Debug Endpoints</a></p>
</aside>
<main>
<h1>🏥 Medical Appointment System</h1>
{offline_help}
<section>
<h2>🔍 Doctor Directory</h2>
<form method="post" action="/doctors">
<label>Select Specialty: <select name="specialty">{doctor_specialties}</select></label>
<button>🔍 Search Doctors</button>
</form>
<form method="post" action="/availability">
<label>Doctor ID: <input name="doctor_id" placeholder="e.g., dr001"></label>
<button>📅 Check Availability</button>
</form>
</section>
<section>
<h2>📅 Book New Appointment</h2>
<form method="post" action="/book">
<label>Patient Name: <input name="patient_name" placeholder="Enter patient name"></label>
<label>Phone Number (Optional): <input name="patient_phone" placeholder="+1234567890"></label>
<label>Preferred Specialty: <select name="specialty">{booking_specialties}</select></label>
<label>Preferred Time: <select name="time_preference">{time_preferences}</select></label>
<button>📝 Book Appointment</button>
</form>
</section>
<section>
<h2>📋 Appointment Management</h2>
<form method="post" action="/appointments">
<label>Patient Name (optional): <input name="patient_name" placeholder="Filter by patient name"></label>
<button>📋 List Appointments</button>
</form>
<form method="post" action="/cancel">
<label>Appointment ID: <input name="appointment_id" placeholder="e.g., APT0001"></label>
<button>❌ Cancel Appointment</button>
</form>
</section>
<section>
<h2>💬 Chat with Agents</h2>
<p><strong>Example queries:</strong></p>
<p>{doctor_examples}</p>
<p>{booking_examples}</p>
<form method="post" action="/chat">
<label><input type="radio" name="agent" value="doctor" checked> Doctor Directory Agent</label>
<label><input type="radio" name="agent" value="booking"> Booking Agent</label>
<input name="message" placeholder="Type your question or command..." size="60">
<button>📤 Send Message</button>
</form>
<form method="post" action="/clear"><button>🗑️ Clear Chat</button></form>
</section>
<section>
<h2>📜 Conversation History</h2>
{entries}
</section>
</main>
</body>
</html>
"#,
        style = STYLE,
        doctor_badge = status_badge("Doctor Directory Agent", doctor_online),
        booking_badge = status_badge("Booking Agent", booking_online),
        offline_help = offline_help,
        doctor_specialties = options(DOCTOR_SPECIALTIES),
        booking_specialties = options(BOOKING_SPECIALTIES),
        time_preferences = options(TIME_PREFERENCES),
        doctor_examples = example_buttons("doctor", DOCTOR_EXAMPLES),
        booking_examples = example_buttons("booking", BOOKING_EXAMPLES),
        entries = entries,
    )
}
