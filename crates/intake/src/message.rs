//! Composition of the waitlist notification sent to the team inbox.

use crate::{ClientId, NotificationMessage, SignupSubmission, Timestamp};

/// Subject prefix; the submitted address is appended.
pub const SUBJECT_PREFIX: &str = "New BudMeet waitlist: ";

/// Rendered in place of any absent value.
const PLACEHOLDER: &str = "-";

const PRE_STYLE: &str = "font:14px/1.45 ui-monospace,SFMono-Regular,Menlo,Monaco,Consolas,'Liberation Mono','Courier New',monospace";

/// Request context that is reported alongside the submission itself.
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    pub client_id: &'a ClientId,
    pub user_agent: Option<&'a str>,
    pub received_at: Timestamp,
}

/// Builds the subject, plain-text body and HTML body for one signup.
pub fn compose(submission: &SignupSubmission, context: &MessageContext<'_>) -> NotificationMessage {
    let lines = report_lines(submission, context);
    let text = lines.join("\n");
    let html = format!(
        "<pre style=\"{PRE_STYLE}\">{}</pre>",
        escape_html(&text)
    );

    NotificationMessage {
        subject: format!("{SUBJECT_PREFIX}{}", submission.email),
        text,
        html,
    }
}

fn report_lines(submission: &SignupSubmission, context: &MessageContext<'_>) -> Vec<String> {
    let or_dash = |value: &Option<String>| value.as_deref().unwrap_or(PLACEHOLDER).to_string();
    let user_agent = context
        .user_agent
        .filter(|ua| !ua.is_empty())
        .unwrap_or(PLACEHOLDER);

    vec![
        format!("Email: {}", submission.email),
        format!("UTM Source: {}", or_dash(&submission.utm_source)),
        format!("UTM Medium: {}", or_dash(&submission.utm_medium)),
        format!("UTM Campaign: {}", or_dash(&submission.utm_campaign)),
        format!("UTM Term: {}", or_dash(&submission.utm_term)),
        format!("UTM Content: {}", or_dash(&submission.utm_content)),
        format!("Referrer: {}", or_dash(&submission.referrer)),
        format!("User-Agent: {user_agent}"),
        format!("IP: {}", context.client_id),
        format!("Time: {}", context.received_at.to_iso8601()),
    ]
}

/// Escapes the characters that are significant inside HTML text and attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn submission() -> SignupSubmission {
        SignupSubmission {
            email: "user@example.com".into(),
            utm_source: Some("instagram".into()),
            utm_medium: None,
            utm_campaign: Some("launch".into()),
            utm_term: None,
            utm_content: None,
            referrer: None,
        }
    }

    fn context(client_id: &ClientId) -> MessageContext<'_> {
        MessageContext {
            client_id,
            user_agent: Some("Mozilla/5.0"),
            received_at: Timestamp::from_utc(Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_subject_embeds_email() {
        let ip = ClientId::new("203.0.113.4").unwrap();
        let message = compose(&submission(), &context(&ip));
        assert_eq!(message.subject, "New BudMeet waitlist: user@example.com");
    }

    #[test]
    fn test_text_lists_every_field_with_placeholders() {
        let ip = ClientId::new("203.0.113.4").unwrap();
        let message = compose(&submission(), &context(&ip));

        let expected = "Email: user@example.com\n\
                        UTM Source: instagram\n\
                        UTM Medium: -\n\
                        UTM Campaign: launch\n\
                        UTM Term: -\n\
                        UTM Content: -\n\
                        Referrer: -\n\
                        User-Agent: Mozilla/5.0\n\
                        IP: 203.0.113.4\n\
                        Time: 2025-10-18T12:00:00.000Z";
        assert_eq!(message.text, expected);
    }

    #[test]
    fn test_missing_user_agent_uses_placeholder() {
        let ip = ClientId::unknown();
        let mut ctx = context(&ip);
        ctx.user_agent = None;
        let message = compose(&submission(), &ctx);
        assert!(message.text.contains("User-Agent: -\n"));
        assert!(message.text.contains("IP: 0.0.0.0\n"));
    }

    #[test]
    fn test_html_wraps_escaped_text_in_pre() {
        let ip = ClientId::new("203.0.113.4").unwrap();
        let mut sub = submission();
        sub.referrer = Some("<script>alert('x')</script>".into());
        let message = compose(&sub, &context(&ip));

        assert!(message.html.starts_with("<pre style=\"font:14px/1.45 ui-monospace"));
        assert!(message.html.ends_with("</pre>"));
        assert!(message.html.contains("Referrer: &lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!message.html.contains("<script>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b < c > \"d\""), "a &amp; b &lt; c &gt; &quot;d&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
