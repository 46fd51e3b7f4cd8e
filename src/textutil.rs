use regex::Regex;

/// An inquiry message split from its trailing listing link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub message: String,
    pub link: Option<String>,
}

/// Converts a `HH:MM:SS` call duration into seconds.
pub fn time_to_sec(time: &str) -> Option<u32> {
    let mut parts = time.split(':');
    let hours: u32 = parts.next()?.trim().parse().ok()?;
    let minutes: u32 = parts.next()?.trim().parse().ok()?;
    let seconds: u32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Splits a portal inquiry into its free-text message and the
/// `Link: <url>` marker the portal appends to it.
pub fn parse_message_and_link(input: &str) -> ParsedMessage {
    let link_re = Regex::new(r"Link:\s(https?://\S+)").unwrap();
    let link = link_re
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let message = input
        .split_once("Link:")
        .map(|(before, _)| before)
        .unwrap_or(input)
        .trim()
        .to_string();

    ParsedMessage { message, link }
}
