//! Text helpers for Slack's message markup.
//!
//! Slack escapes `&`, `<` and `>` and wraps mentions, links and special
//! commands in angle brackets, optionally with a `|label`.

/// Escapes the three characters Slack reserves.
///
/// Command markup is not produced; use [`escape_command`] for that.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Converts Slack markup to plain text.
///
/// Labelled references keep their label (with a leading `#` or `@` if the
/// reference had one), `<!here>`-style broadcasts become `@here`, other
/// commands lose their `!`, brackets are dropped and entities unescaped.
pub fn decode_text(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        plain.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) => {
                plain.push_str(&decode_reference(&after[..close]));
                rest = &after[close + 1..];
            }
            None => {
                plain.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    plain.push_str(rest);

    plain
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

fn decode_reference(inner: &str) -> String {
    let inner = match inner.split_once('|') {
        Some((target, label)) => {
            let sigils: String = target.chars().take_while(|c| matches!(c, '#' | '@')).collect();
            format!("{sigils}{label}")
        }
        None => inner.to_string(),
    };

    match inner.strip_prefix('!') {
        Some(cmd @ ("everyone" | "channel" | "here")) => format!("@{cmd}"),
        Some(cmd) => cmd.to_string(),
        None => inner,
    }
}

/// Removes formatting symbols (`_ * ~ \``) wherever they appear.
pub fn remove_symbols(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '_' | '*' | '~' | '`'))
        .collect()
}

/// Wraps a command or reference in brackets, e.g. `<!here>` or `<@U1|bob>`.
pub fn escape_command(cmd: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("<{cmd}|{label}>"),
        None => format!("<{cmd}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a & <b> c"), "a &amp; &lt;b&gt; c");
    }

    #[test]
    fn test_decode_references() {
        assert_eq!(
            decode_text("<@U123|bob> see <#C1|general> and <https://x.io|the docs>"),
            "@bob see #general and the docs"
        );
        assert_eq!(decode_text("<@U123> hi"), "@U123 hi");
        assert_eq!(decode_text("<https://x.io>"), "https://x.io");
    }

    #[test]
    fn test_decode_commands() {
        assert_eq!(decode_text("<!here> <!channel> <!everyone>"), "@here @channel @everyone");
        assert_eq!(decode_text("<!subteam^S1|@devs> ping"), "@devs ping");
        assert_eq!(decode_text("<!date^1392734382^{date}>"), "date^1392734382^{date}");
    }

    #[test]
    fn test_decode_unescapes_after_brackets() {
        assert_eq!(decode_text("1 &lt; 2 &amp;&amp; <@U1>"), "1 < 2 && @U1");
        assert_eq!(decode_text("&amp;lt;"), "&lt;");
        assert_eq!(decode_text("open < only"), "open < only");
    }

    #[test]
    fn test_remove_symbols() {
        assert_eq!(remove_symbols("*bold* _it_ ~s~ `c`"), "bold it s c");
    }

    #[test]
    fn test_escape_command() {
        assert_eq!(escape_command("!here", None), "<!here>");
        assert_eq!(escape_command("@U1", Some("bob")), "<@U1|bob>");
        assert_eq!(decode_text(&escape_command("@U1", Some("bob"))), "@bob");
    }
}
