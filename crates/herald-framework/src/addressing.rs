//! Recognising messages addressed to the bot.
//!
//! A message is addressed when it starts with a mention of the bot
//! (`<@id>` or `<@!id>`, optionally followed by one space) or with the
//! configured command prefix. [`Addressing`] is rebuilt for every message from
//! the sink's current identity, so an identity change takes effect
//! immediately.

/// Addressing rules for one message.
#[derive(Debug, Clone, Copy)]
pub struct Addressing<'a> {
    self_id: &'a str,
    prefix: &'a str,
    ignore_mention: bool,
}

impl<'a> Addressing<'a> {
    /// Creates addressing rules from the bot identity and the prefix.
    pub fn new(self_id: &'a str, prefix: &'a str, ignore_mention: bool) -> Self {
        Self {
            self_id,
            prefix,
            ignore_mention,
        }
    }

    /// Returns the byte length of a leading mention of the bot, if any.
    ///
    /// Matches `<@` + optional `!` + self id + `>` + optional single space.
    pub fn mention_len(&self, text: &str) -> Option<usize> {
        if self.self_id.is_empty() {
            return None;
        }
        let rest = text.strip_prefix("<@")?;
        let rest = rest.strip_prefix('!').unwrap_or(rest);
        let rest = rest.strip_prefix(self.self_id)?.strip_prefix('>')?;
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        Some(text.len() - rest.len())
    }

    /// Returns `true` if the text addresses the bot.
    pub fn is_addressed(&self, text: &str) -> bool {
        let mentioned = !self.ignore_mention && self.mention_len(text).is_some();
        mentioned || text.starts_with(self.prefix)
    }

    /// Removes one leading mention and then one leading prefix.
    ///
    /// Both removals are anchored at the start; a prefix occurring later in
    /// the text is left alone.
    pub fn strip<'t>(&self, text: &'t str) -> &'t str {
        let text = match self.mention_len(text) {
            Some(len) => &text[len..],
            None => text,
        };
        text.strip_prefix(self.prefix).unwrap_or(text)
    }
}
