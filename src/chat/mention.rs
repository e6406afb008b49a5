//! `@name` mention tokenizing and resolution.
//!
//! A mention token is `@` followed by one or more ASCII word characters
//! (`[0-9A-Za-z_]`).  Each token is resolved against the current community's
//! members, then against the recipients of the user's direct-message
//! channels.  A token that cannot be resolved, for any reason, is left as is.

use crate::chat::console::Console;
use crate::chat::context::ContextState;
use crate::observability::{
    MENTION_LOOKUP_ERRORS, MENTION_LOOKUPS, MENTION_RESOLVED, MENTION_UNRESOLVED,
};
use crate::transport::{MEMBER_LOOKUP_LIMIT, Transport};
use crate::types::{DirectMessageChannel, Member, User};

/// A piece of a tokenized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text that is passed through unchanged.
    Text(&'a str),
    /// An `@name` token, `@` included.
    Mention(&'a str),
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Splits a line into text and mention tokens.
///
/// Concatenating the tokens reproduces the line exactly.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] != b'@' {
            index += 1;
            continue;
        }
        let mut end = index + 1;
        while end < bytes.len() && is_word_byte(bytes[end]) {
            end += 1;
        }
        if end == index + 1 {
            index += 1;
            continue;
        }
        if text_start < index {
            tokens.push(Token::Text(&line[text_start..index]));
        }
        tokens.push(Token::Mention(&line[index..end]));
        text_start = end;
        index = end;
    }
    if text_start < bytes.len() {
        tokens.push(Token::Text(&line[text_start..]));
    }
    tokens
}

/// Finds the first member whose nickname, or failing that username, starts with `name`.
///
/// Members are examined in order; for each member the nickname is checked
/// before the username.
pub fn match_member<'a>(name: &str, members: &'a [Member]) -> Option<&'a User> {
    members
        .iter()
        .find(|member| {
            member.nickname().is_some_and(|nick| nick.starts_with(name))
                || member.username().starts_with(name)
        })
        .map(|member| &member.user)
}

/// Finds the first direct-message recipient matching `name`.
///
/// The first recipient whose username is a prefix of `name` wins.  Only when
/// no recipient qualifies is the first recipient whose username starts with
/// `name` taken.
pub fn match_recipient<'a>(name: &str, channels: &'a [DirectMessageChannel]) -> Option<&'a User> {
    let recipients = || channels.iter().flat_map(|channel| channel.recipients.iter());
    recipients()
        .find(|recipient| name.starts_with(recipient.username.as_str()))
        .or_else(|| recipients().find(|recipient| recipient.username.starts_with(name)))
}

/// Resolves mention tokens to addressable references.
pub struct MentionResolver<'a, T: Transport + ?Sized> {
    transport: &'a T,
    console: &'a Console,
}

impl<'a, T: Transport + ?Sized> MentionResolver<'a, T> {
    /// Creates a resolver that looks names up through `transport`.
    pub fn new(transport: &'a T, console: &'a Console) -> Self {
        Self { transport, console }
    }

    /// Rewrites every mention token in `line`.
    ///
    /// Each token is resolved independently, with its own lookups.
    pub async fn rewrite(&self, line: &str, context: &ContextState) -> String {
        let mut rewritten = String::with_capacity(line.len());
        for token in tokenize(line) {
            match token {
                Token::Text(text) => rewritten.push_str(text),
                Token::Mention(mention) => {
                    rewritten.push_str(&self.resolve(mention, context).await);
                }
            }
        }
        rewritten
    }

    /// Resolves a single `@name` token, returning it unchanged when nothing matches.
    pub async fn resolve(&self, token: &str, context: &ContextState) -> String {
        let name = match token.strip_prefix('@') {
            Some(name) if !name.is_empty() => name,
            _ => return token.to_string(),
        };

        if let Some(community_id) = context.community_id() {
            MENTION_LOOKUPS.click();
            match self
                .transport
                .list_members(community_id, MEMBER_LOOKUP_LIMIT)
                .await
            {
                Ok(members) => {
                    if let Some(user) = match_member(name, &members) {
                        MENTION_RESOLVED.click();
                        return user.mention();
                    }
                }
                Err(err) => {
                    MENTION_LOOKUP_ERRORS.click();
                    self.console
                        .print_error(&format!("Could not look up members: {err}"));
                    return token.to_string();
                }
            }
        }

        MENTION_LOOKUPS.click();
        let channels = match self.transport.list_direct_message_channels().await {
            Ok(channels) => channels,
            Err(err) => {
                MENTION_LOOKUP_ERRORS.click();
                tracing::debug!(%err, "direct-message lookup failed");
                return token.to_string();
            }
        };
        if let Some(user) = match_recipient(name, &channels) {
            MENTION_RESOLVED.click();
            return user.mention();
        }

        MENTION_UNRESOLVED.click();
        token.to_string()
    }
}
