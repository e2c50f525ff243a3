use crate::rng::RandomSource;
use crate::tables::parse::{content_lines, unquote};
use crate::tables::{Parsed, TableError};
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_BUCKET: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Say,
    Emote,
    /// Another social, aimed back at the actor when the reply is targeted.
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub payload: String,
}

impl Reply {
    pub fn new(kind: ReplyKind, payload: &str) -> Self {
        Self {
            kind,
            payload: payload.to_string(),
        }
    }

    /// Payload with every `%name%` replaced by `actor`.
    pub fn render(&self, actor: &str) -> String {
        self.payload.replace("%name%", actor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyScope {
    /// The social was aimed at the responder.
    Targeted,
    Room,
}

#[derive(Debug, Clone, Default)]
struct Bucket {
    by_social: HashMap<String, Vec<Reply>>,
    fallback: Vec<Reply>,
}

impl Bucket {
    fn add(&mut self, social: &str, reply: Reply) {
        if social == DEFAULT_BUCKET {
            self.fallback.push(reply);
        } else {
            self.by_social
                .entry(social.to_string())
                .or_default()
                .push(reply);
        }
    }

    fn choices(&self, social: &str) -> &[Reply] {
        match self.by_social.get(social) {
            Some(replies) if !replies.is_empty() => replies,
            _ => &self.fallback,
        }
    }

    fn len(&self) -> usize {
        self.fallback.len() + self.by_social.values().map(Vec::len).sum::<usize>()
    }
}

/// Replies to socials, split by scope and keyed by social name.
#[derive(Debug, Clone)]
pub struct ReplyBank {
    targeted: Bucket,
    room: Bucket,
}

impl Default for ReplyBank {
    fn default() -> Self {
        let mut bank = Self {
            targeted: Bucket::default(),
            room: Bucket::default(),
        };
        bank.fill_defaults();
        bank
    }
}

impl ReplyBank {
    pub fn parse(content: &str, path: &Path) -> Parsed<Self> {
        let mut bank = Self {
            targeted: Bucket::default(),
            room: Bucket::default(),
        };
        let mut skipped = Vec::new();
        for (line_no, line) in content_lines(content, &['#']) {
            let fields: Vec<&str> = line.splitn(4, '|').map(str::trim).collect();
            if fields.len() < 4 || fields[0].is_empty() {
                skipped.push(TableError::line(
                    path,
                    line_no,
                    "expected <social>|<scope>|<kind>|<payload>",
                ));
                continue;
            }
            let kind = match fields[2] {
                "say" => ReplyKind::Say,
                "emote" => ReplyKind::Emote,
                _ => ReplyKind::Action,
            };
            let reply = Reply::new(kind, unquote(fields[3]));
            let social = fields[0].to_ascii_lowercase();
            match fields[1] {
                "targeted" => bank.targeted.add(&social, reply),
                _ => bank.room.add(&social, reply),
            }
        }
        bank.fill_defaults();
        Parsed {
            table: bank,
            skipped,
        }
    }

    fn fill_defaults(&mut self) {
        if self.targeted.fallback.is_empty() {
            self.targeted.fallback = vec![
                Reply::new(ReplyKind::Say, "Easy there, chummer."),
                Reply::new(ReplyKind::Action, "grin"),
            ];
        }
        if self.room.fallback.is_empty() {
            self.room.fallback = vec![
                Reply::new(ReplyKind::Action, "smile"),
                Reply::new(ReplyKind::Say, "Heh."),
            ];
        }
    }

    /// Replies registered for `social`, or the scope's default bucket.
    pub fn choices(&self, scope: ReplyScope, social: &str) -> &[Reply] {
        let social = social.to_ascii_lowercase();
        match scope {
            ReplyScope::Targeted => self.targeted.choices(&social),
            ReplyScope::Room => self.room.choices(&social),
        }
    }

    pub fn pick(
        &self,
        scope: ReplyScope,
        social: &str,
        rng: &mut dyn RandomSource,
    ) -> Option<&Reply> {
        let choices = self.choices(scope, social);
        rng.pick_index(choices.len())
            .and_then(|idx| choices.get(idx))
    }

    pub fn len(&self) -> usize {
        self.targeted.len() + self.room.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::EngineRng;

    #[test]
    fn defaults_cover_both_scopes() {
        let bank = ReplyBank::default();
        assert_eq!(
            bank.choices(ReplyScope::Targeted, "poke")[0],
            Reply::new(ReplyKind::Say, "Easy there, chummer.")
        );
        assert_eq!(
            bank.choices(ReplyScope::Room, "wave")[0],
            Reply::new(ReplyKind::Action, "smile")
        );
    }

    #[test]
    fn parses_scoped_replies_and_keeps_file_defaults() {
        let content = "\
wave|targeted|say|\"Hoi, %name%.\"
wave|room|emote|waves lazily.
default|targeted|action|nod
hug|targeted
";
        let parsed = ReplyBank::parse(content, Path::new("social_replies.txt"));
        assert_eq!(parsed.skipped.len(), 1);
        let bank = parsed.table;
        let wave = &bank.choices(ReplyScope::Targeted, "WAVE")[0];
        assert_eq!(wave.kind, ReplyKind::Say);
        assert_eq!(wave.render("Kira"), "Hoi, Kira.");
        assert_eq!(
            bank.choices(ReplyScope::Targeted, "hug"),
            &[Reply::new(ReplyKind::Action, "nod")]
        );
        assert_eq!(bank.choices(ReplyScope::Room, "hug").len(), 2);
        assert_eq!(bank.choices(ReplyScope::Room, "wave")[0].kind, ReplyKind::Emote);
    }

    #[test]
    fn pick_draws_from_choices() {
        let bank = ReplyBank::default();
        let mut rng = EngineRng::from_seed(6);
        let reply = bank.pick(ReplyScope::Room, "smile", &mut rng).expect("default reply");
        assert!(bank.choices(ReplyScope::Room, "smile").contains(reply));
    }
}
