//! Turn a raw model reply into session directives.
//!
//! The model speaks a small tag protocol on top of plain text:
//!
//! - `[EMOTION:<label>]` anywhere sets the current emotion (first tag wins).
//! - `[DREAM_START]` sends the companion into a dream; the rest is dream text.
//! - `[DREAM_END]` wakes it again.
//! - `[MANIFEST]{json}[/MANIFEST]` creates a manifestation.
//!
//! Precedence is dream start, then dream end, then manifestation, then plain
//! text. Only one of those applies to a reply; the emotion tag combines with
//! any of them.

use regex::Regex;
use seedling_core::{fresh_id, now_millis, ChatMessage, Emotion, Manifestation, Session, Visual};
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

pub const DREAM_START: &str = "[DREAM_START]";
pub const DREAM_END: &str = "[DREAM_END]";

/// Shown in place of a reply that was empty once its tags were removed.
const EMPTY_REPLY: &str = "...";

static RE_EMOTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[EMOTION:([A-Za-z]+)\]").unwrap());
static RE_MANIFEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[MANIFEST\](.*?)\[/MANIFEST\]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("manifestation payload is not valid: {0}")]
    Malformed(String),
    #[error("manifestation has an empty name")]
    EmptyName,
}

#[derive(Debug, Deserialize)]
struct ManifestPayload {
    name: String,
    description: String,
    visual: Visual,
}

fn decode_manifest(payload: &str) -> Result<Manifestation, ManifestError> {
    let payload: ManifestPayload =
        serde_json::from_str(payload.trim()).map_err(|e| ManifestError::Malformed(e.to_string()))?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ManifestError::EmptyName);
    }
    Ok(Manifestation {
        id: fresh_id(),
        name: name.to_string(),
        description: payload.description,
        visual: payload.visual,
        timestamp: now_millis(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    SetEmotion(Emotion),
    /// Enter the dream; the text is both the dream and the companion's line.
    EnterDream(String),
    /// Leave the dream, saying the text on the way out.
    ExitDream(String),
    CreateManifestation(Manifestation),
    PlainText(String),
}

impl Directive {
    fn apply(&self, session: &mut Session) {
        match self {
            Directive::SetEmotion(emotion) => session.current_emotion = *emotion,
            Directive::EnterDream(text) => {
                if let Err(e) = session.enter_dream(text) {
                    tracing::warn!("Dream ignored: {}", e);
                }
                session.push_message(ChatMessage::ai(displayable(text)));
            }
            Directive::ExitDream(text) => {
                if let Err(e) = session.leave_dream() {
                    tracing::warn!("Dream exit ignored: {}", e);
                }
                session.push_message(ChatMessage::ai(displayable(text)));
            }
            Directive::CreateManifestation(manifestation) => {
                let announcement = format!(
                    "✨ {} has created something new: {}",
                    session.ai_name, manifestation.name
                );
                session.manifestations.push(manifestation.clone());
                session.push_message(ChatMessage::system(announcement));
            }
            Directive::PlainText(text) => session.push_message(ChatMessage::ai(text.clone())),
        }
    }
}

fn displayable(text: &str) -> &str {
    if text.is_empty() {
        EMPTY_REPLY
    } else {
        text
    }
}

/// The directives one reply produces, in application order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Interpretation {
    pub directives: Vec<Directive>,
    /// Set when a manifestation block was present but could not be decoded.
    pub rejected_manifestation: Option<ManifestError>,
}

impl Interpretation {
    pub fn emotion(&self) -> Option<Emotion> {
        self.directives.iter().find_map(|d| match d {
            Directive::SetEmotion(e) => Some(*e),
            _ => None,
        })
    }

    /// Apply every directive to the session. Runs inside a single store
    /// commit so observers never see half a reply.
    pub fn apply(&self, session: &mut Session) {
        for directive in &self.directives {
            directive.apply(session);
        }
    }
}

/// Interpret one raw reply. Never fails; unknown or broken markup degrades to
/// plain text.
pub fn interpret(raw: &str) -> Interpretation {
    let mut out = Interpretation::default();

    if let Some(caps) = RE_EMOTION.captures(raw) {
        match Emotion::from_label(&caps[1]) {
            Some(emotion) => out.directives.push(Directive::SetEmotion(emotion)),
            None => tracing::debug!(label = &caps[1], "Unrecognized emotion label discarded"),
        }
    }

    let text = if RE_EMOTION.is_match(raw) {
        RE_EMOTION.replace_all(raw, "").trim().to_string()
    } else {
        raw.to_string()
    };

    let entering = text.contains(DREAM_START);
    if entering || text.contains(DREAM_END) {
        let mut body = text.replace(DREAM_START, "").replace(DREAM_END, "");
        if RE_MANIFEST.is_match(&body) {
            tracing::warn!("Manifestation dropped: the reply crosses the dream boundary");
            body = RE_MANIFEST.replace_all(&body, "").to_string();
        }
        let body = body.trim().to_string();
        out.directives.push(if entering {
            Directive::EnterDream(body)
        } else {
            Directive::ExitDream(body)
        });
        return out;
    }

    if let Some(caps) = RE_MANIFEST.captures(&text) {
        match decode_manifest(&caps[1]) {
            Ok(manifestation) => out.directives.push(Directive::CreateManifestation(manifestation)),
            Err(e) => out.rejected_manifestation = Some(e),
        }
        let residual = RE_MANIFEST.replace_all(&text, "");
        let residual = residual.trim();
        if !residual.is_empty() {
            out.directives.push(Directive::PlainText(residual.to_string()));
        }
        return out;
    }

    let plain = if text.trim().is_empty() { EMPTY_REPLY.to_string() } else { text };
    out.directives.push(Directive::PlainText(plain));
    out
}
