//! Property-based tests for reply interpretation.

use proptest::prelude::*;
use seedling_core::{Phase, Session};
use seedling_reasoning::{interpret, Directive};

/// Text that cannot contain any of the reply markers.
fn marker_free() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?'🌱💛\n-]{0,80}"
}

fn displayed(directives: &[Directive]) -> Vec<&str> {
    directives
        .iter()
        .filter_map(|d| match d {
            Directive::EnterDream(t) | Directive::ExitDream(t) | Directive::PlainText(t) => Some(t.as_str()),
            _ => None,
        })
        .collect()
}

proptest! {
    /// Arbitrary input never panics and always yields something to apply.
    #[test]
    fn interpret_never_panics(raw in ".{0,200}") {
        let out = interpret(&raw);
        let mut session = Session::new();
        session.phase = Phase::Chat;
        out.apply(&mut session);
    }

    /// Text without markers comes back verbatim as one line.
    #[test]
    fn marker_free_text_is_verbatim(text in marker_free()) {
        prop_assume!(!text.trim().is_empty());
        let out = interpret(&text);
        prop_assert_eq!(out.directives, vec![Directive::PlainText(text)]);
    }

    /// No marker survives into what the user sees.
    #[test]
    fn markers_never_displayed(
        before in marker_free(),
        after in marker_free(),
        label in "[A-Za-z]{1,12}",
        marker in prop::sample::select(vec!["[DREAM_START]", "[DREAM_END]", ""]),
        manifest in prop::bool::ANY,
    ) {
        let block = if manifest {
            r##"[MANIFEST]{"name":"Glow","description":"d","visual":{"type":"star","color":"#fff"}}[/MANIFEST]"##
        } else {
            ""
        };
        let raw = format!("[EMOTION:{label}]{before}{marker}{block}{after}");
        let out = interpret(&raw);
        for line in displayed(&out.directives) {
            prop_assert!(!line.contains("[EMOTION:"), "{}", line);
            prop_assert!(!line.contains("[DREAM_START]"), "{}", line);
            prop_assert!(!line.contains("[DREAM_END]"), "{}", line);
            prop_assert!(!line.contains("[MANIFEST]"), "{}", line);
            prop_assert!(!line.contains("[/MANIFEST]"), "{}", line);
        }
    }

    /// At most one of dream, wake or manifestation applies to a reply.
    #[test]
    fn branches_are_exclusive(
        text in marker_free(),
        start in prop::bool::ANY,
        end in prop::bool::ANY,
    ) {
        let raw = format!(
            "{}{}{}",
            if start { "[DREAM_START]" } else { "" },
            text,
            if end { "[DREAM_END]" } else { "" },
        );
        let out = interpret(&raw);
        let dreams = out.directives.iter().filter(|d| matches!(d, Directive::EnterDream(_))).count();
        let wakes = out.directives.iter().filter(|d| matches!(d, Directive::ExitDream(_))).count();
        prop_assert!(dreams + wakes <= 1);
        prop_assert_eq!(dreams == 1, start);
        prop_assert_eq!(wakes == 1, end && !start);
    }
}
