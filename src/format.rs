use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DESCRIPTION_CARD_LIMIT: usize = 20;
pub const NAME_WRAP_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CardText {
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortLabel {
    pub text: String,
    pub wrap: bool,
}

pub fn truncate_for_card(text: &str, limit: usize) -> CardText {
    if text.is_empty() {
        return CardText { lines: Vec::new() };
    }

    match text.char_indices().nth(limit) {
        Some((split, _)) => CardText {
            lines: vec![text[..split].to_string(), text[split..].to_string()],
        },
        None => CardText {
            lines: vec![text.to_string()],
        },
    }
}

pub fn format_short_label(text: &str, limit: usize) -> ShortLabel {
    ShortLabel {
        text: text.to_string(),
        wrap: text.chars().count() > limit,
    }
}

pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    later.signed_duration_since(earlier).num_days()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{
        days_between, format_short_label, truncate_for_card, DESCRIPTION_CARD_LIMIT,
        NAME_WRAP_LIMIT,
    };

    #[test]
    fn empty_text_yields_no_lines() {
        let card = truncate_for_card("", DESCRIPTION_CARD_LIMIT);
        assert!(card.lines.is_empty());
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let card = truncate_for_card("oil change", DESCRIPTION_CARD_LIMIT);
        assert_eq!(card.lines, vec!["oil change".to_string()]);
    }

    #[test]
    fn text_at_limit_is_not_split() {
        let text = "a".repeat(DESCRIPTION_CARD_LIMIT);
        let card = truncate_for_card(&text, DESCRIPTION_CARD_LIMIT);
        assert_eq!(card.lines.len(), 1);
    }

    #[test]
    fn long_text_splits_and_reconstructs() {
        let text = "a".repeat(25);
        let card = truncate_for_card(&text, DESCRIPTION_CARD_LIMIT);

        assert_eq!(card.lines.len(), 2);
        assert_eq!(card.lines[0].chars().count(), 20);
        assert_eq!(card.lines[1].chars().count(), 5);
        assert_eq!(card.lines.concat(), text);
    }

    #[test]
    fn split_respects_multibyte_characters() {
        let text = "é".repeat(25);
        let card = truncate_for_card(&text, DESCRIPTION_CARD_LIMIT);

        assert_eq!(card.lines[0].chars().count(), 20);
        assert_eq!(card.lines.concat(), text);
    }

    #[test]
    fn short_name_is_not_wrapped() {
        let label = format_short_label("ab", NAME_WRAP_LIMIT);
        assert_eq!(label.text, "ab");
        assert!(!label.wrap);
    }

    #[test]
    fn long_name_is_marked_for_wrapping_without_truncation() {
        let label = format_short_label("abcdef", NAME_WRAP_LIMIT);
        assert_eq!(label.text, "abcdef");
        assert!(label.wrap);
    }

    #[test]
    fn days_between_counts_whole_days() {
        let now = Utc::now();
        assert_eq!(days_between(now, now), 0);
        assert_eq!(days_between(now - Duration::days(3), now), 3);
        assert_eq!(days_between(now - Duration::hours(30), now), 1);
    }
}
