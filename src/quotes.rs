//! Quote of the day for the daily summary

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;

pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

pub const QUOTES: &[Quote] = &[
    Quote { text: "You don't have to be extreme, just consistent.", author: "Unknown" },
    Quote {
        text: "Discipline is choosing between what you want now and what you want most.",
        author: "Abraham Lincoln",
    },
    Quote { text: "The only bad workout is the one that didn't happen.", author: "Unknown" },
    Quote { text: "Progress, not perfection.", author: "Unknown" },
    Quote { text: "Sweat now, shine later.", author: "Unknown" },
    Quote { text: "You are stronger than you think.", author: "Unknown" },
    Quote {
        text: "We are what we repeatedly do. Excellence, then, is not an act, but a habit.",
        author: "Will Durant",
    },
    Quote { text: "The body achieves what the mind believes.", author: "Napoleon Hill" },
    Quote { text: "Strength does not come from winning. Your struggles develop your strengths.", author: "Arnold Schwarzenegger" },
    Quote { text: "Small steps every day.", author: "Unknown" },
];

/// Rotates through the list by day of year
pub fn quote_of_day(date: NaiveDate) -> &'static Quote {
    &QUOTES[date.ordinal0() as usize % QUOTES.len()]
}

pub fn random_quote<R: Rng>(rng: &mut R) -> Option<&'static Quote> {
    QUOTES.choose(rng)
}

pub fn format_quote(quote: &Quote) -> String {
    format!("\"{}\" - {}", quote.text, quote.author)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_quote_of_day_is_stable() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 8).unwrap();
        assert_eq!(quote_of_day(date).text, quote_of_day(date).text);
    }

    #[test]
    fn test_quote_of_day_rotates() {
        let first = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let second = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(quote_of_day(first).text, QUOTES[0].text);
        assert_eq!(quote_of_day(second).text, QUOTES[1].text);
    }

    #[test]
    fn test_random_quote() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(random_quote(&mut rng).is_some());
    }

    #[test]
    fn test_all_quotes_have_text() {
        for (i, quote) in QUOTES.iter().enumerate() {
            assert!(!quote.text.is_empty(), "Quote {} has empty text", i);
            assert!(!quote.author.is_empty(), "Quote {} has no author", i);
        }
    }

    #[test]
    fn test_format_quote() {
        let formatted = format_quote(&QUOTES[3]);
        assert_eq!(formatted, "\"Progress, not perfection.\" - Unknown");
    }
}
