//! Review Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::events::{DomainEvent, ReviewEvent};
use crate::domain::value_objects::Rating;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub rating: Rating,
    pub comment: String,
    pub sentiment: Option<Sentiment>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Positive => "positive", Self::Neutral => "neutral", Self::Negative => "negative" }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s { "positive" => Some(Self::Positive), "neutral" => Some(Self::Neutral), "negative" => Some(Self::Negative), _ => None }
    }
}

const POSITIVE: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "comfortable", "excellent", "fantastic", "gorgeous",
    "great", "good", "happy", "lovely", "love", "loved", "nice", "perfect", "quality", "recommend",
    "soft", "stunning", "superb", "wonderful", "worth",
];

const NEGATIVE: &[&str] = &[
    "awful", "bad", "broke", "broken", "cheap", "damaged", "disappointed", "disappointing", "flimsy",
    "hate", "horrible", "poor", "refund", "return", "returned", "terrible", "torn", "ugly", "useless",
    "waste", "worst", "wrong",
];

fn is_negator(word: &str) -> bool {
    word.ends_with("n't")
        || matches!(word, "not" | "no" | "never" | "hardly" | "dont" | "doesnt" | "didnt" | "isnt" | "wasnt" | "cant" | "wont")
}

/// Lexicon scorer: each known term counts +1 or -1, flipped when the word
/// right before it is a negator.
pub fn classify(comment: &str) -> Sentiment {
    let lowered = comment.to_lowercase().replace('\u{2019}', "'");
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .collect();

    let mut score = 0i32;
    for (i, word) in words.iter().enumerate() {
        let polarity = if POSITIVE.contains(word) { 1 } else if NEGATIVE.contains(word) { -1 } else { continue };
        let negated = i > 0 && is_negator(words[i - 1]);
        score += if negated { -polarity } else { polarity };
    }
    match score {
        s if s > 0 => Sentiment::Positive,
        s if s < 0 => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

impl Review {
    pub fn post(user_id: Uuid, product_id: Uuid, rating: Rating, comment: &str, now: DateTime<Utc>) -> Result<(Self, DomainEvent), ReviewError> {
        let comment = comment.trim();
        if comment.is_empty() { return Err(ReviewError::EmptyComment); }
        let review = Self {
            id: Uuid::now_v7(), user_id, product_id, rating, comment: comment.to_string(),
            sentiment: Some(classify(comment)), created_at: now,
        };
        let event = DomainEvent::Review(ReviewEvent::Posted { review_id: review.id, product_id, rating: rating.value() });
        Ok((review, event))
    }
}

/// Aggregate rating of a product, derived from the full set of its reviews.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i32,
}

impl RatingSummary {
    pub fn from_ratings<I: IntoIterator<Item = Rating>>(ratings: I) -> Self {
        let (sum, count) = ratings.into_iter().fold((0u32, 0i32), |(s, c), r| (s + r.value() as u32, c + 1));
        if count == 0 {
            return Self { average: 0.0, count: 0 };
        }
        Self { average: sum as f64 / count as f64, count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("Comment is required")]
    EmptyComment,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(v: i32) -> Rating { Rating::new(v).unwrap() }

    #[test]
    fn test_classify() {
        assert_eq!(classify("Absolutely love it, great quality!"), Sentiment::Positive);
        assert_eq!(classify("Arrived damaged, terrible packaging."), Sentiment::Negative);
        assert_eq!(classify("It is a scarf."), Sentiment::Neutral);
        assert_eq!(classify("Not good at all"), Sentiment::Negative);
        assert_eq!(classify("I don't hate it"), Sentiment::Positive);
    }

    #[test]
    fn test_typographic_apostrophe_negates() {
        assert_eq!(classify("I don\u{2019}t love it"), Sentiment::Negative);
        assert_eq!(classify("Doesn\u{2019}t feel cheap"), classify("Doesn't feel cheap"));
    }

    #[test]
    fn test_summary_is_mean() {
        let s = RatingSummary::from_ratings([r(5), r(4), r(3)]);
        assert_eq!(s.count, 3);
        assert!((s.average - 4.0).abs() < f64::EPSILON);
        let s = RatingSummary::from_ratings([r(5), r(4)]);
        assert!((s.average - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(RatingSummary::from_ratings(Vec::new()), RatingSummary { average: 0.0, count: 0 });
    }

    #[test]
    fn test_post_tags_sentiment() {
        let (review, event) = Review::post(Uuid::new_v4(), Uuid::new_v4(), r(5), "  Wonderful bag ", Utc::now()).unwrap();
        assert_eq!(review.comment, "Wonderful bag");
        assert_eq!(review.sentiment, Some(Sentiment::Positive));
        assert!(matches!(event, DomainEvent::Review(ReviewEvent::Posted { rating: 5, .. })));
        assert_eq!(Review::post(Uuid::new_v4(), Uuid::new_v4(), r(1), "   ", Utc::now()).unwrap_err(), ReviewError::EmptyComment);
    }
}
