use analysis_core::NewsHeadline;
use serde::Serialize;

/// Headlines fetched per request
pub const NEWS_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadlineSentiment {
    Positive,
    Negative,
    Neutral,
}

impl HeadlineSentiment {
    /// Reads a one-word classification out of free text; anything else is neutral.
    pub fn from_reply(reply: &str) -> Self {
        let reply = reply.to_lowercase();
        if reply.contains("positive") {
            HeadlineSentiment::Positive
        } else if reply.contains("negative") {
            HeadlineSentiment::Negative
        } else {
            HeadlineSentiment::Neutral
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            HeadlineSentiment::Positive => 0.7,
            HeadlineSentiment::Negative => -0.7,
            HeadlineSentiment::Neutral => 0.0,
        }
    }
}

pub fn classification_prompt(headline: &str) -> String {
    format!(
        "Analyze sentiment of this headline (respond with only: positive, negative, or neutral): \"{}\"",
        headline
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub date: String,
    pub headline: String,
    pub publisher: Option<String>,
    pub link: Option<String>,
    pub sentiment: HeadlineSentiment,
    pub sentiment_score: f64,
}

impl NewsItem {
    pub fn new(headline: NewsHeadline, sentiment: HeadlineSentiment) -> Self {
        Self {
            date: headline.published_at.format("%Y-%m-%d").to_string(),
            headline: headline.title,
            publisher: headline.publisher,
            link: headline.link,
            sentiment,
            sentiment_score: sentiment.score(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsReport {
    pub ticker: String,
    pub news: Vec<NewsItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reply() {
        assert_eq!(HeadlineSentiment::from_reply("Positive"), HeadlineSentiment::Positive);
        assert_eq!(HeadlineSentiment::from_reply(" negative.\n"), HeadlineSentiment::Negative);
        assert_eq!(HeadlineSentiment::from_reply("neutral"), HeadlineSentiment::Neutral);
        assert_eq!(HeadlineSentiment::from_reply("unclear"), HeadlineSentiment::Neutral);
        assert_eq!(HeadlineSentiment::from_reply(""), HeadlineSentiment::Neutral);
    }

    #[test]
    fn test_scores() {
        assert_eq!(HeadlineSentiment::Positive.score(), 0.7);
        assert_eq!(HeadlineSentiment::Negative.score(), -0.7);
        assert_eq!(HeadlineSentiment::Neutral.score(), 0.0);
    }

    #[test]
    fn test_prompt_quotes_headline() {
        let prompt = classification_prompt("Apple beats estimates");
        assert!(prompt.ends_with("\"Apple beats estimates\""));
    }
}
