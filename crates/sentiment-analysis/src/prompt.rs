/// Characters of article text forwarded to an LLM.
pub const LLM_MAX_CHARS: usize = 3000;

const SENTIMENT_PROMPT_HEAD: &str = "You are an institutional-grade financial analyst specializing in the Indian stock market (NSE/BSE).

Analyze the following news article and provide a structured JSON response:

Article: ";

const SENTIMENT_PROMPT_TAIL: &str = r#"

Respond ONLY with valid JSON in this exact format:
{
    "sentiment_score": <float between -1.0 and 1.0>,
    "confidence": <float between 0.0 and 1.0>,
    "explanation": "<2-3 sentence explanation of market impact>",
    "impact_timeline": "<one of: immediate, short_term, long_term>",
    "affected_sectors": [<list of affected sectors>],
    "mentioned_tickers": [<list of NSE ticker symbols>],
    "key_themes": [<list of key themes>]
}
"#;

/// Sentiment prompt for one article. The article is cut to [`LLM_MAX_CHARS`].
pub fn sentiment_prompt(article_text: &str, context: &str) -> String {
    let article: String = article_text.chars().take(LLM_MAX_CHARS).collect();
    format!(
        "{}{}\n\nContext (if any): {}{}",
        SENTIMENT_PROMPT_HEAD, article, context, SENTIMENT_PROMPT_TAIL
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_truncates_article() {
        let article = "x".repeat(LLM_MAX_CHARS + 500);
        let prompt = sentiment_prompt(&article, "source: Mint");
        assert!(prompt.contains(&"x".repeat(LLM_MAX_CHARS)));
        assert!(!prompt.contains(&"x".repeat(LLM_MAX_CHARS + 1)));
        assert!(prompt.contains("Context (if any): source: Mint"));
        assert!(prompt.contains("\"impact_timeline\""));
    }

    #[test]
    fn test_prompt_truncation_respects_char_boundaries() {
        let article = "₹".repeat(LLM_MAX_CHARS + 10);
        let prompt = sentiment_prompt(&article, "");
        assert_eq!(prompt.matches('₹').count(), LLM_MAX_CHARS);
    }
}
