//! Text normalization for feed summaries and scraped article bodies.

use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("valid entity pattern")
});

static INVISIBLE_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("[\u{00a0}\u{200b}\u{200c}\u{200d}\u{feff}]").expect("valid space pattern")
});

// Matched per line, so a boilerplate lead-in only removes the rest of its own line.
static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?im)also\s+read\s*:.*$",
        r"(?im)recommended\s+stories.*$",
        r"(?im)subscribe\s+to\s+our\s+newsletter.*$",
        r"(?im)click\s+here\s+to\s+(?:read|know).*$",
        r"(?im)follow\s+us\s+on\s+(?:twitter|facebook|instagram).*$",
        r"(?im)download\s+the\s+(?:app|moneycontrol).*$",
        r"(?im)disclaimer\s*:.*$",
        r"(?im)for\s+more\s+(?:details|information)\s*,?\s*(?:visit|click).*$",
        r"(?i)\(with\s+inputs\s+from\s+(?:PTI|IANS|Reuters|ANI)\)",
        r"(?im)first\s+published\s+on.*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid boilerplate pattern"))
    .collect()
});

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "–",
        "mdash" => "—",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        "hellip" => "…",
        "rupee" | "inr" => "₹",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        _ => return None,
    };
    Some(decoded.to_string())
}

/// Strip tags, decode entities and collapse whitespace.
pub fn clean_html(html: &str) -> String {
    let without_tags = TAG.replace_all(html, " ");
    let decoded = ENTITY.replace_all(&without_tags, |caps: &regex::Captures| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    collapse_whitespace(&decoded)
}

/// Normalize an article body for NLP: invisible spaces, boilerplate lines and
/// whitespace runs are removed.
pub fn clean_article_text(text: &str) -> String {
    let mut cleaned = INVISIBLE_SPACE.replace_all(text, " ").into_owned();
    for pattern in BOILERPLATE.iter() {
        cleaned = pattern.replace_all(&cleaned, " ").into_owned();
    }
    collapse_whitespace(&cleaned)
}

/// Cut to at most `max_chars` characters, backing up to a word boundary when
/// one is close, and append `...` when anything was removed.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let boundary = cut
        .rfind(' ')
        .filter(|&idx| cut[..idx].chars().count() as f64 > max_chars as f64 * 0.8);
    let kept = match boundary {
        Some(idx) => &cut[..idx],
        None => cut.as_str(),
    };
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_html() {
        let html = "<p>Sensex &amp; Nifty <b>rally</b></p>\n<br/>on &quot;FII&quot; buying&#33;";
        assert_eq!(clean_html(html), "Sensex & Nifty rally on \"FII\" buying!");
    }

    #[test]
    fn test_clean_html_keeps_unknown_entities() {
        assert_eq!(clean_html("R&amp;D &foo; spend"), "R&D &foo; spend");
        assert_eq!(clean_html("&#x20B9;500 crore"), "₹500 crore");
    }

    #[test]
    fn test_clean_article_text_removes_boilerplate_lines() {
        let text = "Infosys shares rose 3%.\nAlso Read: Top gainers today\nThe IT major beat estimates.\u{00a0}(With inputs from PTI)";
        assert_eq!(
            clean_article_text(text),
            "Infosys shares rose 3%. The IT major beat estimates."
        );
    }

    #[test]
    fn test_boilerplate_does_not_swallow_following_lines() {
        let text = "Disclaimer: views are personal\nRBI kept rates unchanged.";
        assert_eq!(clean_article_text(text), "RBI kept rates unchanged.");
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_prefers_word_boundary() {
        let text = "The quick brown fox jumps over the lazy dog";
        assert_eq!(truncate(text, 20), "The quick brown fox...");
    }

    #[test]
    fn test_truncate_hard_cut_without_nearby_space() {
        assert_eq!(truncate("abcdefghijklmnop", 10), "abcdefghij...");
    }
}
