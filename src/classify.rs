use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

static CHAPTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ch(\d+)-(\d+)-").unwrap());
static APPENDIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"appendix-(\d+)").unwrap());

/// What a documentation page is, judged from its URL alone.
///
/// Variant order is the output order: every chapter comes before every
/// appendix, then numeric fields in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    Chapter { major: u32, minor: u32 },
    EndAppendix { number: u32 },
    Other,
}

impl Classification {
    pub fn is_relevant(&self) -> bool {
        !matches!(self, Classification::Other)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Chapter { major, minor } => write!(f, "chapter {}.{}", major, minor),
            Classification::EndAppendix { number } => write!(f, "appendix {}", number),
            Classification::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    pub include_appendix: bool,
    /// Inclusive bounds on the chapter major number.
    pub min_chapter: u32,
    pub max_chapter: u32,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            include_appendix: true,
            min_chapter: 1,
            max_chapter: 10,
        }
    }
}

pub fn classify(url: &str, opts: &ClassifyOptions) -> Classification {
    if let Some((major, minor)) = chapter_numbers(url) {
        if (opts.min_chapter..=opts.max_chapter).contains(&major) {
            return Classification::Chapter { major, minor };
        }
    }

    if opts.include_appendix {
        if let Some(number) = appendix_number(url) {
            return Classification::EndAppendix { number };
        }
    }

    Classification::Other
}

fn chapter_numbers(url: &str) -> Option<(u32, u32)> {
    let caps = CHAPTER_RE.captures(url)?;
    let major = caps[1].parse().ok()?;
    let minor = caps[2].parse().ok()?;
    Some((major, minor))
}

fn appendix_number(url: &str) -> Option<u32> {
    APPENDIX_RE.captures(url)?[1].parse().ok()
}

/// Drop irrelevant pages and order the rest by classification.
///
/// The sort is stable, so pages with equal classifications keep the order
/// they were discovered in.
pub fn order_pages(urls: Vec<Url>, opts: &ClassifyOptions) -> Vec<(Url, Classification)> {
    let mut pages: Vec<_> = urls
        .into_iter()
        .map(|url| {
            let class = classify(url.as_str(), opts);
            (url, class)
        })
        .filter(|(_, class)| class.is_relevant())
        .collect();

    pages.sort_by_key(|(_, class)| *class);
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ClassifyOptions {
        ClassifyOptions::default()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn chapter_in_range() {
        assert_eq!(
            classify("https://x/ch3-02-foo", &defaults()),
            Classification::Chapter { major: 3, minor: 2 }
        );
    }

    #[test]
    fn zero_padded_chapter() {
        assert_eq!(
            classify("https://book.cairo-lang.org/ch01-01-installation.html", &defaults()),
            Classification::Chapter { major: 1, minor: 1 }
        );
    }

    #[test]
    fn chapter_out_of_range() {
        assert_eq!(classify("https://x/ch11-03-foo", &defaults()), Classification::Other);
        assert_eq!(classify("https://x/ch0-01-foo", &defaults()), Classification::Other);
    }

    #[test]
    fn custom_range() {
        let opts = ClassifyOptions {
            min_chapter: 11,
            max_chapter: 20,
            ..defaults()
        };
        assert_eq!(
            classify("https://x/ch11-03-foo", &opts),
            Classification::Chapter { major: 11, minor: 3 }
        );
        assert_eq!(classify("https://x/ch3-02-foo", &opts), Classification::Other);
    }

    #[test]
    fn appendix_toggle() {
        let off = ClassifyOptions {
            include_appendix: false,
            ..defaults()
        };
        assert_eq!(classify("https://x/appendix-07-foo", &off), Classification::Other);
        assert_eq!(
            classify("https://x/appendix-07-foo", &defaults()),
            Classification::EndAppendix { number: 7 }
        );
    }

    #[test]
    fn chapter_wins_over_appendix() {
        assert_eq!(
            classify("https://x/ch2-04-appendix-01-mixed", &defaults()),
            Classification::Chapter { major: 2, minor: 4 }
        );
    }

    #[test]
    fn out_of_range_chapter_falls_back_to_appendix() {
        assert_eq!(
            classify("https://x/ch42-01-appendix-03", &defaults()),
            Classification::EndAppendix { number: 3 }
        );
    }

    #[test]
    fn incomplete_patterns_are_other() {
        for u in [
            "https://x/",
            "https://x/ch3-foo",
            "https://x/ch3-02",
            "https://x/appendix-foo",
            "https://x/title-page.html",
            "not a url",
        ] {
            assert_eq!(classify(u, &defaults()), Classification::Other, "{}", u);
        }
    }

    #[test]
    fn numbers_too_large_are_other() {
        assert_eq!(
            classify("https://x/ch99999999999-01-foo", &defaults()),
            Classification::Other
        );
    }

    #[test]
    fn classify_is_pure() {
        for u in ["https://x/ch3-02-foo", "https://x/appendix-01", "https://x/index.html"] {
            assert_eq!(classify(u, &defaults()), classify(u, &defaults()));
        }
    }

    #[test]
    fn orders_chapters_numerically() {
        let urls = vec![
            url("https://x/ch2-01-b"),
            url("https://x/ch1-09-a"),
            url("https://x/ch1-01-a"),
        ];
        let ordered: Vec<_> = order_pages(urls, &defaults())
            .into_iter()
            .map(|(_, c)| c)
            .collect();
        assert_eq!(
            ordered,
            vec![
                Classification::Chapter { major: 1, minor: 1 },
                Classification::Chapter { major: 1, minor: 9 },
                Classification::Chapter { major: 2, minor: 1 },
            ]
        );
    }

    #[test]
    fn chapters_precede_appendices_and_other_is_dropped() {
        let urls = vec![
            url("https://x/appendix-02-b"),
            url("https://x/index.html"),
            url("https://x/ch10-01-last"),
            url("https://x/appendix-01-a"),
            url("https://x/ch2-01-first"),
        ];
        let ordered: Vec<_> = order_pages(urls, &defaults())
            .into_iter()
            .map(|(u, _)| u.path().to_string())
            .collect();
        assert_eq!(
            ordered,
            vec!["/ch2-01-first", "/ch10-01-last", "/appendix-01-a", "/appendix-02-b"]
        );
    }

    #[test]
    fn equal_keys_keep_discovery_order() {
        let urls = vec![
            url("https://x/ch1-01-second-copy"),
            url("https://x/ch1-01-first-copy"),
        ];
        let ordered: Vec<_> = order_pages(urls, &defaults())
            .into_iter()
            .map(|(u, _)| u.path().to_string())
            .collect();
        assert_eq!(ordered, vec!["/ch1-01-second-copy", "/ch1-01-first-copy"]);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(Classification::Chapter { major: 1, minor: 2 }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "chapter", "major": 1, "minor": 2 }));
        let json = serde_json::to_value(Classification::EndAppendix { number: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "end_appendix", "number": 4 }));
    }
}
