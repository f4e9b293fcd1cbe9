use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

static TERM_LONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(fall|spring|summer)\s*(\d{4})").expect("valid regex"));
static TERM_SHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(fa|sp|su)(\d{2})\b").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
}

impl Season {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spring" | "sp" => Some(Self::Spring),
            "summer" | "su" => Some(Self::Summer),
            "fall" | "fa" => Some(Self::Fall),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Fall => "fall",
        }
    }
}

/// An academic term. Ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term {
    year: u16,
    season: Season,
}

impl Term {
    pub fn new(season: Season, year: u16) -> Self {
        Self { year, season }
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn year(&self) -> u16 {
        self.year
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season.as_str(), self.year)
    }
}

impl FromStr for Term {
    type Err = ();

    /// Accepts `fall 2025`, `Fall2025` and `fa25`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        find_terms(s)
            .into_iter()
            .find(|t| t.start == 0 && t.end == s.len())
            .map(|t| t.term)
            .ok_or(())
    }
}

/// A term mention inside a text, with the raw season and year as written.
#[derive(Debug, Clone)]
pub struct TermMatch {
    pub term: Term,
    pub start: usize,
    pub end: usize,
    pub raw_season: String,
    pub raw_year: String,
}

/// Every long (`fall 2025`) and short (`fa25`) term mention, in text order.
pub fn find_terms(text: &str) -> Vec<TermMatch> {
    let long = TERM_LONG.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let season = Season::parse(&caps[1])?;
        let year: u16 = caps[2].parse().ok()?;
        Some(TermMatch {
            term: Term::new(season, year),
            start: whole.start(),
            end: whole.end(),
            raw_season: caps[1].to_lowercase(),
            raw_year: caps[2].to_string(),
        })
    });

    let short = TERM_SHORT.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let season = Season::parse(&caps[1])?;
        let year: u16 = caps[2].parse().ok()?;
        Some(TermMatch {
            term: Term::new(season, 2000 + year),
            start: whole.start(),
            end: whole.end(),
            raw_season: caps[1].to_lowercase(),
            raw_year: caps[2].to_string(),
        })
    });

    let mut all: Vec<TermMatch> = long.chain(short).collect();
    all.sort_by_key(|t| t.start);
    all
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        let fall: Term = "Fall 2025".parse().unwrap();
        assert_eq!(fall, Term::new(Season::Fall, 2025));
        assert_eq!("fa25".parse::<Term>().unwrap(), fall);
        assert!("autumn 2025".parse::<Term>().is_err());
    }

    #[test]
    fn terms_are_chronological() {
        let sp = Term::new(Season::Spring, 2025);
        let su = Term::new(Season::Summer, 2025);
        let fa = Term::new(Season::Fall, 2024);
        assert!(fa < sp);
        assert!(sp < su);
    }

    #[test]
    fn finds_terms_in_order() {
        let found = find_terms("SP24 something Fall 2024 and su25");
        let terms: Vec<String> = found.iter().map(|t| t.term.to_string()).collect();
        assert_eq!(terms, vec!["spring 2024", "fall 2024", "summer 2025"]);
        assert_eq!(found[0].raw_season, "sp");
        assert_eq!(found[0].raw_year, "24");
    }
}
