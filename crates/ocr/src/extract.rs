use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use crate::types::{CandidateItem, ExtractedReceipt};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_amount_labeled,
    r"(?i)\b(?:total|amount|sum)\b[\s:]*[$€£฿]?\s*(\d[\d,]*(?:\.\d{1,2})?)");
re!(re_amount_currency,
    r"[$€£฿]\s*(\d[\d,]*\.\d{2})\b");
re!(re_amount_trailing_label,
    r"(?i)(\d[\d,]*\.\d{2})\s*(?:total|amount)\b");

re!(re_date_numeric,
    r"\b(\d{1,2})[-/](\d{1,2})[-/](\d{2,4})\b");
re!(re_date_iso,
    r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b");
re!(re_date_month_name,
    r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{2,4})\b");

re!(re_long_digit_run, r"\d{10}");
re!(re_address_word, r"(?i)\b(?:address|street|rd|ave|blvd)\b");

re!(re_item_line,
    r"^([A-Za-z][A-Za-z ]*?)\s+[$€£฿]?\s*(\d[\d,]*\.\d{2})$");
re!(re_item_stop_word,
    r"(?i)total|subtotal|tax|address|phone|thank");

// ── First-match-wins rule cascade ─────────────────────────────────────────────

/// One heuristic: a pattern plus a parser for its captures. The parser may
/// reject a syntactic match (e.g. an impossible calendar date), which moves
/// evaluation on to the next rule.
type FieldRule<T> = (fn() -> &'static Regex, fn(&Captures) -> Option<T>);

fn first_match<T>(text: &str, rules: &[FieldRule<T>]) -> Option<T> {
    rules
        .iter()
        .find_map(|(re, parse)| re().captures(text).and_then(|c| parse(&c)))
}

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Extract structured expense fields from raw OCR text.
    ///
    /// Pure and total: the same text always yields the same receipt, and a
    /// field the heuristics cannot find is simply absent.
    pub fn extract(ocr_text: &str) -> ExtractedReceipt {
        let lines: Vec<&str> = ocr_text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        // Amount first: item extraction needs it to skip the total line.
        let amount = extract_amount(ocr_text);
        let date = extract_date(ocr_text);
        let description = extract_description(&lines);
        let items = extract_items(&lines, amount.as_deref());

        ExtractedReceipt { description, amount, date, items }
    }
}

// ── Amount ────────────────────────────────────────────────────────────────────

/// Receipts are inconsistent about whether the total is labeled before or
/// after the number, so several orderings are tried, most specific first.
fn extract_amount(text: &str) -> Option<String> {
    const RULES: &[FieldRule<String>] = &[
        (re_amount_labeled, capture_amount),
        (re_amount_currency, capture_amount),
        (re_amount_trailing_label, capture_amount),
    ];
    first_match(text, RULES)
}

fn capture_amount(c: &Captures) -> Option<String> {
    c.get(1).map(|m| m.as_str().replace(',', ""))
}

// ── Date ──────────────────────────────────────────────────────────────────────

fn extract_date(text: &str) -> Option<NaiveDate> {
    const RULES: &[FieldRule<NaiveDate>] = &[
        (re_date_numeric, parse_numeric_date),
        (re_date_iso, parse_iso_date),
        (re_date_month_name, parse_month_name_date),
    ];
    first_match(text, RULES)
}

/// `N/N/Y` with a 2–4 digit year. Month-first is tried before day-first, the
/// convention the receipts this was tuned on actually use.
fn parse_numeric_date(c: &Captures) -> Option<NaiveDate> {
    let p1: u32 = c.get(1)?.as_str().parse().ok()?;
    let p2: u32 = c.get(2)?.as_str().parse().ok()?;
    let year = expand_year(c.get(3)?.as_str().parse().ok()?);
    NaiveDate::from_ymd_opt(year, p1, p2).or_else(|| NaiveDate::from_ymd_opt(year, p2, p1))
}

fn parse_iso_date(c: &Captures) -> Option<NaiveDate> {
    let y: i32 = c.get(1)?.as_str().parse().ok()?;
    let m: u32 = c.get(2)?.as_str().parse().ok()?;
    let d: u32 = c.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

fn parse_month_name_date(c: &Captures) -> Option<NaiveDate> {
    let month = abbr_month_to_num(c.get(1)?.as_str())?;
    let day: u32 = c.get(2)?.as_str().parse().ok()?;
    let year = expand_year(c.get(3)?.as_str().parse().ok()?);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn expand_year(y: i32) -> i32 {
    if y < 100 { 2000 + y } else { y }
}

fn abbr_month_to_num(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "jan" => Some(1), "feb" => Some(2), "mar" => Some(3), "apr" => Some(4),
        "may" => Some(5), "jun" => Some(6), "jul" => Some(7), "aug" => Some(8),
        "sep" => Some(9), "oct" => Some(10), "nov" => Some(11), "dec" => Some(12),
        _ => None,
    }
}

// ── Description (merchant) ────────────────────────────────────────────────────

/// The merchant name is almost always in the first few printed lines; phone
/// numbers and address lines are the usual impostors.
fn extract_description(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .take(3)
        .find(|l| {
            l.chars().count() > 3
                && !re_long_digit_run().is_match(l)
                && !re_address_word().is_match(l)
        })
        .map(|l| l.to_string())
}

// ── Line items ────────────────────────────────────────────────────────────────

fn extract_items(lines: &[&str], amount: Option<&str>) -> Vec<CandidateItem> {
    // Pass 1 (strict): name followed by a price at the end of the line.
    let mut matched_any = false;
    let mut items: Vec<CandidateItem> = Vec::new();

    for line in lines {
        let Some(c) = re_item_line().captures(line) else { continue };
        matched_any = true;

        let price = c.get(2).map(|m| m.as_str().replace(',', ""));
        // A price equal to the extracted amount is the total line, not an item.
        if price.as_deref() == amount && amount.is_some() {
            continue;
        }
        if let Some(name) = c.get(1) {
            items.push(CandidateItem::named(name.as_str().trim()));
        }
    }

    // Pass 2 (fallback) only runs when the strict pattern matched nothing at
    // all; a matched-then-discarded total line still counts as a match.
    if !matched_any {
        items = lines
            .iter()
            .filter(|l| {
                l.starts_with(char::is_alphabetic)
                    && (3..=30).contains(&l.chars().count())
                    && !re_item_stop_word().is_match(l)
            })
            .take(5)
            .map(|l| CandidateItem::named(*l))
            .collect();
    }

    items
}

// ── Tests ─────────────────────────────────────────────────────────────────────
