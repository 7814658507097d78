//! Search normalization for Arabic and Latin text.
//!
//! Quranic text carries full vocalization and several letter variants
//! that users never type. Both sides of a comparison go through
//! [`normalize_arabic`] so that `الفاتحة` finds `ٱلْفَاتِحَةِ`.

use crate::domain::{AzkarCategory, SurahSummary};

/// Strip diacritics and unify letter variants.
pub fn normalize_arabic(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if is_diacritic(c) {
            continue;
        }
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match unify_letter(c) {
            Some(u) => out.push(u),
            None => out.extend(c.to_lowercase()),
        }
    }

    out
}

fn is_diacritic(c: char) -> bool {
    matches!(c,
        '\u{064B}'..='\u{065F}' // harakat, tanwin, shadda, sukun
        | '\u{0670}'            // superscript alef
        | '\u{06D6}'..='\u{06ED}' // Quranic annotation marks
        | '\u{0640}'            // tatweel
    )
}

fn unify_letter(c: char) -> Option<char> {
    let unified = match c {
        'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',
        'ة' => 'ه',
        'ى' => 'ي',
        'ؤ' => 'و',
        'ئ' => 'ي',
        _ => return None,
    };
    Some(unified)
}

/// Whether `query` occurs in `haystack` after normalizing both.
pub fn matches(haystack: &str, query: &str) -> bool {
    let query = normalize_arabic(query);
    if query.is_empty() {
        return true;
    }
    normalize_arabic(haystack).contains(&query)
}

/// Surahs whose number, name, English name or translation match `query`.
pub fn search_surahs<'a>(surahs: &'a [SurahSummary], query: &str) -> Vec<&'a SurahSummary> {
    let trimmed = query.trim();
    if let Ok(number) = trimmed.parse::<u16>() {
        return surahs.iter().filter(|s| s.number == number).collect();
    }

    surahs
        .iter()
        .filter(|s| {
            matches(&s.name, trimmed)
                || matches(&s.english_name, trimmed)
                || s
                    .english_name_translation
                    .as_deref()
                    .is_some_and(|t| matches(t, trimmed))
        })
        .collect()
}

/// Categories whose name or any item text matches `query`.
pub fn search_azkar<'a>(categories: &'a [AzkarCategory], query: &str) -> Vec<&'a AzkarCategory> {
    categories
        .iter()
        .filter(|c| {
            matches(&c.category_name, query) || c.items.iter().any(|i| matches(&i.content, query))
        })
        .collect()
}
