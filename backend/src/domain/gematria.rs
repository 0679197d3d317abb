//! Hebrew numeral (gematria) rendering and month names.
//!
//! Produces the display strings used for Hebrew dates everywhere in the
//! application, so the exact output shape matters: ט״ו and ט״ז substitutions,
//! geresh after a single letter, gershayim before the last of several, and
//! years rendered without their thousands.

const LETTERS: [(u32, &str); 22] = [
    (400, "ת"),
    (300, "ש"),
    (200, "ר"),
    (100, "ק"),
    (90, "צ"),
    (80, "פ"),
    (70, "ע"),
    (60, "ס"),
    (50, "נ"),
    (40, "מ"),
    (30, "ל"),
    (20, "כ"),
    (10, "י"),
    (9, "ט"),
    (8, "ח"),
    (7, "ז"),
    (6, "ו"),
    (5, "ה"),
    (4, "ד"),
    (3, "ג"),
    (2, "ב"),
    (1, "א"),
];

const GERESH: &str = "׳";
const GERSHAYIM: &str = "״";

/// Month display names, Nisan through Adar II.
const MONTH_NAMES: [&str; 13] = [
    "ניסן",
    "אייר",
    "סיון",
    "תמוז",
    "אב",
    "אלול",
    "תשרי",
    "חשון",
    "כסלו",
    "טבת",
    "שבט",
    "אדר א׳",
    "אדר ב׳",
];

/// Render a number in Hebrew numerals. Year numbers drop their thousands
/// (5785 renders as תשפ״ה).
pub fn gematria(number: u32) -> String {
    let mut value = if number > 999 { number % 1000 } else { number };
    if value == 0 {
        // Nothing to spell; fall back to digits.
        return number.to_string();
    }

    let mut letters: Vec<&str> = Vec::new();
    while value > 0 {
        // Numbers ending in 15 or 16 avoid spelling out the divine name.
        if value == 15 {
            letters.extend(["ט", "ו"]);
            break;
        }
        if value == 16 {
            letters.extend(["ט", "ז"]);
            break;
        }
        let (amount, letter) = LETTERS
            .iter()
            .find(|(amount, _)| *amount <= value)
            .expect("value is positive so a letter always matches");
        letters.push(letter);
        value -= amount;
    }

    if letters.len() == 1 {
        format!("{}{}", letters[0], GERESH)
    } else {
        let mut rendered: Vec<&str> = letters;
        rendered.insert(rendered.len() - 1, GERSHAYIM);
        rendered.concat()
    }
}

/// Display name of a Hebrew month number; empty for out-of-range numbers.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=13 => MONTH_NAMES[(month - 1) as usize],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_letter_takes_a_geresh() {
        assert_eq!(gematria(1), "א׳");
        assert_eq!(gematria(20), "כ׳");
        assert_eq!(gematria(30), "ל׳");
    }

    #[test]
    fn test_multi_letter_takes_gershayim_before_the_last() {
        assert_eq!(gematria(11), "י״א");
        assert_eq!(gematria(14), "י״ד");
        assert_eq!(gematria(29), "כ״ט");
    }

    #[test]
    fn test_fifteen_and_sixteen_are_substituted() {
        assert_eq!(gematria(15), "ט״ו");
        assert_eq!(gematria(16), "ט״ז");
        assert_eq!(gematria(715), "תשט״ו");
    }

    #[test]
    fn test_years_drop_thousands() {
        assert_eq!(gematria(5785), "תשפ״ה");
        assert_eq!(gematria(5784), "תשפ״ד");
        assert_eq!(gematria(5750), "תש״נ");
    }

    #[test]
    fn test_month_names_cover_the_leap_month() {
        assert_eq!(month_name(1), "ניסן");
        assert_eq!(month_name(7), "תשרי");
        assert_eq!(month_name(13), "אדר ב׳");
        assert_eq!(month_name(14), "");
    }
}
