// Numeral parsing for chapter numbering schemes.
//
// Headings number chapters with arabic digits ("12"), roman numerals ("XII"),
// cardinal words ("twelve", "twenty-one") or ordinals ("the first").

const UNITS: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const ORDINAL_UNITS: [&str; 20] = [
    "zeroth", "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth",
    "ninth", "tenth", "eleventh", "twelfth", "thirteenth", "fourteenth", "fifteenth",
    "sixteenth", "seventeenth", "eighteenth", "nineteenth",
];

const ORDINAL_TENS: [&str; 10] = [
    "", "", "twentieth", "thirtieth", "fortieth", "fiftieth", "sixtieth", "seventieth",
    "eightieth", "ninetieth",
];

/// Parse an arabic number, ignoring a single trailing period.
pub fn parse_arabic(token: &str) -> Option<u32> {
    let token = token.strip_suffix('.').unwrap_or(token);
    if token.is_empty() || token.len() > 4 || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Parse a roman numeral in canonical form (e.g. "XIV", not "XIIII").
///
/// Case-insensitive, a single trailing period is ignored.
pub fn parse_roman(token: &str) -> Option<u32> {
    let token = token.strip_suffix('.').unwrap_or(token);
    if token.is_empty() {
        return None;
    }

    let mut total = 0u32;
    let mut previous = 0u32;
    for c in token.chars().rev() {
        let value = match c.to_ascii_uppercase() {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => return None,
        };
        if value < previous {
            total = total.checked_sub(value)?;
        } else {
            total += value;
            previous = value;
        }
    }

    // Mixed case ("Xii") is not a numeral, it's a word
    let upper = token.chars().all(|c| c.is_ascii_uppercase());
    let lower = token.chars().all(|c| c.is_ascii_lowercase());
    if !(upper || lower) {
        return None;
    }

    if total == 0 || total > 4999 || !to_roman(total).eq_ignore_ascii_case(token) {
        return None;
    }
    Some(total)
}

/// Format a value as an uppercase roman numeral.
pub fn to_roman(mut value: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for (step, symbol) in TABLE {
        while value >= step {
            out.push_str(symbol);
            value -= step;
        }
    }
    out
}

/// Parse a cardinal or ordinal number word below one hundred.
///
/// Accepts "seven", "twenty-one", "twenty one", "first", "the first",
/// "twenty-second". Case-insensitive.
pub fn parse_number_word(phrase: &str) -> Option<u32> {
    let lowered = phrase.trim().trim_end_matches('.').to_lowercase();
    let lowered = lowered.strip_prefix("the ").unwrap_or(&lowered);
    let parts: Vec<&str> = lowered
        .split(|c: char| c == '-' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [single] => word_value(single),
        [tens, unit] => {
            let tens_value = TENS.iter().position(|t| !t.is_empty() && t == tens)? as u32 * 10;
            let unit_value = word_value(unit)?;
            (1..10).contains(&unit_value).then_some(tens_value + unit_value)
        }
        _ => None,
    }
}

fn word_value(word: &str) -> Option<u32> {
    UNITS
        .iter()
        .position(|w| *w == word)
        .or_else(|| ORDINAL_UNITS.iter().position(|w| *w == word))
        .map(|i| i as u32)
        .or_else(|| {
            TENS.iter()
                .position(|w| !w.is_empty() && *w == word)
                .or_else(|| ORDINAL_TENS.iter().position(|w| !w.is_empty() && *w == word))
                .map(|i| i as u32 * 10)
        })
        .filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arabic() {
        assert_eq!(parse_arabic("12"), Some(12));
        assert_eq!(parse_arabic("3."), Some(3));
        assert_eq!(parse_arabic("3a"), None);
        assert_eq!(parse_arabic(""), None);
        assert_eq!(parse_arabic("123456"), None);
    }

    #[test]
    fn test_roman_canonical_only() {
        assert_eq!(parse_roman("XIV"), Some(14));
        assert_eq!(parse_roman("xiv"), Some(14));
        assert_eq!(parse_roman("XII."), Some(12));
        assert_eq!(parse_roman("MCMXC"), Some(1990));
        assert_eq!(parse_roman("IIII"), None);
        assert_eq!(parse_roman("VX"), None);
        assert_eq!(parse_roman("Mix"), None);
        assert_eq!(parse_roman("CHAPTER"), None);
    }

    #[test]
    fn test_to_roman() {
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(49), "XLIX");
        assert_eq!(to_roman(2024), "MMXXIV");
    }

    #[test]
    fn test_number_words() {
        assert_eq!(parse_number_word("ONE"), Some(1));
        assert_eq!(parse_number_word("Twenty-One"), Some(21));
        assert_eq!(parse_number_word("twenty one"), Some(21));
        assert_eq!(parse_number_word("the First"), Some(1));
        assert_eq!(parse_number_word("twenty-second"), Some(22));
        assert_eq!(parse_number_word("thirtieth"), Some(30));
        assert_eq!(parse_number_word("twenty-twenty"), None);
        assert_eq!(parse_number_word("storm"), None);
        assert_eq!(parse_number_word("zero"), None);
    }
}
