//! Phone number parsing.

use serde::Deserialize;

/// Line type of a phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneNumberKind {
    /// Landline.
    FixedLine,
    /// Mobile.
    Mobile,
    /// Could be either; some numbering plans do not tell them apart.
    FixedLineOrMobile,
    /// Free for the caller.
    TollFree,
    /// Charged above normal rates.
    PremiumRate,
    /// Cost split between caller and recipient.
    SharedCost,
    /// Internet telephony.
    Voip,
    /// Routed to a person rather than a line.
    PersonalNumber,
    /// Pager.
    Pager,
    /// Universal access number.
    Uan,
    /// Voicemail access.
    Voicemail,
    /// The parser could not classify the number.
    Unknown,
}

impl PhoneNumberKind {
    /// Returns `true` when a number of this kind satisfies `wanted`.
    pub fn satisfies(self, wanted: Self) -> bool {
        self == wanted
            || (self == Self::FixedLineOrMobile && matches!(wanted, Self::FixedLine | Self::Mobile))
    }
}

/// A successfully parsed and valid number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPhoneNumber {
    /// ITU country calling code.
    pub country_code: u16,
    /// Subscriber digits without the country code or trunk prefix.
    pub national_number: String,
    /// Line type.
    pub kind: PhoneNumberKind,
}

impl ParsedPhoneNumber {
    /// E.164 rendering, e.g. `+4930123456`.
    pub fn e164(&self) -> String {
        format!("+{}{}", self.country_code, self.national_number)
    }
}

/// Parses and validates phone numbers.
pub trait PhoneNumberParser: Send + Sync {
    /// Returns the parsed number, or `None` when `input` is not a valid
    /// number. `default_region` (ISO 3166-1 alpha-2) applies to numbers
    /// written without an international prefix.
    fn parse(&self, input: &str, default_region: Option<&str>) -> Option<ParsedPhoneNumber>;
}

/// ITU-T E.164 country calling codes.
const CALLING_CODES: &[u16] = &[
    1, 7, 20, 27, 30, 31, 32, 33, 34, 36, 39, 40, 41, 43, 44, 45, 46, 47, 48, 49, 51, 52, 53, 54,
    55, 56, 57, 58, 60, 61, 62, 63, 64, 65, 66, 81, 82, 84, 86, 90, 91, 92, 93, 94, 95, 98, 211,
    212, 213, 216, 218, 220, 221, 222, 223, 224, 225, 226, 227, 228, 229, 230, 231, 232, 233, 234,
    235, 236, 237, 238, 239, 240, 241, 242, 243, 244, 245, 246, 247, 248, 249, 250, 251, 252, 253,
    254, 255, 256, 257, 258, 260, 261, 262, 263, 264, 265, 266, 267, 268, 269, 290, 291, 297, 298,
    299, 350, 351, 352, 353, 354, 355, 356, 357, 358, 359, 370, 371, 372, 373, 374, 375, 376, 377,
    378, 379, 380, 381, 382, 383, 385, 386, 387, 389, 420, 421, 423, 500, 501, 502, 503, 504, 505,
    506, 507, 508, 509, 590, 591, 592, 593, 594, 595, 596, 597, 598, 599, 670, 672, 673, 674, 675,
    676, 677, 678, 679, 680, 681, 682, 683, 685, 686, 687, 688, 689, 690, 691, 692, 800, 808, 850,
    852, 853, 855, 856, 870, 878, 880, 881, 882, 883, 886, 888, 960, 961, 962, 963, 964, 965, 966,
    967, 968, 970, 971, 972, 973, 974, 975, 976, 977, 979, 992, 993, 994, 995, 996, 998,
];

/// Calling codes of the regions accepted as `default_region`.
const REGION_CODES: &[(&str, u16)] = &[
    ("AE", 971), ("AR", 54), ("AT", 43), ("AU", 61), ("BE", 32), ("BG", 359), ("BR", 55),
    ("CA", 1), ("CH", 41), ("CL", 56), ("CN", 86), ("CO", 57), ("CY", 357), ("CZ", 420),
    ("DE", 49), ("DK", 45), ("EE", 372), ("EG", 20), ("ES", 34), ("FI", 358), ("FR", 33),
    ("GB", 44), ("GR", 30), ("HK", 852), ("HR", 385), ("HU", 36), ("ID", 62), ("IE", 353),
    ("IL", 972), ("IN", 91), ("IS", 354), ("IT", 39), ("JP", 81), ("KR", 82), ("LT", 370),
    ("LU", 352), ("LV", 371), ("MA", 212), ("MT", 356), ("MX", 52), ("MY", 60), ("NG", 234),
    ("NL", 31), ("NO", 47), ("NZ", 64), ("PE", 51), ("PH", 63), ("PK", 92), ("PL", 48),
    ("PT", 351), ("RO", 40), ("RS", 381), ("RU", 7), ("SA", 966), ("SE", 46), ("SG", 65),
    ("SI", 386), ("SK", 421), ("TH", 66), ("TR", 90), ("TW", 886), ("UA", 380), ("US", 1),
    ("VN", 84), ("ZA", 27),
];

/// Regions whose leading zero is part of the subscriber number.
const KEEPS_LEADING_ZERO: &[&str] = &["IT"];

/// Structural parser for numbers in international notation.
///
/// Accepts `+` or `00` followed by a known calling code and a subscriber
/// number, with spaces, dots, hyphens, slashes and parentheses as visual
/// separators. National numbers are accepted when a known default region is
/// given; a single trunk `0` is dropped. The result's kind is always
/// [`PhoneNumberKind::Unknown`].
#[derive(Debug, Clone, Copy, Default)]
pub struct E164PhoneParser;

impl E164PhoneParser {
    const MAX_DIGITS: usize = 15;
    const MIN_NATIONAL_DIGITS: usize = 4;

    fn split_calling_code(digits: &str) -> Option<(u16, &str)> {
        (1..=3).find_map(|len| {
            let code: u16 = digits.get(..len)?.parse().ok()?;
            CALLING_CODES
                .binary_search(&code)
                .ok()
                .map(|_| (code, &digits[len..]))
        })
    }
}

impl PhoneNumberParser for E164PhoneParser {
    fn parse(&self, input: &str, default_region: Option<&str>) -> Option<ParsedPhoneNumber> {
        let trimmed = input.trim();
        let (international, rest) = if let Some(rest) = trimmed.strip_prefix('+') {
            (true, rest)
        } else if let Some(rest) = trimmed.strip_prefix("00") {
            (true, rest)
        } else {
            (false, trimmed)
        };

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '/' | '(' | ')' => {}
                _ => return None,
            }
        }

        let (country_code, national) = if international {
            Self::split_calling_code(&digits)?
        } else {
            let region = default_region?;
            let (_, code) = REGION_CODES.iter().find(|(r, _)| r.eq_ignore_ascii_case(region))?;
            let national = if KEEPS_LEADING_ZERO.iter().any(|r| r.eq_ignore_ascii_case(region)) {
                digits.as_str()
            } else {
                digits.strip_prefix('0').unwrap_or(&digits)
            };
            (*code, national)
        };

        let total = country_code.to_string().len() + national.len();
        if national.len() < Self::MIN_NATIONAL_DIGITS || total > Self::MAX_DIGITS {
            return None;
        }
        Some(ParsedPhoneNumber {
            country_code,
            national_number: national.to_owned(),
            kind: PhoneNumberKind::Unknown,
        })
    }
}
