//! `Y-m-d H:i:s` style layouts.
//!
//! Letters follow the conventions of PHP's `DateTime::createFromFormat`,
//! which is what most rule files in the wild are written against. Fields
//! are read leniently (a month of `13` parses) and range checked afterwards
//! so a bad date or time can be told apart from a malformed string.

use chrono::NaiveDate;

const DAY_NAMES: [&str; 7] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

const SEPARATORS: &[char] = &[';', ':', '/', '.', ',', '-', '(', ')'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Day,
    DayName,
    DaySuffix,
    DayOfYear,
    Month,
    MonthName,
    Year,
    ShortYear,
    Meridiem,
    Hour12,
    Hour24,
    Minute,
    Second,
    Millis,
    Micros,
    Offset,
    Zone,
    Timestamp,
    Whitespace,
    Separator,
    AnyChar,
    AnyUntilSeparator,
    Reset,
    IgnoreRest,
    Literal(char),
}

/// Why an input does not fit a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mismatch {
    /// The string does not have the layout's shape.
    Format,
    /// Well-formed, but the calendar date does not exist.
    Date,
    /// Well-formed, but the time of day does not exist.
    Time,
}

/// A tokenized layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Layout {
    tokens: Vec<Token>,
}

#[derive(Debug, Default)]
struct Fields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    pm: Option<bool>,
}

/// Cursor over the remaining input.
struct Input<'s> {
    rest: &'s str,
}

impl<'s> Input<'s> {
    fn digits(&mut self, min: usize, max: usize) -> Result<u32, Mismatch> {
        let len = self
            .rest
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if len < min {
            return Err(Mismatch::Format);
        }
        let (digits, rest) = self.rest.split_at(len);
        self.rest = rest;
        digits.parse().map_err(|_| Mismatch::Format)
    }

    /// Consumes the longest of `words` (case-insensitive) found at the
    /// cursor, also trying three-letter abbreviations.
    fn word(&mut self, words: &[&str]) -> Result<usize, Mismatch> {
        for (index, word) in words.iter().enumerate() {
            for candidate in [*word, &word[..3]] {
                let found = self
                    .rest
                    .get(..candidate.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(candidate));
                if found {
                    self.rest = &self.rest[candidate.len()..];
                    return Ok(index);
                }
            }
        }
        Err(Mismatch::Format)
    }

    fn one_of(&mut self, options: &[&str]) -> Result<usize, Mismatch> {
        let index = options
            .iter()
            .position(|option| {
                self.rest
                    .get(..option.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(option))
            })
            .ok_or(Mismatch::Format)?;
        self.rest = &self.rest[options[index].len()..];
        Ok(index)
    }

    fn char_if(&mut self, accept: impl Fn(char) -> bool) -> Option<char> {
        let c = self.rest.chars().next().filter(|&c| accept(c))?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn skip_while(&mut self, accept: impl Fn(char) -> bool) -> usize {
        let len = self
            .rest
            .find(|c: char| !accept(c))
            .unwrap_or(self.rest.len());
        self.rest = &self.rest[len..];
        len
    }

    fn offset(&mut self) -> Result<(), Mismatch> {
        if self.char_if(|c| c == 'Z' || c == 'z').is_some() {
            return Ok(());
        }
        self.char_if(|c| c == '+' || c == '-').ok_or(Mismatch::Format)?;
        self.digits(2, 2)?;
        self.char_if(|c| c == ':');
        if self.rest.starts_with(|c: char| c.is_ascii_digit()) {
            self.digits(2, 2)?;
        }
        Ok(())
    }

    fn zone(&mut self) -> Result<(), Mismatch> {
        if self.rest.starts_with(['+', '-']) {
            return self.offset();
        }
        let len = self.skip_while(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '+')
        });
        if len == 0 {
            return Err(Mismatch::Format);
        }
        Ok(())
    }
}

impl Layout {
    /// Tokenizes `format`. Unknown letters match themselves; `\` escapes the
    /// next character.
    pub(crate) fn new(format: &str) -> Self {
        let mut tokens = Vec::new();
        let mut chars = format.chars();
        while let Some(c) = chars.next() {
            tokens.push(match c {
                'd' | 'j' => Token::Day,
                'D' | 'l' => Token::DayName,
                'S' => Token::DaySuffix,
                'z' => Token::DayOfYear,
                'm' | 'n' => Token::Month,
                'M' | 'F' => Token::MonthName,
                'Y' => Token::Year,
                'y' => Token::ShortYear,
                'a' | 'A' => Token::Meridiem,
                'g' | 'h' => Token::Hour12,
                'G' | 'H' => Token::Hour24,
                'i' => Token::Minute,
                's' => Token::Second,
                'v' => Token::Millis,
                'u' => Token::Micros,
                'O' | 'P' | 'p' => Token::Offset,
                'e' | 'T' => Token::Zone,
                'U' => Token::Timestamp,
                ' ' => Token::Whitespace,
                '#' => Token::Separator,
                '?' => Token::AnyChar,
                '*' => Token::AnyUntilSeparator,
                '!' | '|' => Token::Reset,
                '+' => Token::IgnoreRest,
                '\\' => Token::Literal(chars.next().unwrap_or('\\')),
                other => Token::Literal(other),
            });
        }
        Self { tokens }
    }

    /// Checks `text` against the layout.
    pub(crate) fn check(&self, text: &str) -> Result<(), Mismatch> {
        let mut input = Input { rest: text };
        let mut fields = Fields::default();
        let mut ignore_rest = false;

        for token in &self.tokens {
            match *token {
                Token::Day => fields.day = Some(input.digits(1, 2)?),
                Token::DayName => {
                    input.word(&DAY_NAMES)?;
                }
                Token::DaySuffix => {
                    input.one_of(&["st", "nd", "rd", "th"])?;
                }
                Token::DayOfYear => {
                    input.digits(1, 3)?;
                }
                Token::Month => fields.month = Some(input.digits(1, 2)?),
                Token::MonthName => {
                    let index = input.word(&MONTH_NAMES)?;
                    fields.month = Some(index as u32 + 1);
                }
                Token::Year => fields.year = Some(input.digits(1, 4)? as i32),
                Token::ShortYear => {
                    let year = input.digits(2, 2)? as i32;
                    fields.year = Some(if year < 70 { 2000 + year } else { 1900 + year });
                }
                Token::Meridiem => {
                    let index = input.one_of(&["a.m.", "p.m.", "am", "pm"])?;
                    fields.pm = Some(index % 2 == 1);
                }
                Token::Hour12 => {
                    let hour = input.digits(1, 2)?;
                    if hour > 12 {
                        return Err(Mismatch::Format);
                    }
                    fields.hour = Some(hour);
                }
                Token::Hour24 => fields.hour = Some(input.digits(1, 2)?),
                Token::Minute => fields.minute = Some(input.digits(2, 2)?),
                Token::Second => fields.second = Some(input.digits(2, 2)?),
                Token::Millis => {
                    input.digits(3, 3)?;
                }
                Token::Micros => {
                    input.digits(1, 6)?;
                }
                Token::Offset => input.offset()?,
                Token::Zone => input.zone()?,
                Token::Timestamp => {
                    input.char_if(|c| c == '-');
                    if input.skip_while(|c| c.is_ascii_digit()) == 0 {
                        return Err(Mismatch::Format);
                    }
                }
                Token::Whitespace => {
                    input.skip_while(char::is_whitespace);
                }
                Token::Separator => {
                    input
                        .char_if(|c| SEPARATORS.contains(&c))
                        .ok_or(Mismatch::Format)?;
                }
                Token::AnyChar => {
                    input.char_if(|_| true).ok_or(Mismatch::Format)?;
                }
                Token::AnyUntilSeparator => {
                    input.skip_while(|c| !SEPARATORS.contains(&c) && !c.is_ascii_digit());
                }
                Token::Reset => {}
                Token::IgnoreRest => ignore_rest = true,
                Token::Literal(expected) => {
                    input.char_if(|c| c == expected).ok_or(Mismatch::Format)?;
                }
            }
        }
        if !input.rest.is_empty() && !ignore_rest {
            return Err(Mismatch::Format);
        }
        fields.validate()
    }
}

impl Fields {
    fn validate(&self) -> Result<(), Mismatch> {
        if self.year.is_some() || self.month.is_some() || self.day.is_some() {
            // Leap year when unset, so a bare `29.02` is accepted.
            let year = self.year.unwrap_or(2000);
            let date =
                NaiveDate::from_ymd_opt(year, self.month.unwrap_or(1), self.day.unwrap_or(1));
            if date.is_none() {
                return Err(Mismatch::Date);
            }
        }
        let hour = match (self.hour, self.pm) {
            (Some(12), Some(false)) => Some(0),
            (Some(hour), Some(true)) if hour < 12 => Some(hour + 12),
            (hour, _) => hour,
        };
        if hour.is_some_and(|h| h > 23)
            || self.minute.is_some_and(|m| m > 59)
            || self.second.is_some_and(|s| s > 59)
        {
            return Err(Mismatch::Time);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Y-m-d H:i:s", "2010-01-01 01:02:03")]
    #[case("Y/m/d H:i", "2010/01/01 01:02")]
    #[case("d/m/Y", "01/01/2010")]
    #[case("m/d/Y", "12/01/2010")]
    #[case("d.m.Y", "5.10.2010")]
    #[case("H:i", "01:02")]
    #[case("Y-m-d\\TH:i:sP", "2010-01-01T01:02:03+02:00")]
    #[case("Y-m-d\\TH:i:sp", "2010-01-01T01:02:03Z")]
    #[case("D, d M Y", "Fri, 01 Jan 2010")]
    #[case("l jS F Y", "Friday 1st January 2010")]
    #[case("g:i A", "12:30 PM")]
    #[case("U", "1262304000")]
    #[case("Y-m-d H:i:s.v", "2010-01-01 01:02:03.123")]
    #[case("Y#m#d", "2010.01-01")]
    #[case("d.m", "29.02")]
    #[case("Y-m-d e", "2010-01-01 Europe/Paris")]
    #[case("Y-m-d+", "2010-01-01 and then some")]
    fn accepted(#[case] format: &str, #[case] input: &str) {
        assert_eq!(Layout::new(format).check(input), Ok(()));
    }

    #[rstest]
    #[case("Y-m-d", "foobar", Mismatch::Format)]
    #[case("H:i", "00:00:00", Mismatch::Format)]
    #[case("Y-m-d", "2010-01-01 00:00", Mismatch::Format)]
    #[case("Y-m-d H:i:s", "2010-01-01 00:00", Mismatch::Format)]
    #[case("g:i", "13:00", Mismatch::Format)]
    #[case("D Y", "Fry 2010", Mismatch::Format)]
    #[case("Y-m-d", "2010-13-01", Mismatch::Date)]
    #[case("Y-m-d", "2010-04-32", Mismatch::Date)]
    #[case("Y-m-d", "2010-02-29", Mismatch::Date)]
    #[case("Y-m-d", "2010-00-10", Mismatch::Date)]
    #[case("H:i:s", "24:00:00", Mismatch::Time)]
    #[case("H:i:s", "00:60:00", Mismatch::Time)]
    #[case("H:i:s", "00:00:60", Mismatch::Time)]
    #[case("Y-m-d H:i:s", "2010-01-01 00:00:60", Mismatch::Time)]
    fn rejected(#[case] format: &str, #[case] input: &str, #[case] mismatch: Mismatch) {
        assert_eq!(Layout::new(format).check(input), Err(mismatch));
    }

    #[test]
    fn escaped_letters_are_literal() {
        let layout = Layout::new("\\Y\\e\\a\\r: Y");
        assert_eq!(layout.check("Year: 2010"), Ok(()));
        assert_eq!(layout.check("2010: 2010"), Err(Mismatch::Format));
    }
}
