//! Country, currency, language and locale lookups.

mod tables;

use tables::{COUNTRIES, COUNTRIES_ALPHA3, CURRENCIES, LANGUAGES, LANGUAGES_ALPHA3, SCRIPTS};

/// Code lists used by the intl constraints and by `Bic`.
///
/// All lookups are case sensitive: countries, currencies and regions are
/// uppercase, languages lowercase, scripts title case.
pub trait IntlData: Send + Sync {
    /// ISO 3166-1 alpha-2 country code.
    fn country_exists(&self, code: &str) -> bool;

    /// ISO 3166-1 alpha-3 country code.
    fn alpha3_country_exists(&self, code: &str) -> bool;

    /// ISO 4217 currency code.
    fn currency_exists(&self, code: &str) -> bool;

    /// ISO 639 language code (two letters, or three for languages without a
    /// two-letter code).
    fn language_exists(&self, code: &str) -> bool;

    /// ISO 639-2 three-letter language code.
    fn alpha3_language_exists(&self, code: &str) -> bool;

    /// Locale identifier in `language[_Script][_REGION]` form.
    fn locale_exists(&self, locale: &str) -> bool;
}

/// Codes assigned by CLDR on top of ISO 3166-1.
const EXTRA_COUNTRIES: &[(&str, &str)] = &[("XK", "XKK")];

/// Tables compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinIntlData;

impl BuiltinIntlData {
    fn script_exists(code: &str) -> bool {
        SCRIPTS.binary_search(&code).is_ok()
    }

    fn region_exists(&self, code: &str) -> bool {
        // UN M.49 numeric areas such as `419` (Latin America).
        (code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit())) || self.country_exists(code)
    }
}

impl IntlData for BuiltinIntlData {
    fn country_exists(&self, code: &str) -> bool {
        COUNTRIES.binary_search_by(|(alpha2, _)| alpha2.cmp(&code)).is_ok()
            || EXTRA_COUNTRIES.iter().any(|(alpha2, _)| *alpha2 == code)
    }

    fn alpha3_country_exists(&self, code: &str) -> bool {
        COUNTRIES_ALPHA3.binary_search(&code).is_ok()
            || EXTRA_COUNTRIES.iter().any(|(_, alpha3)| *alpha3 == code)
    }

    fn currency_exists(&self, code: &str) -> bool {
        CURRENCIES.binary_search(&code).is_ok()
    }

    fn language_exists(&self, code: &str) -> bool {
        match code.len() {
            2 => LANGUAGES.binary_search_by(|(alpha2, _)| alpha2.cmp(&code)).is_ok(),
            3 => {
                self.alpha3_language_exists(code)
                    && !LANGUAGES.iter().any(|(_, alpha3)| *alpha3 == code)
            }
            _ => false,
        }
    }

    fn alpha3_language_exists(&self, code: &str) -> bool {
        LANGUAGES_ALPHA3.binary_search(&code).is_ok()
    }

    fn locale_exists(&self, locale: &str) -> bool {
        let mut parts = locale.split('_');
        let Some(language) = parts.next() else {
            return false;
        };
        if !self.language_exists(language) {
            return false;
        }
        let mut rest: Vec<&str> = parts.collect();
        if rest.first().is_some_and(|part| part.len() == 4) {
            if !Self::script_exists(rest[0]) {
                return false;
            }
            rest.remove(0);
        }
        match rest.as_slice() {
            [] => true,
            [region] => self.region_exists(region),
            _ => false,
        }
    }
}

/// Rewrites a locale to canonical `ll_Ssss_RR` form: `-` becomes `_`,
/// the language is lowercased, a script is title-cased and a region
/// uppercased. Anything after a `.` or `@` (encoding, modifiers) is dropped.
pub fn canonicalize_locale(locale: &str) -> String {
    let base = locale.split(['.', '@']).next().unwrap_or_default();
    base.split(['_', '-'])
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_ascii_lowercase()
            } else if part.len() == 4 && part.bytes().all(|b| b.is_ascii_alphabetic()) {
                let mut script = part.to_ascii_lowercase();
                script[..1].make_ascii_uppercase();
                script
            } else {
                part.to_ascii_uppercase()
            }
        })
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn tables_are_sorted() {
        assert!(COUNTRIES.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(COUNTRIES_ALPHA3.windows(2).all(|w| w[0] < w[1]));
        assert!(CURRENCIES.windows(2).all(|w| w[0] < w[1]));
        assert!(LANGUAGES.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(LANGUAGES_ALPHA3.windows(2).all(|w| w[0] < w[1]));
        assert!(SCRIPTS.windows(2).all(|w| w[0] < w[1]));
    }

    #[rstest]
    #[case("DE", true)]
    #[case("GB", true)]
    #[case("XK", true)]
    #[case("de", false)]
    #[case("ZZ", false)]
    #[case("DEU", false)]
    fn countries(#[case] code: &str, #[case] exists: bool) {
        assert_eq!(BuiltinIntlData.country_exists(code), exists);
    }

    #[test]
    fn alpha3_lookups() {
        let intl = BuiltinIntlData;
        assert!(intl.alpha3_country_exists("DEU"));
        assert!(!intl.alpha3_country_exists("DE"));
        assert!(intl.alpha3_language_exists("deu"));
        assert!(intl.currency_exists("EUR"));
        assert!(!intl.currency_exists("EU"));
    }

    #[rstest]
    #[case("en", true)]
    #[case("haw", true)]
    #[case("eng", false)]
    #[case("EN", false)]
    #[case("xx", false)]
    fn languages(#[case] code: &str, #[case] exists: bool) {
        assert_eq!(BuiltinIntlData.language_exists(code), exists);
    }

    #[rstest]
    #[case("en", true)]
    #[case("en_GB", true)]
    #[case("zh_Hant_TW", true)]
    #[case("es_419", true)]
    #[case("sr_Latn", true)]
    #[case("en_ZZ", false)]
    #[case("en_Abcd", false)]
    #[case("en_GB_extra", false)]
    #[case("xx_GB", false)]
    fn locales(#[case] locale: &str, #[case] exists: bool) {
        assert_eq!(BuiltinIntlData.locale_exists(locale), exists);
    }

    #[rstest]
    #[case("en-gb", "en_GB")]
    #[case("ZH-hant-tw", "zh_Hant_TW")]
    #[case("de_DE.UTF-8", "de_DE")]
    #[case("fr_FR@euro", "fr_FR")]
    fn canonical_locales(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonicalize_locale(input), expected);
    }
}
