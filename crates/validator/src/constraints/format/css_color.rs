//! CSS colour values.

use std::sync::LazyLock;

use serde::Deserialize;

use crate::constraints::report;
use crate::foundation::{
    DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value, text_input,
};

const BYTE: &str = r"(0|255|25[0-4]|2[0-4]\d|1\d\d|0?\d?\d)";
const HUE: &str = r"(0|360|35\d|3[0-4]\d|[12]\d\d|0?\d?\d)";
const PERCENT: &str = r"(0|100|\d{1,2})%";
const ALPHA: &str = r"(0|0?\.\d+|1(\.0)?)";

fn pattern(source: &str) -> regex::Regex {
    regex::Regex::new(&format!("(?i)^{source}$")).expect("valid CSS colour pattern")
}

static HEX_LONG: LazyLock<regex::Regex> = LazyLock::new(|| pattern("#[0-9a-f]{6}"));
static HEX_LONG_WITH_ALPHA: LazyLock<regex::Regex> = LazyLock::new(|| pattern("#[0-9a-f]{8}"));
static HEX_SHORT: LazyLock<regex::Regex> = LazyLock::new(|| pattern("#[0-9a-f]{3}"));
static HEX_SHORT_WITH_ALPHA: LazyLock<regex::Regex> = LazyLock::new(|| pattern("#[0-9a-f]{4}"));
static RGB: LazyLock<regex::Regex> = LazyLock::new(|| {
    pattern(&format!(r"rgb\(\s*{BYTE},\s*{BYTE},\s*{BYTE}\s*\)"))
});
static RGBA: LazyLock<regex::Regex> = LazyLock::new(|| {
    pattern(&format!(r"rgba\(\s*{BYTE},\s*{BYTE},\s*{BYTE},\s*{ALPHA}\s*\)"))
});
static HSL: LazyLock<regex::Regex> = LazyLock::new(|| {
    pattern(&format!(r"hsl\(\s*{HUE},\s*{PERCENT},\s*{PERCENT}\s*\)"))
});
static HSLA: LazyLock<regex::Regex> = LazyLock::new(|| {
    pattern(&format!(r"hsla\(\s*{HUE},\s*{PERCENT},\s*{PERCENT},\s*{ALPHA}\s*\)"))
});

const BASIC_NAMED_COLORS: &[&str] = &[
    "black", "silver", "gray", "white", "maroon", "red", "purple", "fuchsia", "green", "lime",
    "olive", "yellow", "navy", "blue", "teal", "aqua",
];

const EXTENDED_NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue", "darkcyan",
    "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki", "darkmagenta",
    "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon", "darkseagreen",
    "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise", "darkviolet", "deeppink",
    "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick", "floralwhite", "forestgreen",
    "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod", "gray", "green", "greenyellow",
    "grey", "honeydew", "hotpink", "indianred", "indigo", "ivory", "khaki", "lavender",
    "lavenderblush", "lawngreen", "lemonchiffon", "lightblue", "lightcoral", "lightcyan",
    "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey", "lightpink", "lightsalmon",
    "lightseagreen", "lightskyblue", "lightslategray", "lightslategrey", "lightsteelblue",
    "lightyellow", "lime", "limegreen", "linen", "magenta", "maroon", "mediumaquamarine",
    "mediumblue", "mediumorchid", "mediumpurple", "mediumseagreen", "mediumslateblue",
    "mediumspringgreen", "mediumturquoise", "mediumvioletred", "midnightblue", "mintcream",
    "mistyrose", "moccasin", "navajowhite", "navy", "oldlace", "olive", "olivedrab", "orange",
    "orangered", "orchid", "palegoldenrod", "palegreen", "paleturquoise", "palevioletred",
    "papayawhip", "peachpuff", "peru", "pink", "plum", "powderblue", "purple", "red", "rosybrown",
    "royalblue", "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna",
    "silver", "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen",
    "steelblue", "tan", "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white",
    "whitesmoke", "yellow", "yellowgreen",
];

const SYSTEM_COLORS: &[&str] = &[
    "Canvas", "CanvasText", "LinkText", "VisitedText", "ActiveText", "ButtonFace", "ButtonText",
    "ButtonBorder", "Field", "FieldText", "Highlight", "HighlightText", "SelectedItem",
    "SelectedItemText", "Mark", "MarkText", "GrayText",
];

const KEYWORDS: &[&str] = &["transparent", "currentColor"];

/// Notations a [`CssColor`] constraint can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CssColorFormat {
    /// `#rrggbb`
    HexLong,
    /// `#rrggbbaa`
    HexLongWithAlpha,
    /// `#rgb`
    HexShort,
    /// `#rgba`
    HexShortWithAlpha,
    /// The sixteen HTML 4 colour names.
    BasicNamedColors,
    /// The SVG/X11 colour names.
    ExtendedNamedColors,
    /// System colours such as `Canvas`.
    SystemColors,
    /// `transparent` and `currentColor`.
    Keywords,
    /// `rgb(r, g, b)`
    Rgb,
    /// `rgba(r, g, b, a)`
    Rgba,
    /// `hsl(h, s%, l%)`
    Hsl,
    /// `hsla(h, s%, l%, a)`
    Hsla,
}

impl CssColorFormat {
    /// Every notation.
    pub const ALL: [Self; 12] = [
        Self::HexLong,
        Self::HexLongWithAlpha,
        Self::HexShort,
        Self::HexShortWithAlpha,
        Self::BasicNamedColors,
        Self::ExtendedNamedColors,
        Self::SystemColors,
        Self::Keywords,
        Self::Rgb,
        Self::Rgba,
        Self::Hsl,
        Self::Hsla,
    ];

    /// Returns `true` if `color` is written in this notation.
    pub fn matches(self, color: &str) -> bool {
        let named = |names: &[&str]| names.iter().any(|name| name.eq_ignore_ascii_case(color));
        match self {
            Self::HexLong => HEX_LONG.is_match(color),
            Self::HexLongWithAlpha => HEX_LONG_WITH_ALPHA.is_match(color),
            Self::HexShort => HEX_SHORT.is_match(color),
            Self::HexShortWithAlpha => HEX_SHORT_WITH_ALPHA.is_match(color),
            Self::BasicNamedColors => named(BASIC_NAMED_COLORS),
            Self::ExtendedNamedColors => named(EXTENDED_NAMED_COLORS),
            Self::SystemColors => named(SYSTEM_COLORS),
            Self::Keywords => named(KEYWORDS),
            Self::Rgb => RGB.is_match(color),
            Self::Rgba => RGBA.is_match(color),
            Self::Hsl => HSL.is_match(color),
            Self::Hsla => HSLA.is_match(color),
        }
    }
}

/// The value must be a CSS colour in one of the configured notations.
/// Names and hex digits are matched case-insensitively.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "CssColorOptions")]
pub struct CssColor {
    formats: Vec<CssColorFormat>,
    message: Option<String>,
    pub(crate) groups: Groups,
}

impl Default for CssColor {
    fn default() -> Self {
        Self {
            formats: CssColorFormat::ALL.to_vec(),
            message: None,
            groups: Groups::default(),
        }
    }
}

impl CssColor {
    crate::error_codes! {
        INVALID_FORMAT_ERROR = "454ab47b-aacf-4059-8f26-184b2dc9d48d";
    }

    const MESSAGE: &'static str = "This value is not a valid CSS color.";

    /// Accepts only `formats`, which must not be empty.
    pub fn new(formats: impl IntoIterator<Item = CssColorFormat>) -> Result<Self, DefinitionError> {
        Self::try_from(CssColorOptions {
            formats: Some(formats.into_iter().collect()),
            ..CssColorOptions::default()
        })
    }

    /// Message override.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Accepted notations.
    pub fn formats(&self) -> &[CssColorFormat] {
        &self.formats
    }
}

impl Validate for CssColor {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(color) = text_input(value)? else {
            return Ok(());
        };
        if !self.formats.iter().any(|format| format.matches(&color)) {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, Self::INVALID_FORMAT_ERROR);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CssColorOptions {
    formats: Option<Vec<CssColorFormat>>,
    message: Option<String>,
    groups: Groups,
}

impl TryFrom<CssColorOptions> for CssColor {
    type Error = DefinitionError;

    fn try_from(options: CssColorOptions) -> Result<Self, Self::Error> {
        let formats = match options.formats {
            None => CssColorFormat::ALL.to_vec(),
            Some(formats) if formats.is_empty() => {
                return Err(DefinitionError::invalid_option(
                    "CssColor",
                    "formats",
                    "at least one format is required",
                ));
            }
            Some(formats) => formats,
        };
        Ok(Self {
            formats,
            message: options.message,
            groups: options.groups,
        })
    }
}
