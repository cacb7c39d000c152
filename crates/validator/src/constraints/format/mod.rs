//! String format constraints: patterns, addresses and notations.

mod css_color;
mod email;
mod hostname;
mod ip;
mod json;
mod regex;
mod url;

pub use self::css_color::{CssColor, CssColorFormat};
pub use self::email::{Email, EmailMode};
pub use self::hostname::Hostname;
pub use self::ip::{Ip, IpVersion};
pub use self::json::Json;
pub use self::regex::Regex;
pub use self::url::Url;
