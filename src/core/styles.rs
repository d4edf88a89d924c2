//! Style roles for `dstate` output
//!
//! Each logical role maps to an optional `colored::Color`. Colouring is
//! applied only when the caller passes `enabled = true`, so there is no
//! global colour state.
//!
//! ```
//! use delivery_state::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Owner", false), "Owner");
//! assert!(StyleRole::Header.paint("Owner", true).starts_with("\x1b["));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }

            pub fn ansi_code(self) -> Option<&'static str> {
                map_color_code(self.color()?)
            }

            pub fn paint(self, text: &str, enabled: bool) -> String {
                if !enabled {
                    return text.to_string();
                }
                match self.ansi_code() {
                    Some(code) => format!("\x1b[{}m{}\x1b[0m", code, text),
                    None => text.to_string(),
                }
            }

            /// prettytable cell style spec, e.g. `Fy` for a yellow foreground
            pub fn table_spec(self, enabled: bool) -> &'static str {
                if !enabled {
                    return "";
                }
                match self.color() {
                    Some(Color::Yellow) => "bFy",
                    Some(Color::Cyan) => "Fc",
                    Some(Color::Green) => "Fg",
                    Some(Color::BrightGreen) => "FG",
                    Some(Color::BrightRed) => "FR",
                    Some(Color::BrightBlack) => "FK",
                    _ => "",
                }
            }
        }
    };
}

style! {
    Header      => Some(Color::Yellow),
    Literal     => Some(Color::Cyan),
    Placeholder => Some(Color::Green),
    Key         => Some(Color::BrightGreen),
    Value       => None,
    Error       => Some(Color::BrightRed),
    Dim         => Some(Color::BrightBlack),
}

fn map_color_code(c: Color) -> Option<&'static str> {
    match c {
        Color::Green => Some("32"),
        Color::Yellow => Some("33"),
        Color::Cyan => Some("36"),
        Color::BrightBlack => Some("90"),
        Color::BrightRed => Some("91"),
        Color::BrightGreen => Some("92"),
        _ => None,
    }
}

fn color_to_ansi(c: Color) -> Option<AnsiColor> {
    Some(match c {
        Color::Green => AnsiColor::Green,
        Color::Yellow => AnsiColor::Yellow,
        Color::Cyan => AnsiColor::Cyan,
        Color::BrightBlack => AnsiColor::BrightBlack,
        Color::BrightRed => AnsiColor::BrightRed,
        Color::BrightGreen => AnsiColor::BrightGreen,
        _ => return None,
    })
}

/// clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(color_to_ansi) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Literal, false))
        .placeholder(style(StyleRole::Placeholder, false))
        .error(style(StyleRole::Error, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_code_header() {
        assert_eq!(StyleRole::Header.ansi_code(), Some("33"));
        assert_eq!(StyleRole::Value.ansi_code(), None);
    }

    #[test]
    fn paint_enabled_disabled() {
        let colored = StyleRole::Key.paint("17", true);
        assert!(colored.starts_with("\x1b[92m") && colored.ends_with("\x1b[0m"));
        assert_eq!(StyleRole::Key.paint("17", false), "17");
        assert_eq!(StyleRole::Value.paint("17", true), "17");
    }

    #[test]
    fn table_spec_only_when_enabled() {
        assert_eq!(StyleRole::Header.table_spec(true), "bFy");
        assert_eq!(StyleRole::Header.table_spec(false), "");
        assert_eq!(StyleRole::Dim.table_spec(true), "FK");
    }

    #[test]
    fn palette_to_clap_differs_when_enabled() {
        let plain_dbg = format!("{:?}", palette_to_clap(false));
        let styled_dbg = format!("{:?}", palette_to_clap(true));
        assert_ne!(plain_dbg, styled_dbg);
    }
}
