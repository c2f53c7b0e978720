//! Colors used for rendering demangled symbols in a terminal.
use std::borrow::Cow;
use std::fmt;

/// 24-bit color assigned to a rendered token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Escape sequence that switches the terminal foreground to this color.
    pub fn ansi_fg(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }

    pub const ANSI_RESET: &'static str = "\x1b[0m";
}

/// Currently used global colorscheme
pub type Colors = IBM;

/// Categories of a rendered symbol.
pub trait ColorScheme {
    /// `(`, `<`, backticks and other grouping.
    fn brackets() -> &'static Color;

    /// `::` and `, `.
    fn separator() -> &'static Color;

    /// User written names.
    fn identifier() -> &'static Color;

    fn spacing() -> &'static Color {
        &colors::WHITE
    }

    /// Builtin types and `operator` names.
    fn keyword() -> &'static Color {
        Self::identifier()
    }

    /// Access specifiers and calling conventions.
    fn storage() -> &'static Color {
        Self::keyword()
    }

    /// cv-qualifiers, template brackets and `noexcept`.
    fn qualifier() -> &'static Color {
        Self::keyword()
    }

    /// Names made up by the compiler such as `` `vftable' `` or `[thunk]:`.
    fn generated() -> &'static Color {
        Self::identifier()
    }
}

pub struct IBM;

impl ColorScheme for IBM {
    fn brackets() -> &'static Color {
        &colors::GRAY99
    }

    fn separator() -> &'static Color {
        &colors::GRAY40
    }

    fn identifier() -> &'static Color {
        &colors::MAGENTA
    }

    fn keyword() -> &'static Color {
        &colors::PURPLE
    }

    fn storage() -> &'static Color {
        &colors::GREEN
    }

    fn qualifier() -> &'static Color {
        &colors::BLUE
    }

    fn generated() -> &'static Color {
        &colors::RED
    }
}

pub mod colors {
    //! IBM inspired colors.

    use super::Color;

    pub const WHITE: Color = Color::from_rgb(0xff, 0xff, 0xff);
    pub const BLUE: Color = Color::from_rgb(0x0f, 0x62, 0xfe);
    pub const MAGENTA: Color = Color::from_rgb(0xf5, 0x12, 0x81);
    pub const RED: Color = Color::from_rgb(0xff, 0x00, 0x0b);
    pub const PURPLE: Color = Color::from_rgb(0x89, 0x1f, 0xff);
    pub const GREEN: Color = Color::from_rgb(0x02, 0xed, 0x6e);
    pub const GRAY40: Color = Color::from_rgb(0x40, 0x40, 0x40);
    pub const GRAY99: Color = Color::from_rgb(0x99, 0x99, 0x99);
}

/// Fragment of a rendered symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'txt> {
    pub text: Cow<'txt, str>,
    pub color: &'static Color,
}

impl<'txt> Token<'txt> {
    pub fn from_string(text: String, color: &'static Color) -> Self {
        Self {
            text: Cow::Owned(text),
            color,
        }
    }

    pub fn from_str(text: &'static str, color: &'static Color) -> Self {
        Self {
            text: Cow::Borrowed(text),
            color,
        }
    }

    /// Wraps the token's text in the escape sequences of its color.
    pub fn ansi(&self) -> String {
        format!("{}{}{}", self.color.ansi_fg(), self.text, Color::ANSI_RESET)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl ColorScheme for Plain {
        fn brackets() -> &'static Color {
            &colors::WHITE
        }

        fn separator() -> &'static Color {
            &colors::WHITE
        }

        fn identifier() -> &'static Color {
            &colors::MAGENTA
        }
    }

    #[test]
    fn categories_fall_back() {
        assert_eq!(Plain::keyword(), &colors::MAGENTA);
        assert_eq!(Plain::storage(), Plain::keyword());
        assert_eq!(Plain::generated(), Plain::identifier());
        assert_eq!(IBM::spacing(), &colors::WHITE);
        assert_ne!(IBM::storage(), IBM::identifier());
    }

    #[test]
    fn ansi_escape() {
        let token = Token::from_str("int", Colors::keyword());
        assert_eq!(token.ansi(), "\x1b[38;2;137;31;255mint\x1b[0m");
        assert_eq!(token.to_string(), "int");
    }

    #[test]
    fn owned_and_borrowed() {
        let a = Token::from_string(String::from("fn3"), Colors::identifier());
        let b = Token::from_str("fn3", Colors::identifier());
        assert_eq!(a, b);
    }
}
