//! Colored terminal output honoring the no-color and verbose modes.

// std imports
use std::fmt;

// third-party imports
use owo_colors::{AnsiColors, OwoColorize, Style};
use strum::{Display, EnumIter};

// local imports
use crate::states;

// ---

const DIM: Style = Style::new().dimmed();
const HIGHLIGHT: Style = Style::new().bold();

/// The 16 ANSI terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
    LightWhite,
}

impl Color {
    /// Alias of [`Color::DarkGray`].
    pub const LIGHT_BLACK: Color = Color::DarkGray;
}

impl From<Color> for AnsiColors {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => AnsiColors::Black,
            Color::Red => AnsiColors::Red,
            Color::Green => AnsiColors::Green,
            Color::Yellow => AnsiColors::Yellow,
            Color::Blue => AnsiColors::Blue,
            Color::Magenta => AnsiColors::Magenta,
            Color::Cyan => AnsiColors::Cyan,
            Color::White => AnsiColors::White,
            Color::DarkGray => AnsiColors::BrightBlack,
            Color::LightRed => AnsiColors::BrightRed,
            Color::LightGreen => AnsiColors::BrightGreen,
            Color::LightYellow => AnsiColors::BrightYellow,
            Color::LightBlue => AnsiColors::BrightBlue,
            Color::LightMagenta => AnsiColors::BrightMagenta,
            Color::LightCyan => AnsiColors::BrightCyan,
            Color::LightWhite => AnsiColors::BrightWhite,
        }
    }
}

// ---

/// Formats `args` in the given color.
pub fn to_color(color: Color, args: fmt::Arguments) -> String {
    paint(Style::new().color(AnsiColors::from(color)), args, colorize())
}

/// Formats `args` dimmed.
pub fn to_dim(args: fmt::Arguments) -> String {
    paint(DIM, args, colorize())
}

/// Formats `args` highlighted.
pub fn to_highlight(args: fmt::Arguments) -> String {
    paint(HIGHLIGHT, args, colorize())
}

/// Prints a colored line to stdout.
pub fn colored(color: Color, args: fmt::Arguments) {
    println!("{}", to_color(color, args));
}

/// Prints a dimmed line to stdout.
pub fn dim(args: fmt::Arguments) {
    println!("{}", to_dim(args));
}

/// Prints a highlighted line to stdout.
pub fn highlight(args: fmt::Arguments) {
    println!("{}", to_highlight(args));
}

/// Prints `args` to stdout as is, without a trailing newline.
pub fn text(args: fmt::Arguments) {
    print!("{}", args);
}

/// Same as [`colored`] but only in verbose mode.
pub fn colored_v(color: Color, args: fmt::Arguments) {
    if states::env().is_verbose_mode() {
        colored(color, args);
    }
}

/// Same as [`dim`] but only in verbose mode.
pub fn dim_v(args: fmt::Arguments) {
    if states::env().is_verbose_mode() {
        dim(args);
    }
}

fn colorize() -> bool {
    !states::env().is_no_color_mode()
}

fn paint(style: Style, args: fmt::Arguments, colorize: bool) -> String {
    if colorize {
        args.style(style).to_string()
    } else {
        args.to_string()
    }
}
