use colored::{Color, Colorize};

/// Prints the given string with the given color.
///
/// ## Example
/// ```
/// use citopt::utils::utils_console::{planner_print, PrintMode, PrintColor};
/// planner_print("test", PrintMode::Print, PrintColor::Blue, false);
/// ```
pub fn planner_print(s: &str, mode: PrintMode, color: PrintColor, bolded: bool) {
    let mut string = s.normal();
    if bolded { string = string.bold(); }
    if &color != &PrintColor::None {
        string = string.color(color.get_color());
    }
    match mode {
        PrintMode::Println => { println!("{}", string); }
        PrintMode::Print => { print!("{}", string); }
    }
}

pub fn planner_print_new_line() {
    planner_print("\n", PrintMode::Print, PrintColor::None, false);
}

/// Println will cause a new line after each line, while Print will not.
#[derive(Clone, Debug)]
pub enum PrintMode {
    Println,
    Print
}

/// Defines color for a planner print command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrintColor {
    None,
    Blue,
    Green,
    Red,
    Yellow,
    Cyan,
    Magenta
}
impl PrintColor {
    pub fn get_color(&self) -> Color {
        match self {
            PrintColor::None => { Color::White }
            PrintColor::Blue => { Color::Blue }
            PrintColor::Green => { Color::Green }
            PrintColor::Red => { Color::Red }
            PrintColor::Yellow => { Color::Yellow }
            PrintColor::Cyan => { Color::Cyan }
            PrintColor::Magenta => { Color::Magenta }
        }
    }
}
