use colored::Colorize;
use lens_core::product::SeasonalTheme;
use strum::IntoEnumIterator;

pub fn run() {
    println!("{}", "Seasonal themes".bold());
    for theme in SeasonalTheme::iter() {
        println!(
            "  {:<12} {}",
            theme.to_string().bright_white(),
            theme.label().bright_black()
        );
    }
    println!();
    println!(
        "{}",
        "Pass one with --theme, or any free-text theme of your own.".bright_black()
    );
}
