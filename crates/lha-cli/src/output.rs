//! Terminal output formatting.

use colored::Colorize;
use lha_core::form::Message;
use lha_core::settings::Settings;

/// Print the administrator settings with the API key masked.
pub fn print_settings(settings: &Settings) {
    let api_key = if settings.has_api_key() {
        settings.masked_api_key().normal()
    } else {
        "not configured".dimmed()
    };
    let email = if settings.notifications_enabled() {
        settings.notification_email.normal()
    } else {
        "off".dimmed()
    };

    println!("{}: {}", "API key".bold(), api_key);
    println!("{}: {}", "Notification email".bold(), email);
}

/// Print the calculator message area in the colour of its state.
pub fn print_message(message: &Message) {
    match message {
        Message::Hidden => {}
        Message::Error(text) => println!("{} {}", "✗".red().bold(), text.red()),
        Message::Info(text) => println!("{} {}", "→".blue().bold(), text.cyan()),
        Message::Success(text) => println!("{} {}", "✓".green().bold(), text.green().bold()),
    }
}
