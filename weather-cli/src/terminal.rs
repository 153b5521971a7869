use std::io::Write;

use weather_core::{PresentationSink, WeatherView};

/// Presents lookups on the terminal: the card on stdout, status and errors on stderr.
#[derive(Debug, Default)]
pub struct TerminalSink {
    /// Print the view as JSON instead of a card.
    pub json: bool,
}

impl TerminalSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl PresentationSink for TerminalSink {
    fn show_loading(&self) {
        if !self.json {
            eprint!("Fetching weather...");
            let _ = std::io::stderr().flush();
        }
    }

    fn hide_loading(&self) {
        if !self.json {
            eprint!("\r\x1b[2K");
            let _ = std::io::stderr().flush();
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn hide_error(&self) {}

    fn render(&self, view: &WeatherView) {
        if self.json {
            match serde_json::to_string_pretty(view) {
                Ok(text) => println!("{text}"),
                Err(err) => eprintln!("error: failed to serialize weather view: {err}"),
            }
        } else {
            println!("{}", card(view));
        }
    }

    fn clear(&self) {}
}

fn card(view: &WeatherView) -> String {
    format!(
        "{location}\n\
         {observed}\n\
         \n\
         {temp}°C  {description}\n\
         \n\
         Humidity    {humidity}\n\
         Wind        {wind}\n\
         Feels like  {feels_like}\n\
         Visibility  {visibility}\n\
         Icon        {icon}",
        location = view.location_label,
        observed = view.observed_at_text(),
        temp = view.temperature_text(),
        description = view.description,
        humidity = view.humidity_text(),
        wind = view.wind_text(),
        feels_like = view.feels_like_text(),
        visibility = view.visibility_text(),
        icon = view.icon_url(),
    )
}
