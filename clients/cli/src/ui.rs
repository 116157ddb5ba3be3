use basecamp_client::listing::Cell;
use basecamp_client::StatusTone;
use colored::Colorize;
use once_cell::sync::Lazy;

static SHOULD_COLORIZE: Lazy<bool> = Lazy::new(|| {
    colored::control::ShouldColorize::from_env().should_colorize()
});

pub trait FancyToString {
    fn fancy(&self) -> String;
}

/// Convenience to enable fancy() on Option<T>
impl<T> FancyToString for Option<T>
where
    T: FancyToString,
{
    fn fancy(&self) -> String {
        match self {
            | Some(t) => t.fancy(),
            | None => "".to_string(),
        }
    }
}

impl FancyToString for Cell {
    fn fancy(&self) -> String {
        match self {
            | Cell::Text(s) | Cell::Date(s) => s.clone(),
            | Cell::Badge { label, tone } => paint(label, *tone),
            | Cell::Switch(true) => format!("{}{}", emoji("✅"), "on".green()),
            | Cell::Switch(false) => format!("{}{}", emoji("⬜"), "off".dimmed()),
        }
    }
}

fn paint(label: &str, tone: StatusTone) -> String {
    match tone {
        | StatusTone::Green => label.green().to_string(),
        | StatusTone::Orange => {
            format!("{}{}", emoji("🔸"), label.yellow())
        }
        | StatusTone::Red => format!("{}{}", emoji("✖️"), label.red()),
        | StatusTone::Gray => label.dimmed().to_string(),
    }
}

/// Respects NO_COLOR environment variable to avoid showing emojis if tty can't
/// display them.
pub fn emoji(s: &str) -> String {
    if *SHOULD_COLORIZE {
        format!("{} ", s)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_cells() {
        colored::control::set_override(false);
        assert_eq!("Everest", Cell::Text("Everest".to_owned()).fancy());
        assert_eq!("2024-03-01", Cell::Date("2024-03-01".to_owned()).fancy());
        assert!(Cell::Switch(true).fancy().ends_with("on"));
        assert!(Cell::Switch(false).fancy().ends_with("off"));
        assert_eq!("", None::<Cell>.fancy());
    }
}
