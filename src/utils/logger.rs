use colored::{Color, Colorize};
use env_logger::Builder;
use log::Level;
use std::io::Write;

pub fn setup_logging(verbose: bool) {
    use log::LevelFilter;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level) // Our crate: use requested level
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        Level::Error => "ERROR".red(),
                        _ => unreachable!(),
                    };
                    let path = record.target().to_string().white();
                    format!("[{} {} {}] {}", name.cyan(), level_str, path, record.args())
                }
                _ => format!("[{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .init();
}

/// Terminal palette shared by the logger and the report.
pub struct Colors;

impl Colors {
    /// Per-depth colors for report rows; depth 0 (and every 7th level) is uncolored.
    pub const LEVELS: [Option<Color>; 7] = [
        None,
        Some(Color::BrightCyan),
        Some(Color::BrightMagenta),
        Some(Color::Blue),
        Some(Color::Magenta),
        Some(Color::Cyan),
        Some(Color::BrightBlue),
    ];
    pub const HEADER: Color = Color::Blue;
    pub const VALUE: Color = Color::Green;
    pub const SHARE_LOW: Color = Color::Red;
    pub const SHARE_MID: Color = Color::Yellow;
    pub const SHARE_HIGH: Color = Color::Green;

    pub fn for_depth(depth: usize) -> Option<Color> {
        Self::LEVELS[depth % Self::LEVELS.len()]
    }

    /// Color a string, or leave it plain for `None`.
    pub fn paint(color: Option<Color>, s: &str) -> String {
        match color {
            Some(c) => s.color(c).to_string(),
            None => s.to_string(),
        }
    }
}
