use std::{fmt, sync::OnceLock};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BLACK: &str = "\x1b[30m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Warn = 2,
    Error = 3,
    Off = 4,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Level::Trace => BLACK,
            Level::Debug => CYAN,
            Level::Warn => YELLOW,
            Level::Error => RED,
            Level::Off => "",
        }
    }
}

static THRESHOLD: OnceLock<Level> = OnceLock::new();

fn get_threshold() -> Level {
    // An uninitialized logger stays silent.
    THRESHOLD.get().copied().unwrap_or(Level::Off)
}

/// Sets the process-wide log threshold. The first call wins, so tests may
/// initialize in any order without tripping each other.
pub fn log_init(level: Level) {
    let _ = THRESHOLD.set(level);
}

pub fn log(
    level: Level,
    args: fmt::Arguments<'_>,
    file: &'static str,
    line: u32,
) {
    if level < get_threshold() {
        return;
    }
    println!(
        "{}{}\t[{}:{}]\t{}{}",
        level.color_code(),
        level.as_str(),
        file,
        line,
        args,
        RESET,
    );
}

// Or use unstable features to allow $$.
// #![feature(macro_metavar_expr)]

macro_rules! generate_log_macros {
    ($dollar:tt $($name:ident, $level:ident)*) => {
        $(
            #[macro_export]
            macro_rules! $name {
                ($dollar($args:tt)*) => {
                    $crate::log::log(
                        $crate::log::Level::$level,
                        format_args!($dollar($args)*),
                        file!(),
                        line!(),
                    )
                };
            }
        )*
    };
}

generate_log_macros!(
    $
    trace, Trace
    debug, Debug
    warn, Warn
    error, Error
);
