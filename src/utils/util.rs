use itertools::Itertools;
use std::fmt::Display;

pub type Result<T> = std::result::Result<T, String>;

pub fn handle_error_and_exit(err: String) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

/// Joins items with `sep`, or returns `.` when there are none.
pub fn join_or_missing<I>(items: I, sep: &str) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let joined = items.into_iter().join(sep);
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
