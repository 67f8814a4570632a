//! Turning a viewer's query string into navigation commands.
//!
//! The browser client sends its input as an ordinary query string:
//! `newpt=R|D` after a click, `in` or `out` after a key press, and the
//! form fields `x`, `y`, `w`, `num`, `r`, `m` and `col` when the
//! viewer types in new settings.  This module only checks that each
//! value is a well-formed number; whether the value is acceptable is
//! the session's business.

use std::str::FromStr;

use crate::errors::{MandelError, Result};
use crate::planes::Pixel;

/// One navigation or override, in the order it appeared.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    /// Move the center to the point under this pixel.
    Recenter(Pixel),
    /// Shrink the half-width to three quarters.
    ZoomIn,
    /// Double the half-width.
    ZoomOut,
    /// New real part of the center.
    CenterX(f64),
    /// New imaginary part of the center.
    CenterY(f64),
    /// New horizontal half-width.
    HalfWidth(f64),
    /// New iteration budget.
    Iterations(u32),
    /// New chunk size, in units of 1024 pixels.
    Chunk(usize),
    /// New worker count.
    Workers(usize),
    /// New color density.
    Density(u32),
}

/// A parsed query string: the commands that parsed, and an error for
/// each value that did not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Request {
    /// Well-formed commands, in query order.
    pub commands: Vec<Command>,
    /// One entry per malformed value.
    pub errors: Vec<MandelError>,
}

/// Given a string and a separator, returns the two values
/// separated by the separator.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn number<T: FromStr>(key: &str, value: &str, what: &str) -> Result<T> {
    T::from_str(value.trim()).map_err(|_| MandelError::invalid(key, value, what))
}

fn command(key: &str, value: &str) -> Option<Result<Command>> {
    let parsed = match key {
        "newpt" => parse_pair::<usize>(&value.replace("%7C", "|").replace("%7c", "|"), '|')
            .map(|(right, down)| Command::Recenter(Pixel::new(right, down)))
            .ok_or_else(|| MandelError::invalid(key, value, "expected RIGHT|DOWN pixel offsets")),
        "in" => Ok(Command::ZoomIn),
        "out" => Ok(Command::ZoomOut),
        "x" => number(key, value, "not a number").map(Command::CenterX),
        "y" => number(key, value, "not a number").map(Command::CenterY),
        "w" => number(key, value, "not a number").map(Command::HalfWidth),
        "num" => number(key, value, "not a whole number").map(Command::Iterations),
        "r" => number(key, value, "not a whole number").map(Command::Chunk),
        "m" => number(key, value, "not a whole number").map(Command::Workers),
        "col" => number(key, value, "not a whole number").map(Command::Density),
        _ => return None,
    };
    Some(parsed)
}

impl Request {
    /// Parse `key=value&key=value...`.  A leading `?` is skipped,
    /// unknown keys are ignored, and `in`/`out` need no value.
    pub fn parse(query: &str) -> Request {
        let mut request = Request::default();
        let query = query.trim_start_matches('?');
        for field in query.split('&').filter(|f| !f.is_empty()) {
            let (key, value) = match field.find('=') {
                Some(index) => (&field[..index], &field[index + 1..]),
                None => (field, ""),
            };
            match command(key, value) {
                Some(Ok(c)) => request.commands.push(c),
                Some(Err(e)) => request.errors.push(e),
                None => (),
            }
        }
        request
    }

    /// True when the request carries nothing at all.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_queries_carry_nothing() {
        assert!(Request::parse("").is_empty());
        assert!(Request::parse("?").is_empty());
        assert!(Request::parse("?foo=1&bar").is_empty());
    }

    #[test]
    fn click_and_zoom() {
        let r = Request::parse("?newpt=300|200");
        assert_eq!(r.commands, vec![Command::Recenter(Pixel::new(300, 200))]);
        let r = Request::parse("newpt=3%7C2&in=1");
        assert_eq!(
            r.commands,
            vec![Command::Recenter(Pixel::new(3, 2)), Command::ZoomIn]
        );
        assert_eq!(Request::parse("out").commands, vec![Command::ZoomOut]);
    }

    #[test]
    fn form_fields_keep_query_order() {
        let r = Request::parse("x=-0.72765&y=0.2136&w=0.0000003375&num=160&r=64&m=7&col=12");
        assert!(r.errors.is_empty());
        assert_eq!(
            r.commands,
            vec![
                Command::CenterX(-0.72765),
                Command::CenterY(0.2136),
                Command::HalfWidth(0.0000003375),
                Command::Iterations(160),
                Command::Chunk(64),
                Command::Workers(7),
                Command::Density(12),
            ]
        );
    }

    #[test]
    fn malformed_values_are_reported_not_dropped_silently() {
        let r = Request::parse("num=lots&x=0.5&newpt=12&col=1.2");
        assert_eq!(r.commands, vec![Command::CenterX(0.5)]);
        assert_eq!(r.errors.len(), 3);
        assert_eq!(
            r.errors[0],
            MandelError::invalid("num", "lots", "not a whole number")
        );
        match r.errors[1] {
            MandelError::InvalidParameter { ref name, .. } => assert_eq!(name, "newpt"),
            ref other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn negative_whole_numbers_are_malformed() {
        let r = Request::parse("m=-4");
        assert!(r.commands.is_empty());
        assert_eq!(r.errors.len(), 1);
    }
}
