//! Generic parsing traits for procfs statistics files.
//!
//! # Traits
//!
//! - [`KeyValueStat`]: multi-line `key: value [unit]` files such as `/proc/self/status`
//!   and `/proc/self/io`.
//! - [`SingleLineStat`]: files holding one line of whitespace-separated fields,
//!   such as `/proc/self/stat`.
//!
//! # Example: Implementing `KeyValueStat`
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::LazyLock;
//! use procrec::source::KeyValueStat;
//!
//! #[derive(Default)]
//! struct MyStat {
//!     foo: u64,
//! }
//!
//! static HANDLERS: LazyLock<HashMap<&'static str, fn(&mut MyStat, u64)>> = LazyLock::new(|| {
//!     let mut map: HashMap<&'static str, fn(&mut MyStat, u64)> = HashMap::new();
//!     map.insert("foo", |stat, v| stat.foo = v);
//!     map
//! });
//!
//! impl KeyValueStat for MyStat {
//!     fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
//!         &HANDLERS
//!     }
//! }
//!
//! let stat = MyStat::from_reader(&mut "foo: 42\nbar: 1\n".as_bytes()).unwrap();
//! assert_eq!(stat.foo, 42);
//! ```

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use super::StatParseError;

/// A trait for parsing `key<separator> value` style procfs files.
///
/// Only the first whitespace-separated token after the separator is parsed; a
/// trailing unit such as `kB` is left to the field handler to interpret.
/// Lines without the separator and keys without a handler are ignored.
pub trait KeyValueStat: Default
where
    Self: 'static,
{
    /// Character terminating the key on each line.
    const SEPARATOR: char = ':';

    /// If `false`, encountering the same known key twice is an error.
    const ALLOW_DUPLICATE_KEYS: bool = false;

    /// Known field names and the handlers applying their parsed values.
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)>;

    /// Parses a buffered reader into a populated `Self`.
    ///
    /// Stops early once every known key has been seen, unless duplicates are allowed.
    ///
    /// # Errors
    /// Returns an `io::Error` if reading fails, or a `StatParseError` wrapped in `io::Error`
    /// if a known key carries an unparsable or duplicated value.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut stat = Self::default();
        let handlers = Self::field_handlers();
        let field_count = handlers.len();
        let mut seen_keys = HashSet::with_capacity(field_count);

        let mut line = String::new();
        let mut lineno = 0;
        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            Self::parse_line(&mut stat, &line, lineno, handlers, &mut seen_keys)?;
            if !Self::ALLOW_DUPLICATE_KEYS && seen_keys.len() == field_count {
                break;
            }

            line.clear();
        }

        Ok(stat)
    }

    /// Parses a single line and applies its value if the key is known.
    fn parse_line(
        stat: &mut Self,
        line: &str,
        lineno: usize,
        handlers: &HashMap<&'static str, fn(&mut Self, u64)>,
        seen_keys: &mut HashSet<&'static str>,
    ) -> std::io::Result<()> {
        let Some((key, rest)) = line.split_once(Self::SEPARATOR) else {
            return Ok(());
        };
        let key = key.trim();
        let Some((k, handler)) = handlers.get_key_value(key) else {
            return Ok(());
        };

        let val = rest.split_whitespace().next().unwrap_or("");
        let parsed = val
            .parse::<u64>()
            .map_err(|source| StatParseError::InvalidKeyValue {
                key: key.to_string(),
                value: val.to_string(),
                line: lineno,
                source,
            })?;
        if !Self::ALLOW_DUPLICATE_KEYS && !seen_keys.insert(k) {
            return Err(StatParseError::DuplicateField {
                field: key.to_string(),
                line: lineno,
            }
            .into());
        }
        handler(stat, parsed);

        Ok(())
    }
}

/// A trait for parsing single-line statistics files.
pub trait SingleLineStat: Sized + Default {
    /// Parses the statistic from the provided buffered reader.
    ///
    /// # Errors
    /// Returns an `io::Error` if reading or parsing fails.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self>;
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::source::error::extract_stat_parse_error;

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        a: u64,
        b: u64,
    }

    static PAIR_HANDLERS: LazyLock<HashMap<&'static str, fn(&mut Pair, u64)>> =
        LazyLock::new(|| {
            let mut m: HashMap<&'static str, fn(&mut Pair, u64)> = HashMap::new();
            m.insert("a", |p, v| p.a = v);
            m.insert("b", |p, v| p.b = v);
            m
        });

    impl KeyValueStat for Pair {
        fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
            &PAIR_HANDLERS
        }
    }

    #[test]
    fn test_parse_ignores_units_and_unknown_keys() {
        let data = "\
Name:\tprocrec
a:\t   1024 kB
garbage line
b: 7
";
        let stat = Pair::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat, Pair { a: 1024, b: 7 });
    }

    #[test]
    fn test_parse_stops_after_all_keys_seen() {
        let data = "a: 1\nb: 2\na: not-parsed\n";
        let stat = Pair::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat, Pair { a: 1, b: 2 });
    }

    #[test]
    fn test_parse_invalid_value() {
        let data = "a: 1\nb: xyz\n";
        let err = Pair::from_reader(&mut data.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        match extract_stat_parse_error(&err) {
            StatParseError::InvalidKeyValue {
                key, value, line, ..
            } => {
                assert_eq!(key, "b");
                assert_eq!(value, "xyz");
                assert_eq!(*line, 2);
            }
            _ => panic!("Expected InvalidKeyValue error"),
        }
    }

    #[test]
    fn test_parse_duplicate_field() {
        let data = "a: 1\na: 2\n";
        let err = Pair::from_reader(&mut data.as_bytes()).unwrap_err();
        match extract_stat_parse_error(&err) {
            StatParseError::DuplicateField { field, line } => {
                assert_eq!(field, "a");
                assert_eq!(*line, 2);
            }
            _ => panic!("Expected DuplicateField error"),
        }
    }
}
