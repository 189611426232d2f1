use std::sync::OnceLock;

use regex::Regex;
use scraper::Selector;

/// A compiled pattern that can live in a `static`.
pub trait Pattern: Sized {
    fn compile(source: &str) -> Result<Self, String>;
}

impl Pattern for Selector {
    fn compile(source: &str) -> Result<Self, String> {
        Self::parse(source).map_err(|e| format!("{e:?}"))
    }
}

impl Pattern for Regex {
    fn compile(source: &str) -> Result<Self, String> {
        Self::new(source).map_err(|e| e.to_string())
    }
}

#[derive(Debug)]
pub struct Static<T> {
    cell: OnceLock<T>,
    source: &'static str,
}

impl<T> Static<T> {
    pub const fn new(source: &'static str) -> Self {
        Self {
            cell: OnceLock::new(),
            source,
        }
    }
}

impl<T: Pattern> core::ops::Deref for Static<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.cell
            .get_or_init(|| match T::compile(self.source) {
                Ok(pattern) => pattern,
                Err(e) => panic!("Error compiling static pattern {}: {e}", self.source),
            })
    }
}

#[macro_export]
macro_rules! static_selector {
    ($x: ident <- $sel: literal) => {
        static $x: $crate::parse::statics::Static<scraper::Selector> =
            $crate::parse::statics::Static::new($sel);
    };
}

#[macro_export]
macro_rules! static_regex {
    ($x: ident <- $re: literal) => {
        static $x: $crate::parse::statics::Static<regex::Regex> =
            $crate::parse::statics::Static::new($re);
    };
}
