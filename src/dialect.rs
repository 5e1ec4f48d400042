// Dialect configuration: the set of plain constructor arguments that
// describe how a delimited-text file is laid out. Threaded through
// `RegionIndexer` and `ParallelIndexBuilder` by value, the same
// `*_with_config` shape used throughout this crate for separator/escape/
// newline options.

use crate::error::{IndexError, Result};

/// How a row with the wrong number of fields is reconciled against the
/// column count established by the header (or the first row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaggedRowPolicy {
    /// Pad short rows with empty cells, fold extra fields into the last
    /// retained column. This is the default.
    #[default]
    PadAndTruncate,
}

#[derive(Debug, Clone)]
pub struct DialectConfig {
    pub delim: Vec<u8>,
    pub quote: Option<u8>,
    pub trim_ws: bool,
    pub escape_double: bool,
    pub escape_backslash: bool,
    pub has_header: bool,
    pub skip_lines: usize,
    pub n_max: Option<usize>,
    pub comment_char: Option<u8>,
    pub num_threads: usize,
    pub progress: bool,
    pub ragged_row_policy: RaggedRowPolicy,
}

impl DialectConfig {
    /// A config with field separator `delim` and otherwise CSV-like defaults.
    pub fn new(delim: impl Into<Vec<u8>>) -> Result<Self> {
        let cfg = Self {
            delim: delim.into(),
            ..Self::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_quote(mut self, quote: Option<u8>) -> Result<Self> {
        self.quote = quote;
        self.validate()?;
        Ok(self)
    }

    pub fn with_trim_ws(mut self, trim_ws: bool) -> Self {
        self.trim_ws = trim_ws;
        self
    }

    pub fn with_escape_double(mut self, on: bool) -> Self {
        self.escape_double = on;
        self
    }

    pub fn with_escape_backslash(mut self, on: bool) -> Self {
        self.escape_backslash = on;
        self
    }

    pub fn with_has_header(mut self, on: bool) -> Self {
        self.has_header = on;
        self
    }

    pub fn with_skip_lines(mut self, n: usize) -> Self {
        self.skip_lines = n;
        self
    }

    pub fn with_n_max(mut self, n: Option<usize>) -> Self {
        self.n_max = n;
        self
    }

    pub fn with_comment_char(mut self, c: Option<u8>) -> Result<Self> {
        self.comment_char = c;
        self.validate()?;
        Ok(self)
    }

    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = n.max(1);
        self
    }

    pub fn with_progress(mut self, on: bool) -> Self {
        self.progress = on;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.delim.is_empty() {
            return Err(IndexError::InvalidDialect(
                "delim must not be empty".into(),
            ));
        }
        if let Some(q) = self.quote {
            if q == self.delim[0] {
                return Err(IndexError::InvalidDialect(
                    "quote character must differ from the first delimiter byte".into(),
                ));
            }
        }
        if let Some(c) = self.comment_char {
            if c == self.delim[0] {
                return Err(IndexError::InvalidDialect(
                    "comment_char must differ from the first delimiter byte".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            delim: vec![b','],
            quote: Some(b'"'),
            trim_ws: false,
            escape_double: true,
            escape_backslash: false,
            has_header: true,
            skip_lines: 0,
            n_max: None,
            comment_char: None,
            num_threads: crate::parallel::recommended_threads(),
            progress: false,
            ragged_row_policy: RaggedRowPolicy::PadAndTruncate,
        }
    }
}
