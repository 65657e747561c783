//! Single-token command-line option comparison.
//!
//! The one operation here, [`OptionSpec::compare`], classifies the argv
//! element at a cursor against one candidate option (a short name, a long
//! name, or both), extracts its option-argument per policy, and reports how
//! many argv slots were consumed. An option-parsing loop probes each
//! candidate in turn against the current cursor position and advances by
//! [`Outcome::consumed`] on a match:
//!
//! ```
//! use argcmp::{Comparison, OptArg, OptionSpec};
//!
//! let argv = ["--file=notes.txt", "rest"].map(String::from);
//! let file = OptionSpec::new().short('f').long("file").arg(OptArg::Required);
//!
//! let out = file.compare(&argv);
//! assert_eq!(out.comparison, Comparison::LongOpt);
//! assert_eq!(out.value, Some("notes.txt"));
//! assert_eq!(out.rest(&argv), &argv[1..]);
//! ```

// ============================================================================
// Comparison — result tag
// ============================================================================

/// What kind of token was found at the cursor.
///
/// Variant order is part of the contract: every successful match compares
/// greater than [`Comparison::NoMatch`], so a single threshold test answers
/// "did anything match" (see [`Comparison::is_match`]). The structural
/// markers `-` and `--` sit above the threshold; the error tags sit below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Comparison {
    /// The long name matched with an inline `=value`, but the option takes
    /// no option-argument.
    OptArgUnexpected,
    /// Plain positional data; the token does not begin with `-`.
    NotAnOption,
    /// Caller bug: the cursor held no token, or an empty one.
    InternalError,
    /// Syntactically an option, but not this one.
    NoMatch,
    /// Matched the short name, e.g. `-f`.
    ShortOpt,
    /// Matched the long name, e.g. `--file` or `--file=x`.
    LongOpt,
    /// The lone `-`, reserved to mean standard input or output.
    Stdio,
    /// The `--` terminator: every following token is positional.
    EndOfOptions,
}

impl Comparison {
    /// True for any successful match, the structural markers included.
    pub fn is_match(self) -> bool {
        self > Comparison::NoMatch
    }

    /// True when the token matched as a named option, short or long.
    pub fn is_opt(self) -> bool {
        matches!(self, Comparison::ShortOpt | Comparison::LongOpt)
    }
}

// ============================================================================
// OptArg — option-argument policy
// ============================================================================

/// Whether the option accepts an option-argument, and on what terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptArg {
    /// No option-argument; an inline `=value` is a usage error.
    Forbidden,
    /// An option-argument may follow, but a following token that looks
    /// like another option is left unconsumed.
    Optional,
    /// An option-argument must follow; the next token is taken even if it
    /// begins with `-`. A missing value still surfaces as `None` — the
    /// caller decides whether to reject it.
    Required,
}

// ============================================================================
// OptionSpec — the option being probed for
// ============================================================================

/// Descriptor for one candidate option.
///
/// A spec with neither name configured never matches a named option; it is
/// a caller-contract violation and asserted against in debug builds.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec<'a> {
    short: Option<char>,
    long: Option<&'a str>,
    arg: OptArg,
}

impl<'a> OptionSpec<'a> {
    pub fn new() -> Self {
        OptionSpec {
            short: None,
            long: None,
            arg: OptArg::Forbidden,
        }
    }

    pub fn short(mut self, c: char) -> Self {
        self.short = Some(c);
        self
    }

    pub fn long(mut self, name: &'a str) -> Self {
        self.long = Some(name);
        self
    }

    pub fn arg(mut self, arg: OptArg) -> Self {
        self.arg = arg;
        self
    }

    /// Classify the token at the cursor (`argv[0]`) against this option.
    ///
    /// The comparator only reads; the caller owns the cursor and advances
    /// it by [`Outcome::consumed`] after a match. Calling again on the same
    /// slice yields the same outcome.
    pub fn compare<'v, S: AsRef<str>>(&self, argv: &'v [S]) -> Outcome<'v> {
        debug_assert!(
            self.short.is_some() || self.long.is_some(),
            "option probe with neither a short nor a long name"
        );

        let arg = match argv.first() {
            Some(s) => s.as_ref(),
            None => return Outcome::miss(Comparison::InternalError),
        };
        if arg.is_empty() {
            return Outcome::miss(Comparison::InternalError);
        }

        let body = match arg.strip_prefix('-') {
            Some(rest) => rest,
            // Not an option (options begin with -).
            None => return Outcome::miss(Comparison::NotAnOption),
        };

        if body.is_empty() {
            // Special filename for stdio (-).
            return Outcome::hit(Comparison::Stdio, 1, None);
        }

        match body.strip_prefix('-') {
            // Options terminator (--).
            Some("") => Outcome::hit(Comparison::EndOfOptions, 1, None),
            Some(name_part) => self.compare_long(name_part, argv),
            None => self.compare_short(body, argv),
        }
    }

    fn compare_long<'v, S: AsRef<str>>(&self, name_part: &'v str, argv: &'v [S]) -> Outcome<'v> {
        let long = match self.long {
            Some(l) => l,
            // Not expecting a long option; fail the match immediately.
            None => return Outcome::miss(Comparison::NoMatch),
        };

        let boundary = match name_part.strip_prefix(long) {
            Some(rest) => rest,
            None => return Outcome::miss(Comparison::NoMatch),
        };

        let inline = if boundary.is_empty() {
            None
        } else if let Some(v) = boundary.strip_prefix('=') {
            Some(v)
        } else {
            // The configured name is a strict prefix of this token's option
            // name (--file vs. --filename): not a match.
            return Outcome::miss(Comparison::NoMatch);
        };

        if self.arg == OptArg::Forbidden {
            return match inline {
                Some(_) => Outcome::miss(Comparison::OptArgUnexpected),
                None => Outcome::hit(Comparison::LongOpt, 1, None),
            };
        }

        match inline {
            Some(v) => Outcome::hit(Comparison::LongOpt, 1, Some(v)),
            None => self.take_following(Comparison::LongOpt, argv),
        }
    }

    fn compare_short<'v, S: AsRef<str>>(&self, body: &'v str, argv: &'v [S]) -> Outcome<'v> {
        let short = match self.short {
            Some(c) => c,
            None => return Outcome::miss(Comparison::NoMatch),
        };

        let mut chars = body.chars();
        if chars.next() != Some(short) {
            return Outcome::miss(Comparison::NoMatch);
        }

        if self.arg == OptArg::Forbidden {
            return Outcome::hit(Comparison::ShortOpt, 1, None);
        }

        let trailing = chars.as_str();
        if !trailing.is_empty() {
            // -fvalue: the rest of the token, verbatim; no `=` involved.
            return Outcome::hit(Comparison::ShortOpt, 1, Some(trailing));
        }
        self.take_following(Comparison::ShortOpt, argv)
    }

    // The option-argument was not inline, so it is the following argv
    // token, if present. Under the optional policy a following token that
    // looks like another option is left unconsumed, to be reinterpreted by
    // the caller; it might be the next flag, or `--`, or `-`.
    fn take_following<'v, S: AsRef<str>>(
        &self,
        comparison: Comparison,
        argv: &'v [S],
    ) -> Outcome<'v> {
        match argv.get(1).map(|s| s.as_ref()) {
            Some(next) if self.arg == OptArg::Optional && next.starts_with('-') => {
                Outcome::hit(comparison, 1, None)
            }
            Some(next) => Outcome::hit(comparison, 2, Some(next)),
            None => Outcome::hit(comparison, 1, None),
        }
    }
}

impl Default for OptionSpec<'_> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Result of one comparison: the classification tag, the number of argv
/// slots consumed, and the extracted option-argument (borrowed from argv).
///
/// `consumed` is 0 unless the comparison matched; 1 for a matched option
/// whose argument (if any) was inline or absent; 2 when the argument was
/// taken from the following argv slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome<'v> {
    pub comparison: Comparison,
    pub consumed: usize,
    pub value: Option<&'v str>,
}

impl<'v> Outcome<'v> {
    fn miss(comparison: Comparison) -> Self {
        Outcome {
            comparison,
            consumed: 0,
            value: None,
        }
    }

    fn hit(comparison: Comparison, consumed: usize, value: Option<&'v str>) -> Self {
        Outcome {
            comparison,
            consumed,
            value,
        }
    }

    /// True for any successful match, the structural markers included.
    pub fn is_match(&self) -> bool {
        self.comparison.is_match()
    }

    /// The cursor advanced past everything this comparison consumed.
    pub fn rest<'x, S: AsRef<str>>(&self, argv: &'x [S]) -> &'x [S] {
        &argv[self.consumed.min(argv.len())..]
    }
}
