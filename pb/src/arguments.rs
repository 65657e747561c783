use argcmp::{Comparison, OptArg, OptionSpec, Outcome};

use crate::error::{PbError, Result};
use crate::newline;
use crate::pasteboard::DEFAULT_PASTEBOARD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    Copy,
    Paste,
    Clear,
    Count,
    List,
    Help,
    Version,
}

#[derive(Debug)]
pub struct Cmdline {
    pub pasteboard: String,
    pub type_tag: Option<String>,
    pub in_file: Option<String>,
    pub out_file: Option<String>,
    pub translate_newlines: Option<bool>,
    pub subcommand: Option<Subcommand>,
    pub index: Option<u32>,
}

impl Cmdline {
    /// Effective newline-translation setting for the given type tag:
    /// whatever the flags forced, or inferred from the type.
    pub fn translate_for(&self, type_tag: &str) -> bool {
        self.translate_newlines
            .unwrap_or_else(|| newline::is_text_type(type_tag))
    }
}

pub const USAGE: &str = r#"usage: pb [global-options] [subcommand] [options]
global-options:
  -t, --type TYPE        type tag of the data being handled
  -b, --pasteboard NAME  pasteboard to operate on
                         standard pasteboards:
                           clipboard (default)
                           find
      --in-file PATH     read from PATH instead of stdin
      --out-file PATH    write to PATH instead of stdout
      --translate-newlines, --no-translate-newlines
                         force newline translation on or off
                         (default: translate text types only)
      --version          print version information
subcommands:
  copy [TYPE] [PATH]     read stdin (or PATH) and store it as one item
  paste [INDEX] [TYPE] [PATH]
                         write the item at INDEX (or every item) to
                         stdout (or PATH)
  clear                  remove all items from the pasteboard
  count                  show the number of items on the pasteboard
  list [INDEX]           show the type and size of each item (1-based)
  help                   view this help
with no subcommand, pb copies when stdin is not a terminal and pastes
when stdout is not a terminal
"#;

pub fn parse_args() -> Result<Cmdline> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse(&argv)
}

/// Walk the argument vector in three phases: global options, the
/// subcommand word, then the subcommand's own options and arguments.
pub fn parse(argv: &[String]) -> Result<Cmdline> {
    let mut c = Cmdline {
        pasteboard: DEFAULT_PASTEBOARD.to_string(),
        type_tag: None,
        in_file: None,
        out_file: None,
        translate_newlines: None,
        subcommand: None,
        index: None,
    };

    let opt_type = OptionSpec::new().short('t').long("type").arg(OptArg::Required);
    let opt_board = OptionSpec::new()
        .short('b')
        .long("pasteboard")
        .arg(OptArg::Required);
    let opt_in_file = OptionSpec::new().long("in-file").arg(OptArg::Required);
    let opt_out_file = OptionSpec::new().long("out-file").arg(OptArg::Required);
    let opt_translate = OptionSpec::new().long("translate-newlines");
    let opt_no_translate = OptionSpec::new().long("no-translate-newlines");
    let opt_version = OptionSpec::new().long("version");

    let mut cursor = argv;
    let mut options_done = false;

    // Phase 1: global options, up to the subcommand word.
    while let Some(token) = cursor.first() {
        if options_done || token.is_empty() {
            break;
        }

        let out = opt_type.compare(cursor);
        if out.comparison.is_opt() {
            c.type_tag = Some(required_value(&out, "type")?);
            cursor = out.rest(cursor);
            continue;
        }

        let out = opt_board.compare(cursor);
        if out.comparison.is_opt() {
            c.pasteboard = required_value(&out, "pasteboard")?;
            cursor = out.rest(cursor);
            continue;
        }

        let out = opt_in_file.compare(cursor);
        if out.comparison.is_opt() {
            c.in_file = Some(required_value(&out, "in-file")?);
            cursor = out.rest(cursor);
            continue;
        }

        let out = opt_out_file.compare(cursor);
        if out.comparison.is_opt() {
            c.out_file = Some(required_value(&out, "out-file")?);
            cursor = out.rest(cursor);
            continue;
        }

        let out = opt_translate.compare(cursor);
        reject_unexpected_arg(&out, "translate-newlines")?;
        if out.comparison.is_opt() {
            c.translate_newlines = Some(true);
            cursor = out.rest(cursor);
            continue;
        }

        let out = opt_no_translate.compare(cursor);
        reject_unexpected_arg(&out, "no-translate-newlines")?;
        if out.comparison.is_opt() {
            c.translate_newlines = Some(false);
            cursor = out.rest(cursor);
            continue;
        }

        let out = opt_version.compare(cursor);
        reject_unexpected_arg(&out, "version")?;
        if out.comparison.is_opt() {
            c.subcommand = Some(Subcommand::Version);
            cursor = out.rest(cursor);
            break;
        }

        // Every name probe missed; what is left is structural.
        match out.comparison {
            Comparison::NotAnOption | Comparison::Stdio => break,
            Comparison::EndOfOptions => {
                options_done = true;
                cursor = out.rest(cursor);
            }
            Comparison::InternalError => return Err(internal_error()),
            _ => {
                return Err(PbError::Usage(format!(
                    "unrecognised global option '{}'",
                    token
                )))
            }
        }
    }

    // Phase 2: the subcommand word.
    if c.subcommand.is_none() {
        if let Some(word) = cursor.first() {
            c.subcommand = Some(match word.as_str() {
                "copy" => Subcommand::Copy,
                "paste" => Subcommand::Paste,
                "clear" => Subcommand::Clear,
                "count" => Subcommand::Count,
                "list" => Subcommand::List,
                "help" => Subcommand::Help,
                "version" => Subcommand::Version,
                _ => {
                    return Err(PbError::Usage(format!(
                        "unrecognised subcommand '{}'",
                        word
                    )))
                }
            });
            cursor = &cursor[1..];
        }
    }

    // Phase 3: the subcommand's own options and arguments.
    match c.subcommand {
        Some(Subcommand::Copy) => parse_copy_args(&mut c, cursor)?,
        Some(Subcommand::Paste) => parse_paste_args(&mut c, cursor)?,
        Some(Subcommand::List) => parse_list_args(&mut c, cursor)?,
        // clear, count, help, and version ignore leftover arguments.
        _ => {}
    }

    Ok(c)
}

fn parse_copy_args(c: &mut Cmdline, mut cursor: &[String]) -> Result<()> {
    let opt_file = OptionSpec::new().short('f').long("file").arg(OptArg::Required);
    let mut options_done = false;

    while let Some(token) = cursor.first() {
        if options_done || token.is_empty() {
            set_copy_positional(c, token)?;
            cursor = &cursor[1..];
            continue;
        }

        let out = opt_file.compare(cursor);
        if out.comparison.is_opt() {
            c.in_file = Some(required_value(&out, "file")?);
            cursor = out.rest(cursor);
            continue;
        }

        match out.comparison {
            Comparison::Stdio => {
                c.in_file = None;
                cursor = out.rest(cursor);
            }
            Comparison::EndOfOptions => {
                options_done = true;
                cursor = out.rest(cursor);
            }
            Comparison::NotAnOption => {
                set_copy_positional(c, token)?;
                cursor = &cursor[1..];
            }
            Comparison::InternalError => return Err(internal_error()),
            _ => {
                return Err(PbError::Usage(format!(
                    "unrecognised option '{}' to 'copy'",
                    token
                )))
            }
        }
    }
    Ok(())
}

// copy [TYPE] [PATH]: a token with a dot names the type unless one is
// already set; anything else is the input file.
fn set_copy_positional(c: &mut Cmdline, token: &str) -> Result<()> {
    if token.contains('.') && c.type_tag.is_none() {
        c.type_tag = Some(token.to_string());
    } else if c.in_file.is_none() {
        c.in_file = Some(token.to_string());
    } else {
        return Err(PbError::Usage(format!(
            "unexpected argument '{}' to 'copy'",
            token
        )));
    }
    Ok(())
}

fn parse_paste_args(c: &mut Cmdline, mut cursor: &[String]) -> Result<()> {
    let opt_index = OptionSpec::new()
        .short('i')
        .long("index")
        .arg(OptArg::Required);
    let opt_file = OptionSpec::new().short('f').long("file").arg(OptArg::Required);
    let mut options_done = false;

    while let Some(token) = cursor.first() {
        if options_done || token.is_empty() {
            set_paste_positional(c, token)?;
            cursor = &cursor[1..];
            continue;
        }

        let out = opt_index.compare(cursor);
        if out.comparison.is_opt() {
            c.index = Some(parse_index(&required_value(&out, "index")?)?);
            cursor = out.rest(cursor);
            continue;
        }

        let out = opt_file.compare(cursor);
        if out.comparison.is_opt() {
            c.out_file = Some(required_value(&out, "file")?);
            cursor = out.rest(cursor);
            continue;
        }

        match out.comparison {
            Comparison::Stdio => {
                c.out_file = None;
                cursor = out.rest(cursor);
            }
            Comparison::EndOfOptions => {
                options_done = true;
                cursor = out.rest(cursor);
            }
            Comparison::NotAnOption => {
                set_paste_positional(c, token)?;
                cursor = &cursor[1..];
            }
            Comparison::InternalError => return Err(internal_error()),
            _ => {
                return Err(PbError::Usage(format!(
                    "unrecognised option '{}' to 'paste'",
                    token
                )))
            }
        }
    }
    Ok(())
}

// paste [INDEX] [TYPE] [PATH]: a number selects the item; a token with a
// dot names the type unless one is already set; anything else is the
// output file.
fn set_paste_positional(c: &mut Cmdline, token: &str) -> Result<()> {
    if c.index.is_none() {
        if let Ok(n) = token.parse::<u32>() {
            if n > 0 {
                c.index = Some(n);
                return Ok(());
            }
        }
    }
    if token.contains('.') && c.type_tag.is_none() {
        c.type_tag = Some(token.to_string());
    } else if c.out_file.is_none() {
        c.out_file = Some(token.to_string());
    } else {
        return Err(PbError::Usage(format!(
            "unexpected argument '{}' to 'paste'",
            token
        )));
    }
    Ok(())
}

fn parse_list_args(c: &mut Cmdline, mut cursor: &[String]) -> Result<()> {
    while let Some(token) = cursor.first() {
        if c.index.is_some() {
            return Err(PbError::Usage(format!(
                "unexpected argument '{}' to 'list'",
                token
            )));
        }
        c.index = Some(parse_index(token)?);
        cursor = &cursor[1..];
    }
    Ok(())
}

fn parse_index(text: &str) -> Result<u32> {
    match text.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PbError::Usage(format!("invalid item index '{}'", text))),
    }
}

fn required_value(out: &Outcome, name: &str) -> Result<String> {
    match out.value {
        Some(v) => Ok(v.to_string()),
        None => Err(PbError::Usage(format!("missing argument to --{}", name))),
    }
}

fn reject_unexpected_arg(out: &Outcome, name: &str) -> Result<()> {
    if out.comparison == Comparison::OptArgUnexpected {
        return Err(PbError::Usage(format!("unexpected argument to --{}", name)));
    }
    Ok(())
}

fn internal_error() -> PbError {
    PbError::Store("internal error: empty token at the parse cursor (please report this)".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    // -- global options --

    #[test]
    fn empty_argv_has_defaults() {
        let c = parse(&[]).unwrap();
        assert_eq!(c.subcommand, None);
        assert_eq!(c.pasteboard, DEFAULT_PASTEBOARD);
        assert_eq!(c.type_tag, None);
        assert_eq!(c.in_file, None);
        assert_eq!(c.out_file, None);
        assert_eq!(c.translate_newlines, None);
        assert_eq!(c.index, None);
    }

    #[test]
    fn type_option_forms() {
        for argv in [
            args(&["--type=text/plain", "copy"]),
            args(&["--type", "text/plain", "copy"]),
            args(&["-t", "text/plain", "copy"]),
            args(&["-ttext/plain", "copy"]),
        ] {
            let c = parse(&argv).unwrap();
            assert_eq!(c.type_tag.as_deref(), Some("text/plain"), "argv {:?}", argv);
            assert_eq!(c.subcommand, Some(Subcommand::Copy));
        }
    }

    #[test]
    fn pasteboard_option() {
        let c = parse(&args(&["-b", "find", "count"])).unwrap();
        assert_eq!(c.pasteboard, "find");
        assert_eq!(c.subcommand, Some(Subcommand::Count));
    }

    #[test]
    fn in_and_out_file_options() {
        let c = parse(&args(&["--in-file=in.dat", "--out-file", "out.dat"])).unwrap();
        assert_eq!(c.in_file.as_deref(), Some("in.dat"));
        assert_eq!(c.out_file.as_deref(), Some("out.dat"));
        assert_eq!(c.subcommand, None);
    }

    #[test]
    fn translate_flags() {
        let c = parse(&args(&["--translate-newlines", "copy"])).unwrap();
        assert_eq!(c.translate_newlines, Some(true));

        let c = parse(&args(&["--no-translate-newlines", "copy"])).unwrap();
        assert_eq!(c.translate_newlines, Some(false));
    }

    #[test]
    fn translation_is_inferred_from_the_type() {
        let c = parse(&args(&["copy"])).unwrap();
        assert!(c.translate_for("public.utf8-plain-text"));
        assert!(!c.translate_for("public.png"));

        let c = parse(&args(&["--no-translate-newlines", "copy"])).unwrap();
        assert!(!c.translate_for("public.utf8-plain-text"));

        let c = parse(&args(&["--translate-newlines", "copy"])).unwrap();
        assert!(c.translate_for("public.png"));
    }

    #[test]
    fn version_option_acts_as_a_subcommand() {
        let c = parse(&args(&["--version"])).unwrap();
        assert_eq!(c.subcommand, Some(Subcommand::Version));
    }

    #[test]
    fn version_option_takes_no_argument() {
        let err = parse(&args(&["--version=1"])).unwrap_err();
        assert!(err.to_string().contains("unexpected argument to --version"));
    }

    #[test]
    fn missing_type_argument() {
        let err = parse(&args(&["--type"])).unwrap_err();
        assert!(err.to_string().contains("missing argument to --type"));
    }

    #[test]
    fn unknown_global_option() {
        let err = parse(&args(&["--frobnicate", "copy"])).unwrap_err();
        assert!(err.to_string().contains("'--frobnicate'"));
    }

    #[test]
    fn required_argument_may_look_like_an_option() {
        // --type is required, so the following token is taken verbatim.
        let c = parse(&args(&["--type", "-x", "copy"])).unwrap();
        assert_eq!(c.type_tag.as_deref(), Some("-x"));
    }

    // -- subcommand words --

    #[test]
    fn subcommand_words() {
        let cases = [
            ("copy", Subcommand::Copy),
            ("paste", Subcommand::Paste),
            ("clear", Subcommand::Clear),
            ("count", Subcommand::Count),
            ("list", Subcommand::List),
            ("help", Subcommand::Help),
            ("version", Subcommand::Version),
        ];
        for (word, expected) in cases {
            let c = parse(&args(&[word])).unwrap();
            assert_eq!(c.subcommand, Some(expected), "word {:?}", word);
        }
    }

    #[test]
    fn unknown_subcommand() {
        let err = parse(&args(&["snarf"])).unwrap_err();
        assert!(err.to_string().contains("unrecognised subcommand 'snarf'"));
    }

    #[test]
    fn lone_dash_is_not_a_subcommand() {
        let err = parse(&args(&["-"])).unwrap_err();
        assert!(err.to_string().contains("unrecognised subcommand '-'"));
    }

    // -- copy arguments --

    #[test]
    fn copy_file_option() {
        let c = parse(&args(&["copy", "-f", "notes.txt"])).unwrap();
        assert_eq!(c.in_file.as_deref(), Some("notes.txt"));

        let c = parse(&args(&["copy", "--file=notes.txt"])).unwrap();
        assert_eq!(c.in_file.as_deref(), Some("notes.txt"));
    }

    #[test]
    fn copy_positional_type_then_path() {
        let c = parse(&args(&["copy", "public.png", "img"])).unwrap();
        assert_eq!(c.type_tag.as_deref(), Some("public.png"));
        assert_eq!(c.in_file.as_deref(), Some("img"));
    }

    #[test]
    fn copy_dotted_positional_is_a_path_once_the_type_is_set() {
        let c = parse(&args(&["-t", "text/plain", "copy", "notes.txt"])).unwrap();
        assert_eq!(c.type_tag.as_deref(), Some("text/plain"));
        assert_eq!(c.in_file.as_deref(), Some("notes.txt"));
    }

    #[test]
    fn copy_stdio_marker_means_stdin() {
        let c = parse(&args(&["--in-file=x", "copy", "-"])).unwrap();
        assert_eq!(c.in_file, None);
    }

    #[test]
    fn copy_positionals_after_end_of_options() {
        let c = parse(&args(&["-t", "text/plain", "copy", "--", "-f"])).unwrap();
        assert_eq!(c.in_file.as_deref(), Some("-f"));
    }

    #[test]
    fn copy_rejects_extra_positionals() {
        let err = parse(&args(&["-t", "a.b", "copy", "one", "two"])).unwrap_err();
        assert!(err.to_string().contains("unexpected argument 'two'"));
    }

    // -- paste arguments --

    #[test]
    fn paste_index_option() {
        let c = parse(&args(&["paste", "-i", "3"])).unwrap();
        assert_eq!(c.index, Some(3));

        let c = parse(&args(&["paste", "--index=2"])).unwrap();
        assert_eq!(c.index, Some(2));
    }

    #[test]
    fn paste_invalid_index() {
        for bad in ["0", "x", "-1"] {
            let err = parse(&args(&["paste", "--index", bad])).unwrap_err();
            assert!(
                err.to_string().contains("invalid item index"),
                "index {:?}",
                bad
            );
        }
    }

    #[test]
    fn paste_positional_walk() {
        let c = parse(&args(&["paste", "2", "public.png", "out"])).unwrap();
        assert_eq!(c.index, Some(2));
        assert_eq!(c.type_tag.as_deref(), Some("public.png"));
        assert_eq!(c.out_file.as_deref(), Some("out"));
    }

    #[test]
    fn paste_dotted_positional_is_a_path_once_the_type_is_set() {
        let c = parse(&args(&["-t", "text/plain", "paste", "out.txt"])).unwrap();
        assert_eq!(c.out_file.as_deref(), Some("out.txt"));
    }

    #[test]
    fn paste_file_option() {
        let c = parse(&args(&["paste", "--file", "out.dat"])).unwrap();
        assert_eq!(c.out_file.as_deref(), Some("out.dat"));
    }

    #[test]
    fn paste_stdio_marker_means_stdout() {
        let c = parse(&args(&["--out-file=x", "paste", "-"])).unwrap();
        assert_eq!(c.out_file, None);
    }

    // -- list arguments --

    #[test]
    fn list_index() {
        let c = parse(&args(&["list", "2"])).unwrap();
        assert_eq!(c.index, Some(2));
    }

    #[test]
    fn list_rejects_extra_arguments() {
        let err = parse(&args(&["list", "1", "2"])).unwrap_err();
        assert!(err.to_string().contains("unexpected argument '2'"));
    }

    #[test]
    fn list_rejects_non_numeric_index() {
        let err = parse(&args(&["list", "first"])).unwrap_err();
        assert!(err.to_string().contains("invalid item index 'first'"));
    }
}
