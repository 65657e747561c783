use std::fs;
use std::io::{self, IsTerminal, Read, Write};

use crate::arguments::{Cmdline, Subcommand, USAGE};
use crate::error::{PbError, Result};
use crate::newline;
use crate::pasteboard::{Pasteboard, DEFAULT_TYPE};

/// Run the parsed command line, returning the process exit code.
pub fn run(cmdline: &Cmdline) -> i32 {
    match dispatch(cmdline) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("pb: {}", e);
            e.exit_code()
        }
    }
}

fn dispatch(c: &Cmdline) -> Result<()> {
    match c.subcommand {
        Some(Subcommand::Copy) => copy(c),
        Some(Subcommand::Paste) => paste(c),
        Some(Subcommand::Clear) => clear(c),
        Some(Subcommand::Count) => count(c),
        Some(Subcommand::List) => list(c),
        Some(Subcommand::Help) => {
            print!("{}", USAGE);
            Ok(())
        }
        Some(Subcommand::Version) => {
            version();
            Ok(())
        }
        None => default_dispatch(c),
    }
}

/// With no subcommand: copy when the input is not a terminal, then paste
/// when the output is not a terminal (or the input was one, meaning
/// nothing was copied).
fn default_dispatch(c: &Cmdline) -> Result<()> {
    let input_is_terminal = c.in_file.is_none() && io::stdin().is_terminal();
    let output_is_terminal = c.out_file.is_none() && io::stdout().is_terminal();

    if !input_is_terminal {
        copy(c)?;
    }
    if !output_is_terminal || input_is_terminal {
        paste(c)?;
    }
    Ok(())
}

fn copy(c: &Cmdline) -> Result<()> {
    let mut data = read_input(c)?;
    eprintln!(
        "read {} bytes from {}",
        data.len(),
        c.in_file.as_deref().unwrap_or("stdin")
    );
    let type_tag = c
        .type_tag
        .clone()
        .unwrap_or_else(|| DEFAULT_TYPE.to_string());
    if c.translate_for(&type_tag) {
        newline::translate_in_place(&mut data);
    }

    let board = Pasteboard::open(&c.pasteboard)?;
    board.clear()?;
    board.put(&data, &type_tag)?;
    Ok(())
}

fn read_input(c: &Cmdline) -> Result<Vec<u8>> {
    match c.in_file.as_deref() {
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => fs::read(path).map_err(|e| PbError::File {
            path: path.to_string(),
            source: e,
        }),
    }
}

fn paste(c: &Cmdline) -> Result<()> {
    let board = Pasteboard::open(&c.pasteboard)?;
    let item_count = board.item_count();
    let mut out = open_output(c)?;

    match c.index {
        Some(index) => {
            if index as usize > item_count {
                return Err(PbError::Usage(format!(
                    "there are only {} items on pasteboard \"{}\"",
                    item_count,
                    board.name()
                )));
            }
            paste_one(c, &board, index as usize, &mut out)
        }
        None => {
            for index in 1..=item_count {
                paste_one(c, &board, index, &mut out)?;
            }
            Ok(())
        }
    }
}

fn paste_one(c: &Cmdline, board: &Pasteboard, index: usize, out: &mut Output) -> Result<()> {
    let mut data = board.read_item(index, c.type_tag.as_deref())?;
    let tag = board.item_type(index)?;
    if c.translate_for(&tag) {
        newline::translate_in_place(&mut data);
    }
    out.write_all(&data)?;
    Ok(())
}

fn clear(c: &Cmdline) -> Result<()> {
    Pasteboard::open(&c.pasteboard)?.clear()
}

fn count(c: &Cmdline) -> Result<()> {
    println!("{}", Pasteboard::open(&c.pasteboard)?.item_count());
    Ok(())
}

fn list(c: &Cmdline) -> Result<()> {
    let board = Pasteboard::open(&c.pasteboard)?;
    let item_count = board.item_count();
    println!("{}", board.name());
    println!("{} items", item_count);

    let indices: Vec<usize> = match c.index {
        Some(index) => {
            if index as usize > item_count {
                return Err(PbError::Usage(format!(
                    "there are only {} items on pasteboard \"{}\"",
                    item_count,
                    board.name()
                )));
            }
            vec![index as usize]
        }
        None => (1..=item_count).collect(),
    };

    for index in indices {
        println!(
            "#{}: {} ({} bytes)",
            index,
            board.item_type(index)?,
            board.item_len(index)?
        );
    }
    Ok(())
}

fn version() {
    println!("pb {}", env!("CARGO_PKG_VERSION"));
    println!("read and write pasteboards (including the clipboard)");
    println!();
    println!("type 'pb help' for usage");
}

enum Output {
    Stdout(io::Stdout),
    File(fs::File),
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(s) => s.write(buf),
            Output::File(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(s) => s.flush(),
            Output::File(f) => f.flush(),
        }
    }
}

// Paste into an empty file; stdout is left alone so shell appends (>>)
// keep working.
fn open_output(c: &Cmdline) -> Result<Output> {
    match c.out_file.as_deref() {
        None => Ok(Output::Stdout(io::stdout())),
        Some(path) => {
            let f = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .map_err(|e| PbError::File {
                    path: path.to_string(),
                    source: e,
                })?;
            Ok(Output::File(f))
        }
    }
}
