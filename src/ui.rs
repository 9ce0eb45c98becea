//! Terminal output and prompts.
//!
//! Everything the binary prints to the operator goes through a [`Terminal`],
//! which owns its input and output so tests can drive it with buffers.

use std::fmt::Display;
use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};

use crossterm::style::Stylize;

/// Operator-facing console.
pub struct Terminal<R, W> {
    input: R,
    output: W,
    color: bool,
}

impl Terminal<StdinLock<'static>, Stdout> {
    /// Console on stdin and stdout, coloured when stdout is a terminal.
    pub fn stdio() -> Self {
        let color = io::stdout().is_terminal();
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
            color,
        }
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    /// Console over arbitrary streams, without colour.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            color: false,
        }
    }

    /// Give back the output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn header(&mut self, text: &str) -> io::Result<()> {
        let rule = "=".repeat(text.chars().count());
        if self.color {
            writeln!(self.output, "\n{}\n{rule}", text.bold().blue())
        } else {
            writeln!(self.output, "\n{text}\n{rule}")
        }
    }

    pub fn subheader(&mut self, text: &str) -> io::Result<()> {
        let rule = "-".repeat(text.chars().count());
        if self.color {
            writeln!(self.output, "\n{}\n{rule}", text.bold().cyan())
        } else {
            writeln!(self.output, "\n{text}\n{rule}")
        }
    }

    pub fn success(&mut self, text: impl Display) -> io::Result<()> {
        let line = format!("✓ {text}");
        if self.color {
            writeln!(self.output, "{}", line.bold().green())
        } else {
            writeln!(self.output, "{line}")
        }
    }

    pub fn warning(&mut self, text: impl Display) -> io::Result<()> {
        let line = format!("⚠ {text}");
        if self.color {
            writeln!(self.output, "{}", line.bold().yellow())
        } else {
            writeln!(self.output, "{line}")
        }
    }

    pub fn error(&mut self, text: impl Display) -> io::Result<()> {
        let line = format!("✗ {text}");
        if self.color {
            writeln!(self.output, "{}", line.bold().red())
        } else {
            writeln!(self.output, "{line}")
        }
    }

    pub fn info(&mut self, text: impl Display) -> io::Result<()> {
        let line = format!("ℹ {text}");
        if self.color {
            writeln!(self.output, "{}", line.bold())
        } else {
            writeln!(self.output, "{line}")
        }
    }

    /// Write a raw line.
    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    /// Print a titled table with left-aligned columns.
    pub fn table<S: AsRef<str>>(
        &mut self,
        title: &str,
        headers: &[&str],
        rows: &[Vec<S>],
    ) -> io::Result<()> {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.as_ref().chars().count());
            }
        }

        let total = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
        let header = render_row(headers, &widths);
        if self.color {
            writeln!(self.output, "\n{}", title.bold())?;
            writeln!(self.output, "{}", header.bold())?;
        } else {
            writeln!(self.output, "\n{title}")?;
            writeln!(self.output, "{header}")?;
        }
        writeln!(self.output, "{}", "─".repeat(total))?;

        if rows.is_empty() {
            return writeln!(self.output, "(none)");
        }
        for row in rows {
            writeln!(self.output, "{}", render_row(row, &widths))?;
        }
        Ok(())
    }

    /// Ask for a line of text, falling back to `default` on empty input.
    pub fn prompt(&mut self, message: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(default) => write!(self.output, "{message} [{default}]: ")?,
            None => write!(self.output, "{message}: ")?,
        }
        self.output.flush()?;

        let input = self.read_line()?;
        match (input.trim(), default) {
            ("", Some(default)) => Ok(default.to_string()),
            (text, _) => Ok(text.to_string()),
        }
    }

    /// Ask a yes/no question until the answer is understood.
    pub fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool> {
        loop {
            let hint = if default { "Y/n" } else { "y/N" };
            write!(self.output, "{message} ({hint}): ")?;
            self.output.flush()?;

            match self.read_line()?.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                "" => return Ok(default),
                _ => continue,
            }
        }
    }

    /// Show numbered options and return the 0-based index picked.
    pub fn menu<T: Display>(&mut self, title: &str, options: &[T]) -> io::Result<usize> {
        self.header(title)?;
        for (number, option) in options.iter().enumerate() {
            let number = format!("{}.", number + 1);
            if self.color {
                writeln!(self.output, "{} {option}", number.cyan())?;
            } else {
                writeln!(self.output, "{number} {option}")?;
            }
        }

        write!(self.output, "\nEnter your choice (1-{}): ", options.len())?;
        loop {
            self.output.flush()?;
            match self.read_line()?.trim().parse::<usize>() {
                Ok(choice) if (1..=options.len()).contains(&choice) => return Ok(choice - 1),
                Ok(_) => write!(self.output, "Invalid choice. Please try again: ")?,
                Err(_) => write!(self.output, "Please enter a number: ")?,
            }
        }
    }

    /// Wait for Enter.
    pub fn pause(&mut self) -> io::Result<()> {
        write!(self.output, "\nPress Enter to return to the main menu...")?;
        self.output.flush()?;
        self.read_line().map(drop)
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line)
    }
}

fn render_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join(" │ ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn terminal(input: &str) -> Terminal<Cursor<Vec<u8>>, Vec<u8>> {
        Terminal::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(terminal: Terminal<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(terminal.into_output()).unwrap()
    }

    #[test]
    fn test_prompt_default() {
        let mut term = terminal("\n/data\n");
        assert_eq!(term.prompt("Directory", Some("/home")).unwrap(), "/home");
        assert_eq!(term.prompt("Directory", Some("/home")).unwrap(), "/data");
        assert!(output(term).contains("Directory [/home]: "));
    }

    #[test]
    fn test_confirm_retries_until_understood() {
        let mut term = terminal("maybe\nYES\n\n");
        assert!(term.confirm("Proceed?", false).unwrap());
        assert!(!term.confirm("Proceed?", false).unwrap());
    }

    #[test]
    fn test_confirm_eof_is_error() {
        let mut term = terminal("");
        let err = term.confirm("Proceed?", false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_menu_validates_choice() {
        let mut term = terminal("0\nabc\n2\n");
        assert_eq!(term.menu("Main Menu", &["One", "Two"]).unwrap(), 1);
        let text = output(term);
        assert!(text.contains("1. One"));
        assert!(text.contains("Invalid choice"));
        assert!(text.contains("Please enter a number"));
    }

    #[test]
    fn test_table_alignment() {
        let mut term = terminal("");
        term.table(
            "Sizes",
            &["Path", "Size"],
            &[vec!["a", "1 B"], vec!["longer", "2.00 KB"]],
        )
        .unwrap();
        let text = output(term);
        assert!(text.contains("Path   │ Size"));
        assert!(text.contains("a      │ 1 B"));
        assert!(text.contains("longer │ 2.00 KB"));
    }

    #[test]
    fn test_empty_table() {
        let mut term = terminal("");
        term.table::<&str>("Nothing", &["Path"], &[]).unwrap();
        assert!(output(term).contains("(none)"));
    }
}
