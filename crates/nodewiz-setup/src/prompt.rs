//! Line-oriented yes/no and free-text prompts.

use std::io::{self, BufRead, Write};

/// Ask `question` and read a yes/no answer. Anything other than `y`/`yes`,
/// including end of input, counts as no.
pub fn confirm_with<R: BufRead, W: Write>(
  input: &mut R,
  output: &mut W,
  question: &str,
) -> io::Result<bool> {
  let answer = ask_with(input, output, &format!("{question} (y/n)"))?;
  Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Ask for a line of text; the answer is trimmed.
pub fn ask_with<R: BufRead, W: Write>(
  input: &mut R,
  output: &mut W,
  label: &str,
) -> io::Result<String> {
  write!(output, "{label}: ")?;
  output.flush()?;
  let mut line = String::new();
  input.read_line(&mut line)?;
  Ok(line.trim().to_owned())
}

pub fn confirm(question: &str) -> io::Result<bool> {
  confirm_with(&mut io::stdin().lock(), &mut io::stdout(), question)
}

pub fn ask(label: &str) -> io::Result<String> {
  ask_with(&mut io::stdin().lock(), &mut io::stdout(), label)
}
