use num_enum::TryFromPrimitive;
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum Mode {
    Image = 1,
    Webcam = 2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Image(PathBuf),
    Webcam,
}

#[derive(thiserror::Error, Debug)]
pub enum MenuError {
    #[error("Invalid choice!")]
    InvalidChoice(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn read_answer(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> io::Result<String> {
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Prints the mode menu and reads the answer (plus the image path for image mode).
pub fn prompt(input: &mut impl BufRead, output: &mut impl Write) -> Result<Choice, MenuError> {
    writeln!(output, "Choose Mode:")?;
    writeln!(output, "1. Image Mode")?;
    writeln!(output, "2. Webcam Mode")?;

    let answer = read_answer(input, output, "Enter 1 or 2: ")?;
    let mode = answer
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(|n| Mode::try_from(n).ok())
        .ok_or_else(|| MenuError::InvalidChoice(answer.clone()))?;

    match mode {
        Mode::Image => {
            let path = read_answer(input, output, "Enter image path (e.g., images/test.jpg): ")?;
            Ok(Choice::Image(PathBuf::from(path.trim())))
        }
        Mode::Webcam => Ok(Choice::Webcam),
    }
}
