//! GitHub Actions workflow commands and `$GITHUB_OUTPUT` file outputs.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// `%`, CR и LF экранируются, иначе раннер обрежет сообщение.
pub fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

pub fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

pub fn debug(message: &str) {
    println!("::debug::{}", escape_data(message));
}

/// Annotates the run with an error; the caller still decides the exit code.
pub fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// `name<<DELIM\nvalue\nDELIM\n`, the multiline-safe `$GITHUB_OUTPUT` form.
pub fn output_record(name: &str, value: &str, delimiter: &str) -> String {
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

fn random_delimiter() -> String {
    format!("ghadelimiter_{:032x}", rand::random::<u128>())
}

pub fn append_output(path: &Path, name: &str, value: &str) -> io::Result<()> {
    let delimiter = random_delimiter();
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "output collides with the generated delimiter",
        ));
    }
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    f.write_all(output_record(name, value, &delimiter).as_bytes())
}

/// Пишем в `$GITHUB_OUTPUT`; вне раннера — старая команда `::set-output`.
pub fn set_output(name: &str, value: &str) -> io::Result<()> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) if !path.is_empty() => append_output(Path::new(&path), name, value),
        _ => {
            println!(
                "::set-output name={}::{}",
                escape_property(name),
                escape_data(value)
            );
            Ok(())
        }
    }
}
