//! Interactive authorization prompt.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{FactoryError, FactoryResult};

/// Obtains a verification code from the user during first-time
/// authorization.
pub trait AuthorizationPrompt {
    /// Presents `authorization_url` and returns the code the user entered.
    fn verification_code(&mut self, authorization_url: &str) -> FactoryResult<String>;

    /// Called once the new token record has been written to `path`.
    fn credentials_saved(&mut self, _path: &Path) {}
}

impl<F> AuthorizationPrompt for F
where
    F: FnMut(&str) -> FactoryResult<String>,
{
    fn verification_code(&mut self, authorization_url: &str) -> FactoryResult<String> {
        self(authorization_url)
    }
}

/// Prompts on a terminal: prints the URL, then blocks reading one line.
///
/// There is no timeout; a closed input is an authorization error.
pub struct StdinPrompt<R, W> {
    input: R,
    output: W,
}

impl StdinPrompt<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompts on the process's standard input and output.
    pub fn new() -> Self {
        Self::with_io(std::io::stdin().lock(), std::io::stdout())
    }
}

impl Default for StdinPrompt<std::io::StdinLock<'static>, std::io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    /// Prompts on arbitrary streams.
    pub fn with_io(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns the output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    fn write_prompt(&mut self, authorization_url: &str) -> std::io::Result<()> {
        writeln!(
            self.output,
            "Open the following link in your browser:\n{}",
            authorization_url
        )?;
        write!(self.output, "Enter verification code: ")?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> AuthorizationPrompt for StdinPrompt<R, W> {
    fn verification_code(&mut self, authorization_url: &str) -> FactoryResult<String> {
        self.write_prompt(authorization_url).map_err(|e| {
            FactoryError::io(format!("failed to print authorization prompt: {}", e)).with_source(e)
        })?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(|e| {
            FactoryError::io(format!("failed to read verification code: {}", e)).with_source(e)
        })?;
        if read == 0 {
            return Err(FactoryError::authorization(
                "input closed before a verification code was entered",
            ));
        }

        Ok(line.trim().to_string())
    }

    fn credentials_saved(&mut self, path: &Path) {
        let _ = writeln!(self.output, "Credentials saved to {}", path.display());
    }
}
