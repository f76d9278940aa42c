// External decoder/encoder programs
// The path runs as a shell command line with the bits as '0'/'1' text both
// as last argument and on stdin; stdout is read back. The call blocks until
// the program exits.

use std::io::Write;
use std::process::{ChildStdin, Command, Stdio};

use tracing::{debug, warn};

use crate::error::ChainError;
use crate::phy::StageOutput;
use crate::phy::bits::bits_to_string;
use crate::utils::consts::EXTERNAL_MAX_ARG_BITS;

/// Paths of the external decoder and encoder. An empty path means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalPrograms {
    pub decoder: String,
    pub encoder: String,
}

impl ExternalPrograms {
    /// Parse `decoder;encoder`. An empty parameter leaves both unset.
    pub fn parse(text: &str) -> Result<Self, ChainError> {
        if text.is_empty() {
            return Ok(Self::default());
        }
        match text.split_once(';') {
            Some((decoder, encoder)) if !encoder.contains(';') => Ok(Self {
                decoder: decoder.to_string(),
                encoder: encoder.to_string(),
            }),
            _ => Err(ChainError::InvalidExternal(text.to_string())),
        }
    }

    fn program(&self, decoding: bool) -> &str {
        if decoding { &self.decoder } else { &self.encoder }
    }
}

impl std::fmt::Display for ExternalPrograms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.decoder.is_empty() && self.encoder.is_empty() {
            return Ok(());
        }
        write!(f, "{};{}", self.decoder, self.encoder)
    }
}

/// Run the configured program for this direction. A missing path or a failed
/// run yields no bits and one error.
pub fn external_program(decoding: bool, bits: &[bool], programs: &ExternalPrograms) -> StageOutput {
    let program = programs.program(decoding);
    if program.is_empty() {
        warn!(
            "No external {} program configured",
            if decoding { "decoder" } else { "encoder" }
        );
        return StageOutput::failed(1);
    }

    match run_command(program, &bits_to_string(bits)) {
        Ok(output) => {
            // Anything that is not a '1' reads as zero, line breaks aside
            let out: Vec<bool> = output
                .trim()
                .chars()
                .map(|c| c == '1')
                .collect();
            if out.is_empty() {
                warn!("External program {} produced no bits", program);
                return StageOutput::failed(1);
            }
            StageOutput::clean(out)
        }
        Err(e) => {
            warn!("Error running {}: {}", program, e);
            StageOutput::failed(1)
        }
    }
}

fn run_command(program: &str, input: &str) -> std::io::Result<String> {
    debug!("Running external program {} on {} bits", program, input.len());

    let mut child = shell_command(program, input)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    // Feed stdin from its own thread so a program that writes while it reads
    // cannot stall on a full stdout pipe
    let output = std::thread::scope(|scope| -> std::io::Result<std::process::Output> {
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| scope.spawn(move || write_input(&mut stdin, input)));
        let output = child.wait_with_output();
        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| std::io::Error::other("stdin writer panicked"))??;
        }
        output
    })?;

    if !output.status.success() {
        return Err(std::io::Error::other(format!(
            "exited with {}",
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// The configured path is a shell command line; the bit string is appended
/// as its last argument unless it would not fit on a command line.
fn shell_command(program: &str, input: &str) -> Command {
    let line = if input.len() <= EXTERNAL_MAX_ARG_BITS {
        format!("{} {}", program, input)
    } else {
        debug!("Bit string too long for an argument, stdin only");
        program.to_string()
    };

    if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(line);
        command
    } else {
        let mut command = Command::new("sh");
        command.arg("-c").arg(line);
        command
    }
}

fn write_input(stdin: &mut ChildStdin, input: &str) -> std::io::Result<()> {
    match stdin.write_all(input.as_bytes()) {
        // A program that never reads stdin closes the pipe early
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        result => result,
    }
}
