//! Interactive console menu
//!
//! A blocking read-dispatch loop over any `BufRead` input and `Write`
//! output. `main` wires it to stdin/stdout on its own thread; tests drive it
//! with in-memory buffers.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::buffer::{parse_hex_byte, LoadedBuffer};
use crate::native;
use crate::reconstruct::{ProgressCadence, ReconstructionJob};
use crate::state::AppState;

const MENU: &str = "\nMenu:
1. Print Hello, World!
2. Call Native Library to Square a Number
3. Simulate Receiving and Reconstructing a Large File
4. Load and Modify String in Memory
5. Exit
Enter your choice: ";

/// One entry of the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Greet,
    Square,
    Reconstruct,
    ModifyBuffer,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>().map_err(|_| ())? {
            1 => Ok(Self::Greet),
            2 => Ok(Self::Square),
            3 => Ok(Self::Reconstruct),
            4 => Ok(Self::ModifyBuffer),
            5 => Ok(Self::Exit),
            _ => Err(()),
        }
    }
}

/// Console session state
pub struct Console<R, W> {
    state: AppState,
    input: R,
    output: W,
    /// Kept across iterations once the buffer has been loaded
    buffer: Option<LoadedBuffer>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(state: AppState, input: R, output: W) -> Self {
        Self {
            state,
            input,
            output,
            buffer: None,
        }
    }

    /// Run until the user picks Exit or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            write!(self.output, "{}", MENU)?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                tracing::info!("Console input closed");
                return Ok(());
            };

            let Ok(choice) = line.parse::<MenuChoice>() else {
                writeln!(self.output, "Invalid choice. Please enter a valid option.")?;
                continue;
            };

            tracing::debug!(?choice, "Menu choice");
            match choice {
                MenuChoice::Greet => writeln!(self.output, "Hello, World!")?,
                MenuChoice::Square => self.square()?,
                MenuChoice::Reconstruct => self.reconstruct()?,
                MenuChoice::ModifyBuffer => self.modify_buffer()?,
                MenuChoice::Exit => {
                    writeln!(self.output, "Exiting...")?;
                    return Ok(());
                }
            }
        }
    }

    /// Currently held buffer handle, if option 4 has run
    pub fn buffer(&self) -> Option<&LoadedBuffer> {
        self.buffer.as_ref()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        self.read_line()
    }

    fn square(&mut self) -> io::Result<()> {
        let Some(input) = self.prompt("Enter a number to square: ")? else {
            return Ok(());
        };

        match input.parse::<i32>() {
            Ok(n) => writeln!(
                self.output,
                "The square of {} is {}.",
                n,
                native::square(n)
            ),
            Err(_) => writeln!(self.output, "Invalid input. Please enter an integer."),
        }
    }

    fn reconstruct(&mut self) -> io::Result<()> {
        let config = &self.state.config().reconstruct;
        let job = ReconstructionJob::new(config.chunk_size, config.total_size, &config.output_path);
        let cadence = ProgressCadence::from_step(config.progress_step);

        writeln!(self.output, "Simulating receiving a large file...")?;

        let output = &mut self.output;
        let result = job.run(cadence, &mut |written: u64, total: u64| {
            // Progress output errors are ignored.
            let _ = write!(output, "\rReceived {} / {} bytes", written, total);
            let _ = output.flush();
        });

        match result {
            Ok(_) => {
                writeln!(self.output, "\nFile reconstructed successfully!")?;
                writeln!(self.output, "File saved to: {}", job.destination.display())
            }
            Err(e) => {
                tracing::warn!("Reconstruction failed: {}", e);
                writeln!(self.output, "\nError: {}", e)
            }
        }
    }

    fn modify_buffer(&mut self) -> io::Result<()> {
        let buffer = match &self.buffer {
            Some(buffer) => buffer.clone(),
            None => {
                let buffer = self.state.buffer().ensure_loaded();
                self.buffer = Some(buffer.clone());
                buffer
            }
        };

        writeln!(self.output, "Current string in memory: {}", buffer.text())?;
        writeln!(
            self.output,
            "Pre Hex values in memory: {}",
            buffer.hex().collect::<Vec<_>>().join(" ")
        )?;

        let Some(index_input) = self.prompt(&format!(
            "Enter index to modify (0-{}): ",
            buffer.len().saturating_sub(1)
        ))?
        else {
            return Ok(());
        };
        let Ok(index) = index_input.parse::<i64>() else {
            return writeln!(self.output, "Invalid index: {:?}", index_input);
        };

        let Some(value_input) = self.prompt("Enter new byte value in hex (e.g. 5A): ")? else {
            return Ok(());
        };

        let applied = parse_hex_byte(&value_input).and_then(|value| buffer.set_byte(index, value));
        if let Err(e) = applied {
            return writeln!(self.output, "Error: {}", e);
        }

        writeln!(self.output, "Modified string in memory: {}", buffer.text())?;
        writeln!(
            self.output,
            "Post Hex values in memory: {}",
            buffer.hex().collect::<Vec<_>>().join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run_console(state: &AppState, input: &str) -> String {
        let mut output = Vec::new();
        let mut console = Console::new(state.clone(), Cursor::new(input.as_bytes()), &mut output);
        console.run().unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_menu_choice_parsing() {
        assert_eq!("1".parse::<MenuChoice>(), Ok(MenuChoice::Greet));
        assert_eq!(" 4 ".parse::<MenuChoice>(), Ok(MenuChoice::ModifyBuffer));
        assert_eq!("5\n".parse::<MenuChoice>(), Ok(MenuChoice::Exit));
        for bad in ["", "abc", "0", "6", "-1", "1.5"] {
            assert!(bad.parse::<MenuChoice>().is_err(), "{bad:?} should be invalid");
        }
    }

    #[test]
    fn test_invalid_choices_redisplay_menu_without_side_effects() {
        let state = AppState::new(Config::default());
        let out = run_console(&state, "abc\n0\n6\n5\n");

        assert_eq!(out.matches("Invalid choice").count(), 3);
        assert_eq!(out.matches("Enter your choice:").count(), 4);
        assert!(!state.buffer().is_loaded());
        assert!(out.ends_with("Exiting...\n"));
    }

    #[test]
    fn test_greeting_and_square() {
        let state = AppState::new(Config::default());
        let out = run_console(&state, "1\n2\n-12\n2\nnope\n5\n");

        assert!(out.contains("Hello, World!"));
        assert!(out.contains("The square of -12 is 144."));
        assert!(out.contains("Invalid input. Please enter an integer."));
    }

    #[test]
    fn test_end_of_input_stops_loop() {
        let state = AppState::new(Config::default());
        let out = run_console(&state, "1\n");
        assert!(out.contains("Hello, World!"));
        assert!(!out.contains("Exiting..."));
    }

    #[test]
    fn test_modify_buffer_is_shared_with_store() {
        let state = AppState::new(Config::default());
        let out = run_console(&state, "4\n6\n5A\n5\n");

        assert!(out.contains("Current string in memory: BascomHunter"));
        assert!(out.contains("Modified string in memory: BascomZunter"));
        assert!(out.contains("Post Hex values in memory: 42 61 73 63 6F 6D 5A 75 6E 74 65 72"));
        assert_eq!(state.buffer().ensure_loaded().text(), "BascomZunter");
    }

    #[test]
    fn test_modify_buffer_rejections_leave_buffer_unchanged() {
        let state = AppState::new(Config::default());
        let out = run_console(&state, "4\n12\n41\n4\n-1\n41\n4\nx\n4\n0\nZZ\n5\n");

        assert_eq!(out.matches("Error: Index").count(), 2);
        assert!(out.contains("Invalid index: \"x\""));
        assert!(out.contains("Error: Invalid byte value"));
        assert_eq!(state.buffer().ensure_loaded().text(), "BascomHunter");
    }

    #[test]
    fn test_buffer_handle_retained_across_iterations() {
        let state = AppState::new(Config::default());
        let mut output = Vec::new();
        let mut console = Console::new(
            state.clone(),
            Cursor::new("4\n0\n62\n4\n1\n41\n5\n".as_bytes()),
            &mut output,
        );
        console.run().unwrap();

        let held = console.buffer().unwrap().clone();
        assert!(held.same_buffer(&state.buffer().ensure_loaded()));
        assert_eq!(held.text(), "bAscomHunter");
    }

    #[test]
    fn test_reconstruct_option_writes_configured_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.reconstruct.chunk_size = 100;
        config.reconstruct.total_size = 2_550;
        config.reconstruct.output_path = temp_dir.path().join("received.txt");
        let state = AppState::new(config);

        let out = run_console(&state, "3\n5\n");

        assert!(out.contains("Simulating receiving a large file..."));
        assert!(out.contains("\rReceived 2550 / 2550 bytes"));
        assert!(out.contains("File reconstructed successfully!"));
        let data = std::fs::read(temp_dir.path().join("received.txt")).unwrap();
        assert_eq!(data.len(), 2_550);
    }

    #[test]
    fn test_reconstruct_failure_keeps_loop_running() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.reconstruct.output_path = temp_dir.path().join("missing/dir/out.txt");
        let state = AppState::new(config);

        let out = run_console(&state, "3\n1\n5\n");

        assert!(out.contains("Error: Failed to create"));
        assert!(out.contains("Hello, World!"));
        assert!(out.ends_with("Exiting...\n"));
    }
}
