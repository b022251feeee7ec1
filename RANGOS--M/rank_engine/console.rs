//! Interactive console menu driving a [`Workbench`].

use std::{
    fmt,
    io::{BufRead, Write},
};

use anyhow::Result;
use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    error::RankError,
    point::{parse_point, PointSet, SetRole},
    runtime::RankRuntime,
    strategy::RankStrategy,
    workbench::{render_results, Workbench},
};

const MENU: &str = "\n--- Rank menu ---\n\
1) Load example data\n\
2) Show sets A and B\n\
3) Enter points for A (replaces A)\n\
4) Enter points for B (replaces B)\n\
5) Compute ranks (brute force O(|A|*|B|))\n\
6) Compute ranks (sorted O((|A|+|B|) log |A|))\n\
7) Exit\n";

/// Menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Reset both sets to the example pair.
    LoadExample,
    /// Print both sets.
    Show,
    /// Replace a set with points read line by line.
    Enter(SetRole),
    /// Compute ranks with a strategy.
    Compute(RankStrategy),
    /// Leave the loop.
    Exit,
}

impl MenuChoice {
    /// Maps the typed option to a choice.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::LoadExample),
            "2" => Some(Self::Show),
            "3" => Some(Self::Enter(SetRole::Reference)),
            "4" => Some(Self::Enter(SetRole::Query)),
            "5" => Some(Self::Compute(RankStrategy::BruteForce)),
            "6" => Some(Self::Compute(RankStrategy::Sorted)),
            "7" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Line-oriented menu over any reader and writer.
pub struct Console<'a, R, W> {
    input: R,
    output: W,
    runtime: &'a RankRuntime,
    workbench: Workbench,
}

impl<R, W> fmt::Debug for Console<'_, R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("runtime", self.runtime)
            .field("workbench", &self.workbench)
            .finish_non_exhaustive()
    }
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    /// Creates a console starting from the example pair.
    pub fn new(input: R, output: W, runtime: &'a RankRuntime) -> Self {
        Self {
            input,
            output,
            runtime,
            workbench: Workbench::new(),
        }
    }

    /// Current sets.
    pub fn workbench(&self) -> &Workbench {
        &self.workbench
    }

    /// Consumes the console, returning the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until the exit option or end of input.
    pub fn run(&mut self) -> Result<()> {
        loop {
            write!(self.output, "{MENU}")?;
            let Some(line) = self.prompt("Choose an option: ")? else {
                break;
            };
            match MenuChoice::parse(&line) {
                Some(MenuChoice::LoadExample) => {
                    self.workbench.reset_to_example();
                    writeln!(self.output, "Example data loaded.")?;
                }
                Some(MenuChoice::Show) => {
                    let listing = self.workbench.render_sets("Set A", "Set B");
                    write!(self.output, "\n{listing}")?;
                }
                Some(MenuChoice::Enter(role)) => self.enter_points(role)?,
                Some(MenuChoice::Compute(strategy)) => self.compute(strategy)?,
                Some(MenuChoice::Exit) => {
                    writeln!(self.output, "Exiting.")?;
                    break;
                }
                None => writeln!(self.output, "Invalid option. Try again.")?,
            }
        }
        self.log("console.session.closed", json!({}));
        Ok(())
    }

    fn enter_points(&mut self, role: SetRole) -> Result<()> {
        let letter = role.letter();
        writeln!(
            self.output,
            "Enter points for {letter}. Leave the line empty to finish."
        )?;
        let mut points = PointSet::new();
        while let Some(line) = self.prompt(&format!("Point {letter} (x,y): "))? {
            if line.trim().is_empty() {
                break;
            }
            match parse_point(&line) {
                Ok(point) => points.push(point),
                Err(err) => writeln!(self.output, "Error: {err}")?,
            }
        }
        let count = points.len();
        self.workbench.replace(role, points);
        writeln!(self.output, "Set {letter} updated.")?;
        self.log(
            "console.set.replaced",
            json!({ "set": letter.to_string(), "points": count }),
        );
        Ok(())
    }

    fn compute(&mut self, strategy: RankStrategy) -> Result<()> {
        let report = match self.workbench.compute(self.runtime, strategy) {
            Ok(report) => report,
            Err(RankError::EmptySet(role)) => {
                writeln!(
                    self.output,
                    "Set {} is empty. Cannot compute.",
                    role.letter()
                )?;
                return Ok(());
            }
            Err(err) => {
                writeln!(self.output, "Error: {err}")?;
                return Ok(());
            }
        };
        let listing = self
            .workbench
            .render_sets("Set A (reference)", "Set B (to rank)");
        write!(self.output, "\n{listing}\n{}", render_results(&report))?;
        Ok(())
    }

    /// Writes a prompt and reads one line; `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn log(&self, message: &str, metadata: serde_json::Value) {
        if let Some(tel) = self.runtime.telemetry() {
            let _ = tel.log(LogLevel::Debug, message, metadata);
        }
    }
}
