//! Train command for staffdrill.
//!
//! Runs an interactive drill on a line-based terminal. Each prompt names
//! the clef and where the note sits on the staff; the user answers with a
//! note letter (C-B) or its number (1-7), then rates how hard it was.

use std::io::{BufRead, Write};
use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cli::{to_json, Clock};
use crate::core::pitch::{Clef, Letter, Pitch};
use crate::core::scheduler::format_interval;
use crate::core::{Composition, Feedback, Rating, SessionMode, Trainer};
use crate::error::Result;
use crate::storage::TrainerStore;

/// Options for the train command.
#[derive(Debug, Clone, Default)]
pub struct TrainOptions {
    /// Clef to train. Defaults to the first enabled clef.
    pub clef: Option<Clef>,
    /// Stop after this many graded prompts.
    pub rounds: Option<usize>,
    /// Apply `STAFFDRILL_*` mode overrides from the environment.
    pub use_env: bool,
    /// Output the summary as JSON.
    pub json: bool,
    /// Suppress the summary.
    pub quiet: bool,
}

/// Counts for one drill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Graded prompts.
    pub prompts: usize,
    /// Items graded (four per prompt in four-note mode).
    pub reviews: usize,
    /// Items graded after a correct answer.
    pub correct: usize,
}

/// Output format for the train command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainOutput {
    /// Whether a drill could run.
    pub success: bool,
    /// Clef trained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clef: Option<Clef>,
    /// What was done.
    #[serde(flatten)]
    pub tally: Tally,
    /// Informational note, such as nothing being due.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error message if the drill could not run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrainOutput {
    /// Create a successful output.
    pub fn success(clef: Clef, tally: Tally, message: Option<String>) -> Self {
        Self {
            success: true,
            clef: Some(clef),
            tally,
            message,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            clef: None,
            tally: Tally::default(),
            message: None,
            error: Some(error.into()),
        }
    }
}

/// The train command implementation.
pub struct TrainCommand<S: TrainerStore + Clone + 'static> {
    store: S,
    clock: Clock,
}

impl<S: TrainerStore + Clone + 'static> TrainCommand<S> {
    /// Create a new train command.
    pub fn new(store: S, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Run a drill, reading answers from `input` and writing prompts to `out`.
    pub fn run<I, O, R>(
        &self,
        options: &TrainOptions,
        input: &mut I,
        out: &mut O,
        rng: &mut R,
    ) -> TrainOutput
    where
        I: BufRead,
        O: Write,
        R: Rng + ?Sized,
    {
        let mut trainer = Trainer::open(self.store.clone(), self.clock.today);
        if options.use_env {
            trainer.apply_env_overrides();
        }

        if !trainer.has_deck() {
            return TrainOutput::failure("No cards yet. Run `staffdrill init` first.");
        }

        let config = trainer.config();
        let clef = match options.clef {
            Some(clef) => clef,
            None => config.enabled_clefs.first().copied().unwrap_or(Clef::Treble),
        };
        if !config.is_clef_enabled(clef) {
            return TrainOutput::failure(format!(
                "The {} clef is disabled. Enable it with `staffdrill config clef {}`.",
                clef, clef
            ));
        }

        match trainer.start_session(clef, self.clock.now, rng) {
            Composition::Ready(_) => {}
            Composition::NoCards => {
                return TrainOutput::failure(format!(
                    "The deck has no {} cards. Run `staffdrill init --force` to rebuild it.",
                    clef
                ))
            }
            Composition::NothingDue => {
                return TrainOutput::success(
                    clef,
                    Tally::default(),
                    Some("Nothing is due. Come back later or turn on infinite mode.".to_string()),
                )
            }
            Composition::InsufficientCards { available: 0 } => {
                return TrainOutput::success(
                    clef,
                    Tally::default(),
                    Some("Nothing is due. Come back later or turn on infinite mode.".to_string()),
                )
            }
            Composition::InsufficientCards { available } => {
                return TrainOutput::failure(format!(
                    "Four-note mode needs at least 4 {} cards; only {} available.",
                    clef, available
                ))
            }
        }

        match self.drill(&mut trainer, options, input, out) {
            Ok(tally) => TrainOutput::success(clef, tally, None),
            Err(e) => TrainOutput::failure(e.to_string()),
        }
    }

    /// The prompt loop. Ends on `q`, end of input, or the round limit.
    fn drill<I: BufRead, O: Write>(
        &self,
        trainer: &mut Trainer<S>,
        options: &TrainOptions,
        input: &mut I,
        out: &mut O,
    ) -> Result<Tally> {
        let mut tally = Tally::default();
        let mut line = String::new();
        let total = trainer.session().map(|s| s.len()).unwrap_or(0);
        writeln!(
            out,
            "{} cards in this session. Answer with a note name (C-B) or 1-7; q quits.",
            total
        )?;

        'prompts: loop {
            if options.rounds.is_some_and(|limit| tally.prompts >= limit) {
                break;
            }
            let targets: Vec<Pitch> = match trainer.current_prompt() {
                Some(items) => items.iter().map(|item| item.pitch).collect(),
                None => break,
            };
            let position = trainer.session().map(|s| s.position()).unwrap_or(0);
            writeln!(out)?;
            writeln!(out, "{}", render_prompt(&targets, position, total))?;

            let started = Instant::now();
            let (correct, expected) = loop {
                write!(out, "> ")?;
                out.flush()?;
                let Some(reply) = read_reply(input, &mut line)? else {
                    break 'prompts;
                };
                if reply.eq_ignore_ascii_case("q") {
                    break 'prompts;
                }
                let Some(letters) = parse_answers(&reply) else {
                    writeln!(out, "Enter a note name (C D E F G A B) or 1-7.")?;
                    continue;
                };

                let mut verdict = None;
                for letter in letters {
                    match trainer.submit_answer(letter)? {
                        Feedback::Pending { answered, total } => {
                            writeln!(out, "  {}/{}", answered, total)?;
                        }
                        Feedback::Judged {
                            correct, expected, ..
                        } => {
                            verdict = Some((correct, expected));
                            break;
                        }
                        Feedback::Ignored => break,
                    }
                }
                if let Some(verdict) = verdict {
                    break verdict;
                }
            };
            let elapsed = started.elapsed();

            let rating = if correct {
                writeln!(out, "Correct! ({:.1}s)", elapsed.as_secs_f64())?;
                match self.ask_rating(trainer, input, out, &mut line)? {
                    Some(rating) => rating,
                    None => break 'prompts,
                }
            } else {
                writeln!(out, "Not quite: it was {}.", letter_list(&expected))?;
                write!(out, "[r]etry, or Enter to continue > ")?;
                out.flush()?;
                match read_reply(input, &mut line)? {
                    None => break 'prompts,
                    Some(reply) if reply.eq_ignore_ascii_case("q") => break 'prompts,
                    Some(reply) if reply.eq_ignore_ascii_case("r") => {
                        trainer.retry()?;
                        continue 'prompts;
                    }
                    Some(_) => Rating::Again,
                }
            };

            let report = trainer.grade(rating, elapsed, self.clock.now, self.clock.today)?;
            tally.prompts += 1;
            tally.reviews += report.count();
            if report.correct {
                tally.correct += report.count();
            }
            if let Some(item) = report.updated.first() {
                writeln!(out, "Next review in {}.", format_interval(item.interval))?;
            }
        }

        writeln!(out)?;
        Ok(tally)
    }

    /// Ask for a rating. `None` means the user quit.
    fn ask_rating<I: BufRead, O: Write>(
        &self,
        trainer: &Trainer<S>,
        input: &mut I,
        out: &mut O,
        line: &mut String,
    ) -> Result<Option<Rating>> {
        let [again, hard, good, easy] = trainer.preview(self.clock.now).unwrap_or([1; 4]);
        if let Some(session) = trainer.session().filter(|s| s.mode() == SessionMode::FourNote) {
            writeln!(
                out,
                "Intervals are for note 1; the rating applies to all {} notes.",
                session.mode().batch_size()
            )?;
        }
        loop {
            write!(
                out,
                "[a]gain {}  [h]ard {}  [g]ood {}  [e]asy {}  (Enter = good) > ",
                format_interval(again),
                format_interval(hard),
                format_interval(good),
                format_interval(easy)
            )?;
            out.flush()?;

            let Some(reply) = read_reply(input, line)? else {
                return Ok(None);
            };
            if reply.is_empty() {
                return Ok(Some(Rating::Good));
            }
            if reply.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match reply.parse::<Rating>() {
                Ok(rating) => return Ok(Some(rating)),
                Err(_) => writeln!(out, "Enter a, h, g, or e.")?,
            }
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &TrainOutput, options: &TrainOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return to_json(output);
        }

        if !output.success {
            return format!(
                "Train failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }
        if let Some(message) = &output.message {
            return message.clone();
        }

        let tally = &output.tally;
        format!(
            "Session finished: {} prompts, {} cards reviewed, {} correct.",
            tally.prompts, tally.reviews, tally.correct
        )
    }
}

/// Read one line. `None` at end of input.
fn read_reply<I: BufRead>(input: &mut I, line: &mut String) -> Result<Option<String>> {
    line.clear();
    if input.read_line(line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Parse a reply into letters.
///
/// Accepts letters or digits 1-7 (C=1 ... B=7), optionally separated by
/// spaces or commas, so a four-note batch can be answered on one line.
pub fn parse_answers(reply: &str) -> Option<Vec<Letter>> {
    let letters: Option<Vec<Letter>> = reply
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| {
            Letter::from_char(c).or_else(|| {
                c.to_digit(10)
                    .filter(|d| (1..=7).contains(d))
                    .map(|d| Letter::all()[d as usize - 1])
            })
        })
        .collect();
    letters.filter(|l| !l.is_empty())
}

/// Describe where a note sits relative to the five staff lines.
///
/// `step` counts diatonic steps up from the bottom line (0). Even steps are
/// lines, odd steps are spaces.
pub fn staff_position(step: i32) -> String {
    const TOP_LINE: i32 = 8;
    if (0..=TOP_LINE).contains(&step) {
        return if step % 2 == 0 {
            format!("line {}", step / 2 + 1)
        } else {
            format!("space {}", (step + 1) / 2)
        };
    }

    let (distance, side) = if step > TOP_LINE {
        (step - TOP_LINE, "above")
    } else {
        (-step, "below")
    };
    match distance {
        1 => format!("just {} the staff", side),
        d if d % 2 == 0 => format!("ledger line {} {}", d / 2, side),
        d => format!("{} ledger line {}", side, d / 2),
    }
}

fn render_prompt(targets: &[Pitch], position: usize, total: usize) -> String {
    let Some(first) = targets.first() else {
        return String::new();
    };
    if targets.len() == 1 {
        return format!(
            "[{}/{}] {} clef: {}",
            position + 1,
            total,
            first.clef,
            staff_position(first.staff_step())
        );
    }

    let mut lines = vec![format!(
        "[{}-{}/{}] {} clef, name all {} notes:",
        position + 1,
        position + targets.len(),
        total,
        first.clef,
        targets.len()
    )];
    for (n, pitch) in targets.iter().enumerate() {
        lines.push(format!("  {}. {}", n + 1, staff_position(pitch.staff_step())));
    }
    lines.join("\n")
}

fn letter_list(letters: &[Letter]) -> String {
    letters
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
