use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{console::Term, Input};

use crate::consolidate::DonationSelection;

/// Answer to the developer donation question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationDecision {
    Donate,
    Skip,
    Cancel,
}

impl DonationDecision {
    /// "YES" donates, "CANCEL" aborts, anything else skips. Case-insensitive.
    pub fn from_answer(answer: &str) -> Self {
        let answer = answer.trim();
        if answer.eq_ignore_ascii_case("yes") {
            DonationDecision::Donate
        } else if answer.eq_ignore_ascii_case("cancel") {
            DonationDecision::Cancel
        } else {
            DonationDecision::Skip
        }
    }
}

/// Where the donation decision comes from.
pub trait DecisionSource {
    fn decide(&mut self, question: &str) -> Result<DonationDecision>;
}

/// Reads the answer from the terminal, or one line of stdin when either
/// stdin or stderr is redirected.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

fn answer_hint() -> String {
    format!(
        "Type {} to donate, {} to skip, or {} to abort",
        "YES".green(),
        "NO".red(),
        "CANCEL".yellow()
    )
}

impl DecisionSource for TerminalPrompt {
    fn decide(&mut self, question: &str) -> Result<DonationDecision> {
        if !(io::stdin().is_terminal() && Term::stderr().is_term()) {
            return read_decision(&mut io::stdin().lock(), &mut io::stdout(), question);
        }
        println!("{}", question.yellow());
        let answer: String = Input::new()
            .with_prompt(answer_hint())
            .allow_empty(true)
            .interact_text()?;
        Ok(DonationDecision::from_answer(&answer))
    }
}

/// Asks `question` on `out` and parses one line from `input`.
/// End of input counts as an empty answer.
fn read_decision<R, W>(input: &mut R, out: &mut W, question: &str) -> Result<DonationDecision>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", question.yellow())?;
    write!(out, "{}: ", answer_hint())?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    writeln!(out)?;
    Ok(DonationDecision::from_answer(&answer))
}

/// Replays canned answers and records every question asked.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedDecisions {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl DecisionSource for ScriptedDecisions {
    fn decide(&mut self, question: &str) -> Result<DonationDecision> {
        self.asked.push(question.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(DonationDecision::from_answer(&answer)),
            None => bail!("no scripted answer left for: {}", question),
        }
    }
}

pub fn donation_question(selection: &DonationSelection<'_>, total_night: f64) -> String {
    let percentage = selection.percentage_of(total_night);
    if selection.len() == 1 {
        format!(
            "Donate {:.6} NIGHT ({:.2}% of total) to developer?",
            selection.total_amount, percentage
        )
    } else {
        format!(
            "Donate {:.6} NIGHT from {} smallest wallets ({:.2}% of total) to developer?",
            selection.total_amount,
            selection.len(),
            percentage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::select_donation_wallets;
    use crate::wallet::test_wallet;

    #[test]
    fn test_answer_parsing() {
        assert_eq!(DonationDecision::from_answer("YES"), DonationDecision::Donate);
        assert_eq!(DonationDecision::from_answer("  yes\n"), DonationDecision::Donate);
        assert_eq!(DonationDecision::from_answer("Cancel"), DonationDecision::Cancel);
        assert_eq!(DonationDecision::from_answer("no"), DonationDecision::Skip);
        assert_eq!(DonationDecision::from_answer(""), DonationDecision::Skip);
        assert_eq!(DonationDecision::from_answer("y"), DonationDecision::Skip);
    }

    #[test]
    fn test_scripted_decisions() {
        let mut script = ScriptedDecisions::new(["yes", "CANCEL"]);
        assert_eq!(script.decide("first?").unwrap(), DonationDecision::Donate);
        assert_eq!(script.decide("second?").unwrap(), DonationDecision::Cancel);
        assert!(script.decide("third?").is_err());
        assert_eq!(script.asked(), &["first?", "second?", "third?"]);
    }

    #[test]
    fn test_read_decision_from_piped_input() {
        colored::control::set_override(false);
        let cases = [
            ("yes\n", DonationDecision::Donate),
            ("CANCEL\n", DonationDecision::Cancel),
            ("no\n", DonationDecision::Skip),
            ("", DonationDecision::Skip),
        ];
        for (input, expected) in cases {
            let mut reader = io::Cursor::new(input.as_bytes());
            let mut out = Vec::new();
            let decision = read_decision(&mut reader, &mut out, "Donate 1 NIGHT?").unwrap();
            assert_eq!(decision, expected, "input {:?}", input);

            let shown = String::from_utf8(out).unwrap();
            assert!(shown.starts_with("Donate 1 NIGHT?\n"));
            assert!(shown.contains("Type YES to donate, NO to skip, or CANCEL to abort: "));
        }
    }

    #[test]
    fn test_read_decision_takes_only_first_line() {
        let mut reader = io::Cursor::new(&b"cancel\nyes\n"[..]);
        let mut out = Vec::new();
        assert_eq!(
            read_decision(&mut reader, &mut out, "q?").unwrap(),
            DonationDecision::Cancel
        );
        assert_eq!(
            read_decision(&mut reader, &mut out, "q?").unwrap(),
            DonationDecision::Donate
        );
    }

    #[test]
    fn test_question_wording() {
        let single = vec![test_wallet(0, 5.0), test_wallet(1, 95.0)];
        let selection = select_donation_wallets(&single);
        assert_eq!(
            donation_question(&selection, 100.0),
            "Donate 5.000000 NIGHT (5.00% of total) to developer?"
        );

        let many = vec![
            test_wallet(0, 98.8),
            test_wallet(1, 0.6),
            test_wallet(2, 0.6),
        ];
        let selection = select_donation_wallets(&many);
        assert!(donation_question(&selection, 100.0).contains("from 2 smallest wallets"));
    }
}
