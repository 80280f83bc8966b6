use crate::application::confirmation::{ConfirmationPrompt, Decision};
use std::io::{self, BufRead, Write};

/// Renders the confirmation prompt on a terminal and reads a y/N answer.
///
/// Anything other than an explicit yes declines, matching the dialog's
/// default-to-safe behavior.
pub struct ConsoleDialog {
    assume_yes: bool,
}

impl ConsoleDialog {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    pub fn decide(&self, prompt: &ConfirmationPrompt) -> io::Result<Decision> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.decide_from(prompt, stdin.lock(), stdout.lock())
    }

    fn decide_from<R: BufRead, W: Write>(
        &self,
        prompt: &ConfirmationPrompt,
        mut input: R,
        mut output: W,
    ) -> io::Result<Decision> {
        if self.assume_yes {
            writeln!(output, "{} yes", prompt.message())?;
            return Ok(Decision::Confirmed);
        }
        write!(output, "{} [y/N] ", prompt.message())?;
        output.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(Decision::Confirmed),
            _ => Ok(Decision::Declined),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::Amount;

    fn prompt() -> ConfirmationPrompt {
        ConfirmationPrompt {
            amount: Amount::parse("10.00").unwrap(),
            method_label: "PayPal",
        }
    }

    #[test]
    fn test_yes_confirms() {
        let dialog = ConsoleDialog::new(false);
        let mut output = Vec::new();
        let decision = dialog
            .decide_from(&prompt(), "y\n".as_bytes(), &mut output)
            .unwrap();
        assert_eq!(decision, Decision::Confirmed);
        assert!(String::from_utf8(output).unwrap().contains("Pay $10.00 via PayPal?"));
    }

    #[test]
    fn test_anything_else_declines() {
        let dialog = ConsoleDialog::new(false);
        for answer in ["n\n", "\n", "maybe\n"] {
            let decision = dialog
                .decide_from(&prompt(), answer.as_bytes(), &mut Vec::new())
                .unwrap();
            assert_eq!(decision, Decision::Declined);
        }
    }

    #[test]
    fn test_assume_yes_skips_reading() {
        let dialog = ConsoleDialog::new(true);
        let decision = dialog
            .decide_from(&prompt(), "n\n".as_bytes(), &mut Vec::new())
            .unwrap();
        assert_eq!(decision, Decision::Confirmed);
    }
}
