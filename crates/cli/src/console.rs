//! Line-oriented terminal front end for the workflow.

use std::fmt::Display;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};

use mmi_core::domain::customer::CustomerField;
use mmi_core::domain::quotation::{Criterion, Quotation};
use mmi_core::errors::PresentationError;
use mmi_core::flows::summary::{format_cost, format_date, SummaryTable};
use mmi_core::ports::{IntValidator, PresentationPort};

const RULE_WIDTH: usize = 60;

/// [`PresentationPort`] over any line source and sink.
///
/// Styling and screen clearing are only emitted for a real terminal; the
/// plain mode writes bare text so sessions can be scripted and captured.
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
    styled: bool,
}

impl TerminalConsole<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self { input: io::stdin().lock(), output: io::stdout(), styled: true }
    }
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, styled: false }
    }

    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String, PresentationError> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PresentationError::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    fn ask(&mut self, prompt: &str) -> Result<String, PresentationError> {
        if self.styled {
            write!(self.output, "{} ", prompt.bold())?;
        } else {
            write!(self.output, "{prompt} ")?;
        }
        self.read_line()
    }

    fn warn(&mut self, message: impl Display) -> Result<(), PresentationError> {
        if self.styled {
            writeln!(self.output, "{}", message.to_string().yellow())?;
        } else {
            writeln!(self.output, "{message}")?;
        }
        Ok(())
    }

    fn heading(&mut self, title: &str) -> Result<(), PresentationError> {
        if self.styled {
            writeln!(self.output, "{}", title.bold().underlined())?;
        } else {
            writeln!(self.output, "{title}")?;
        }
        Ok(())
    }

    fn rows(&mut self, rows: &[(&str, String)]) -> Result<(), PresentationError> {
        let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or_default();
        for (label, value) in rows {
            writeln!(self.output, "  {label:<width$} | {value}")?;
        }
        writeln!(self.output)?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> PresentationPort for TerminalConsole<R, W> {
    fn banner(&mut self, title: &str) -> Result<(), PresentationError> {
        let rule = "=".repeat(RULE_WIDTH);
        if self.styled {
            queue!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
            writeln!(self.output, "{}", rule.as_str().red())?;
            writeln!(self.output, "{}", format!("{title:^RULE_WIDTH$}").bold())?;
            writeln!(self.output, "{}", rule.as_str().red())?;
        } else {
            writeln!(self.output, "{rule}")?;
            writeln!(self.output, "{title:^RULE_WIDTH$}")?;
            writeln!(self.output, "{rule}")?;
        }
        Ok(())
    }

    fn notify_error(&mut self, message: &str) -> Result<(), PresentationError> {
        if self.styled {
            writeln!(self.output, "{}", message.red().bold())?;
        } else {
            writeln!(self.output, "ERROR: {message}")?;
        }
        Ok(())
    }

    fn render_summary(&mut self, table: &SummaryTable) -> Result<(), PresentationError> {
        self.heading(&table.title)?;
        let rows: Vec<(&str, String)> =
            table.rows().iter().map(|row| (row.label.as_str(), row.value.clone())).collect();
        self.rows(&rows)
    }

    fn render_quotation(&mut self, quotation: &Quotation) -> Result<(), PresentationError> {
        let heading = match (quotation.is_policy, quotation.id) {
            (true, Some(id)) => format!("Policy #{id}"),
            (false, Some(id)) => format!("Quotation #{id}"),
            (_, None) => "Unsaved Quotation".to_string(),
        };
        self.heading(&heading)?;

        let mut rows: Vec<(&str, String)> = Criterion::ALL
            .iter()
            .map(|criterion| (criterion.label(), quotation.display(*criterion)))
            .collect();
        rows.push(("Total Cost", format_cost(quotation.total_cost)));
        rows.push(("Valid Until", format_date(quotation.valid_until)));
        if let Some(customer) = &quotation.customer {
            for field in CustomerField::ALL {
                rows.push((field.label(), customer.get(*field).to_string()));
            }
        }
        self.rows(&rows)
    }

    fn render_expiring(
        &mut self,
        quotations: &[Quotation],
        label: &str,
    ) -> Result<(), PresentationError> {
        self.heading(label)?;
        if quotations.is_empty() {
            writeln!(self.output, "  No records expire in this window.")?;
            writeln!(self.output)?;
            return Ok(());
        }

        writeln!(
            self.output,
            "  {:>6} | {:<24} | {:<20} | {:>8} | {:<10} | Phone",
            "ID", "Customer", "Model", "Cost", "Expires"
        )?;
        for quotation in quotations {
            let id = quotation.id.map(|id| id.to_string()).unwrap_or_default();
            let phone = quotation
                .customer
                .as_ref()
                .map(|customer| customer.phone_number.as_str())
                .unwrap_or_default();
            writeln!(
                self.output,
                "  {:>6} | {:<24} | {:<20} | {:>8} | {:<10} | {}",
                id,
                quotation.customer_name(),
                quotation.display(Criterion::Model),
                format_cost(quotation.total_cost),
                format_date(quotation.valid_until),
                phone
            )?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn prompt_choice(
        &mut self,
        prompt: &str,
        options: &[&str],
    ) -> Result<usize, PresentationError> {
        loop {
            self.heading(prompt)?;
            for (position, option) in options.iter().enumerate() {
                writeln!(self.output, "  {}. {option}", position + 1)?;
            }

            let answer = self.ask(">")?;
            match answer.parse::<usize>() {
                Ok(picked) if (1..=options.len()).contains(&picked) => return Ok(picked - 1),
                _ => self.warn(format!("Please enter a number from 1 to {}.", options.len()))?,
            }
        }
    }

    fn prompt_text(&mut self, prompt: &str) -> Result<String, PresentationError> {
        self.ask(prompt)
    }

    fn prompt_int(
        &mut self,
        prompt: &str,
        validate: IntValidator<'_>,
    ) -> Result<i64, PresentationError> {
        loop {
            let answer = self.ask(prompt)?;
            let Ok(value) = answer.parse::<i64>() else {
                self.warn("Please enter a whole number.")?;
                continue;
            };
            match validate(value) {
                Ok(()) => return Ok(value),
                Err(message) => self.warn(message)?,
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool, PresentationError> {
        loop {
            let answer = self.ask(&format!("{prompt} [y/n]"))?;
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.warn("Please answer y or n.")?,
            }
        }
    }
}
