use instalytics::{DEFAULT_POST_COUNT, clamp_post_count};
use std::io::{self, BufRead, Write};

/// What to save after an `analyze` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    Text,
    Json,
    Both,
    Nothing,
}

impl SaveChoice {
    pub fn parse(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "t" | "text" => Self::Text,
            "j" | "json" => Self::Json,
            "b" | "both" => Self::Both,
            _ => Self::Nothing,
        }
    }

    pub fn text(self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }

    pub fn json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

/// Empty or non-numeric input falls back to the default count, numbers are clamped.
pub fn parse_post_count(answer: &str) -> usize {
    match answer.trim().parse::<i64>() {
        Ok(count) => clamp_post_count(count),
        Err(_) => DEFAULT_POST_COUNT,
    }
}

/// Line-oriented questions over any reader/writer pair, so the flows can be
/// driven from tests as well as a terminal.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    /// Trimmed answer; end of input reads as an empty answer.
    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(question)?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    /// Username from the command line, then the configured target, then a question.
    pub fn username(
        &mut self,
        argument: Option<String>,
        configured: Option<&str>,
    ) -> io::Result<Option<String>> {
        let username = match argument.or_else(|| configured.map(str::to_string)) {
            Some(username) => username,
            None => self.ask("Enter Instagram username: ")?,
        };

        let username = username.trim().trim_start_matches('@').to_string();
        Ok((!username.is_empty()).then_some(username))
    }

    pub fn post_count(&mut self, argument: Option<i64>) -> io::Result<usize> {
        if let Some(count) = argument {
            return Ok(clamp_post_count(count));
        }

        let answer = self.ask(&format!(
            "Posts to analyze (1-{}, default {DEFAULT_POST_COUNT}): ",
            instalytics::MAX_POST_COUNT
        ))?;
        Ok(parse_post_count(&answer))
    }

    pub fn save_choice(&mut self) -> io::Result<SaveChoice> {
        let answer = self.ask("Save data? (t=text, j=json, b=both, n=no): ")?;
        Ok(SaveChoice::parse(&answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn post_count_answers() {
        assert_eq!(parse_post_count(""), 3);
        assert_eq!(parse_post_count("abc"), 3);
        assert_eq!(parse_post_count("0"), 1);
        assert_eq!(parse_post_count("-5"), 1);
        assert_eq!(parse_post_count(" 7 "), 7);
        assert_eq!(parse_post_count("15"), 10);
    }

    #[test]
    fn count_flag_skips_the_question() {
        let mut prompt = prompter("");
        assert_eq!(prompt.post_count(Some(42)).unwrap(), 10);
        assert!(prompt.output.is_empty());

        let mut prompt = prompter("5\n");
        assert_eq!(prompt.post_count(None).unwrap(), 5);
        assert_eq!(
            String::from_utf8(prompt.output).unwrap(),
            "Posts to analyze (1-10, default 3): "
        );
    }

    #[test]
    fn username_sources_in_order() {
        let mut prompt = prompter("typed\n");
        assert_eq!(
            prompt.username(Some("@arg".into()), Some("env")).unwrap(),
            Some("arg".to_string())
        );
        assert_eq!(
            prompt.username(None, Some("env")).unwrap(),
            Some("env".to_string())
        );
        assert_eq!(prompt.username(None, None).unwrap(), Some("typed".to_string()));
    }

    #[test]
    fn blank_username_is_none() {
        let mut prompt = prompter("   \n");
        assert_eq!(prompt.username(None, None).unwrap(), None);

        let mut prompt = prompter("");
        assert_eq!(prompt.username(None, None).unwrap(), None);
    }

    #[test]
    fn confirmation_needs_a_yes() {
        assert!(prompter("y\n").confirm("? ").unwrap());
        assert!(prompter("YES\n").confirm("? ").unwrap());
        assert!(!prompter("n\n").confirm("? ").unwrap());
        assert!(!prompter("\n").confirm("? ").unwrap());
    }

    #[test]
    fn save_choices() {
        assert_eq!(SaveChoice::parse("t"), SaveChoice::Text);
        assert_eq!(SaveChoice::parse(" JSON "), SaveChoice::Json);
        assert!(SaveChoice::parse("b").text() && SaveChoice::parse("both").json());
        assert_eq!(SaveChoice::parse("maybe"), SaveChoice::Nothing);
        assert_eq!(prompter("j\n").save_choice().unwrap(), SaveChoice::Json);
    }
}
