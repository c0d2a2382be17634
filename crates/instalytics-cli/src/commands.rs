use crate::prompt::Prompter;
use instalytics::report::{render_analytics, render_profile_card, render_quick_summary};
use instalytics::{ReportFormat, ScrapeError, Scraper, write_report};
use std::io::{BufRead, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The run could not fetch what was asked for and said so.
    Reported,
    /// Required input was missing.
    Failed,
}

/// Profile counters, with an offer to log in when the profile is walled off.
pub async fn followers<R: BufRead, W: Write>(
    scraper: &mut Scraper,
    prompt: &mut Prompter<R, W>,
    username: Option<String>,
    output_dir: &Path,
) -> anyhow::Result<Outcome> {
    let Some(username) = resolve_username(scraper, prompt, username)? else {
        return Ok(Outcome::Failed);
    };

    prompt.say(&format!("Fetching data for @{username}..."))?;
    let snapshot = match scraper.profile_snapshot(&username).await {
        Ok(snapshot) => snapshot,
        Err(err) if err.needs_login() && !scraper.is_authenticated() => {
            prompt.say("Unable to access this profile without login.")?;
            if !prompt.confirm(
                "Do you want to login to Instagram to try accessing this account? (y/n): ",
            )? {
                return report_failure(prompt, &err);
            }

            if let Err(login_err) = scraper.login().await {
                prompt.say(&format!("Login failed: {login_err}"))?;
                return Ok(Outcome::Reported);
            }

            prompt.say(&format!("Retrying data fetch for @{username}..."))?;
            match scraper.profile_snapshot(&username).await {
                Ok(snapshot) => snapshot,
                Err(err) => return report_failure(prompt, &err),
            }
        }
        Err(err) => return report_failure(prompt, &err),
    };

    prompt.say(&render_profile_card(&snapshot))?;

    if prompt.confirm("\nSave data to file? (y/n): ")? {
        let path = write_report(output_dir, &snapshot, ReportFormat::Followers)?;
        prompt.say(&format!("Data saved to: {}", path.display()))?;
    }

    Ok(Outcome::Done)
}

pub async fn quick<R: BufRead, W: Write>(
    scraper: &Scraper,
    prompt: &mut Prompter<R, W>,
    username: Option<String>,
) -> anyhow::Result<Outcome> {
    let Some(username) = resolve_username(scraper, prompt, username)? else {
        return Ok(Outcome::Failed);
    };

    match scraper.profile_snapshot(&username).await {
        Ok(snapshot) => {
            prompt.say(&render_quick_summary(&snapshot))?;
            Ok(Outcome::Done)
        }
        Err(err) => report_failure(prompt, &err),
    }
}

/// Likes and comments over recent posts, saved as the short report.
pub async fn posts<R: BufRead, W: Write>(
    scraper: &Scraper,
    prompt: &mut Prompter<R, W>,
    username: Option<String>,
    count: Option<i64>,
    output_dir: &Path,
) -> anyhow::Result<Outcome> {
    let Some(username) = resolve_username(scraper, prompt, username)? else {
        return Ok(Outcome::Failed);
    };
    let count = prompt.post_count(count)?;

    prompt.say(&format!("\nAnalyzing @{username}..."))?;
    let snapshot = match scraper.analyze(&username, count).await {
        Ok(snapshot) => snapshot,
        Err(err) => return report_failure(prompt, &err),
    };

    prompt.say(&render_quick_summary(&snapshot))?;

    if prompt.confirm("\nSave report? (y/n): ")? {
        let path = write_report(output_dir, &snapshot, ReportFormat::Summary)?;
        prompt.say(&format!("Report saved: {}", path.display()))?;
    }

    Ok(Outcome::Done)
}

/// Full breakdown, saved as text, JSON or both.
pub async fn analyze<R: BufRead, W: Write>(
    scraper: &Scraper,
    prompt: &mut Prompter<R, W>,
    username: Option<String>,
    count: Option<i64>,
    output_dir: &Path,
) -> anyhow::Result<Outcome> {
    let Some(username) = resolve_username(scraper, prompt, username)? else {
        return Ok(Outcome::Failed);
    };
    let count = prompt.post_count(count)?;

    prompt.say(&format!("\nAnalyzing @{username} ({count} posts)..."))?;
    let snapshot = match scraper.analyze(&username, count).await {
        Ok(snapshot) => snapshot,
        Err(err) => return report_failure(prompt, &err),
    };

    prompt.say(&render_analytics(&snapshot))?;

    let choice = prompt.save_choice()?;
    if choice.text() {
        let path = write_report(output_dir, &snapshot, ReportFormat::Analytics)?;
        prompt.say(&format!("Analytics report saved to: {}", path.display()))?;
    }
    if choice.json() {
        let path = write_report(output_dir, &snapshot, ReportFormat::Json)?;
        prompt.say(&format!("Analytics data saved to: {}", path.display()))?;
    }

    Ok(Outcome::Done)
}

pub async fn login<R: BufRead, W: Write>(
    scraper: &mut Scraper,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<Outcome> {
    match scraper.login().await {
        Ok(()) => {
            let who = scraper.logged_in_as().unwrap_or("unknown");
            prompt.say(&format!("Logged in as @{who}"))?;
            if let Some(path) = scraper.config().session_file.as_deref() {
                prompt.say(&format!("Session saved to: {}", path.display()))?;
            }
            Ok(Outcome::Done)
        }
        Err(err) => {
            prompt.say(&format!("Login failed: {err}"))?;
            Ok(Outcome::Reported)
        }
    }
}

fn resolve_username<R: BufRead, W: Write>(
    scraper: &Scraper,
    prompt: &mut Prompter<R, W>,
    argument: Option<String>,
) -> anyhow::Result<Option<String>> {
    let username = prompt.username(argument, scraper.config().target_account.as_deref())?;
    if username.is_none() {
        prompt.say("No username provided.")?;
    }
    Ok(username)
}

fn report_failure<R: BufRead, W: Write>(
    prompt: &mut Prompter<R, W>,
    err: &ScrapeError,
) -> anyhow::Result<Outcome> {
    tracing::debug!(target: "instalytics", "{err:?}");
    prompt.say(&format!("Failed to retrieve data: {err}"))?;

    let hint = match err {
        ScrapeError::NotFound(_) => Some("Verify the username is correct."),
        ScrapeError::AccessDenied(_) => {
            Some("The account is private or requires login (set INSTAGRAM_USERNAME and INSTAGRAM_PASSWORD).")
        }
        ScrapeError::RateLimit => Some("Instagram is rate limiting requests, try again later."),
        ScrapeError::Network(_) => Some("Check your internet connection."),
        _ => None,
    };
    if let Some(hint) = hint {
        prompt.say(hint)?;
    }

    Ok(Outcome::Reported)
}
