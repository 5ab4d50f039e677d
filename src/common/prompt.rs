//! Yes/no questions on the terminal.
//!
//! Convention: "no" is the conservative choice. Anything that isn't an explicit "y" or "yes"
//! counts as a "no", an empty answer picks the default.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Ask the operator a question and wait for the first line of input.
pub async fn confirm(question: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "[Y/n]" } else { "[y/N]" };

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{question} {hint}\n").as_bytes())
        .await
        .context("error writing prompt")?;
    stdout.flush().await.context("error flushing prompt")?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("error reading answer from stdin")?;

    Ok(parse_answer(&answer, default_yes))
}

/// Interpret an answer to a yes/no question.
pub fn parse_answer(answer: &str, default_yes: bool) -> bool {
    let answer = answer.trim();
    if answer.is_empty() {
        return default_yes;
    }
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::parse_answer;
    use rstest::rstest;

    #[rstest]
    #[case("", false, false)]
    #[case("\n", true, true)]
    #[case("y\n", false, true)]
    #[case("YES", false, true)]
    #[case("  Yes  ", false, true)]
    #[case("n", true, false)]
    #[case("yess", false, false)]
    #[case("sure", true, false)]
    fn answers(#[case] answer: &str, #[case] default_yes: bool, #[case] expected: bool) {
        assert_eq!(parse_answer(answer, default_yes), expected);
    }
}
