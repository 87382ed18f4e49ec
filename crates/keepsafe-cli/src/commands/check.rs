//! Secret strength estimation.

use zeroize::Zeroizing;

use crate::prompt;

/// Estimate the strength of a candidate secret.
pub fn run(secret: Option<&str>) -> anyhow::Result<()> {
    let prompted: Zeroizing<String>;
    let secret = match secret {
        Some(s) => s,
        None => {
            prompted = prompt::read_secret("Enter secret to check: ")?;
            &prompted
        }
    };

    anyhow::ensure!(!secret.is_empty(), "secret must not be empty");

    match strength_line(secret) {
        Some(line) => {
            println!("{line}");
            Ok(())
        }
        None => anyhow::bail!("could not estimate secret strength"),
    }
}

/// One-line crack-time estimate, or `None` when estimation fails.
pub(crate) fn strength_line(secret: &str) -> Option<String> {
    let estimate = zxcvbn::zxcvbn(secret, &[]).ok()?;
    Some(format!(
        "It would take {} to crack this secret (score {}/4)",
        estimate
            .crack_times()
            .offline_slow_hashing_1e4_per_second(),
        estimate.score()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_line_mentions_score() {
        let line = strength_line("correct horse battery staple").unwrap();
        assert!(line.contains("score"));
    }

    #[test]
    fn test_weak_secret_scores_lower_than_strong() {
        let weak = zxcvbn::zxcvbn("abc123", &[]).unwrap();
        let strong = zxcvbn::zxcvbn("0qL#kT9$wXz!mP4vRb", &[]).unwrap();
        assert!(weak.score() < strong.score());
    }

    #[test]
    fn test_empty_secret_has_no_estimate() {
        assert!(strength_line("").is_none());
    }
}
