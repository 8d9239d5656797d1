use colored::Colorize;
use inquire::Confirm;
use regex::Regex;

pub mod config;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// Asks whether an existing addon folder may be replaced or deleted.
///
/// `assume_yes` skips the prompt. A prompt that cannot be shown (no TTY,
/// Ctrl+C) counts as "no".
pub fn confirm_folder_action(action: &str, folder_name: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }

    let message = format!("{} '{}'?", action, folder_name);
    match Confirm::new(&message).with_default(false).prompt() {
        Ok(answer) => answer,
        Err(e) => {
            tracing::debug!("Confirmation prompt failed: {}", e);
            println_pad!("{}", "No confirmation given, skipping.".bright_yellow());
            false
        }
    }
}

fn visible_len(ansi: &Regex, s: &str) -> usize {
    ansi.replace_all(s, "").chars().count()
}

/// Prints the provided lines inside an ASCII box
pub fn print_ansi_boxed_lines(lines: &[String]) {
    let ansi = match Regex::new("\x1b\\[[0-9;]*m") {
        Ok(re) => re,
        Err(_) => {
            for line in lines {
                println_pad!("{}", line);
            }
            return;
        }
    };

    let width = lines
        .iter()
        .map(|s| visible_len(&ansi, s))
        .max()
        .unwrap_or(0);

    let border = "-".repeat(width + 4);
    println_pad!("{}", border);
    for line in lines {
        let pad = width - visible_len(&ansi, line);
        println_pad!("| {}{} |", line, " ".repeat(pad));
    }
    println_pad!("{}", border);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_len_ignores_ansi_codes() {
        let ansi = Regex::new("\x1b\\[[0-9;]*m").unwrap();
        assert_eq!(visible_len(&ansi, "\x1b[1;32mpfQuest\x1b[0m"), 7);
        assert_eq!(visible_len(&ansi, "plain"), 5);
    }

    #[test]
    fn test_confirm_assume_yes_skips_prompt() {
        assert!(confirm_folder_action("Overwrite", "pfQuest", true));
    }
}
