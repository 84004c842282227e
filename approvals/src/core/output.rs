//! Formatting for captured child-process output.

const RULE: &str = "============";

/// Render one labelled output block, or `None` when there is nothing to show.
pub fn format_block(label: &str, text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    Some(format!("\n{RULE}\n{label}:\n{RULE}\n{text}\n{RULE}\n"))
}

/// Render the command line announced before a launch.
pub fn format_command_line(exe: &str, args: &[String]) -> String {
    format!("CMD:  {} {}", exe, args.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_block() {
        assert_eq!(format_block("stdout", ""), None);
    }

    #[test]
    fn block_is_delimited() {
        let block = format_block("stderr", "boom").expect("block");
        assert_eq!(
            block,
            "\n============\nstderr:\n============\nboom\n============\n"
        );
    }

    #[test]
    fn command_line_joins_args() {
        let line = format_command_line("/usr/bin/meld", &["r.txt".into(), "a.txt".into()]);
        assert_eq!(line, "CMD:  /usr/bin/meld r.txt a.txt");
    }
}
