use std::io::IsTerminal;

/// Returns true if running in an interactive terminal (both stdin and stdout are TTYs).
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Fail with a hint when `what` needs to prompt but there is no terminal.
pub fn require_interactive(what: &str) -> anyhow::Result<()> {
    if !is_interactive() {
        anyhow::bail!("{what} needs an interactive terminal");
    }
    Ok(())
}
