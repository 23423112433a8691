//! Command-line interface.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "chatrelay",
    version,
    about = "Chat gateway relaying conversations to Yandex Foundation Models"
)]
pub struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit OpenTelemetry spans alongside console logs.
    #[arg(long)]
    pub otel: bool,
}

impl Cli {
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "info,chatrelay=debug,chatrelay_core=debug,chatrelay_infra=debug",
            _ => "debug,chatrelay_core=trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["chatrelay"]);
        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.port, 8000);
        assert_eq!(cli.log_filter(), "info");
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::parse_from(["chatrelay", "-vv"]);
        assert_eq!(cli.log_filter(), "debug,chatrelay_core=trace");
        let cli = Cli::parse_from(["chatrelay", "--quiet"]);
        assert_eq!(cli.log_filter(), "error");
    }
}
