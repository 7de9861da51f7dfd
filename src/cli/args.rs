//! Command-line argument definitions

use clap::Parser;

/// Event OData gateway service
#[derive(Parser, Debug)]
#[command(name = "eventgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Listen host; overrides the HOST environment variable
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port; overrides the PORT environment variable
    #[arg(long)]
    pub port: Option<u16>,

    /// Entity model namespace; overrides the NAMESPACE environment variable
    #[arg(long)]
    pub namespace: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_overrides() {
        let cli = Cli::parse_from(["eventgate"]);
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.namespace.is_none());
    }

    #[test]
    fn test_flag_overrides() {
        let cli = Cli::parse_from(["eventgate", "--port", "9090", "--host", "127.0.0.1"]);
        assert_eq!(cli.port, Some(9090));
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
    }
}
