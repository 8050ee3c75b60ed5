use std::net::{IpAddr, SocketAddr};

use clap::Args;

/// Listener and auth settings for `serve`. Storage and generation settings
/// come from their own crates' `from_env`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "BOOKFORGE_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "BOOKFORGE_PORT", default_value_t = 3810)]
    pub port: u16,

    /// Shared API key accepted in addition to keys created with `keygen`.
    #[arg(long, env = "BOOKFORGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        serve: ServeArgs,
    }

    #[test]
    fn defaults_and_overrides() {
        let args = Wrapper::try_parse_from(["test"]).unwrap().serve;
        assert_eq!(args.addr().port(), 3810);

        let args = Wrapper::try_parse_from(["test", "--bind", "127.0.0.1", "--port", "9000"])
            .unwrap()
            .serve;
        assert_eq!(args.addr().to_string(), "127.0.0.1:9000");
    }
}
