use crate::config::DevServer;
use clap::Args;

/// Where the dev server can be reached
#[derive(Clone, Debug, Args)]
#[command(next_help_heading = "Dev server")]
pub struct DevServerArgs {
    /// The port to serve on
    #[arg(long, env = "DEV_PORT", default_value_t = 3000)]
    pub port: u16,
    /// The hostname the browser reaches the dev server at
    #[arg(long, env = "DEV_HOSTNAME", default_value = "localhost")]
    pub hostname: String,
    /// The full public host of the dev server, e.g. `//10.0.2.2:3000/` [default: //<hostname>:<port>/]
    #[arg(long, env = "DEV_HOST")]
    pub host: Option<String>,
}

impl DevServerArgs {
    pub fn dev_server(self) -> DevServer {
        let Self {
            port,
            hostname,
            host,
        } = self;
        DevServer::new(port, &hostname, host)
    }
}
